//! Single-turn completion: one request, print the first completion's text.

use std::io::Write;

use tracing::info;

use crate::client::ChatClient;
use crate::error::Result;
use crate::types::ChatMessage;

/// Send `messages` once, write the returned text plus a newline to `out`,
/// and return the text.
pub async fn complete_and_print<W: Write>(
    client: &ChatClient,
    messages: Vec<ChatMessage>,
    out: &mut W,
) -> Result<String> {
    let response = client.complete(messages).await?;
    info!(
        model = client.model(),
        output_tokens = response.usage.output_tokens,
        "completion received"
    );
    writeln!(out, "{}", response.text)?;
    out.flush()?;
    Ok(response.text)
}
