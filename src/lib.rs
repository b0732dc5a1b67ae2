//! colloquy: chat completions and small bounded agent conversations.
//!
//! Three entry points share one set of types:
//!
//! - [`completion::complete_and_print`]: one request, print the first
//!   completion's text.
//! - [`agent::run_single_exchange`]: one assistant, one task, one reply,
//!   with the model client released on every exit path.
//! - [`agent::run_group_chat`]: a human proxy and an assistant taking
//!   round-robin turns until a round cap or the human's termination token.
//!
//! # Quick Start
//!
//! ```no_run
//! use colloquy::prelude::*;
//! use colloquy::config::{Credentials, Endpoint};
//!
//! # async fn example() -> colloquy::error::Result<()> {
//! let credentials = Credentials::for_endpoint(Endpoint::OpenAi, Some("sk-...".into()));
//! let client = ChatClient::connect(&ClientConfig::new(credentials, "gpt-4o-mini"))?;
//! let reply = client.complete(vec![ChatMessage::user("Hello!")]).await?;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
