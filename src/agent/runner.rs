//! Entry points wiring configs, clients, and agents together.
//!
//! Each runner owns the client it is given and releases it on every exit
//! path, including when the conversation itself fails.

use std::future::Future;
use std::sync::Arc;

use tracing::warn;

use crate::client::ChatClient;
use crate::config::{AssistantConfig, GroupChatConfig};
use crate::error::Result;
use crate::provider::ModelProvider;

use super::assistant::{AssistantAgent, TaskResult};
use super::code_exec::LocalCodeExecutor;
use super::group_chat::{ChatResult, GroupChat, GroupChatManager, MessageSink};
use super::human::{HumanInput, HumanProxyAgent};
use super::Agent;

/// Name of the manager agent that drives group chats.
pub const MANAGER_NAME: &str = "chat_manager";

/// Run `work` and then close `client`, whatever the outcome. A failure of
/// `work` takes precedence over a failure to release.
async fn with_release<T, F>(client: &ChatClient, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let outcome = work.await;
    let released = client.close().await;
    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), released) => {
            if let Err(release_err) = released {
                warn!(error = %release_err, "release failed after an earlier error");
            }
            Err(e)
        }
    }
}

/// One assistant, one task, one reply; the client is built from `config`
/// and released before returning.
#[cfg(feature = "openai")]
pub async fn run_single_exchange(config: &AssistantConfig) -> Result<TaskResult> {
    let client = ChatClient::connect(&config.client)?;
    exchange(config, client).await
}

/// Like [`run_single_exchange`], over an explicit provider. Every call builds
/// and releases its own client.
pub async fn run_single_exchange_with(
    config: &AssistantConfig,
    provider: Arc<dyn ModelProvider>,
) -> Result<TaskResult> {
    let client = ChatClient::with_provider(&config.client, provider)?;
    exchange(config, client).await
}

async fn exchange(config: &AssistantConfig, client: ChatClient) -> Result<TaskResult> {
    let assistant = AssistantAgent::new(&config.name, &config.system_message, client.clone());
    with_release(&client, assistant.run(&config.task)).await
}

/// Human proxy + assistant under a round-robin manager, seeded by the human.
/// `sink`, when given, sees every message as it is appended. The result's
/// usage is the client's accumulated usage once the chat ends.
pub async fn run_group_chat(
    config: &GroupChatConfig,
    client: ChatClient,
    input: Box<dyn HumanInput>,
    sink: Option<MessageSink>,
) -> Result<ChatResult> {
    let mut human = HumanProxyAgent::new(&config.human_name, input, &config.termination_token);
    if let Some(ref exec) = config.code_execution {
        human = human.with_code_executor(
            Box::new(LocalCodeExecutor::from_config(exec)),
            exec.last_n_messages,
        );
    }
    let assistant = AssistantAgent::new(&config.assistant_name, &config.system_message, client.clone());

    let agents: Vec<Box<dyn Agent>> = vec![Box::new(human), Box::new(assistant)];

    with_release(&client, async {
        let chat = GroupChat::new(agents, config.max_round)?;
        let mut manager = GroupChatManager::new(MANAGER_NAME, chat);
        if let Some(sink) = sink {
            manager = manager.with_message_sink(sink);
        }
        let mut result = manager
            .run(&config.human_name, config.seed_message.clone())
            .await?;
        result.usage = client.usage();
        Ok(result)
    })
    .await
}
