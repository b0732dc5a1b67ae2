//! colloquy CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use colloquy::agent::{self, MessageSink, StdinInput};
use colloquy::cli::{self, AssistArgs, Cli, Commands, CompleteArgs, GroupChatArgs};
use colloquy::client::ChatClient;
use colloquy::completion;
use colloquy::config::{
    self, AssistantConfig, CompletionConfig, Endpoint, EnvLoader, GroupChatConfig, Settings,
};
use colloquy::types::ChatMessage;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // `.env` may carry RUST_LOG, so it is exported before the filter is built.
    let dotenv = config::env::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(Some(path)) => debug!(path = %path.display(), "loaded .env"),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "ignoring .env"),
    }

    let cli = Cli::parse();
    let env = EnvLoader::from_process();

    let result = match Settings::discover(cli.config.as_deref()) {
        Ok(settings) => match cli.command {
            Commands::Complete(args) => handle_complete(args, &env, &settings).await,
            Commands::Assist(args) => handle_assist(args, &env, &settings).await,
            Commands::GroupChat(args) => handle_group_chat(args, &env, &settings).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn handle_complete(
    args: CompleteArgs,
    env: &EnvLoader,
    settings: &Settings,
) -> colloquy::error::Result<()> {
    let endpoint = args.model.endpoint.unwrap_or(Endpoint::OpenRouter);
    let mut config = CompletionConfig::new(env.client_config(endpoint, config::DEFAULT_COMPLETION_MODEL));
    settings.apply_completion(&mut config);
    args.apply(&mut config);

    let client = ChatClient::connect(&config.client)?;
    let mut stdout = std::io::stdout().lock();
    completion::complete_and_print(&client, config.messages(), &mut stdout).await?;
    Ok(())
}

async fn handle_assist(
    args: AssistArgs,
    env: &EnvLoader,
    settings: &Settings,
) -> colloquy::error::Result<()> {
    let endpoint = args.model.endpoint.unwrap_or(Endpoint::OpenAi);
    let mut config = AssistantConfig::new(env.client_config(endpoint, config::DEFAULT_ASSISTANT_MODEL));
    settings.apply_assistant(&mut config);
    args.apply(&mut config);

    println!("{}", cli::assist_banner(&config.name));

    let result = agent::run_single_exchange(&config).await?;
    println!("{result}");
    Ok(())
}

async fn handle_group_chat(
    args: GroupChatArgs,
    env: &EnvLoader,
    settings: &Settings,
) -> colloquy::error::Result<()> {
    let endpoint = args.model.endpoint.unwrap_or(Endpoint::OpenAi);
    let mut config = GroupChatConfig::new(env.client_config(endpoint, config::DEFAULT_ASSISTANT_MODEL));
    settings.apply_group_chat(&mut config);
    args.apply(&mut config);

    println!(
        "=== colloquy group chat (up to {} rounds, type '{}' to stop) ===",
        config.max_round, config.termination_token
    );

    let sink: MessageSink = Arc::new(|message: &ChatMessage| {
        let speaker = message.name.as_deref().unwrap_or("unknown");
        println!("\n{speaker}:\n{}\n", message.content);
        println!("{}", "-".repeat(40));
    });

    let client = ChatClient::connect(&config.client)?;
    let result =
        agent::run_group_chat(&config, client, Box::new(StdinInput::new()), Some(sink)).await?;
    println!(
        "Finished after {} rounds ({}, {} tokens).",
        result.rounds, result.termination, result.usage.total_tokens
    );
    Ok(())
}
