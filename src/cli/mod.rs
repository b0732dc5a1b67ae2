//! Command-line definitions for the `colloquy` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{
    AssistantConfig, ClientConfig, CodeExecutionConfig, CompletionConfig, Endpoint,
    GroupChatConfig,
};

/// colloquy CLI
#[derive(Parser, Debug)]
#[command(name = "colloquy", version, about = "Chat completions and bounded agent conversations")]
pub struct Cli {
    /// Settings file (defaults to <config dir>/colloquy/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one system + user message pair and print the reply
    Complete(CompleteArgs),
    /// Give one task to an assistant agent and print the exchange
    Assist(AssistArgs),
    /// Run a bounded group chat between you and an assistant
    GroupChat(GroupChatArgs),
}

/// Options shared by every command that talks to a model.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Endpoint to call (openai, openrouter)
    #[arg(short, long)]
    pub endpoint: Option<Endpoint>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// System message
    #[arg(short, long)]
    pub system: Option<String>,

    /// Request timeout in seconds (none waits indefinitely)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl ModelArgs {
    /// Flags override the settings file, which overrides defaults.
    pub fn apply(&self, client: &mut ClientConfig, system: &mut String) {
        if let Some(ref model) = self.model {
            client.model = model.clone();
        }
        if let Some(ref s) = self.system {
            *system = s.clone();
        }
        if let Some(secs) = self.timeout_secs {
            client.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(t) = self.temperature {
            client.settings.temperature = Some(t);
        }
        if let Some(max) = self.max_tokens {
            client.settings.max_tokens = Some(max);
        }
    }
}

/// Arguments for `colloquy complete`.
#[derive(Args, Debug)]
pub struct CompleteArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// User message (positional)
    pub prompt: Option<String>,
}

/// Arguments for `colloquy assist`.
#[derive(Args, Debug)]
pub struct AssistArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Task for the assistant (positional)
    pub task: Option<String>,
}

/// Arguments for `colloquy group-chat`.
#[derive(Args, Debug)]
pub struct GroupChatArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Maximum number of agent turns
    #[arg(long)]
    pub max_round: Option<usize>,

    /// Input that ends the chat early
    #[arg(long)]
    pub termination_token: Option<String>,

    /// Run code blocks from the assistant in this directory
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Trailing messages scanned for code blocks
    #[arg(long, requires = "work_dir")]
    pub last_n_messages: Option<usize>,

    /// Seed message sent by you (positional)
    pub seed: Option<String>,
}

impl CompleteArgs {
    pub fn apply(&self, config: &mut CompletionConfig) {
        self.model.apply(&mut config.client, &mut config.system_message);
        if let Some(ref prompt) = self.prompt {
            config.user_message = prompt.clone();
        }
    }
}

impl AssistArgs {
    pub fn apply(&self, config: &mut AssistantConfig) {
        self.model.apply(&mut config.client, &mut config.system_message);
        if let Some(ref task) = self.task {
            config.task = task.clone();
        }
    }
}

impl GroupChatArgs {
    /// `--work-dir` replaces only the directory of any code execution
    /// settings already loaded; the rest keep their values.
    pub fn apply(&self, config: &mut GroupChatConfig) {
        self.model.apply(&mut config.client, &mut config.system_message);
        if let Some(max_round) = self.max_round {
            config.max_round = max_round;
        }
        if let Some(ref token) = self.termination_token {
            config.termination_token = token.clone();
        }
        if let Some(ref work_dir) = self.work_dir {
            let exec = match config.code_execution.take() {
                Some(mut exec) => {
                    exec.work_dir = work_dir.clone();
                    exec
                }
                None => CodeExecutionConfig::builder().work_dir(work_dir.clone()).build(),
            };
            config.code_execution = Some(exec);
        }
        if let (Some(n), Some(exec)) = (self.last_n_messages, config.code_execution.as_mut()) {
            exec.last_n_messages = n;
        }
        if let Some(ref seed) = self.seed {
            config.seed_message = seed.clone();
        }
    }
}

/// Lines printed before the single-exchange assistant runs.
pub fn assist_banner(agent_name: &str) -> String {
    format!("=== colloquy assistant ===\nA single exchange with the {agent_name} agent.\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_complete_with_defaults() {
        let cli = Cli::try_parse_from(["colloquy", "complete"]).unwrap();
        match cli.command {
            Commands::Complete(args) => {
                assert!(args.model.endpoint.is_none());
                assert!(args.model.model.is_none());
                assert!(args.prompt.is_none());
            }
            other => panic!("expected Complete, got {other:?}"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_complete_with_all_options() {
        let cli = Cli::try_parse_from([
            "colloquy",
            "complete",
            "-e",
            "openrouter",
            "-m",
            "moonshotai/kimi-k2:free",
            "-s",
            "Be brief",
            "--timeout-secs",
            "30",
            "hi",
        ])
        .unwrap();
        match cli.command {
            Commands::Complete(args) => {
                assert_eq!(args.model.endpoint, Some(Endpoint::OpenRouter));
                assert_eq!(args.model.model.as_deref(), Some("moonshotai/kimi-k2:free"));
                assert_eq!(args.model.system.as_deref(), Some("Be brief"));
                assert_eq!(args.model.timeout_secs, Some(30));
                assert_eq!(args.prompt.as_deref(), Some("hi"));
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn parse_group_chat_options() {
        let cli = Cli::try_parse_from([
            "colloquy",
            "--config",
            "settings.toml",
            "group-chat",
            "--max-round",
            "4",
            "--termination-token",
            "quit",
            "--work-dir",
            "coding",
            "--last-n-messages",
            "2",
            "Plot a sine wave",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("settings.toml")));
        match cli.command {
            Commands::GroupChat(args) => {
                assert_eq!(args.max_round, Some(4));
                assert_eq!(args.termination_token.as_deref(), Some("quit"));
                assert_eq!(args.work_dir, Some(PathBuf::from("coding")));
                assert_eq!(args.last_n_messages, Some(2));
                assert_eq!(args.seed.as_deref(), Some("Plot a sine wave"));
            }
            other => panic!("expected GroupChat, got {other:?}"),
        }
    }

    #[test]
    fn last_n_messages_requires_work_dir() {
        assert!(Cli::try_parse_from(["colloquy", "group-chat", "--last-n-messages", "2"]).is_err());
    }

    #[test]
    fn unknown_endpoint_is_error() {
        assert!(Cli::try_parse_from(["colloquy", "assist", "-e", "nowhere"]).is_err());
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["colloquy"]).is_err());
    }

    fn client() -> ClientConfig {
        ClientConfig::new(
            crate::config::Credentials::for_endpoint(Endpoint::OpenAi, Some("sk".into())),
            "gpt-3.5-turbo",
        )
    }

    fn group_chat_args(argv: &[&str]) -> GroupChatArgs {
        let mut full = vec!["colloquy", "group-chat"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::GroupChat(args) => args,
            other => panic!("expected GroupChat, got {other:?}"),
        }
    }

    #[test]
    fn sampling_flags_reach_client_settings() {
        let cli = Cli::try_parse_from([
            "colloquy", "assist", "-t", "0.7", "--max-tokens", "1024", "Say hi",
        ])
        .unwrap();
        let Commands::Assist(args) = cli.command else {
            panic!("expected Assist");
        };
        let mut config = AssistantConfig::new(client());
        args.apply(&mut config);

        assert!((config.client.settings.temperature.unwrap() - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.client.settings.max_tokens, Some(1024));
        assert_eq!(config.task, "Say hi");
    }

    #[test]
    fn work_dir_flag_keeps_loaded_execution_settings() {
        let mut config = GroupChatConfig::new(client()).with_code_execution(
            CodeExecutionConfig::builder()
                .work_dir("from-file")
                .last_n_messages(5)
                .timeout(Duration::from_secs(7))
                .build(),
        );

        group_chat_args(&["--work-dir", "from-flag"]).apply(&mut config);

        let exec = config.code_execution.unwrap();
        assert_eq!(exec.work_dir, PathBuf::from("from-flag"));
        assert_eq!(exec.last_n_messages, 5);
        assert_eq!(exec.timeout, Duration::from_secs(7));
    }

    #[test]
    fn work_dir_flag_without_file_uses_defaults() {
        let mut config = GroupChatConfig::new(client());

        group_chat_args(&["--work-dir", "coding", "--last-n-messages", "2", "--max-round", "4"])
            .apply(&mut config);

        let exec = config.code_execution.unwrap();
        assert_eq!(exec.work_dir, PathBuf::from("coding"));
        assert_eq!(exec.last_n_messages, 2);
        assert_eq!(exec.timeout, Duration::from_secs(60));
        assert_eq!(config.max_round, 4);
    }

    #[test]
    fn assist_banner_names_the_agent() {
        let banner = assist_banner("Helper");
        assert_eq!(
            banner.lines().collect::<Vec<_>>(),
            ["=== colloquy assistant ===", "A single exchange with the Helper agent."]
        );
    }
}
