//! Running fenced code blocks on behalf of the human proxy.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::CodeExecutionConfig;
use crate::error::{ColloquyError, Result};
use crate::types::ChatMessage;

/// Exit code reported when a block exceeds its time limit.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// A fenced code block found in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

/// Combined result of executing a sequence of blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub output: String,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// Message body sent back into the conversation.
    pub fn report(&self) -> String {
        let status = if self.succeeded() {
            "execution succeeded"
        } else {
            "execution failed"
        };
        format!("exitcode: {} ({status})\nCode output: {}", self.exit_code, self.output)
    }
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*([\w+-]*)[^\n]*\n(.*?)```").expect("fence pattern is valid")
    })
}

/// Extract fenced code blocks in order of appearance.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    fence_regex()
        .captures_iter(text)
        .map(|caps| CodeBlock {
            language: caps[1].to_lowercase(),
            code: caps[2].to_string(),
        })
        .collect()
}

/// Code blocks across `messages`, oldest first.
pub fn collect_code_blocks(messages: &[ChatMessage]) -> Vec<CodeBlock> {
    messages
        .iter()
        .flat_map(|m| extract_code_blocks(&m.content))
        .collect()
}

/// Executes code blocks. Implementations decide on sandboxing.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(&self, blocks: &[CodeBlock]) -> Result<ExecutionResult>;
}

/// Runs blocks as local processes inside a working directory.
///
/// Blocks run in order; execution stops at the first failing block.
#[derive(Debug, Clone)]
pub struct LocalCodeExecutor {
    work_dir: PathBuf,
    timeout: Duration,
}

impl LocalCodeExecutor {
    pub fn new(work_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            work_dir: work_dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &CodeExecutionConfig) -> Self {
        Self::new(config.work_dir.clone(), config.timeout)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn run_block(&self, index: usize, block: &CodeBlock) -> Result<ExecutionResult> {
        let Some((interpreter, ext)) = interpreter_for(&block.language) else {
            return Ok(ExecutionResult {
                exit_code: 1,
                output: format!("unknown language {}", block.language),
            });
        };

        let file_name = format!("code_block_{index}.{ext}");
        tokio::fs::write(self.work_dir.join(&file_name), &block.code).await?;
        debug!(interpreter, file = %file_name, "executing code block");

        let mut command = Command::new(interpreter);
        command
            .arg(&file_name)
            .current_dir(&self.work_dir)
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| {
                ColloquyError::CodeExecution(format!("failed to start {interpreter}: {e}"))
            })?,
            Err(_) => {
                warn!(file = %file_name, timeout_secs = self.timeout.as_secs(), "code block timed out");
                return Ok(ExecutionResult {
                    exit_code: TIMEOUT_EXIT_CODE,
                    output: "Timeout".to_string(),
                });
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ExecutionResult {
            exit_code: output.status.code().unwrap_or(1),
            output: text,
        })
    }
}

fn interpreter_for(language: &str) -> Option<(&'static str, &'static str)> {
    match language {
        "" | "sh" | "shell" | "console" => Some(("sh", "sh")),
        "bash" => Some(("bash", "sh")),
        "python" | "py" | "python3" => Some(("python3", "py")),
        _ => None,
    }
}

#[async_trait]
impl CodeExecutor for LocalCodeExecutor {
    async fn execute(&self, blocks: &[CodeBlock]) -> Result<ExecutionResult> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        let mut output = String::new();
        for (index, block) in blocks.iter().enumerate() {
            let result = self.run_block(index, block).await?;
            output.push_str(&result.output);
            if !result.succeeded() {
                return Ok(ExecutionResult {
                    exit_code: result.exit_code,
                    output,
                });
            }
        }
        Ok(ExecutionResult {
            exit_code: 0,
            output,
        })
    }
}
