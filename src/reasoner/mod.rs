mod claude;
mod codex;
mod parse;

pub use claude::ClaudeReasoner;
pub use codex::CodexReasoner;
pub use parse::decode_output;

use crate::config::{Config, Provider};
use crate::error::ReasonerError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout as tokio_timeout;

/// One typed analysis request for the reasoning engine
#[derive(Debug, Clone)]
pub struct ReasoningRequest {
    pub unit: &'static str,
    pub user_id: String,
    pub instructions: &'static str,
    /// JSON Schema the answer must satisfy
    pub output_schema: serde_json::Value,
    /// Serialized data slice
    pub payload: String,
}

impl ReasoningRequest {
    pub fn render_prompt(&self) -> String {
        let schema = serde_json::to_string_pretty(&self.output_schema)
            .unwrap_or_else(|_| self.output_schema.to_string());

        format!(
            "{}\n\n## Output\n\nRespond with a single JSON object matching this schema and nothing else:\n\n```json\n{}\n```\n\n## Financial data for user {}\n\n```json\n{}\n```",
            self.instructions.trim_end(),
            schema,
            self.user_id,
            self.payload
        )
    }
}

#[derive(Debug)]
pub struct ReasonerOutput {
    pub text: String,
    pub duration: Duration,
}

#[async_trait]
pub trait Reasoner: Send + Sync {
    fn name(&self) -> &'static str;

    async fn invoke(
        &self,
        request: &ReasoningRequest,
        timeout: Duration,
    ) -> Result<ReasonerOutput, ReasonerError>;
}

/// Create the reasoner for the configured provider
pub fn create_reasoner(config: &Config) -> Arc<dyn Reasoner> {
    match config.provider {
        Provider::ClaudeCli => Arc::new(ClaudeReasoner {
            binary: config.providers.claude_cli.binary.clone(),
            model: config.providers.claude_cli.model.clone(),
            permission_mode: config.providers.claude_cli.permission_mode.clone(),
        }),
        Provider::CodexCli => Arc::new(CodexReasoner {
            binary: config.providers.codex_cli.binary.clone(),
            model: config.providers.codex_cli.model.clone(),
        }),
    }
}

/// Use the binary as a path if it looks like one, otherwise let PATH resolve it
fn command_for(binary: &std::path::Path) -> Command {
    let binary_str = binary.to_string_lossy();
    if binary_str.contains('/') || binary_str.contains('\\') {
        Command::new(binary)
    } else {
        Command::new(binary_str.as_ref())
    }
}

/// Spawn `cmd`, feed `input` on stdin and collect stdout within `timeout`.
/// The child is killed if the returned future is dropped.
async fn run_with_stdin(
    mut cmd: Command,
    input: &str,
    timeout: Duration,
) -> Result<String, ReasonerError> {
    cmd.stdin(std::process::Stdio::piped());
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).await?;
        stdin.shutdown().await?;
    }

    let output = tokio_timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| ReasonerError::Timeout(timeout))??;

    if !output.status.success() {
        return Err(ReasonerError::NonZeroExit {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
