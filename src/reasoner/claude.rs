use super::{command_for, run_with_stdin, Reasoner, ReasonerOutput, ReasoningRequest};
use crate::error::ReasonerError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub struct ClaudeReasoner {
    pub binary: PathBuf,
    pub model: String,
    pub permission_mode: String,
}

#[async_trait]
impl Reasoner for ClaudeReasoner {
    fn name(&self) -> &'static str {
        "claude_cli"
    }

    async fn invoke(
        &self,
        request: &ReasoningRequest,
        timeout: Duration,
    ) -> Result<ReasonerOutput, ReasonerError> {
        let mut cmd = command_for(&self.binary);

        // Ensure subscription auth is used (not API key)
        cmd.env_remove("ANTHROPIC_API_KEY");

        // Prompt is read from stdin; specialists get no tools
        cmd.arg("-p")
            .arg("--model")
            .arg(&self.model)
            .arg("--output-format")
            .arg("json")
            .arg("--permission-mode")
            .arg(&self.permission_mode);

        debug!("Invoking claude for {} ({})", request.unit, self.model);

        let start = std::time::Instant::now();
        let text = run_with_stdin(cmd, &request.render_prompt(), timeout).await?;

        Ok(ReasonerOutput {
            text,
            duration: start.elapsed(),
        })
    }
}
