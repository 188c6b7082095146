use super::{command_for, run_with_stdin, Reasoner, ReasonerOutput, ReasoningRequest};
use crate::error::ReasonerError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::debug;

pub struct CodexReasoner {
    pub binary: PathBuf,
    pub model: String,
}

#[async_trait]
impl Reasoner for CodexReasoner {
    fn name(&self) -> &'static str {
        "codex_cli"
    }

    async fn invoke(
        &self,
        request: &ReasoningRequest,
        timeout: Duration,
    ) -> Result<ReasonerOutput, ReasonerError> {
        // Final assistant message lands here; stdout is a JSONL event stream
        let out_file = NamedTempFile::new()?;

        let mut cmd = command_for(&self.binary);
        cmd.arg("exec")
            .arg("--model")
            .arg(&self.model)
            .arg("--json")
            .arg("--output-last-message")
            .arg(out_file.path())
            .arg("-");

        debug!("Invoking codex for {} ({})", request.unit, self.model);

        let start = std::time::Instant::now();
        run_with_stdin(cmd, &request.render_prompt(), timeout).await?;
        let text = tokio::fs::read_to_string(out_file.path()).await?;

        Ok(ReasonerOutput {
            text,
            duration: start.elapsed(),
        })
    }
}
