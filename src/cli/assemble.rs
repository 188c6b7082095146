use crate::cli::AssembleArgs;
use crate::config::Config;
use crate::enforcement::EnforcementGateway;
use crate::rules::assemble;
use crate::specialist::CombinedAnalysis;
use anyhow::Context;
use tracing::info;

pub async fn execute(args: AssembleArgs) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(&args.config)?;
    // Assembly never submits, so credentials are not required
    config.enforcement.enabled = false;
    config.validate()?;

    let content = tokio::fs::read_to_string(&args.analysis)
        .await
        .with_context(|| format!("Failed to read analysis {:?}", args.analysis))?;
    let analysis: CombinedAnalysis = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse analysis {:?}", args.analysis))?;

    let payload = assemble(&analysis, &config.prefs);
    let result = EnforcementGateway::preview(&payload);
    info!(
        fingerprint = %result.fingerprint,
        "Assembled payload: {}", result.action
    );

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
