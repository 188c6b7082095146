use crate::bundle::{validate_user_id, FileBundleSource};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::enforcement::{EnforcementGateway, HttpControlApi};
use crate::output;
use crate::reasoner::create_reasoner;
use crate::rules::assemble;
use crate::runner::{Orchestrator, RunSettings};
use chrono::Local;
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    validate_user_id(&args.user)?;

    info!("Loading config from {:?}", args.config);
    let mut config = Config::load_or_default(&args.config)?;

    // Apply CLI overrides
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(report_dir) = args.report_dir {
        config.report_dir = report_dir;
    }
    if let Some(deadline) = args.deadline_sec {
        config.deadline_sec = Some(deadline);
    }
    if args.dry_run {
        info!("DRY RUN - rules will be assembled but not submitted");
        config.enforcement.enabled = false;
    }

    config.validate()?;

    // validate() guarantees a document id whenever enforcement is enabled
    let dry_run = !config.enforcement.enabled;
    let document_id = config.enforcement.document_id.clone().unwrap_or_default();
    let api = Arc::new(HttpControlApi::from_config(&config.enforcement)?);
    let gateway = EnforcementGateway::new(api, document_id);

    let source = Arc::new(FileBundleSource::new(config.data.bundle_path.clone()));
    let reasoner = create_reasoner(&config);
    info!("Using {} for specialist reasoning", config.provider);

    let orchestrator = Orchestrator::new(source, reasoner, RunSettings::from_config(&config))?;
    let run = orchestrator.run_detailed(&args.user).await?;

    // Create dated report directory (reports/YYYY-MM-DD/<user>/)
    let date_str = Local::now().format("%Y-%m-%d").to_string();
    let report_dir = output::run_dir(&config.report_dir, &date_str, &args.user);
    output::write_analysis(&report_dir, &run)?;

    let payload = assemble(&run.analysis, &config.prefs);

    let enforcement = match gateway.apply(&payload, dry_run).await {
        Ok(result) => result,
        Err(e) => {
            error!("Enforcement failed, controls were NOT applied: {}", e);
            return Err(e.into());
        }
    };

    output::write_enforcement(&report_dir, &enforcement)?;
    let summary = output::write_summary(&report_dir, &run, &enforcement)?;

    if !summary.fallbacks.is_empty() {
        warn!(
            "{} specialists fell back: {:?}",
            summary.fallbacks.len(),
            summary.fallbacks
        );
    }

    println!(
        "Run {} for {}: {} specialists settled in {:.1}s ({} fell back)",
        summary.run_id,
        summary.user_id,
        summary.units.len(),
        summary.duration_sec,
        summary.fallbacks.len()
    );
    println!(
        "Action: {}{} [{}]",
        summary.action,
        if summary.applied { " (applied)" } else { "" },
        summary.fingerprint
    );
    println!("Reports: {}", report_dir.display());

    Ok(())
}
