use crate::enforcement::{EnforcementAction, EnforcementResult};
use crate::error::OutputError;
use crate::runner::{AnalysisRun, UnitStatus};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub timestamp: String,
    pub run_id: String,
    pub user_id: String,
    pub duration_sec: f64,
    pub units: Vec<UnitSummary>,
    pub fallbacks: Vec<String>,
    pub action: EnforcementAction,
    pub applied: bool,
    pub fingerprint: String,
    pub rule_counts: RuleCounts,
    pub report_dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct UnitSummary {
    pub name: String,
    pub status: String,
    pub duration_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RuleCounts {
    pub global: usize,
    pub merchant: usize,
    pub transaction: usize,
}

pub fn write_summary(
    dir: &Path,
    run: &AnalysisRun,
    enforcement: &EnforcementResult,
) -> Result<SummaryReport, OutputError> {
    fs::create_dir_all(dir).map_err(OutputError::CreateDir)?;

    let summary = build_summary(run, enforcement, dir.to_path_buf());

    let json_path = dir.join("summary.json");
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&json_path, json).map_err(OutputError::WriteReport)?;

    let md_path = dir.join("summary.md");
    fs::write(&md_path, build_summary_markdown(&summary)).map_err(OutputError::WriteReport)?;

    Ok(summary)
}

pub fn build_summary(
    run: &AnalysisRun,
    enforcement: &EnforcementResult,
    report_dir: PathBuf,
) -> SummaryReport {
    let mut fallbacks = Vec::new();

    let units = run
        .units
        .iter()
        .map(|unit| {
            let (status, reason) = match &unit.status {
                UnitStatus::Completed => ("completed", None),
                UnitStatus::FellBack { reason } => ("fell_back", Some(reason.clone())),
                UnitStatus::TimedOut => ("timed_out", None),
            };
            if !unit.is_genuine() {
                fallbacks.push(unit.name.to_string());
            }
            UnitSummary {
                name: unit.name.to_string(),
                status: status.to_string(),
                duration_sec: unit.duration.as_secs_f64(),
                reason,
            }
        })
        .collect();

    let rules = &enforcement.rules;

    SummaryReport {
        timestamp: Utc::now().to_rfc3339(),
        run_id: run.run_id.to_string(),
        user_id: run.user_id.clone(),
        duration_sec: run.total_duration.as_secs_f64(),
        units,
        fallbacks,
        action: enforcement.action,
        applied: enforcement.applied,
        fingerprint: enforcement.fingerprint.clone(),
        rule_counts: RuleCounts {
            global: rules.global_controls.len(),
            merchant: rules.merchant_controls.len(),
            transaction: rules.transaction_controls.len(),
        },
        report_dir,
    }
}

fn build_summary_markdown(summary: &SummaryReport) -> String {
    let mut md = String::new();

    md.push_str("# spendshield Summary\n\n");
    md.push_str(&format!("**Generated:** {}\n", summary.timestamp));
    md.push_str(&format!("**User:** {}\n", summary.user_id));
    md.push_str(&format!("**Run:** {}\n", summary.run_id));
    md.push_str(&format!("**Duration:** {:.1}s\n\n", summary.duration_sec));

    md.push_str("## Specialists\n\n");
    md.push_str("| Specialist | Status | Duration |\n");
    md.push_str("|------------|--------|----------|\n");

    for unit in &summary.units {
        let status_icon = match unit.status.as_str() {
            "completed" => "✅",
            "fell_back" => "⚠️",
            "timed_out" => "⏱️",
            _ => "❓",
        };

        let status_str = match &unit.reason {
            Some(reason) => format!("{} {} ({})", status_icon, unit.status, reason),
            None => format!("{} {}", status_icon, unit.status),
        };

        md.push_str(&format!(
            "| {} | {} | {:.1}s |\n",
            unit.name, status_str, unit.duration_sec
        ));
    }

    md.push_str("\n## Enforcement\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Action | {} |\n", summary.action));
    md.push_str(&format!("| Applied | {} |\n", summary.applied));
    md.push_str(&format!("| Fingerprint | `{}` |\n", summary.fingerprint));
    md.push_str(&format!(
        "| Global controls | {} |\n",
        summary.rule_counts.global
    ));
    md.push_str(&format!(
        "| Merchant controls | {} |\n",
        summary.rule_counts.merchant
    ));
    md.push_str(&format!(
        "| Transaction controls | {} |\n",
        summary.rule_counts.transaction
    ));

    if !summary.fallbacks.is_empty() {
        md.push_str("\n**Degraded:** ");
        md.push_str(&summary.fallbacks.join(", "));
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforcement::EnforcementGateway;
    use crate::output::{write_analysis, write_enforcement};
    use crate::rules::{assemble, mapping::fixtures::quiet_analysis, UserPrefs};
    use crate::runner::UnitReport;
    use std::time::Duration;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn sample_run() -> AnalysisRun {
        AnalysisRun {
            run_id: Uuid::new_v4(),
            user_id: "alex".to_string(),
            analysis: quiet_analysis(),
            units: vec![
                UnitReport {
                    name: "financial_meaning",
                    status: UnitStatus::Completed,
                    duration: Duration::from_millis(1200),
                },
                UnitReport {
                    name: "fraud_alerts",
                    status: UnitStatus::FellBack {
                        reason: "No JSON found in output".to_string(),
                    },
                    duration: Duration::from_millis(300),
                },
                UnitReport {
                    name: "upcoming_bills",
                    status: UnitStatus::TimedOut,
                    duration: Duration::from_secs(5),
                },
            ],
            total_duration: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_summary_lists_degraded_units() {
        let payload = assemble(&quiet_analysis(), &UserPrefs::default());
        let enforcement = EnforcementGateway::preview(&payload);
        let summary = build_summary(&sample_run(), &enforcement, PathBuf::from("reports"));

        assert_eq!(summary.fallbacks, vec!["fraud_alerts", "upcoming_bills"]);
        assert_eq!(summary.units[1].status, "fell_back");
        assert_eq!(summary.action, EnforcementAction::Enforce);
        assert_eq!(summary.rule_counts.merchant, 1);
        assert!(!summary.applied);
    }

    #[test]
    fn test_reports_written_to_run_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = crate::output::run_dir(tmp.path(), "2026-03-31", "alex");
        let run = sample_run();
        let enforcement = EnforcementGateway::preview(&Default::default());

        write_analysis(&dir, &run).unwrap();
        write_enforcement(&dir, &enforcement).unwrap();
        write_summary(&dir, &run, &enforcement).unwrap();

        for file in ["analysis.json", "rules.json", "summary.json", "summary.md"] {
            assert!(dir.join(file).exists(), "missing {}", file);
        }

        let rules: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("rules.json")).unwrap()).unwrap();
        assert_eq!(rules["action"], "no_rules");

        let md = fs::read_to_string(dir.join("summary.md")).unwrap();
        assert!(md.contains("| upcoming_bills | ⏱️ timed_out |"));
        assert!(md.contains("**Degraded:** fraud_alerts, upcoming_bills"));
    }
}
