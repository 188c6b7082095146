use crate::enforcement::EnforcementResult;
use crate::error::OutputError;
use crate::runner::AnalysisRun;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory for one run: `<report_dir>/<date>/<user_id>`
pub fn run_dir(report_dir: &Path, date: &str, user_id: &str) -> PathBuf {
    report_dir.join(date).join(user_id)
}

/// Write the combined analysis as soon as the run settles, before enforcement
pub fn write_analysis(dir: &Path, run: &AnalysisRun) -> Result<(), OutputError> {
    fs::create_dir_all(dir).map_err(OutputError::CreateDir)?;

    let analysis_path = dir.join("analysis.json");
    let json = serde_json::to_string_pretty(&run.analysis)?;
    fs::write(&analysis_path, json).map_err(OutputError::WriteReport)?;

    Ok(())
}

pub fn write_enforcement(dir: &Path, enforcement: &EnforcementResult) -> Result<(), OutputError> {
    fs::create_dir_all(dir).map_err(OutputError::CreateDir)?;

    let rules_path = dir.join("rules.json");
    let json = serde_json::to_string_pretty(enforcement)?;
    fs::write(&rules_path, json).map_err(OutputError::WriteReport)?;

    Ok(())
}
