mod orchestrator;
mod retry;

pub use orchestrator::{AnalysisRun, Orchestrator, RunSettings, UnitReport, UnitStatus};
