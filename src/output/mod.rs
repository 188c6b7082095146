mod report;
mod summary;

pub use report::{run_dir, write_analysis, write_enforcement};
pub use summary::{write_summary, SummaryReport};
