use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("Retry max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("Monthly income must be a positive number, got {0}")]
    InvalidIncome(f64),

    #[error("Enforcement is enabled but no document_id is configured")]
    MissingDocumentId,

    #[error("Duplicate specialist name '{0}'")]
    DuplicateSpecialist(String),

    #[error("Fallback for specialist '{name}' does not satisfy its schema: {reason}")]
    InvalidFallback { name: String, reason: String },
}

/// Failures of the data-fetch collaborator. Always fatal to a run.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read bundle '{path}': {source}")]
    ReadBundle {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse bundle '{path}': {reason}")]
    ParseBundle { path: PathBuf, reason: String },

    #[error("No financial data for user '{0}'")]
    UnknownUser(String),

    #[error("Invalid user id '{0}': must be a single path component")]
    InvalidUserId(String),
}

#[derive(Error, Debug)]
pub enum ReasonerError {
    #[error("Execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process failed with exit code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Reasoning engine rejected request: {0}")]
    Rejected(String),
}

/// Per-unit failure. Caught at the unit boundary and replaced by the fallback.
#[derive(Error, Debug)]
pub enum SpecialistError {
    #[error("Failed to build data slice: {0}")]
    Slice(#[from] serde_json::Error),

    #[error("Reasoner error: {0}")]
    Reasoner(#[from] ReasonerError),

    #[error("No JSON object found in reasoner output")]
    NoJson,

    #[error("Output does not match schema: {0}")]
    Schema(String),

    #[error("Failed to acquire semaphore: {0}")]
    Semaphore(#[from] tokio::sync::AcquireError),
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to fetch financial data: {0}")]
    Fetch(#[from] DataError),

    #[error("Invalid specialist registry: {0}")]
    Registry(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum EnforcementError {
    #[error("Control API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Control API rejected rules with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write report: {0}")]
    WriteReport(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
