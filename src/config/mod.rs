mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use defaults::*;
use std::path::Path;
use std::time::Duration;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            data: DataConfig::default(),
            provider: Provider::default(),
            providers: ProvidersConfig::default(),
            concurrency: default_concurrency(),
            timeout_sec: default_timeout_sec(),
            deadline_sec: None,
            retry: RetryConfig::default(),
            report_dir: default_report_dir(),
            prefs: Default::default(),
            enforcement: EnforcementConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if !(self.prefs.monthly_income.is_finite() && self.prefs.monthly_income > 0.0) {
            return Err(ConfigError::InvalidIncome(self.prefs.monthly_income));
        }
        if self.enforcement.enabled && self.enforcement.document_id.is_none() {
            return Err(ConfigError::MissingDocumentId);
        }
        Ok(())
    }

    pub fn unit_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }

    pub fn run_deadline(&self) -> Option<Duration> {
        self.deadline_sec.map(Duration::from_secs)
    }
}
