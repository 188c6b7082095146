mod types;

pub use types::*;

#[cfg(test)]
pub(crate) use types::fixtures;

use crate::error::DataError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Data-fetch collaborator: produces the one bundle every specialist in a run observes
#[async_trait]
pub trait BundleSource: Send + Sync {
    async fn fetch_bundle(&self, user_id: &str) -> Result<FinancialDataBundle, DataError>;
}

/// Reads pre-aggregated bundles from JSON or YAML files on disk
pub struct FileBundleSource {
    /// Path template; `{user_id}` is replaced with the requested user
    pub path_template: String,
}

impl FileBundleSource {
    pub fn new(path_template: impl Into<String>) -> Self {
        Self {
            path_template: path_template.into(),
        }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        PathBuf::from(self.path_template.replace("{user_id}", user_id))
    }
}

fn parse_bundle(path: &Path, content: &str) -> Result<FinancialDataBundle, DataError> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let parsed = if is_yaml {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| DataError::ParseBundle {
        path: path.to_path_buf(),
        reason,
    })
}

/// User ids name files and report directories, so they must not contain
/// separators or be a relative component.
pub fn validate_user_id(user_id: &str) -> Result<(), DataError> {
    let invalid = user_id.is_empty()
        || user_id == "."
        || user_id == ".."
        || user_id.contains(&['/', '\\', '\0'][..]);

    if invalid {
        return Err(DataError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}

#[async_trait]
impl BundleSource for FileBundleSource {
    async fn fetch_bundle(&self, user_id: &str) -> Result<FinancialDataBundle, DataError> {
        validate_user_id(user_id)?;
        let path = self.path_for(user_id);
        debug!("Loading bundle for {} from {}", user_id, path.display());

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DataError::UnknownUser(user_id.to_string()));
            }
            Err(e) => return Err(DataError::ReadBundle { path, source: e }),
        };

        Ok(parse_bundle(&path, &content)?.into_windowed())
    }
}
