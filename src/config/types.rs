use crate::rules::UserPrefs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub provider: Provider,

    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Maximum specialists in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout for a single reasoning call
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,

    /// Overall run deadline; pending specialists fall back when it passes
    #[serde(default)]
    pub deadline_sec: Option<u64>,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    #[serde(default)]
    pub prefs: UserPrefs,

    #[serde(default)]
    pub enforcement: EnforcementConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct DataConfig {
    /// Path to the bundle file; `{user_id}` is substituted per run
    #[serde(default = "default_bundle_path")]
    pub bundle_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            bundle_path: default_bundle_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[default]
    ClaudeCli,
    CodexCli,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::ClaudeCli => write!(f, "claude_cli"),
            Provider::CodexCli => write!(f, "codex_cli"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub claude_cli: ClaudeCliConfig,

    #[serde(default)]
    pub codex_cli: CodexCliConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ClaudeCliConfig {
    #[serde(default = "default_claude_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_claude_model")]
    pub model: String,

    #[serde(default = "default_permission_mode")]
    pub permission_mode: String,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            binary: default_claude_binary(),
            model: default_claude_model(),
            permission_mode: default_permission_mode(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CodexCliConfig {
    #[serde(default = "default_codex_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_codex_model")]
    pub model: String,
}

impl Default for CodexCliConfig {
    fn default() -> Self {
        Self {
            binary: default_codex_binary(),
            model: default_codex_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct EnforcementConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_control_base_url")]
    pub base_url: String,

    /// Rules document the payload replaces
    #[serde(default)]
    pub document_id: Option<String>,

    /// Cardholder identifier stamped on every submitted control
    #[serde(default)]
    pub user_identifier: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_control_base_url(),
            document_id: None,
            user_identifier: String::new(),
            api_key_env: default_api_key_env(),
            request_timeout_sec: default_request_timeout_sec(),
        }
    }
}
