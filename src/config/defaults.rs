use std::path::PathBuf;

pub fn default_version() -> u32 {
    1
}

pub fn default_bundle_path() -> String {
    "data/{user_id}.json".to_string()
}

pub fn default_concurrency() -> usize {
    // one permit per registered specialist
    7
}

pub fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

pub fn default_timeout_sec() -> u64 {
    120
}

pub fn default_claude_binary() -> PathBuf {
    // Check common install location first
    if let Some(home) = std::env::var_os("HOME") {
        let local_path = PathBuf::from(home).join(".claude/local/claude");
        if local_path.exists() {
            return local_path;
        }
    }
    PathBuf::from("claude")
}

pub fn default_claude_model() -> String {
    "haiku".to_string()
}

pub fn default_permission_mode() -> String {
    "default".to_string()
}

pub fn default_codex_binary() -> PathBuf {
    PathBuf::from("codex")
}

pub fn default_codex_model() -> String {
    "gpt-4.1-mini".to_string()
}

pub fn default_max_attempts() -> u32 {
    2
}

pub fn default_backoff_base_ms() -> u64 {
    500
}

pub fn default_true() -> bool {
    true
}

pub fn default_control_base_url() -> String {
    "https://sandbox.api.visa.com".to_string()
}

pub fn default_api_key_env() -> String {
    "SPENDSHIELD_CONTROL_API_KEY".to_string()
}

pub fn default_request_timeout_sec() -> u64 {
    30
}
