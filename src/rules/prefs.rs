use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_monthly_income() -> f64 {
    5500.0
}

fn default_time_zone() -> String {
    "America/New_York".to_string()
}

/// Preferences consumed by the rule mappers. Snapshot per assembly call.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct UserPrefs {
    /// Allow a critical fraud verdict to freeze the card
    #[serde(default = "default_true")]
    pub fraud_freeze_enabled: bool,

    #[serde(default = "default_true")]
    pub gambling_block: bool,

    #[serde(default)]
    pub cross_border_block: bool,

    /// Basis for debt-driven monthly spend limits
    #[serde(default = "default_monthly_income")]
    pub monthly_income: f64,

    /// Time zone for period spend limits
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self {
            fraud_freeze_enabled: true,
            gambling_block: true,
            cross_border_block: false,
            monthly_income: default_monthly_income(),
            time_zone: default_time_zone(),
        }
    }
}
