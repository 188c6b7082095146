//! Typed results for each specialist. These double as the schemas the
//! reasoning engine must satisfy.

use crate::bundle::BudgetStatus;
use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Integer counts from the reasoner; whole-number floats such as `36.0` are accepted.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        Number::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        Number::Float(f) => Err(de::Error::custom(format!(
            "expected a whole number, got {}",
            f
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Stable,
    Warning,
    Critical,
}

/// Narrative read of overall financial health
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct FinancialMeaningOutput {
    pub greeting: String,
    pub verdict: String,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct WastefulSubscription {
    pub merchant: String,
    pub monthly_cost: f64,
    #[serde(deserialize_with = "whole_number")]
    pub last_used_days_ago: i64,
    pub annual_waste: f64,
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct SubscriptionAnalysis {
    pub subscriptions: Vec<WastefulSubscription>,
    pub total_annual_waste: f64,
    #[serde(default)]
    pub verdict: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct BudgetOverrun {
    pub category: String,
    pub budget_amount: f64,
    pub actual_amount: f64,
    pub overspend_amount: f64,
    pub pct_over: f64,
    pub volatility: Volatility,
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct BudgetAnalysis {
    pub overruns: Vec<BudgetOverrun>,
    pub overall_budget_status: BudgetStatus,
    #[serde(default)]
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct UpcomingBill {
    pub merchant: String,
    pub amount: f64,
    pub due_date: String,
    #[serde(deserialize_with = "whole_number")]
    pub days_until: i64,
    #[serde(default)]
    pub recommended_card: Option<String>,
    #[serde(default)]
    pub estimated_rewards_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct BillsAnalysis {
    pub bills: Vec<UpcomingBill>,
    pub total_upcoming_30_days: f64,
    #[serde(default)]
    pub verdict: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DebtUrgency {
    Critical,
    Warning,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct DebtSpiral {
    pub account: String,
    pub balance: f64,
    pub apr: f64,
    pub monthly_interest: f64,
    #[serde(deserialize_with = "whole_number")]
    pub minimum_payment_months: i64,
    pub recommended_payment: f64,
    #[serde(deserialize_with = "whole_number")]
    pub recommended_months: i64,
    pub interest_saved: f64,
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct DebtAnalysis {
    pub debts: Vec<DebtSpiral>,
    pub total_debt: f64,
    pub total_monthly_interest: f64,
    pub urgency: DebtUrgency,
    #[serde(default)]
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct MissedReward {
    pub category: String,
    pub current_card: String,
    pub optimal_card: String,
    #[serde(deserialize_with = "whole_number")]
    pub transactions_affected: i64,
    #[serde(deserialize_with = "whole_number")]
    pub points_lost: i64,
    pub cash_value_lost: f64,
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct RewardsAnalysis {
    pub missed_rewards: Vec<MissedReward>,
    pub annual_opportunity_cost: f64,
    #[serde(default)]
    pub verdict: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    Elevated,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FraudAction {
    Block,
    Monitor,
    Allow,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct FraudAlert {
    pub merchant: String,
    pub amount: f64,
    pub date: String,
    /// 0.0 - 1.0
    pub risk_score: f64,
    #[serde(default)]
    pub indicators: Vec<String>,
    pub recommended_action: FraudAction,
    pub verdict: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct FraudAnalysis {
    pub alerts: Vec<FraudAlert>,
    pub overall_risk: RiskLevel,
    #[serde(default)]
    pub verdict: String,
}

/// One settled result per registered specialist, keyed by specialist name.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct CombinedAnalysis {
    pub financial_meaning: FinancialMeaningOutput,
    pub wasteful_subscriptions: SubscriptionAnalysis,
    pub budget_overruns: BudgetAnalysis,
    pub upcoming_bills: BillsAnalysis,
    pub debt_spirals: DebtAnalysis,
    pub missed_rewards: RewardsAnalysis,
    pub fraud_alerts: FraudAnalysis,
}
