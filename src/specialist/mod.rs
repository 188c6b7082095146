//! Specialist units: one typed analysis capability per financial domain.
//!
//! Each unit pairs a name, a pure slice function, a result schema, and a
//! fallback value. Units are stateless and statically registered in
//! [`REGISTERED`].

pub mod slices;
mod types;

pub use types::*;

use crate::bundle::{BudgetStatus, FinancialDataBundle};
use crate::error::{ConfigError, SpecialistError};
use crate::reasoner::{decode_output, Reasoner, ReasoningRequest};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

pub trait Specialist: Send + Sync + 'static {
    const NAME: &'static str;

    type Output: Serialize + DeserializeOwned + JsonSchema + Clone + Send + Sync + 'static;

    fn instructions() -> &'static str;

    fn slice(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error>;

    fn fallback() -> Self::Output;

    /// Checks serde cannot express. Runs on genuine results and fallbacks alike.
    fn check(_output: &Self::Output) -> Result<(), String> {
        Ok(())
    }
}

pub struct FinancialMeaning;
pub struct WastefulSubscriptions;
pub struct BudgetOverruns;
pub struct UpcomingBills;
pub struct DebtSpirals;
pub struct MissedRewards;
pub struct FraudDetection;

/// Names of every registered unit, in registration order
pub const REGISTERED: [&str; 7] = [
    FinancialMeaning::NAME,
    WastefulSubscriptions::NAME,
    BudgetOverruns::NAME,
    UpcomingBills::NAME,
    DebtSpirals::NAME,
    MissedRewards::NAME,
    FraudDetection::NAME,
];

fn non_negative(label: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{} must be a non-negative number, got {}", label, value))
    }
}

impl Specialist for FinancialMeaning {
    const NAME: &'static str = "financial_meaning";
    type Output = FinancialMeaningOutput;

    fn instructions() -> &'static str {
        include_str!("../../prompts/specialists/financial_meaning.md")
    }

    fn slice(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
        slices::financial_meaning(bundle)
    }

    fn fallback() -> Self::Output {
        FinancialMeaningOutput {
            greeting: "Systems are coming online. Stand by for the full analysis.".to_string(),
            verdict: "Unable to complete financial analysis at this time.".to_string(),
            status: HealthStatus::Warning,
        }
    }
}

impl Specialist for WastefulSubscriptions {
    const NAME: &'static str = "wasteful_subscriptions";
    type Output = SubscriptionAnalysis;

    fn instructions() -> &'static str {
        include_str!("../../prompts/specialists/wasteful_subscriptions.md")
    }

    fn slice(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
        slices::wasteful_subscriptions(bundle)
    }

    fn fallback() -> Self::Output {
        SubscriptionAnalysis {
            subscriptions: Vec::new(),
            total_annual_waste: 0.0,
            verdict: "Subscription analysis unavailable.".to_string(),
        }
    }

    fn check(output: &Self::Output) -> Result<(), String> {
        non_negative("total_annual_waste", output.total_annual_waste)?;
        output
            .subscriptions
            .iter()
            .try_for_each(|s| non_negative("monthly_cost", s.monthly_cost))
    }
}

impl Specialist for BudgetOverruns {
    const NAME: &'static str = "budget_overruns";
    type Output = BudgetAnalysis;

    fn instructions() -> &'static str {
        include_str!("../../prompts/specialists/budget_overruns.md")
    }

    fn slice(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
        slices::budget_overruns(bundle)
    }

    fn fallback() -> Self::Output {
        BudgetAnalysis {
            overruns: Vec::new(),
            overall_budget_status: BudgetStatus::OnTrack,
            verdict: "Budget analysis unavailable.".to_string(),
        }
    }

    fn check(output: &Self::Output) -> Result<(), String> {
        // budget_amount becomes a decline threshold downstream
        output
            .overruns
            .iter()
            .try_for_each(|o| non_negative("budget_amount", o.budget_amount))
    }
}

impl Specialist for UpcomingBills {
    const NAME: &'static str = "upcoming_bills";
    type Output = BillsAnalysis;

    fn instructions() -> &'static str {
        include_str!("../../prompts/specialists/upcoming_bills.md")
    }

    fn slice(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
        slices::upcoming_bills(bundle)
    }

    fn fallback() -> Self::Output {
        BillsAnalysis {
            bills: Vec::new(),
            total_upcoming_30_days: 0.0,
            verdict: "Upcoming bills analysis unavailable.".to_string(),
        }
    }
}

impl Specialist for DebtSpirals {
    const NAME: &'static str = "debt_spirals";
    type Output = DebtAnalysis;

    fn instructions() -> &'static str {
        include_str!("../../prompts/specialists/debt_spirals.md")
    }

    fn slice(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
        slices::debt_spirals(bundle)
    }

    fn fallback() -> Self::Output {
        DebtAnalysis {
            debts: Vec::new(),
            total_debt: 0.0,
            total_monthly_interest: 0.0,
            urgency: DebtUrgency::Stable,
            verdict: "Debt analysis unavailable.".to_string(),
        }
    }
}

impl Specialist for MissedRewards {
    const NAME: &'static str = "missed_rewards";
    type Output = RewardsAnalysis;

    fn instructions() -> &'static str {
        include_str!("../../prompts/specialists/missed_rewards.md")
    }

    fn slice(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
        slices::missed_rewards(bundle)
    }

    fn fallback() -> Self::Output {
        RewardsAnalysis {
            missed_rewards: Vec::new(),
            annual_opportunity_cost: 0.0,
            verdict: "Rewards analysis unavailable.".to_string(),
        }
    }
}

impl Specialist for FraudDetection {
    const NAME: &'static str = "fraud_alerts";
    type Output = FraudAnalysis;

    fn instructions() -> &'static str {
        include_str!("../../prompts/specialists/fraud_alerts.md")
    }

    fn slice(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
        slices::fraud_alerts(bundle)
    }

    fn fallback() -> Self::Output {
        FraudAnalysis {
            alerts: Vec::new(),
            overall_risk: RiskLevel::Normal,
            verdict: "Fraud analysis unavailable.".to_string(),
        }
    }

    fn check(output: &Self::Output) -> Result<(), String> {
        for alert in &output.alerts {
            if !(0.0..=1.0).contains(&alert.risk_score) {
                return Err(format!(
                    "risk_score for {} must be within 0.0-1.0, got {}",
                    alert.merchant, alert.risk_score
                ));
            }
        }
        Ok(())
    }
}

/// Build the reasoning request for one unit over its slice
pub fn build_request<S: Specialist>(user_id: &str, payload: String) -> ReasoningRequest {
    let schema = schema_for!(S::Output);
    ReasoningRequest {
        unit: S::NAME,
        user_id: user_id.to_string(),
        instructions: S::instructions(),
        output_schema: serde_json::to_value(&schema).unwrap_or_default(),
        payload,
    }
}

/// One reasoning attempt: invoke, decode against the schema, check
pub async fn analyze<S: Specialist>(
    reasoner: &dyn Reasoner,
    request: &ReasoningRequest,
    timeout: Duration,
) -> Result<S::Output, SpecialistError> {
    let output = reasoner.invoke(request, timeout).await?;
    debug!(
        "{} answered via {} in {:?}",
        S::NAME,
        reasoner.name(),
        output.duration
    );

    let result: S::Output = decode_output(&output.text)?;
    S::check(&result).map_err(SpecialistError::Schema)?;
    Ok(result)
}

fn validate_fallback<S: Specialist>() -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidFallback {
        name: S::NAME.to_string(),
        reason,
    };

    let value = serde_json::to_value(S::fallback()).map_err(|e| invalid(e.to_string()))?;
    let round_tripped: S::Output =
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
    S::check(&round_tripped).map_err(invalid)
}

/// Registration-time check: names are unique and every fallback satisfies its
/// own schema. A failure here is a configuration bug, never a run failure.
pub fn validate_registry() -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in REGISTERED {
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateSpecialist(name.to_string()));
        }
    }

    validate_fallback::<FinancialMeaning>()?;
    validate_fallback::<WastefulSubscriptions>()?;
    validate_fallback::<BudgetOverruns>()?;
    validate_fallback::<UpcomingBills>()?;
    validate_fallback::<DebtSpirals>()?;
    validate_fallback::<MissedRewards>()?;
    validate_fallback::<FraudDetection>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_valid() {
        validate_registry().unwrap();
    }

    #[test]
    fn test_registered_names_match_combined_analysis_keys() {
        let analysis = CombinedAnalysis {
            financial_meaning: FinancialMeaning::fallback(),
            wasteful_subscriptions: WastefulSubscriptions::fallback(),
            budget_overruns: BudgetOverruns::fallback(),
            upcoming_bills: UpcomingBills::fallback(),
            debt_spirals: DebtSpirals::fallback(),
            missed_rewards: MissedRewards::fallback(),
            fraud_alerts: FraudDetection::fallback(),
        };
        let value = serde_json::to_value(&analysis).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        let mut names: Vec<_> = REGISTERED.iter().map(|s| s.to_string()).collect();
        keys.sort();
        names.sort();
        assert_eq!(keys, names);
    }

    #[test]
    fn test_fraud_check_rejects_out_of_range_score() {
        let mut output = FraudDetection::fallback();
        output.alerts.push(FraudAlert {
            merchant: "Unknown".to_string(),
            amount: 999.0,
            date: "2026-03-30".to_string(),
            risk_score: 1.5,
            indicators: vec!["amount_anomaly".to_string()],
            recommended_action: FraudAction::Block,
            verdict: "suspicious".to_string(),
        });
        assert!(FraudDetection::check(&output).is_err());
    }

    #[test]
    fn test_request_embeds_output_schema() {
        let request = build_request::<DebtSpirals>("alex", "{}".to_string());
        assert_eq!(request.unit, "debt_spirals");
        let schema = request.output_schema.to_string();
        assert!(schema.contains("urgency"));
        assert!(schema.contains("total_monthly_interest"));
    }
}
