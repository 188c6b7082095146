//! Pure translations from one specialist result to control-rule fragments.
//! No I/O; identical inputs always yield identical fragments.

use super::categories::merchant_control_for;
use super::{
    Control, MerchantControl, MerchantControlType, RuleFragmentSet, SpendLimit,
    TransactionControl, TransactionControlType, UserPrefs,
};
use crate::specialist::{
    BillsAnalysis, BudgetAnalysis, DebtAnalysis, DebtUrgency, FraudAnalysis, RewardsAnalysis,
    RiskLevel, SubscriptionAnalysis,
};

/// Smallest alert threshold: notify on every matching charge
const ALERT_EVERY_CHARGE: f64 = 0.01;

const ELEVATED_FRAUD_DECLINE: f64 = 200.0;
const ELEVATED_FRAUD_ALERT: f64 = 50.0;

pub fn map_fraud(analysis: &FraudAnalysis, prefs: &UserPrefs) -> RuleFragmentSet {
    if !prefs.fraud_freeze_enabled {
        return RuleFragmentSet::default();
    }

    match analysis.overall_risk {
        RiskLevel::Critical => RuleFragmentSet::global(Control::decline_all()),
        RiskLevel::Elevated => RuleFragmentSet::global(Control::thresholds(
            ELEVATED_FRAUD_DECLINE,
            ELEVATED_FRAUD_ALERT,
        )),
        RiskLevel::Normal => RuleFragmentSet::default(),
    }
}

/// Monthly ceiling as a share of income, tightening with urgency
pub fn map_debt(analysis: &DebtAnalysis, prefs: &UserPrefs) -> RuleFragmentSet {
    let (ceiling_pct, per_txn_decline) = match analysis.urgency {
        DebtUrgency::Critical => (0.70, 250.0),
        DebtUrgency::Warning => (0.85, 500.0),
        DebtUrgency::Stable => return RuleFragmentSet::default(),
    };

    let monthly_limit = prefs.monthly_income * ceiling_pct;
    let control = Control::thresholds(per_txn_decline, per_txn_decline * 0.5)
        .with_spend_limit(SpendLimit::monthly(monthly_limit, &prefs.time_zone));

    RuleFragmentSet::global(control)
}

pub fn map_budget(analysis: &BudgetAnalysis, prefs: &UserPrefs) -> RuleFragmentSet {
    let merchant = analysis
        .overruns
        .iter()
        .filter_map(|overrun| {
            let control_type = merchant_control_for(&overrun.category)?;
            let target = overrun.budget_amount;
            Some(MerchantControl {
                control_type,
                control: Control::thresholds(target, target * 0.8)
                    .with_spend_limit(SpendLimit::monthly(target, &prefs.time_zone)),
            })
        })
        .collect();

    RuleFragmentSet {
        merchant,
        ..RuleFragmentSet::default()
    }
}

/// Recurring-charge alerts when waste exists, plus the user's standing blocks
pub fn map_subscriptions(analysis: &SubscriptionAnalysis, prefs: &UserPrefs) -> RuleFragmentSet {
    let mut fragments = RuleFragmentSet::default();

    if !analysis.subscriptions.is_empty() {
        fragments.transaction.push(TransactionControl {
            control_type: TransactionControlType::TctAutoPay,
            control: Control::alert_only(ALERT_EVERY_CHARGE),
        });
    }

    if prefs.gambling_block {
        fragments.merchant.push(MerchantControl {
            control_type: MerchantControlType::MctGambling,
            control: Control::decline_all(),
        });
    }

    if prefs.cross_border_block {
        fragments.transaction.push(TransactionControl {
            control_type: TransactionControlType::TctCrossBorder,
            control: Control::decline_all(),
        });
    }

    fragments
}

/// Alert-only: a nudge toward the better card, never a decline
pub fn map_rewards(analysis: &RewardsAnalysis, _prefs: &UserPrefs) -> RuleFragmentSet {
    let merchant = analysis
        .missed_rewards
        .iter()
        .filter_map(|reward| merchant_control_for(&reward.category))
        .map(|control_type| MerchantControl {
            control_type,
            control: Control::alert_only(ALERT_EVERY_CHARGE),
        })
        .collect();

    RuleFragmentSet {
        merchant,
        ..RuleFragmentSet::default()
    }
}

pub fn map_bills(analysis: &BillsAnalysis, _prefs: &UserPrefs) -> RuleFragmentSet {
    if analysis.bills.is_empty() {
        return RuleFragmentSet::default();
    }

    RuleFragmentSet {
        transaction: vec![TransactionControl {
            control_type: TransactionControlType::TctAutoPay,
            control: Control::alert_only(ALERT_EVERY_CHARGE),
        }],
        ..RuleFragmentSet::default()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::bundle::BudgetStatus;
    use crate::specialist::*;

    pub fn fraud(risk: RiskLevel) -> FraudAnalysis {
        FraudAnalysis {
            alerts: Vec::new(),
            overall_risk: risk,
            verdict: String::new(),
        }
    }

    pub fn debt(urgency: DebtUrgency) -> DebtAnalysis {
        DebtAnalysis {
            debts: Vec::new(),
            total_debt: 3200.0,
            total_monthly_interest: 61.0,
            urgency,
            verdict: String::new(),
        }
    }

    pub fn overrun(category: &str, budget_amount: f64) -> BudgetOverrun {
        BudgetOverrun {
            category: category.to_string(),
            budget_amount,
            actual_amount: budget_amount * 1.5,
            overspend_amount: budget_amount * 0.5,
            pct_over: 50.0,
            volatility: Volatility::Medium,
            verdict: String::new(),
        }
    }

    pub fn budget(overruns: Vec<BudgetOverrun>) -> BudgetAnalysis {
        BudgetAnalysis {
            overruns,
            overall_budget_status: BudgetStatus::Warning,
            verdict: String::new(),
        }
    }

    pub fn subscriptions(merchants: &[&str]) -> SubscriptionAnalysis {
        SubscriptionAnalysis {
            subscriptions: merchants
                .iter()
                .map(|m| WastefulSubscription {
                    merchant: m.to_string(),
                    monthly_cost: 15.99,
                    last_used_days_ago: 60,
                    annual_waste: 191.88,
                    verdict: String::new(),
                })
                .collect(),
            total_annual_waste: 191.88 * merchants.len() as f64,
            verdict: String::new(),
        }
    }

    pub fn rewards(categories: &[&str]) -> RewardsAnalysis {
        RewardsAnalysis {
            missed_rewards: categories
                .iter()
                .map(|c| MissedReward {
                    category: c.to_string(),
                    current_card: "Debit".to_string(),
                    optimal_card: "Dining Rewards".to_string(),
                    transactions_affected: 4,
                    points_lost: 1200,
                    cash_value_lost: 12.0,
                    verdict: String::new(),
                })
                .collect(),
            annual_opportunity_cost: 144.0,
            verdict: String::new(),
        }
    }

    pub fn bills(merchants: &[&str]) -> BillsAnalysis {
        BillsAnalysis {
            bills: merchants
                .iter()
                .map(|m| UpcomingBill {
                    merchant: m.to_string(),
                    amount: 90.0,
                    due_date: "2026-04-05".to_string(),
                    days_until: 5,
                    recommended_card: None,
                    estimated_rewards_value: None,
                })
                .collect(),
            total_upcoming_30_days: 90.0 * merchants.len() as f64,
            verdict: String::new(),
        }
    }

    pub fn quiet_analysis() -> CombinedAnalysis {
        CombinedAnalysis {
            financial_meaning: FinancialMeaning::fallback(),
            wasteful_subscriptions: subscriptions(&[]),
            budget_overruns: budget(Vec::new()),
            upcoming_bills: bills(&[]),
            debt_spirals: debt(DebtUrgency::Stable),
            missed_rewards: rewards(&[]),
            fraud_alerts: fraud(RiskLevel::Normal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_fraud_critical_freezes() {
        let fragments = map_fraud(&fraud(RiskLevel::Critical), &UserPrefs::default());
        assert!(fragments.is_freeze());
        assert_eq!(fragments.global.len(), 1);
        assert!(fragments.merchant.is_empty());
    }

    #[test]
    fn test_fraud_elevated_limits() {
        let fragments = map_fraud(&fraud(RiskLevel::Elevated), &UserPrefs::default());
        assert!(!fragments.is_freeze());
        assert_eq!(fragments.global[0].decline_threshold, Some(200.0));
        assert_eq!(fragments.global[0].alert_threshold, Some(50.0));
    }

    #[test]
    fn test_fraud_normal_or_disabled_is_empty() {
        assert!(map_fraud(&fraud(RiskLevel::Normal), &UserPrefs::default()).is_empty());

        let prefs = UserPrefs {
            fraud_freeze_enabled: false,
            ..UserPrefs::default()
        };
        assert!(map_fraud(&fraud(RiskLevel::Critical), &prefs).is_empty());
    }

    #[test]
    fn test_debt_ceiling_tightens_with_urgency() {
        let prefs = UserPrefs {
            monthly_income: 4000.0,
            time_zone: "America/Chicago".to_string(),
            ..UserPrefs::default()
        };

        let warning = map_debt(&debt(DebtUrgency::Warning), &prefs);
        let limit = warning.global[0].spend_limit.as_ref().unwrap();
        assert_eq!(limit.decline_threshold, 4000.0 * 0.85);
        assert_eq!(limit.alert_threshold, 4000.0 * 0.85 * 0.8);
        assert_eq!(limit.time_zone_id, "America/Chicago");
        assert_eq!(warning.global[0].decline_threshold, Some(500.0));
        assert_eq!(warning.global[0].alert_threshold, Some(250.0));

        let critical = map_debt(&debt(DebtUrgency::Critical), &prefs);
        let limit = critical.global[0].spend_limit.as_ref().unwrap();
        assert_eq!(limit.decline_threshold, 4000.0 * 0.70);
        assert_eq!(critical.global[0].decline_threshold, Some(250.0));
        assert!(!critical.is_freeze());

        assert!(map_debt(&debt(DebtUrgency::Stable), &prefs).is_empty());
    }

    #[test]
    fn test_budget_skips_unmapped_categories() {
        let analysis = budget(vec![overrun("Dining", 180.0), overrun("streaming", 40.0)]);
        let fragments = map_budget(&analysis, &UserPrefs::default());

        assert_eq!(fragments.merchant.len(), 1);
        let dining = &fragments.merchant[0];
        assert_eq!(dining.control_type, MerchantControlType::MctDining);
        assert_eq!(dining.control.decline_threshold, Some(180.0));
        assert_eq!(dining.control.alert_threshold, Some(144.0));
        assert_eq!(
            dining.control.spend_limit.as_ref().unwrap().decline_threshold,
            180.0
        );
    }

    #[test]
    fn test_subscriptions_alert_and_standing_blocks() {
        let prefs = UserPrefs {
            gambling_block: true,
            cross_border_block: true,
            ..UserPrefs::default()
        };
        let fragments = map_subscriptions(&subscriptions(&["StreamCo"]), &prefs);

        let types: Vec<_> = fragments.transaction.iter().map(|t| t.control_type).collect();
        assert_eq!(
            types,
            vec![
                TransactionControlType::TctAutoPay,
                TransactionControlType::TctCrossBorder
            ]
        );
        assert!(!fragments.transaction[0].control.should_decline_all);
        assert!(fragments.transaction[1].control.should_decline_all);
        assert_eq!(
            fragments.merchant[0].control_type,
            MerchantControlType::MctGambling
        );
    }

    #[test]
    fn test_standing_blocks_apply_without_findings() {
        let fragments = map_subscriptions(&subscriptions(&[]), &UserPrefs::default());
        assert!(fragments.transaction.is_empty());
        assert_eq!(fragments.merchant.len(), 1);

        let prefs = UserPrefs {
            gambling_block: false,
            ..UserPrefs::default()
        };
        assert!(map_subscriptions(&subscriptions(&[]), &prefs).is_empty());
    }

    #[test]
    fn test_rewards_never_decline() {
        let fragments = map_rewards(&rewards(&["dining", "groceries", "crypto"]), &UserPrefs::default());
        assert_eq!(fragments.merchant.len(), 2);
        for control in &fragments.merchant {
            assert!(!control.control.should_decline_all);
            assert_eq!(control.control.decline_threshold, None);
            assert_eq!(control.control.alert_threshold, Some(0.01));
        }
    }

    #[test]
    fn test_bills_alert_on_auto_pay() {
        assert!(map_bills(&bills(&[]), &UserPrefs::default()).is_empty());

        let fragments = map_bills(&bills(&["PowerCo"]), &UserPrefs::default());
        assert_eq!(
            fragments.transaction[0].control_type,
            TransactionControlType::TctAutoPay
        );
    }

    #[test]
    fn test_mappers_are_deterministic() {
        let prefs = UserPrefs::default();
        let analysis = budget(vec![overrun("dining", 180.0), overrun("gas", 120.0)]);
        assert_eq!(map_budget(&analysis, &prefs), map_budget(&analysis, &prefs));
    }
}
