use super::mapping::{map_bills, map_budget, map_debt, map_fraud, map_rewards, map_subscriptions};
use super::{
    MerchantControlType, RuleFragmentSet, RulePayload, TransactionControlType, UserPrefs,
};
use crate::specialist::CombinedAnalysis;
use std::collections::HashSet;
use tracing::{debug, info};

/// Merge the combined analysis into one payload.
///
/// Fraud runs first; a freeze from it is returned alone. Otherwise fragments
/// merge in priority order (fraud, debt, budget, subscriptions, rewards,
/// bills) and the first mapper to claim a key keeps it.
pub fn assemble(analysis: &CombinedAnalysis, prefs: &UserPrefs) -> RulePayload {
    let fraud = map_fraud(&analysis.fraud_alerts, prefs);

    if fraud.is_freeze() {
        info!("Fraud freeze activated, declining all transactions");
        return RulePayload {
            global_controls: fraud.global.into_iter().take(1).collect(),
            ..RulePayload::default()
        };
    }

    let ordered = [
        ("fraud", fraud),
        ("debt", map_debt(&analysis.debt_spirals, prefs)),
        ("budget", map_budget(&analysis.budget_overruns, prefs)),
        (
            "subscriptions",
            map_subscriptions(&analysis.wasteful_subscriptions, prefs),
        ),
        ("rewards", map_rewards(&analysis.missed_rewards, prefs)),
        ("bills", map_bills(&analysis.upcoming_bills, prefs)),
    ];

    let mut merger = Merger::default();
    for (mapper, fragments) in ordered {
        merger.absorb(mapper, fragments);
    }
    merger.payload
}

#[derive(Default)]
struct Merger {
    payload: RulePayload,
    merchant_keys: HashSet<MerchantControlType>,
    transaction_keys: HashSet<TransactionControlType>,
}

impl Merger {
    fn absorb(&mut self, mapper: &str, fragments: RuleFragmentSet) {
        if fragments.is_empty() {
            debug!("{} mapper proposed no controls", mapper);
            return;
        }

        if let Some(global) = fragments.global.into_iter().next() {
            if self.payload.global_controls.is_empty() {
                self.payload.global_controls.push(global);
            } else {
                debug!("Dropping {} global control, already claimed", mapper);
            }
        }

        for control in fragments.merchant {
            if self.merchant_keys.insert(control.control_type) {
                self.payload.merchant_controls.push(control);
            } else {
                debug!(
                    "Dropping {} control for {:?}, already claimed",
                    mapper, control.control_type
                );
            }
        }

        for control in fragments.transaction {
            if self.transaction_keys.insert(control.control_type) {
                self.payload.transaction_controls.push(control);
            } else {
                debug!(
                    "Dropping {} control for {:?}, already claimed",
                    mapper, control.control_type
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::mapping::fixtures::*;
    use crate::rules::Control;
    use crate::specialist::{DebtUrgency, RiskLevel};

    fn no_blocks() -> UserPrefs {
        UserPrefs {
            gambling_block: false,
            cross_border_block: false,
            ..UserPrefs::default()
        }
    }

    #[test]
    fn test_critical_fraud_short_circuits() {
        let mut analysis = quiet_analysis();
        analysis.fraud_alerts = fraud(RiskLevel::Critical);
        analysis.debt_spirals = debt(DebtUrgency::Critical);
        analysis.budget_overruns = budget(vec![overrun("dining", 180.0), overrun("gambling", 50.0)]);
        analysis.wasteful_subscriptions = subscriptions(&["StreamCo"]);
        analysis.missed_rewards = rewards(&["groceries"]);
        analysis.upcoming_bills = bills(&["PowerCo"]);

        let prefs = UserPrefs {
            cross_border_block: true,
            ..UserPrefs::default()
        };
        let payload = assemble(&analysis, &prefs);

        assert_eq!(
            payload,
            RulePayload {
                global_controls: vec![Control::decline_all()],
                ..RulePayload::default()
            }
        );
        assert!(payload.is_freeze());
    }

    #[test]
    fn test_budget_beats_rewards_for_same_category() {
        let mut analysis = quiet_analysis();
        analysis.budget_overruns = budget(vec![overrun("dining", 180.0)]);
        analysis.missed_rewards = rewards(&["Dining"]);

        let payload = assemble(&analysis, &no_blocks());

        assert_eq!(payload.merchant_controls.len(), 1);
        let dining = &payload.merchant_controls[0];
        assert_eq!(dining.control_type, MerchantControlType::MctDining);
        assert_eq!(dining.control.decline_threshold, Some(180.0));
        assert_eq!(dining.control.alert_threshold, Some(144.0));
    }

    #[test]
    fn test_quiet_analysis_assembles_to_empty_payload() {
        let payload = assemble(&quiet_analysis(), &no_blocks());
        assert!(payload.is_empty());
    }

    #[test]
    fn test_fraud_global_wins_over_debt() {
        let mut analysis = quiet_analysis();
        analysis.fraud_alerts = fraud(RiskLevel::Elevated);
        analysis.debt_spirals = debt(DebtUrgency::Warning);
        analysis.budget_overruns = budget(vec![overrun("groceries", 400.0)]);

        let payload = assemble(&analysis, &no_blocks());

        assert_eq!(payload.global_controls.len(), 1);
        let global = &payload.global_controls[0];
        assert_eq!(global.decline_threshold, Some(200.0));
        assert_eq!(global.alert_threshold, Some(50.0));
        assert!(global.spend_limit.is_none());

        assert_eq!(payload.merchant_controls.len(), 1);
        assert_eq!(
            payload.merchant_controls[0].control_type,
            MerchantControlType::MctGrocery
        );
        assert!(payload.transaction_controls.is_empty());
    }

    #[test]
    fn test_debt_global_survives_without_fraud() {
        let mut analysis = quiet_analysis();
        analysis.debt_spirals = debt(DebtUrgency::Warning);

        let payload = assemble(&analysis, &no_blocks());
        let limit = payload.global_controls[0].spend_limit.as_ref().unwrap();
        assert_eq!(limit.decline_threshold, 5500.0 * 0.85);
    }

    #[test]
    fn test_auto_pay_overlap_keeps_subscription_fragment() {
        let mut analysis = quiet_analysis();
        analysis.wasteful_subscriptions = subscriptions(&["StreamCo", "GymCo"]);
        analysis.upcoming_bills = bills(&["PowerCo"]);

        let payload = assemble(&analysis, &no_blocks());
        let auto_pay: Vec<_> = payload
            .transaction_controls
            .iter()
            .filter(|t| t.control_type == TransactionControlType::TctAutoPay)
            .collect();
        assert_eq!(auto_pay.len(), 1);
    }

    #[test]
    fn test_budget_cap_beats_gambling_block() {
        let mut analysis = quiet_analysis();
        analysis.budget_overruns = budget(vec![overrun("gambling", 50.0)]);

        let payload = assemble(&analysis, &UserPrefs::default());
        assert_eq!(payload.merchant_controls.len(), 1);
        let gambling = &payload.merchant_controls[0];
        assert_eq!(gambling.control_type, MerchantControlType::MctGambling);
        assert!(!gambling.control.should_decline_all);
        assert_eq!(gambling.control.decline_threshold, Some(50.0));
    }

    #[test]
    fn test_fraud_disabled_leaves_debt_in_charge() {
        let mut analysis = quiet_analysis();
        analysis.fraud_alerts = fraud(RiskLevel::Critical);
        analysis.debt_spirals = debt(DebtUrgency::Critical);

        let prefs = UserPrefs {
            fraud_freeze_enabled: false,
            ..no_blocks()
        };
        let payload = assemble(&analysis, &prefs);

        assert!(!payload.is_freeze());
        assert_eq!(payload.global_controls[0].decline_threshold, Some(250.0));
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let mut analysis = quiet_analysis();
        analysis.fraud_alerts = fraud(RiskLevel::Elevated);
        analysis.budget_overruns = budget(vec![overrun("dining", 180.0), overrun("gas", 90.0)]);
        analysis.wasteful_subscriptions = subscriptions(&["StreamCo"]);
        analysis.missed_rewards = rewards(&["electronics", "dining"]);
        analysis.upcoming_bills = bills(&["PowerCo"]);

        let prefs = UserPrefs {
            cross_border_block: true,
            ..UserPrefs::default()
        };
        let first = serde_json::to_vec(&assemble(&analysis, &prefs)).unwrap();
        let second = serde_json::to_vec(&assemble(&analysis, &prefs)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_merchant_order_follows_priority() {
        let mut analysis = quiet_analysis();
        analysis.budget_overruns = budget(vec![overrun("gas", 90.0)]);
        analysis.missed_rewards = rewards(&["electronics"]);

        let payload = assemble(&analysis, &UserPrefs::default());
        let order: Vec<_> = payload
            .merchant_controls
            .iter()
            .map(|m| m.control_type)
            .collect();
        assert_eq!(
            order,
            vec![
                MerchantControlType::MctGasAndPetroleum,
                MerchantControlType::MctGambling,
                MerchantControlType::MctElectronics,
            ]
        );
    }
}
