use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MerchantControlType {
    MctDining,
    MctGrocery,
    MctGasAndPetroleum,
    MctSportAndRecreation,
    MctApparelAndAccessories,
    MctElectronics,
    MctHotelAndLodging,
    MctAirfare,
    MctAlcohol,
    MctAutomotive,
    MctCarRental,
    MctPersonalCare,
    MctGambling,
    MctSmokeAndTobacco,
    MctHousehold,
    MctAdultEntertainment,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionControlType {
    /// Recurring and card-on-file charges
    TctAutoPay,
    TctCrossBorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpendLimitType {
    LmtMonth,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpendLimit {
    #[serde(rename = "type")]
    pub limit_type: SpendLimitType,
    pub decline_threshold: f64,
    pub alert_threshold: f64,
    pub current_period_spend: f64,
    #[serde(rename = "timeZoneID")]
    pub time_zone_id: String,
}

impl SpendLimit {
    /// Monthly cap alerting at 80% of the limit
    pub fn monthly(limit: f64, time_zone: &str) -> Self {
        Self {
            limit_type: SpendLimitType::LmtMonth,
            decline_threshold: limit,
            alert_threshold: limit * 0.8,
            current_period_spend: 0.0,
            time_zone_id: time_zone.to_string(),
        }
    }
}

/// Threshold settings shared by every control kind
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub is_control_enabled: bool,
    pub should_decline_all: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<f64>,
    pub should_alert_on_decline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend_limit: Option<SpendLimit>,
}

impl Control {
    pub fn decline_all() -> Self {
        Self {
            is_control_enabled: true,
            should_decline_all: true,
            decline_threshold: None,
            alert_threshold: None,
            should_alert_on_decline: true,
            user_identifier: None,
            spend_limit: None,
        }
    }

    pub fn thresholds(decline: f64, alert: f64) -> Self {
        Self {
            is_control_enabled: true,
            should_decline_all: false,
            decline_threshold: Some(decline),
            alert_threshold: Some(alert),
            should_alert_on_decline: true,
            user_identifier: None,
            spend_limit: None,
        }
    }

    /// Notifies on every matching charge, never declines
    pub fn alert_only(alert: f64) -> Self {
        Self {
            is_control_enabled: true,
            should_decline_all: false,
            decline_threshold: None,
            alert_threshold: Some(alert),
            should_alert_on_decline: false,
            user_identifier: None,
            spend_limit: None,
        }
    }

    pub fn with_spend_limit(mut self, limit: SpendLimit) -> Self {
        self.spend_limit = Some(limit);
        self
    }
}

/// Account-wide control
pub type GlobalControl = Control;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MerchantControl {
    pub control_type: MerchantControlType,
    #[serde(flatten)]
    pub control: Control,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionControl {
    pub control_type: TransactionControlType,
    #[serde(flatten)]
    pub control: Control,
}

/// Fragments proposed by a single mapper, before any merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleFragmentSet {
    pub global: Vec<GlobalControl>,
    pub merchant: Vec<MerchantControl>,
    pub transaction: Vec<TransactionControl>,
}

impl RuleFragmentSet {
    pub fn global(control: GlobalControl) -> Self {
        Self {
            global: vec![control],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.merchant.is_empty() && self.transaction.is_empty()
    }

    pub fn is_freeze(&self) -> bool {
        self.global.first().is_some_and(|g| g.should_decline_all)
    }
}

/// The merged payload submitted to the control API. Holds at most one global
/// control and at most one control per merchant or transaction type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulePayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_controls: Vec<GlobalControl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merchant_controls: Vec<MerchantControl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transaction_controls: Vec<TransactionControl>,
}

impl RulePayload {
    pub fn is_empty(&self) -> bool {
        self.global_controls.is_empty()
            && self.merchant_controls.is_empty()
            && self.transaction_controls.is_empty()
    }

    pub fn is_freeze(&self) -> bool {
        self.global_controls
            .first()
            .is_some_and(|g| g.should_decline_all)
    }

    /// Short content hash of the canonical JSON form
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let hash = Sha256::digest(canonical.as_bytes());
        format!("{:x}", hash)[..12].to_string()
    }

    /// Copy of the payload with every control attributed to `user`
    pub fn stamped(&self, user: &str) -> Self {
        let mut payload = self.clone();
        let stamp = |c: &mut Control| c.user_identifier = Some(user.to_string());
        payload.global_controls.iter_mut().for_each(stamp);
        payload
            .merchant_controls
            .iter_mut()
            .for_each(|m| stamp(&mut m.control));
        payload
            .transaction_controls
            .iter_mut()
            .for_each(|t| stamp(&mut t.control));
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_payload_serializes_to_empty_object() {
        let payload = RulePayload::default();
        assert!(payload.is_empty());
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({}));
    }

    #[test]
    fn test_wire_format() {
        let payload = RulePayload {
            global_controls: vec![Control::thresholds(500.0, 250.0)
                .with_spend_limit(SpendLimit::monthly(1000.0, "America/New_York"))],
            merchant_controls: vec![MerchantControl {
                control_type: MerchantControlType::MctGasAndPetroleum,
                control: Control::alert_only(0.01),
            }],
            transaction_controls: vec![TransactionControl {
                control_type: TransactionControlType::TctAutoPay,
                control: Control::alert_only(0.01),
            }],
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value["globalControls"][0],
            json!({
                "isControlEnabled": true,
                "shouldDeclineAll": false,
                "declineThreshold": 500.0,
                "alertThreshold": 250.0,
                "shouldAlertOnDecline": true,
                "spendLimit": {
                    "type": "LMT_MONTH",
                    "declineThreshold": 1000.0,
                    "alertThreshold": 800.0,
                    "currentPeriodSpend": 0.0,
                    "timeZoneID": "America/New_York"
                }
            })
        );
        assert_eq!(
            value["merchantControls"][0]["controlType"],
            "MCT_GAS_AND_PETROLEUM"
        );
        assert_eq!(value["transactionControls"][0]["controlType"], "TCT_AUTO_PAY");
        assert!(value["transactionControls"][0]
            .get("declineThreshold")
            .is_none());
    }

    #[test]
    fn test_freeze_detection() {
        let freeze = RulePayload {
            global_controls: vec![Control::decline_all()],
            ..RulePayload::default()
        };
        assert!(freeze.is_freeze());

        let limits = RulePayload {
            global_controls: vec![Control::thresholds(200.0, 50.0)],
            ..RulePayload::default()
        };
        assert!(!limits.is_freeze());
        assert!(!RulePayload::default().is_freeze());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = RulePayload {
            global_controls: vec![Control::thresholds(200.0, 50.0)],
            ..RulePayload::default()
        };
        let b = RulePayload {
            global_controls: vec![Control::thresholds(250.0, 125.0)],
            ..RulePayload::default()
        };
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 12);
    }

    #[test]
    fn test_stamped_attributes_every_control() {
        let payload = RulePayload {
            global_controls: vec![Control::thresholds(200.0, 50.0)],
            merchant_controls: vec![MerchantControl {
                control_type: MerchantControlType::MctGambling,
                control: Control::decline_all(),
            }],
            transaction_controls: vec![],
        };

        let stamped = payload.stamped("card-holder-7");
        assert_eq!(
            stamped.global_controls[0].user_identifier.as_deref(),
            Some("card-holder-7")
        );
        assert_eq!(
            stamped.merchant_controls[0].control.user_identifier.as_deref(),
            Some("card-holder-7")
        );
        assert!(payload.global_controls[0].user_identifier.is_none());
    }

    #[test]
    fn test_payload_parses_wire_form() {
        let raw = r#"{
            "merchantControls": [{
                "controlType": "MCT_DINING",
                "isControlEnabled": true,
                "shouldDeclineAll": false,
                "declineThreshold": 180.0,
                "alertThreshold": 144.0,
                "shouldAlertOnDecline": true
            }]
        }"#;
        let payload: RulePayload = serde_json::from_str(raw).unwrap();
        assert_eq!(
            payload.merchant_controls[0].control_type,
            MerchantControlType::MctDining
        );
        assert_eq!(payload.merchant_controls[0].control.decline_threshold, Some(180.0));
        assert!(payload.global_controls.is_empty());
    }
}
