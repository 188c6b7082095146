//! Point-in-time financial snapshot shared read-only by every specialist in a run.

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transactions older than this (relative to the snapshot) are not part of a bundle
pub const TRANSACTION_WINDOW_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Account {
    pub account_id: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    pub balance: f64,

    #[serde(default)]
    pub nickname: String,
}

/// 50/30/20 budget bucket a transaction falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Needs,
    Wants,
    Savings,
    Income,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transaction {
    pub id: String,

    pub account_id: String,

    pub date: DateTime<Utc>,

    pub merchant: String,

    pub category: String,

    pub amount: f64,

    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default)]
    pub next_expected_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub bucket: Option<Bucket>,
}

impl Transaction {
    pub fn is_spending(&self) -> bool {
        matches!(self.bucket, Some(Bucket::Needs) | Some(Bucket::Wants))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    #[default]
    OnTrack,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BucketBreakdown {
    pub target_pct: f64,
    pub target_amount: f64,
    pub actual_amount: f64,
    pub actual_pct: f64,
    pub status: BudgetStatus,

    /// category -> amount spent
    #[serde(default)]
    pub breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverspendCategory {
    pub category: String,
    pub amount: f64,
    pub pct_over: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BudgetReport {
    pub monthly_income: f64,
    pub needs: BucketBreakdown,
    pub wants: BucketBreakdown,
    pub savings: BucketBreakdown,

    /// 0-100 score
    pub overall_health: f64,

    #[serde(default)]
    pub overspend_categories: Vec<OverspendCategory>,

    #[serde(default)]
    pub credit_card_impact: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FinancialDataBundle {
    pub accounts: Vec<Account>,

    pub transactions: Vec<Transaction>,

    pub budget: BudgetReport,

    pub total_net_worth: f64,

    pub monthly_income: f64,

    pub monthly_spending: f64,

    pub snapshot_timestamp: DateTime<Utc>,
}

impl FinancialDataBundle {
    /// Drop transactions outside the bundle window
    pub fn into_windowed(mut self) -> Self {
        let cutoff = self.snapshot_timestamp - Duration::days(TRANSACTION_WINDOW_DAYS);
        self.transactions.retain(|t| t.date >= cutoff);
        self
    }

    /// Transactions dated within `days` of the snapshot
    pub fn recent_transactions(&self, days: i64) -> impl Iterator<Item = &Transaction> {
        let cutoff = self.snapshot_timestamp - Duration::days(days);
        self.transactions.iter().filter(move |t| t.date >= cutoff)
    }

    pub fn accounts_of(&self, account_type: AccountType) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .filter(move |a| a.account_type == account_type)
    }
}
