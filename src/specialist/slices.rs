//! Pure projections of the bundle down to what each specialist needs.
//!
//! Every time window is measured from the bundle's snapshot timestamp so the
//! same bundle always slices to the same payload.

use crate::bundle::{AccountType, Bucket, FinancialDataBundle, Transaction};
use serde_json::json;

/// Window used by the budget and rewards slices
pub const RECENT_WINDOW_DAYS: i64 = 30;

const DEBT_CATEGORIES: &[&str] = &["loan_payment", "minimum_cc_payment"];

pub fn financial_meaning(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
    let savings_balance = bundle
        .accounts_of(AccountType::Savings)
        .next()
        .map(|a| a.balance)
        .unwrap_or(0.0);

    serde_json::to_string(&json!({
        "total_net_worth": bundle.total_net_worth,
        "monthly_income": bundle.monthly_income,
        "monthly_spending": bundle.monthly_spending,
        "health_score": bundle.budget.overall_health,
        "needs_status": bundle.budget.needs.status,
        "wants_status": bundle.budget.wants.status,
        "savings_status": bundle.budget.savings.status,
        "savings_balance": savings_balance,
    }))
}

pub fn wasteful_subscriptions(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
    let recurring: Vec<&Transaction> = bundle
        .transactions
        .iter()
        .filter(|t| t.is_recurring && t.bucket != Some(Bucket::Income))
        .collect();

    serde_json::to_string(&json!({ "recurring_transactions": recurring }))
}

pub fn budget_overruns(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
    let recent: Vec<&Transaction> = bundle
        .recent_transactions(RECENT_WINDOW_DAYS)
        .filter(|t| t.is_spending())
        .collect();

    serde_json::to_string(&json!({
        "budget_report": bundle.budget,
        "recent_transactions": recent,
    }))
}

pub fn upcoming_bills(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
    let scheduled: Vec<&Transaction> = bundle
        .transactions
        .iter()
        .filter(|t| t.is_recurring && t.next_expected_date.is_some())
        .collect();

    serde_json::to_string(&json!({
        "recurring_transactions": scheduled,
        "accounts": bundle.accounts,
    }))
}

pub fn debt_spirals(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
    let credit_cards: Vec<_> = bundle.accounts_of(AccountType::CreditCard).collect();
    let loan_transactions: Vec<&Transaction> = bundle
        .transactions
        .iter()
        .filter(|t| DEBT_CATEGORIES.contains(&t.category.as_str()))
        .collect();

    serde_json::to_string(&json!({
        "credit_card_accounts": credit_cards,
        "loan_transactions": loan_transactions,
        "credit_card_impact": bundle.budget.credit_card_impact,
    }))
}

pub fn missed_rewards(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
    let recent: Vec<&Transaction> = bundle
        .recent_transactions(RECENT_WINDOW_DAYS)
        .filter(|t| t.is_spending())
        .collect();

    serde_json::to_string(&json!({
        "recent_transactions": recent,
        "accounts": bundle.accounts,
    }))
}

pub fn fraud_alerts(bundle: &FinancialDataBundle) -> Result<String, serde_json::Error> {
    serde_json::to_string(&json!({ "transactions": bundle.transactions }))
}
