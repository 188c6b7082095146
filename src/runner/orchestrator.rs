use crate::bundle::{BundleSource, FinancialDataBundle};
use crate::config::{Config, RetryConfig};
use crate::error::{RunnerError, SpecialistError};
use crate::reasoner::{Reasoner, ReasoningRequest};
use crate::specialist::{
    analyze, build_request, validate_registry, BudgetOverruns, CombinedAnalysis, DebtSpirals,
    FinancialMeaning, FraudDetection, MissedRewards, Specialist, UpcomingBills,
    WastefulSubscriptions,
};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::retry::retry_with_backoff;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub concurrency: usize,
    pub unit_timeout: Duration,
    pub deadline: Option<Duration>,
    pub retry: RetryConfig,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            concurrency: config.concurrency,
            unit_timeout: config.unit_timeout(),
            deadline: config.run_deadline(),
            retry: config.retry.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Completed,
    FellBack { reason: String },
    TimedOut,
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitStatus::Completed => write!(f, "completed"),
            UnitStatus::FellBack { reason } => write!(f, "fell back: {}", reason),
            UnitStatus::TimedOut => write!(f, "timed_out"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnitReport {
    pub name: &'static str,
    pub status: UnitStatus,
    pub duration: Duration,
}

impl UnitReport {
    pub fn is_genuine(&self) -> bool {
        self.status == UnitStatus::Completed
    }
}

/// A settled run: the combined analysis plus out-of-band telemetry on how each
/// unit settled
#[derive(Debug)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub user_id: String,
    pub analysis: CombinedAnalysis,
    pub units: Vec<UnitReport>,
    pub total_duration: Duration,
}

impl AnalysisRun {
    pub fn fallback_count(&self) -> usize {
        self.units.iter().filter(|u| !u.is_genuine()).count()
    }
}

pub struct Orchestrator {
    source: Arc<dyn BundleSource>,
    reasoner: Arc<dyn Reasoner>,
    settings: RunSettings,
    semaphore: Semaphore,
}

impl Orchestrator {
    /// Fails fast if the specialist registry is misconfigured
    pub fn new(
        source: Arc<dyn BundleSource>,
        reasoner: Arc<dyn Reasoner>,
        settings: RunSettings,
    ) -> Result<Self, RunnerError> {
        validate_registry()?;
        let semaphore = Semaphore::new(settings.concurrency.max(1));
        Ok(Self {
            source,
            reasoner,
            settings,
            semaphore,
        })
    }

    /// The combined analysis alone. The CLI calls `run_detailed` instead,
    /// since its reports need the per-unit outcomes.
    #[allow(dead_code)]
    pub async fn run(&self, user_id: &str) -> Result<CombinedAnalysis, RunnerError> {
        Ok(self.run_detailed(user_id).await?.analysis)
    }

    /// Fetch once, slice per unit, dispatch every unit concurrently and wait
    /// for all of them to settle. Only a bundle-fetch failure is an error.
    pub async fn run_detailed(&self, user_id: &str) -> Result<AnalysisRun, RunnerError> {
        let run_id = Uuid::new_v4();
        let start = Instant::now();

        let bundle = self.source.fetch_bundle(user_id).await?;
        info!(
            %run_id,
            user_id,
            transactions = bundle.transactions.len(),
            accounts = bundle.accounts.len(),
            "Financial data fetched"
        );

        let deadline = self
            .settings
            .deadline
            .map(|d| tokio::time::Instant::now() + d);

        // Slices are computed up front; a slice error only sinks its own unit
        let fm = prepare::<FinancialMeaning>(&bundle, user_id);
        let ws = prepare::<WastefulSubscriptions>(&bundle, user_id);
        let bo = prepare::<BudgetOverruns>(&bundle, user_id);
        let ub = prepare::<UpcomingBills>(&bundle, user_id);
        let ds = prepare::<DebtSpirals>(&bundle, user_id);
        let mr = prepare::<MissedRewards>(&bundle, user_id);
        let fd = prepare::<FraudDetection>(&bundle, user_id);

        debug!(%run_id, "Dispatching specialists");

        let (fm, ws, bo, ub, ds, mr, fd) = tokio::join!(
            self.settle::<FinancialMeaning>(fm, deadline),
            self.settle::<WastefulSubscriptions>(ws, deadline),
            self.settle::<BudgetOverruns>(bo, deadline),
            self.settle::<UpcomingBills>(ub, deadline),
            self.settle::<DebtSpirals>(ds, deadline),
            self.settle::<MissedRewards>(mr, deadline),
            self.settle::<FraudDetection>(fd, deadline),
        );

        let units = vec![fm.1, ws.1, bo.1, ub.1, ds.1, mr.1, fd.1];
        let analysis = CombinedAnalysis {
            financial_meaning: fm.0,
            wasteful_subscriptions: ws.0,
            budget_overruns: bo.0,
            upcoming_bills: ub.0,
            debt_spirals: ds.0,
            missed_rewards: mr.0,
            fraud_alerts: fd.0,
        };

        let run = AnalysisRun {
            run_id,
            user_id: user_id.to_string(),
            analysis,
            units,
            total_duration: start.elapsed(),
        };

        info!(
            %run_id,
            fallbacks = run.fallback_count(),
            "All specialists settled in {:.1}s",
            run.total_duration.as_secs_f64()
        );

        Ok(run)
    }

    async fn attempt<S: Specialist>(
        &self,
        prepared: Result<ReasoningRequest, SpecialistError>,
    ) -> Result<S::Output, SpecialistError> {
        let request = prepared?;
        let _permit = self.semaphore.acquire().await?;

        let reasoner: &dyn Reasoner = self.reasoner.as_ref();
        let request = &request;
        let timeout = self.settings.unit_timeout;
        retry_with_backoff(&self.settings.retry, S::NAME, move || {
            analyze::<S>(reasoner, request, timeout)
        })
        .await
    }

    /// Result-or-fallback around one unit. Never fails and never panics.
    async fn settle<S: Specialist>(
        &self,
        prepared: Result<ReasoningRequest, SpecialistError>,
        deadline: Option<tokio::time::Instant>,
    ) -> (S::Output, UnitReport) {
        let start = Instant::now();

        let guarded = AssertUnwindSafe(self.attempt::<S>(prepared)).catch_unwind();

        let settled = match deadline {
            Some(at) => match tokio::time::timeout_at(at, guarded).await {
                Ok(settled) => settled,
                Err(_) => {
                    warn!("{} still pending at run deadline, using fallback", S::NAME);
                    return (S::fallback(), report::<S>(UnitStatus::TimedOut, start));
                }
            },
            None => guarded.await,
        };

        match settled {
            Ok(Ok(output)) => {
                debug!("{} completed in {:?}", S::NAME, start.elapsed());
                (output, report::<S>(UnitStatus::Completed, start))
            }
            Ok(Err(e)) => {
                warn!("{} failed, using fallback: {}", S::NAME, e);
                let status = UnitStatus::FellBack {
                    reason: e.to_string(),
                };
                (S::fallback(), report::<S>(status, start))
            }
            Err(_) => {
                warn!("{} panicked, using fallback", S::NAME);
                let status = UnitStatus::FellBack {
                    reason: "specialist panicked".to_string(),
                };
                (S::fallback(), report::<S>(status, start))
            }
        }
    }
}

fn prepare<S: Specialist>(
    bundle: &FinancialDataBundle,
    user_id: &str,
) -> Result<ReasoningRequest, SpecialistError> {
    let payload = S::slice(bundle)?;
    Ok(build_request::<S>(user_id, payload))
}

fn report<S: Specialist>(status: UnitStatus, start: Instant) -> UnitReport {
    UnitReport {
        name: S::NAME,
        status,
        duration: start.elapsed(),
    }
}
