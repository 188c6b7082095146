//! Enforcement gateway: hands the assembled payload to the control API.
//!
//! Unlike specialist failures, a failed submission is surfaced to the caller.
//! An unenforced control must never look like "no rules warranted".

mod http;

pub use http::HttpControlApi;

use crate::error::EnforcementError;
use crate::rules::RulePayload;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementAction {
    NoRules,
    Freeze,
    Enforce,
}

impl EnforcementAction {
    pub fn for_payload(payload: &RulePayload) -> Self {
        if payload.is_empty() {
            EnforcementAction::NoRules
        } else if payload.is_freeze() {
            EnforcementAction::Freeze
        } else {
            EnforcementAction::Enforce
        }
    }
}

impl std::fmt::Display for EnforcementAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnforcementAction::NoRules => write!(f, "no_rules"),
            EnforcementAction::Freeze => write!(f, "freeze"),
            EnforcementAction::Enforce => write!(f, "enforce"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlResponse {
    pub status: u16,
    pub ok: bool,
    #[serde(skip)]
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnforcementResult {
    pub action: EnforcementAction,
    /// True only when the control API accepted the payload
    pub applied: bool,
    pub fingerprint: String,
    pub rules: RulePayload,
    pub response: Option<ControlResponse>,
}

/// The external control API. `put_rules` replaces the whole rules document,
/// so resubmitting an identical payload is a no-op.
#[async_trait]
pub trait ControlApi: Send + Sync {
    async fn put_rules(
        &self,
        document_id: &str,
        payload: &RulePayload,
    ) -> Result<ControlResponse, EnforcementError>;
}

pub struct EnforcementGateway {
    api: Arc<dyn ControlApi>,
    document_id: String,
}

impl EnforcementGateway {
    pub fn new(api: Arc<dyn ControlApi>, document_id: impl Into<String>) -> Self {
        Self {
            api,
            document_id: document_id.into(),
        }
    }

    /// What `apply` would do, without touching the API
    pub fn preview(payload: &RulePayload) -> EnforcementResult {
        EnforcementResult {
            action: EnforcementAction::for_payload(payload),
            applied: false,
            fingerprint: payload.fingerprint(),
            rules: payload.clone(),
            response: None,
        }
    }

    pub async fn apply(
        &self,
        payload: &RulePayload,
        dry_run: bool,
    ) -> Result<EnforcementResult, EnforcementError> {
        let preview = Self::preview(payload);

        if preview.action == EnforcementAction::NoRules {
            info!("No control rules to enforce");
            return Ok(preview);
        }

        if dry_run {
            info!(
                fingerprint = %preview.fingerprint,
                "Dry run: would {} on {}", preview.action, self.document_id
            );
            return Ok(preview);
        }

        let response = self.api.put_rules(&self.document_id, payload).await?;
        if !response.ok {
            warn!(status = response.status, "Control API rejected rules");
            return Err(EnforcementError::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        info!(
            fingerprint = %preview.fingerprint,
            status = response.status,
            "Enforcement completed: {}", preview.action
        );

        Ok(EnforcementResult {
            applied: true,
            response: Some(response),
            ..preview
        })
    }
}
