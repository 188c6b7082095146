use super::{ControlApi, ControlResponse};
use crate::config::EnforcementConfig;
use crate::error::EnforcementError;
use crate::rules::RulePayload;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const RULES_PATH: &str = "/vctc/customerrules/v1/consumertransactioncontrols";

/// Control API client over HTTPS, authenticated with an API key query param
pub struct HttpControlApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
    user_identifier: String,
}

impl HttpControlApi {
    pub fn new(
        base_url: &str,
        api_key: String,
        user_identifier: String,
        timeout: Duration,
    ) -> Result<Self, EnforcementError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: Some(api_key),
            api_key_env: String::new(),
            user_identifier,
        })
    }

    /// The API key is required up front only when enforcement is enabled.
    /// A disabled client still builds for dry runs but cannot submit.
    pub fn from_config(config: &EnforcementConfig) -> Result<Self, EnforcementError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty());
        if config.enabled && api_key.is_none() {
            return Err(EnforcementError::MissingApiKey(config.api_key_env.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_sec))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            user_identifier: config.user_identifier.clone(),
        })
    }

    fn rules_url(&self, document_id: &str) -> String {
        format!("{}{}/{}/rules", self.base_url, RULES_PATH, document_id)
    }
}

#[async_trait]
impl ControlApi for HttpControlApi {
    async fn put_rules(
        &self,
        document_id: &str,
        payload: &RulePayload,
    ) -> Result<ControlResponse, EnforcementError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EnforcementError::MissingApiKey(self.api_key_env.clone()))?;

        let body = if self.user_identifier.is_empty() {
            serde_json::to_vec(payload)?
        } else {
            serde_json::to_vec(&payload.stamped(&self.user_identifier))?
        };

        let url = self.rules_url(document_id);
        debug!("PUT {}", url);

        let start = Instant::now();
        let response = self
            .client
            .put(&url)
            .query(&[("apikey", api_key)])
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        info!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Control API responded"
        );
        if !status.is_success() {
            warn!(status = status.as_u16(), body = %text, "Control API error");
        }

        Ok(ControlResponse {
            status: status.as_u16(),
            ok: status.is_success(),
            body: text,
        })
    }
}
