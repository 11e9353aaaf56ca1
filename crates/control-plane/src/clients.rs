//! HTTP clients for the external control-plane services.
//! Both sit behind traits so the engine and its tests never touch the network.

use openbidder_core::error::{BidError, BidResult};
use openbidder_core::types::AgentConfig;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// System of record for an agent's declared configuration.
pub trait ConfigStore: Send + Sync + 'static {
    fn register_agent(
        &self,
        name: &str,
        config: &AgentConfig,
    ) -> impl Future<Output = BidResult<()>> + Send;

    fn unregister_agent(&self, name: &str) -> impl Future<Output = BidResult<()>> + Send;
}

/// Receives periodic balance snapshots for an agent's account path.
pub trait BalanceSink: Send + Sync + 'static {
    fn report_balance(
        &self,
        account_path: &str,
        balance_units: i64,
    ) -> impl Future<Output = BidResult<()>> + Send;
}

// ─── ACS ────────────────────────────────────────────────────────────────────

/// Client for the Agent Configuration Service.
pub struct AcsClient {
    base_url: String,
    http: reqwest::Client,
}

impl AcsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: default_http_client(),
        }
    }

    fn config_url(&self, name: &str) -> String {
        format!("{}/v1/agents/{}/config", self.base_url, name)
    }
}

impl ConfigStore for AcsClient {
    async fn register_agent(&self, name: &str, config: &AgentConfig) -> BidResult<()> {
        let url = self.config_url(name);
        debug!(agent = name, url = %url, "Registering agent config with ACS");

        self.http
            .post(&url)
            .header("Accept", "application/json")
            .json(config)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| BidError::Registration(e.to_string()))?;

        Ok(())
    }

    async fn unregister_agent(&self, name: &str) -> BidResult<()> {
        let url = self.config_url(name);
        debug!(agent = name, url = %url, "Removing agent config from ACS");

        self.http
            .delete(&url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| BidError::Registration(e.to_string()))?;

        Ok(())
    }
}

// ─── Banker ─────────────────────────────────────────────────────────────────

/// Client for the Banker spend ledger.
pub struct BankerClient {
    base_url: String,
    http: reqwest::Client,
}

impl BankerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: default_http_client(),
        }
    }

    fn balance_url(&self, account_path: &str) -> String {
        format!("{}/v1/accounts/{}/balance", self.base_url, account_path)
    }
}

impl BalanceSink for BankerClient {
    async fn report_balance(&self, account_path: &str, balance_units: i64) -> BidResult<()> {
        let url = self.balance_url(account_path);
        debug!(account = account_path, balance = balance_units, "Pacing");

        self.http
            .post(&url)
            .header("Accept", "application/json")
            .json(&serde_json::json!({ "USD/1M": balance_units }))
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| BidError::Pacing(e.to_string()))?;

        Ok(())
    }
}

fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
