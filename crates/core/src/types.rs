//! Shared domain types: creatives, agent configuration, impression keys.

use serde::{Deserialize, Serialize};

/// A specific ad asset eligible to fill an impression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creative {
    pub format: String,
    pub id: i64,
    pub name: String,
}

/// The agent configuration registered with the ACS. Immutable after load.
///
/// `augmentations` and `bid_control` are opaque to the bidder; they are
/// cached as raw JSON and passed through to the ACS untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub account: Vec<String>,
    pub augmentations: Option<serde_json::Value>,
    pub bid_control: Option<serde_json::Value>,
    pub bid_probability: f64,
    pub creatives: Vec<Creative>,
    #[serde(default)]
    pub error_format: String,
    #[serde(default)]
    pub external: bool,
    pub external_id: i64,
    #[serde(default)]
    pub loss_format: String,
    #[serde(default)]
    pub min_time_available_ms: f64,
    #[serde(default)]
    pub win_format: String,
}

impl AgentConfig {
    /// Colon-joined account path used by the Banker balance endpoint.
    pub fn account_path(&self) -> String {
        self.account.join(":")
    }
}

/// One entry of the agents file: a named bidding strategy plus its
/// fixed bid price and pacing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub config: AgentConfig,
    /// Fixed price the agent bids per impression.
    pub price: f64,
    /// Pacing period in milliseconds.
    pub period: u64,
    /// Balance reported to the Banker each tick, in USD/1M units.
    pub balance: i64,
}

/// Composite key correlating one impression with one agent's external id.
/// Derived per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImpressionKey {
    pub imp_id: String,
    pub external_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_config_wire_names() {
        let raw = serde_json::json!({
            "account": ["hello", "world"],
            "augmentations": null,
            "bidControl": { "type": "RELAY" },
            "bidProbability": 0.1,
            "creatives": [ { "format": "728x90", "id": 2, "name": "LeaderBoard" } ],
            "errorFormat": "lightweight",
            "external": false,
            "externalId": 0,
            "lossFormat": "lightweight",
            "minTimeAvailableMs": 5.0,
            "winFormat": "full"
        });
        let config: AgentConfig = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(config.external_id, 0);
        assert_eq!(config.creatives[0].id, 2);
        assert_eq!(config.account_path(), "hello:world");

        // The ACS receives the config exactly as it was loaded.
        let round_trip = serde_json::to_value(&config).unwrap();
        assert_eq!(round_trip, raw);
    }
}
