//! Shared fixtures for the crate's unit tests.

use openbidder_core::types::{AgentConfig, AgentSpec, Creative};

/// A fixed-price agent spec with the given external id and creative ids.
pub(crate) fn test_spec(name: &str, external_id: i64, creative_ids: &[i64]) -> AgentSpec {
    AgentSpec {
        name: name.to_string(),
        config: AgentConfig {
            account: vec!["hello".to_string(), "world".to_string()],
            augmentations: None,
            bid_control: None,
            bid_probability: 0.1,
            creatives: creative_ids
                .iter()
                .map(|id| Creative {
                    format: "728x90".to_string(),
                    id: *id,
                    name: format!("creative-{id}"),
                })
                .collect(),
            error_format: "lightweight".to_string(),
            external: false,
            external_id,
            loss_format: "lightweight".to_string(),
            min_time_available_ms: 5.0,
            win_format: "full".to_string(),
        },
        price: 1.0,
        period: 30_000,
        balance: 15_000,
    }
}
