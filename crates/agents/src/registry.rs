//! Agent registry: owns every configured agent, keyed by unique name.

use crate::agent::Agent;
use dashmap::DashMap;
use openbidder_core::types::AgentSpec;
use std::sync::Arc;

/// The set of configured agents. Built once at startup from the agents
/// file; agents themselves carry the mutable runtime state.
#[derive(Default)]
pub struct AgentRegistry {
    agents: DashMap<String, Arc<Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: Vec<AgentSpec>) -> Self {
        let registry = Self::new();
        for spec in specs {
            registry.insert(Agent::new(spec));
        }
        registry
    }

    /// Insert an agent; the name is the unique key, so a duplicate name
    /// replaces the earlier entry.
    pub fn insert(&self, agent: Agent) -> Arc<Agent> {
        let agent = Arc::new(agent);
        self.agents.insert(agent.name().to_string(), agent.clone());
        agent
    }

    pub fn get(&self, name: &str) -> Option<Arc<Agent>> {
        self.agents.get(name).map(|entry| entry.value().clone())
    }

    /// Snapshot of all agents, safe to iterate while requests are served.
    pub fn iter(&self) -> Vec<Arc<Agent>> {
        self.agents
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
