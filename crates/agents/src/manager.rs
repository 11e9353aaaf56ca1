//! Lifecycle controller: registers agents with the ACS, starts their
//! pacers, and tears everything down on shutdown.

use crate::pacer;
use crate::registry::AgentRegistry;
use openbidder_control::{BalanceSink, ConfigStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Manages the lifecycle of all configured agents.
pub struct AgentManager<C, S> {
    registry: Arc<AgentRegistry>,
    acs: Arc<C>,
    banker: Arc<S>,
}

impl<C: ConfigStore, S: BalanceSink> AgentManager<C, S> {
    pub fn new(registry: Arc<AgentRegistry>, acs: Arc<C>, banker: Arc<S>) -> Self {
        Self {
            registry,
            acs,
            banker,
        }
    }

    pub fn registry(&self) -> Arc<AgentRegistry> {
        self.registry.clone()
    }

    /// Register every agent with the ACS and start its pacer. A failed
    /// registration leaves the agent unregistered but still bidding; the
    /// pacer starts either way.
    pub async fn bootstrap(&self) -> anyhow::Result<()> {
        for agent in self.registry.iter() {
            match self.acs.register_agent(agent.name(), &agent.spec.config).await {
                Ok(()) => {
                    agent.mark_registered(true);
                    metrics::counter!("acs.registrations").increment(1);
                    info!(agent = %agent.name(), "Agent registered with ACS");
                }
                Err(e) => {
                    metrics::counter!("acs.errors").increment(1);
                    warn!(
                        agent = %agent.name(),
                        error = %e,
                        "ACS registration failed; agent stays unregistered but keeps bidding"
                    );
                }
            }

            agent.set_pacer(pacer::start(agent.clone(), self.banker.clone()));
        }

        info!(count = self.registry.len(), "All agents started");
        Ok(())
    }

    /// Stop every pacer and remove each agent's config from the ACS.
    /// Best effort per agent; failures are logged, not retried.
    pub async fn shutdown(&self) {
        for agent in self.registry.iter() {
            if let Some(handle) = agent.take_pacer() {
                handle.stop().await;
            }

            match self.acs.unregister_agent(agent.name()).await {
                Ok(()) => {
                    agent.mark_registered(false);
                    info!(agent = %agent.name(), "Agent unregistered");
                }
                Err(e) => {
                    warn!(agent = %agent.name(), error = %e, "ACS unregister failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_spec;
    use openbidder_core::error::{BidError, BidResult};
    use openbidder_core::types::AgentConfig;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct MockAcs {
        fail_register: bool,
        registered: Mutex<Vec<String>>,
        unregistered: Mutex<Vec<String>>,
    }

    impl ConfigStore for MockAcs {
        async fn register_agent(&self, name: &str, _config: &AgentConfig) -> BidResult<()> {
            if self.fail_register {
                return Err(BidError::Registration("acs unreachable".to_string()));
            }
            self.registered.lock().push(name.to_string());
            Ok(())
        }

        async fn unregister_agent(&self, name: &str) -> BidResult<()> {
            self.unregistered.lock().push(name.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct NullSink {
        reports: AtomicU64,
    }

    impl BalanceSink for NullSink {
        async fn report_balance(&self, _account_path: &str, _balance_units: i64) -> BidResult<()> {
            self.reports.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager(
        specs: Vec<openbidder_core::types::AgentSpec>,
        acs: MockAcs,
    ) -> AgentManager<MockAcs, NullSink> {
        AgentManager::new(
            Arc::new(AgentRegistry::from_specs(specs)),
            Arc::new(acs),
            Arc::new(NullSink::default()),
        )
    }

    #[tokio::test]
    async fn test_bootstrap_registers_and_starts_pacers() {
        let manager = manager(
            vec![test_spec("alpha", 0, &[1]), test_spec("beta", 1, &[2])],
            MockAcs::default(),
        );

        manager.bootstrap().await.unwrap();

        for agent in manager.registry().iter() {
            assert!(agent.is_registered());
            assert!(agent.has_pacer());
        }
        assert_eq!(manager.acs.registered.lock().len(), 2);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_registration_keeps_agent_bidding() {
        let manager = manager(
            vec![test_spec("alpha", 0, &[1])],
            MockAcs {
                fail_register: true,
                ..Default::default()
            },
        );

        manager.bootstrap().await.unwrap();

        let agent = manager.registry().get("alpha").unwrap();
        assert!(!agent.is_registered());
        // The pacer runs regardless of the registration outcome.
        assert!(agent.has_pacer());

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_pacers_and_unregisters() {
        let manager = manager(vec![test_spec("alpha", 0, &[1])], MockAcs::default());

        manager.bootstrap().await.unwrap();
        manager.shutdown().await;

        let agent = manager.registry().get("alpha").unwrap();
        assert!(!agent.has_pacer());
        assert!(!agent.is_registered());
        assert_eq!(manager.acs.unregistered.lock().as_slice(), ["alpha"]);
    }
}
