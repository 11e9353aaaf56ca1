//! Pacing scheduler: one periodic task per agent that pushes the agent's
//! balance snapshot to the Banker.

use crate::agent::Agent;
use openbidder_control::BalanceSink;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Cancellation handle for a running pacer. `stop` consumes the handle,
/// so stopping twice is unrepresentable.
pub struct PacerHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PacerHandle {
    /// Cancel the recurring timer. When this returns, no further balance
    /// reports will be issued; reports already dispatched may complete
    /// but are never retried.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.task.await;
    }
}

/// Start the pacer for one agent. Every `agent.spec.period` milliseconds
/// it dispatches a detached balance report so a slow or failing Banker
/// call never delays the next tick. The balance itself is a read-only
/// snapshot; spend accounting lives entirely in the Banker.
pub fn start<S: BalanceSink>(agent: Arc<Agent>, sink: Arc<S>) -> PacerHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel();

    let name = agent.name().to_string();
    let account_path = agent.spec.config.account_path();
    let balance = agent.spec.balance;
    let period = Duration::from_millis(agent.spec.period);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately; the first report waits one period.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sink = sink.clone();
                    let name = name.clone();
                    let account_path = account_path.clone();
                    tokio::spawn(async move {
                        debug!(agent = %name, account = %account_path, "Pacing...");
                        metrics::counter!("pacing.reports").increment(1);
                        if let Err(e) = sink.report_balance(&account_path, balance).await {
                            warn!(agent = %name, error = %e, "Balance report failed");
                            metrics::counter!("pacing.errors").increment(1);
                        }
                    });
                }
                _ = &mut stop_rx => break,
            }
        }
    });

    PacerHandle { stop_tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_spec;
    use openbidder_core::error::{BidError, BidResult};
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingSink {
        reports: AtomicU64,
        fail: bool,
        delay: Duration,
    }

    impl CountingSink {
        fn new() -> Self {
            Self {
                reports: AtomicU64::new(0),
                fail: false,
                delay: Duration::ZERO,
            }
        }

        fn count(&self) -> u64 {
            self.reports.load(Ordering::SeqCst)
        }
    }

    impl BalanceSink for CountingSink {
        async fn report_balance(&self, _account_path: &str, _balance_units: i64) -> BidResult<()> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reports.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BidError::Pacing("banker unreachable".to_string()));
            }
            Ok(())
        }
    }

    fn paced_agent(period_ms: u64) -> Arc<Agent> {
        let mut spec = test_spec("paced", 0, &[1]);
        spec.period = period_ms;
        Arc::new(Agent::new(spec))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_pacer_fires_roughly_every_period() {
        let sink = Arc::new(CountingSink::new());
        let handle = start(paced_agent(100), sink.clone());

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let fired = sink.count();
        assert!(fired >= 9, "expected at least 9 reports in 1s, got {fired}");

        handle.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_halts_reports() {
        let sink = Arc::new(CountingSink::new());
        let handle = start(paced_agent(100), sink.clone());

        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.stop().await;

        // Reports dispatched before the stop may still land.
        tokio::time::sleep(Duration::from_millis(150)).await;
        let after_stop = sink.count();
        assert!(after_stop >= 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(sink.count(), after_stop, "no reports after stop");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failing_sink_never_blocks_ticks() {
        let sink = Arc::new(CountingSink {
            reports: AtomicU64::new(0),
            fail: true,
            delay: Duration::ZERO,
        });
        let handle = start(paced_agent(100), sink.clone());

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let fired = sink.count();
        assert!(fired >= 9, "failures must not suppress ticks, got {fired}");

        handle.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_slow_sink_never_delays_next_tick() {
        // Each report takes 3 periods; ticks must keep firing anyway.
        let sink = Arc::new(CountingSink {
            reports: AtomicU64::new(0),
            fail: false,
            delay: Duration::from_millis(300),
        });
        let handle = start(paced_agent(100), sink.clone());

        tokio::time::sleep(Duration::from_millis(1350)).await;
        let fired = sink.count();
        assert!(
            fired >= 9,
            "slow reports must overlap, not serialize, got {fired}"
        );

        handle.stop().await;
    }
}
