//! Bid processing pipeline: builds the eligibility index for a request,
//! runs every registered agent against it, and aggregates the result into
//! a single one-seat response.

use crate::index;
use crate::registry::AgentRegistry;
use openbidder_core::openrtb::{BidRequest, BidResponse};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Processes a single bid request across all registered agents.
pub struct BidProcessor {
    registry: Arc<AgentRegistry>,
}

impl BidProcessor {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Process a request with the production random source. `None` means
    /// no agent bid and the caller should answer with no-bid.
    pub fn process(&self, request: &BidRequest) -> Option<BidResponse> {
        self.process_with_rng(request, &mut rand::thread_rng())
    }

    /// Same as [`process`](Self::process) with an injected random source,
    /// so creative selection can be pinned.
    pub fn process_with_rng(
        &self,
        request: &BidRequest,
        rng: &mut impl Rng,
    ) -> Option<BidResponse> {
        metrics::counter!("bids.requests").increment(1);

        // Malformed eligibility degrades to an empty index for the
        // affected impressions; it never fails the auction.
        let eligibility = index::build_eligibility_index_lossy(request);
        let mut response = BidResponse::with_one_seat(request.id.clone());

        let mut any_bid = false;
        for agent in self.registry.iter() {
            let did_bid = agent.bid(request, &eligibility, rng, &mut response);
            any_bid = any_bid || did_bid;
        }

        if any_bid {
            metrics::counter!("bids.responded").increment(1);
            debug!(request_id = %request.id, bids = response.bid_count(), "Responding");
            Some(response)
        } else {
            metrics::counter!("bids.no_bid").increment(1);
            None
        }
    }
}
