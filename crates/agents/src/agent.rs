//! Agent runtime state and the per-agent matching engine.

use crate::index::EligibilityIndex;
use crate::pacer::PacerHandle;
use openbidder_core::openrtb::{Bid, BidExt, BidRequest, BidResponse};
use openbidder_core::types::{AgentSpec, ImpressionKey};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, warn};

/// One configured bidding strategy and its mutable runtime state.
///
/// The spec (name, config, price, pacing parameters) is immutable after
/// load. Requests are served concurrently, so the bid sequence is atomic;
/// the registration flag and pacer slot are only touched by the lifecycle
/// controller.
pub struct Agent {
    pub spec: AgentSpec,
    registered: AtomicBool,
    bid_seq: AtomicU64,
    pacer: Mutex<Option<PacerHandle>>,
}

impl Agent {
    pub fn new(spec: AgentSpec) -> Self {
        Self {
            spec,
            registered: AtomicBool::new(false),
            bid_seq: AtomicU64::new(0),
            pacer: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn external_id(&self) -> i64 {
        self.spec.config.external_id
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub fn mark_registered(&self, registered: bool) {
        self.registered.store(registered, Ordering::Release);
    }

    /// Allocate the next bid identifier. Strictly increasing and unique
    /// for this agent within the process lifetime.
    fn next_bid_id(&self) -> String {
        self.bid_seq.fetch_add(1, Ordering::Relaxed).to_string()
    }

    pub fn set_pacer(&self, handle: PacerHandle) {
        *self.pacer.lock() = Some(handle);
    }

    pub fn take_pacer(&self) -> Option<PacerHandle> {
        self.pacer.lock().take()
    }

    pub fn has_pacer(&self) -> bool {
        self.pacer.lock().is_some()
    }

    /// Run this agent against one request. For every impression the agent
    /// is eligible for, pick one creative uniformly at random, price the
    /// bid at the agent's fixed price, and append it to the response's
    /// single seat. Returns true iff at least one bid was appended.
    ///
    /// Bad upstream data never panics: an out-of-range creative index
    /// skips that single bid and the rest of the request continues.
    pub fn bid(
        &self,
        request: &BidRequest,
        index: &EligibilityIndex,
        rng: &mut impl Rng,
        response: &mut BidResponse,
    ) -> bool {
        let Some(seat) = response.seatbid.first_mut() else {
            return false;
        };

        let mut appended = 0usize;

        for imp in &request.imp {
            let key = ImpressionKey {
                imp_id: imp.id.clone(),
                external_id: self.spec.config.external_id,
            };
            let Some(eligible) = index.get(&key) else {
                continue;
            };
            if eligible.is_empty() {
                continue;
            }

            let raw_index = eligible[rng.gen_range(0..eligible.len())];
            let creative = match usize::try_from(raw_index)
                .ok()
                .and_then(|i| self.spec.config.creatives.get(i))
            {
                Some(creative) => creative,
                None => {
                    warn!(
                        agent = %self.spec.name,
                        imp_id = %imp.id,
                        creative_index = raw_index,
                        creatives = self.spec.config.creatives.len(),
                        "Eligible creative index out of range, skipping bid"
                    );
                    metrics::counter!("bids.creative_index_errors").increment(1);
                    continue;
                }
            };

            let bid = Bid {
                id: self.next_bid_id(),
                impid: imp.id.clone(),
                price: self.spec.price as f32,
                crid: Some(creative.id.to_string()),
                ext: Some(BidExt {
                    priority: 1.0,
                    external_id: self.spec.config.external_id,
                }),
            };

            debug!(
                agent = %self.spec.name,
                imp_id = %imp.id,
                crid = %creative.id,
                price = self.spec.price,
                "Appending bid"
            );
            seat.bid.push(bid);
            appended += 1;
        }

        appended > 0
    }
}
