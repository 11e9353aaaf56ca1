//! Eligibility index builder: turns the exchange-embedded impression ext
//! blocks into a per-request lookup keyed by (impression id, external id).

use openbidder_core::error::{BidError, BidResult};
use openbidder_core::openrtb::{BidRequest, Impression, ImpressionExt};
use openbidder_core::types::ImpressionKey;
use std::collections::HashMap;
use tracing::warn;

/// Maps (impression id, external agent id) to the list of eligible
/// creative indices. Scoped to one request, discarded after use.
///
/// Values are wire integers, not validated offsets; the matching engine
/// bounds-checks them against the agent's creative list.
pub type EligibilityIndex = HashMap<ImpressionKey, Vec<i64>>;

/// Build the eligibility index for a request. Fails on the first
/// impression whose eligibility metadata is absent or wrong-shaped.
pub fn build_eligibility_index(request: &BidRequest) -> BidResult<EligibilityIndex> {
    let mut index = EligibilityIndex::new();
    for imp in &request.imp {
        insert_impression(&mut index, imp)?;
    }
    Ok(index)
}

/// Build the index, treating a malformed impression as "no eligible
/// agents for that impression" instead of failing the request. This is
/// what the bid path uses.
pub fn build_eligibility_index_lossy(request: &BidRequest) -> EligibilityIndex {
    let mut index = EligibilityIndex::new();
    for imp in &request.imp {
        if let Err(e) = insert_impression(&mut index, imp) {
            warn!(imp_id = %imp.id, error = %e, "Skipping impression with malformed eligibility");
            metrics::counter!("bids.malformed_impressions").increment(1);
        }
    }
    index
}

fn insert_impression(index: &mut EligibilityIndex, imp: &Impression) -> BidResult<()> {
    let raw = imp.ext.as_ref().ok_or_else(|| {
        BidError::MalformedRequest(format!("impression '{}' has no eligibility ext", imp.id))
    })?;

    let ext: ImpressionExt = serde_json::from_value(raw.clone())
        .map_err(|e| BidError::MalformedRequest(format!("impression '{}': {}", imp.id, e)))?;

    for external_id in ext.external_ids {
        // The creative-indexes map is keyed by the decimal form of the
        // external id. A listed id with no entry gets no index entry at
        // all, which reads as "not eligible" downstream.
        if let Some(creatives) = ext.creative_indexes.get(&external_id.to_string()) {
            index.insert(
                ImpressionKey {
                    imp_id: imp.id.clone(),
                    external_id,
                },
                creatives.clone(),
            );
        }
    }
    Ok(())
}
