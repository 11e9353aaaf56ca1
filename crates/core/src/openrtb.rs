//! OpenRTB 2.1 compatible bid request/response types.
//! Subset of fields relevant to exchange-side eligibility matching.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OpenRTB Bid Request (simplified).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidRequest {
    pub id: String,
    pub imp: Vec<Impression>,
    #[serde(default)]
    pub tmax: u32,
    #[serde(default)]
    pub at: u32,
    #[serde(default)]
    pub cur: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Impression {
    pub id: String,
    #[serde(default)]
    pub bidfloor: f64,
    #[serde(default = "default_bidfloorcur")]
    pub bidfloorcur: String,
    /// Exchange-attached eligibility metadata. Left untyped here; the
    /// index builder validates it into an [`ImpressionExt`] per impression
    /// so one bad block never rejects the whole request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

fn default_bidfloorcur() -> String {
    "USD".to_string()
}

/// Validated shape of the impression `ext` block the exchange embeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpressionExt {
    #[serde(rename = "external-ids")]
    pub external_ids: Vec<i64>,
    /// Keyed by the decimal string form of the external id.
    #[serde(rename = "creative-indexes")]
    pub creative_indexes: HashMap<String, Vec<i64>>,
}

/// OpenRTB Bid Response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidResponse {
    pub id: String,
    #[serde(default)]
    pub seatbid: Vec<SeatBid>,
    #[serde(default = "default_cur")]
    pub cur: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

fn default_cur() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatBid {
    pub bid: Vec<Bid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    #[serde(default)]
    pub group: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub impid: String,
    pub price: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<BidExt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidExt {
    pub priority: f64,
    #[serde(rename = "external-id")]
    pub external_id: i64,
}

impl BidResponse {
    /// Create an empty response carrying the single seat every bid for
    /// this request is appended to.
    pub fn with_one_seat(request_id: String) -> Self {
        Self {
            id: request_id,
            seatbid: vec![SeatBid {
                bid: Vec::new(),
                seat: None,
                group: 0,
            }],
            cur: "USD".to_string(),
            ext: None,
        }
    }

    pub fn bid_count(&self) -> usize {
        self.seatbid.iter().map(|s| s.bid.len()).sum()
    }
}
