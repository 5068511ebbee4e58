//! Bid-log events
//!
//! `RawBid` mirrors one CSV row exactly as read; `BidEvent` is the trimmed,
//! typed record every later stage consumes.

use serde::{Deserialize, Serialize};

use crate::schema::CategoricalColumn;

/// One bid-log row before normalization. All fields are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBid {
    #[serde(default)]
    pub bid_id: String,
    pub bidder_id: String,
    pub auction: String,
    pub merchandise: String,
    pub device: String,
    pub time: String,
    #[serde(default)]
    pub country: String,
    pub ip: String,
    pub url: String,
}

/// Normalized bid event. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidEvent {
    pub bid_id: String,
    pub bidder_id: String,
    pub auction: String,
    pub merchandise: String,
    pub device: String,
    /// Opaque, roughly monotonic timestamp
    pub time: i64,
    pub country: String,
    pub ip: String,
    pub url: String,
}

impl BidEvent {
    /// Raw value of a categorical column
    pub fn category(&self, column: CategoricalColumn) -> &str {
        match column {
            CategoricalColumn::Auction => &self.auction,
            CategoricalColumn::Merchandise => &self.merchandise,
            CategoricalColumn::Device => &self.device,
            CategoricalColumn::Country => &self.country,
            CategoricalColumn::Ip => &self.ip,
            CategoricalColumn::Url => &self.url,
        }
    }
}
