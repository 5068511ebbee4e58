//! Bid normalization: trims every field and parses the timestamp

use botbid_types::{BidEvent, Label, RawBid, RawRosterRecord, RosterRecord};
use tracing::info;

use crate::errors::{FeatureError, Result};

/// Normalize one raw bid. `row` is the zero-based data row, used in errors.
pub fn normalize_bid(row: usize, raw: RawBid) -> Result<BidEvent> {
    let bidder_id = raw.bidder_id.trim().to_string();
    if bidder_id.is_empty() {
        return Err(FeatureError::MissingBidder { row });
    }

    let time_text = raw.time.trim();
    let time = time_text
        .parse::<i64>()
        .map_err(|_| FeatureError::InvalidTimestamp {
            row,
            value: time_text.to_string(),
        })?;

    Ok(BidEvent {
        bid_id: raw.bid_id.trim().to_string(),
        bidder_id,
        auction: raw.auction.trim().to_string(),
        merchandise: raw.merchandise.trim().to_string(),
        device: raw.device.trim().to_string(),
        time,
        country: raw.country.trim().to_string(),
        ip: raw.ip.trim().to_string(),
        url: raw.url.trim().to_string(),
    })
}

/// Normalize a whole bid log, preserving input order
pub fn normalize_bids(raw: Vec<RawBid>) -> Result<Vec<BidEvent>> {
    let bids = raw
        .into_iter()
        .enumerate()
        .map(|(row, bid)| normalize_bid(row, bid))
        .collect::<Result<Vec<_>>>()?;
    info!("Normalized {} bid events", bids.len());
    Ok(bids)
}

/// Normalize roster rows and decode the optional outcome
pub fn normalize_roster(raw: Vec<RawRosterRecord>) -> Result<Vec<RosterRecord>> {
    raw.into_iter()
        .enumerate()
        .map(|(row, record)| -> Result<RosterRecord> {
            let label = match record.outcome {
                Some(value) => Some(
                    Label::from_outcome(value)
                        .ok_or(FeatureError::InvalidOutcome { row, value })?,
                ),
                None => None,
            };
            Ok(RosterRecord {
                bidder_id: record.bidder_id.trim().to_string(),
                payment_account: record.payment_account.trim().to_string(),
                address: record.address.trim().to_string(),
                label,
            })
        })
        .collect()
}
