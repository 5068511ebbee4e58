//! Chronological per-actor aggregation
//!
//! Groups normalized bids by bidder, orders each group by timestamp (stable on
//! ties, so equal timestamps keep their input order) and reduces the group to
//! an [`ActorFeatures`] row: one fingerprint string per categorical column,
//! distinct-value counts, the inter-bid gap sequence and its summary
//! statistics. The result is an immutable [`AggregatedTable`] handed to the
//! joiner by value.

use botbid_types::{BidEvent, CategoricalColumn, DiffStatistic, NumericColumn, TextColumn};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::stats::{gap_summary, mean_present};

/// Aggregated features of one actor
#[derive(Debug, Clone, PartialEq)]
pub struct ActorFeatures {
    pub bidder_id: String,
    pub bid_count: usize,
    /// Consecutive timestamp differences; the first entry is always `None`.
    /// Widened so any pair of `i64` timestamps has an exact gap.
    pub time_diffs: Vec<Option<i128>>,
    fingerprints: BTreeMap<TextColumn, String>,
    unique_counts: BTreeMap<CategoricalColumn, usize>,
    diff_stats: BTreeMap<DiffStatistic, Option<f64>>,
}

impl ActorFeatures {
    fn from_group(bidder_id: &str, mut group: Vec<&BidEvent>) -> Self {
        // `sort_by_key` is stable
        group.sort_by_key(|bid| bid.time);

        let mut fingerprints = BTreeMap::new();
        let mut unique_counts = BTreeMap::new();
        for column in CategoricalColumn::ALL {
            let tokens: Vec<String> = group
                .iter()
                .map(|bid| column.token(bid.category(column)))
                .collect();
            let distinct: BTreeSet<&str> = group.iter().map(|bid| bid.category(column)).collect();
            fingerprints.insert(TextColumn::Category(column), tokens.join(" "));
            unique_counts.insert(column, distinct.len());
        }

        let time_diffs: Vec<Option<i128>> = std::iter::once(None)
            .chain(
                group
                    .windows(2)
                    .map(|pair| Some(i128::from(pair[1].time) - i128::from(pair[0].time))),
            )
            .take(group.len())
            .collect();
        let gaps: Vec<i128> = time_diffs.iter().flatten().copied().collect();
        let diff_tokens: Vec<String> = gaps.iter().map(|g| format!("time_diff_{}", g)).collect();
        fingerprints.insert(TextColumn::TimeDiff, diff_tokens.join(" "));

        Self {
            bidder_id: bidder_id.to_string(),
            bid_count: group.len(),
            time_diffs,
            fingerprints,
            unique_counts,
            diff_stats: gap_summary(&gaps).into_iter().collect(),
        }
    }

    /// Fingerprint of an aggregated text column; `None` for roster columns
    pub fn fingerprint(&self, column: TextColumn) -> Option<&str> {
        self.fingerprints.get(&column).map(String::as_str)
    }

    pub fn unique_count(&self, column: CategoricalColumn) -> usize {
        self.unique_counts.get(&column).copied().unwrap_or(0)
    }

    pub fn diff_stat(&self, stat: DiffStatistic) -> Option<f64> {
        self.diff_stats.get(&stat).copied().flatten()
    }

    /// Value of a numeric column; gap statistics may still be missing when
    /// no actor in the log had two or more bids
    pub fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::BidCount => Some(self.bid_count as f64),
            NumericColumn::Unique(c) => Some(self.unique_count(c) as f64),
            NumericColumn::Diff(stat) => self.diff_stat(stat),
        }
    }
}

/// Immutable per-actor feature table keyed by bidder id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedTable {
    actors: BTreeMap<String, ActorFeatures>,
}

impl AggregatedTable {
    pub fn get(&self, bidder_id: &str) -> Option<&ActorFeatures> {
        self.actors.get(bidder_id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Actors in bidder-id order
    pub fn iter(&self) -> impl Iterator<Item = &ActorFeatures> {
        self.actors.values()
    }
}

/// Aggregate a normalized bid log into one feature row per actor.
///
/// Actors with fewer than two bids have no gaps; each of their gap
/// statistics is replaced by the mean of that statistic over every actor
/// that has one.
pub fn aggregate(bids: &[BidEvent]) -> AggregatedTable {
    let mut groups: BTreeMap<&str, Vec<&BidEvent>> = BTreeMap::new();
    for bid in bids {
        groups.entry(bid.bidder_id.as_str()).or_default().push(bid);
    }

    let mut actors: BTreeMap<String, ActorFeatures> = groups
        .into_iter()
        .map(|(id, group)| (id.to_string(), ActorFeatures::from_group(id, group)))
        .collect();

    for stat in DiffStatistic::all() {
        let population_mean = mean_present(actors.values().map(|a| a.diff_stat(stat)));
        match population_mean {
            Some(mean) => {
                for actor in actors.values_mut() {
                    let entry = actor.diff_stats.entry(stat).or_insert(None);
                    if entry.is_none() {
                        *entry = Some(mean);
                    }
                }
            }
            None => warn!("No actor has a value for {}; left missing", stat.name()),
        }
        debug!("Imputation mean for {}: {:?}", stat.name(), population_mean);
    }

    info!(
        "Aggregated {} bids into {} actor feature rows",
        bids.len(),
        actors.len()
    );
    AggregatedTable { actors }
}
