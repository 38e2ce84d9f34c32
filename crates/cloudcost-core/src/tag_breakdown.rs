//! Billing breakdown by cost-allocation tag (or any grouping key)
//!
//! Billing collaborators return one [`BillingBucket`] per period, each with
//! groups keyed like `Project$web`. This module turns those raw keys into tag
//! values, sums the amounts across periods and ranks the totals.
//!
//! # Examples
//!
//! ```
//! use cloudcost_core::tag_breakdown::{accumulate, parse_group_key, rank};
//! use cloudcost_core::types::BillingGroup;
//!
//! assert_eq!(parse_group_key("Project$web", "Project"), "web");
//!
//! let groups = vec![
//!     BillingGroup::new("web", 2.0),
//!     BillingGroup::new("batch", 5.0),
//!     BillingGroup::new("web", 4.0),
//! ];
//! let ranked = rank(&accumulate(&groups));
//! assert_eq!(ranked.entries()[0].key, "web");
//! assert_eq!(ranked.entries()[0].amount, 6.0);
//! ```

use crate::types::{BillingBucket, BillingGroup};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Label used for resources without a value for the tag
pub const NO_VALUE: &str = "(no value)";

/// Separator between tag key and tag value in grouped billing keys
const TAG_SEPARATOR: char = '$';

/// Extract the tag value from a grouped billing key
///
/// Strips a leading `"{tag_key}$"`. An empty key or an empty remainder maps
/// to [`NO_VALUE`]. Keys that do not carry the expected prefix are returned
/// unchanged.
pub fn parse_group_key(raw_key: &str, tag_key: &str) -> String {
    if raw_key.is_empty() {
        return NO_VALUE.to_string();
    }

    let remainder = raw_key
        .strip_prefix(tag_key)
        .and_then(|rest| rest.strip_prefix(TAG_SEPARATOR));

    match remainder {
        Some("") => NO_VALUE.to_string(),
        Some(value) => value.to_string(),
        None => {
            debug!("Unexpected billing group key format: {}", raw_key);
            raw_key.to_string()
        }
    }
}

/// Sum amounts per key
///
/// Non-finite amounts are skipped; they never abort the fold.
pub fn accumulate<'a, I>(groups: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a BillingGroup>,
{
    groups.into_iter().fold(BTreeMap::new(), |mut totals, group| {
        if group.amount.is_finite() {
            *totals.entry(group.key.clone()).or_insert(0.0) += group.amount;
        } else {
            debug!(
                "Skipping non-finite billing amount for {}: {}",
                group.key, group.amount
            );
        }
        totals
    })
}

/// Per-tag-value totals across every bucket of a billing response
pub fn tag_totals(buckets: &[BillingBucket], tag_key: &str) -> BTreeMap<String, f64> {
    let parsed: Vec<BillingGroup> = buckets
        .iter()
        .flat_map(|bucket| bucket.groups.iter())
        .map(|group| BillingGroup::new(parse_group_key(&group.key, tag_key), group.amount))
        .collect();
    accumulate(&parsed)
}

/// Per-key totals for groupings whose keys are used as-is (e.g. services)
pub fn raw_totals(buckets: &[BillingBucket]) -> BTreeMap<String, f64> {
    accumulate(buckets.iter().flat_map(|bucket| bucket.groups.iter()))
}

/// A key with its accumulated amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub key: String,
    pub amount: f64,
}

/// Entries sorted by amount descending, ties broken by key ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedList(Vec<RankedEntry>);

impl RankedList {
    /// Sorted entries
    pub fn entries(&self) -> &[RankedEntry] {
        &self.0
    }

    /// The first `n` entries
    pub fn top(&self, n: usize) -> &[RankedEntry] {
        &self.0[..n.min(self.0.len())]
    }

    /// Sum of all amounts
    pub fn total(&self) -> f64 {
        self.0.iter().map(|e| e.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn ranking_order(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.amount
        .total_cmp(&a.amount)
        .then_with(|| a.key.cmp(&b.key))
}

/// Rank accumulated totals
pub fn rank(totals: &BTreeMap<String, f64>) -> RankedList {
    rank_entries(
        totals
            .iter()
            .map(|(key, amount)| RankedEntry {
                key: key.clone(),
                amount: *amount,
            })
            .collect(),
    )
}

/// Rank an arbitrary list of entries (keys need not be unique)
pub fn rank_entries(mut entries: Vec<RankedEntry>) -> RankedList {
    entries.sort_by(ranking_order);
    RankedList(entries)
}
