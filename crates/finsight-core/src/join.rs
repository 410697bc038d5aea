//! Nearest-date join of shares outstanding against close prices.
//!
//! [`PriceSeries`] holds a sorted, de-duplicated reference series and answers
//! "closest close within N days" lookups by binary search. [`join_market_cap`]
//! uses it to derive market capitalization for each [`SharesSnapshot`].

use chrono::{NaiveDate, TimeDelta};

use crate::types::{PricePoint, SharesSnapshot};

/// Default maximum distance between a snapshot date and its matched price.
pub const DEFAULT_TOLERANCE_DAYS: i64 = 10;

/// Date-sorted reference price series with one point per date.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates a series, sorting by date and keeping the first point seen
    /// for any duplicated date.
    #[must_use]
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    /// Returns the points in ascending date order.
    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Finds the point closest to `anchor` that is at most `tolerance` away.
    ///
    /// The bound is inclusive. When an earlier and a later point are equally
    /// close, the earlier one wins.
    #[must_use]
    pub fn nearest(&self, anchor: NaiveDate, tolerance: TimeDelta) -> Option<&PricePoint> {
        let idx = self.points.partition_point(|p| p.date < anchor);
        let before = idx.checked_sub(1).and_then(|i| self.points.get(i));
        let after = self.points.get(idx);

        let best = match (before, after) {
            (Some(b), Some(a)) => {
                if anchor - b.date <= a.date - anchor {
                    b
                } else {
                    a
                }
            }
            (Some(p), None) | (None, Some(p)) => p,
            (None, None) => return None,
        };

        ((best.date - anchor).abs() <= tolerance).then_some(best)
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Returns a copy of `snapshot` with market cap derived from `close`.
///
/// Each market cap is present only when both the share count and the close
/// are present.
#[must_use]
pub fn with_close_price(snapshot: &SharesSnapshot, close: Option<f64>) -> SharesSnapshot {
    SharesSnapshot {
        market_cap_basic: close.and_then(|c| Some(snapshot.basic? * c)),
        market_cap_diluted: close.and_then(|c| Some(snapshot.diluted? * c)),
        ..snapshot.clone()
    }
}

/// Enriches every snapshot with market cap from the nearest close price.
///
/// Snapshots without a date, or with no close within `tolerance`, get absent
/// market cap. The input is left untouched.
#[must_use]
pub fn join_market_cap(
    snapshots: &[SharesSnapshot],
    prices: &PriceSeries,
    tolerance: TimeDelta,
) -> Vec<SharesSnapshot> {
    snapshots
        .iter()
        .map(|snapshot| {
            let close = snapshot
                .date
                .and_then(|date| prices.nearest(date, tolerance))
                .map(|p| p.close);
            with_close_price(snapshot, close)
        })
        .collect()
}
