//! Date-keyed merging of statement series.
//!
//! Balance sheet, income statement and cash flow series for one ticker and
//! cadence are outer-joined on period end date into [`MergedRow`]s.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::period::Cadence;
use crate::types::{CombinedFundamentals, MergedRow, PeriodSeries, StatementHistory};

/// Merges parallel series into one row per distinct period end.
///
/// `sources` are given in precedence order. For each date, a field key taken
/// from an earlier source is never overwritten by a later one, even if the
/// earlier value is absent. Records without a period end are dropped. The
/// output is ascending by date and has one row for every date present in any
/// source.
#[must_use]
pub fn merge_series(sources: &[&PeriodSeries]) -> Vec<MergedRow> {
    let mut rows: BTreeMap<NaiveDate, MergedRow> = BTreeMap::new();

    for source in sources {
        for record in source.iter() {
            let Some(date) = record.period_end else {
                continue;
            };
            let row = rows.entry(date).or_insert_with(|| MergedRow::new(date));
            if row.currency.is_none() {
                row.currency.clone_from(&record.currency);
            }
            for (name, value) in &record.fields {
                row.fields.entry(name.clone()).or_insert(*value);
            }
        }
    }

    rows.into_values().collect()
}

/// Merges up to three statement histories into annual and quarterly rows.
///
/// Missing statements (`None`) simply contribute no fields. Histories are
/// taken in the order given, which should be balance sheet, income statement,
/// cash flow.
#[must_use]
pub fn merge_statements(histories: &[Option<&StatementHistory>]) -> CombinedFundamentals {
    let merge = |cadence: Cadence| {
        let series: Vec<&PeriodSeries> = histories
            .iter()
            .flatten()
            .map(|history| history.series(cadence))
            .collect();
        merge_series(&series)
    };

    CombinedFundamentals {
        annual: merge(Cadence::Annual),
        quarterly: merge(Cadence::Quarterly),
    }
}
