//! # Calendar aggregation of ranked hits
//!
//! Buckets hits into UTC calendar days ([`day_bins`]) and rolls the daily
//! bins up into months ([`monthly_composite`]). The monthly score is the
//! unweighted mean of the daily averages — an average of averages, not
//! re-weighted by daily hit count. Callers relying on the monthly figures
//! must be aware of that simplification.

use std::collections::BTreeMap;

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::ranking::RankedHit;
use crate::scan::Hit;

/// One UTC calendar day of hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBin {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub count: u32,
    /// Arithmetic mean of the day's severities; `None` when the day carries
    /// no severity information.
    pub score: Option<f64>,
}

/// One UTC calendar month of daily bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBin {
    pub year: i32,
    pub month: u8,
    pub count: u32,
    /// Unweighted mean of the month's daily scores.
    pub score: Option<f64>,
}

fn bin_days<I>(timestamped: I) -> Vec<DayBin>
where
    I: IntoIterator<Item = (Epoch, Option<f64>)>,
{
    let mut bins: BTreeMap<(i32, u8, u8), (u32, f64, u32)> = BTreeMap::new();
    for (time, severity) in timestamped {
        let (year, month, day, ..) = time.to_gregorian_utc();
        let entry = bins.entry((year, month, day)).or_insert((0, 0.0, 0));
        entry.0 += 1;
        if let Some(severity) = severity {
            entry.1 += severity;
            entry.2 += 1;
        }
    }

    bins.into_iter()
        .map(|((year, month, day), (count, sum, scored))| DayBin {
            year,
            month,
            day,
            count,
            score: (scored > 0).then(|| sum / scored as f64),
        })
        .collect()
}

/// Group ranked hits by their UTC calendar date, one bin per distinct date,
/// sorted chronologically.
pub fn day_bins(hits: &[RankedHit]) -> Vec<DayBin> {
    bin_days(
        hits.iter()
            .map(|ranked| (ranked.hit.exact_time, Some(ranked.severity))),
    )
}

/// Same grouping for raw, unranked hits; every bin gets `score = None`.
pub fn day_bins_unranked(hits: &[Hit]) -> Vec<DayBin> {
    bin_days(hits.iter().map(|hit| (hit.exact_time, None)))
}

/// Roll daily bins up into months: counts are summed, scores are the
/// unweighted mean of the daily averages present.
pub fn monthly_composite(days: &[DayBin]) -> Vec<MonthBin> {
    let mut bins: BTreeMap<(i32, u8), (u32, f64, u32)> = BTreeMap::new();
    for day in days {
        let entry = bins.entry((day.year, day.month)).or_insert((0, 0.0, 0));
        entry.0 += day.count;
        if let Some(score) = day.score {
            entry.1 += score;
            entry.2 += 1;
        }
    }

    bins.into_iter()
        .map(|((year, month), (count, sum, scored))| MonthBin {
            year,
            month,
            count,
            score: (scored > 0).then(|| sum / scored as f64),
        })
        .collect()
}
