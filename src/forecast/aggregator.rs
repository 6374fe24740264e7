use chrono::NaiveDate;
use indexmap::IndexMap;

use super::models::DailySummary;
use crate::weather::ForecastEntry;

struct DayAccumulator {
    total: f64,
    count: usize,
    icon: String,
}

/// Group forecast entries by calendar date and compute per-day mean temperatures.
///
/// Dates appear in the order they are first seen. The representative icon of a
/// day is the icon of its first entry, not the most frequent one.
pub fn summarize(entries: &[ForecastEntry]) -> Vec<DailySummary> {
    let mut days: IndexMap<NaiveDate, DayAccumulator> = IndexMap::new();

    for entry in entries {
        let day = days
            .entry(entry.timestamp.date())
            .or_insert_with(|| DayAccumulator {
                total: 0.0,
                count: 0,
                icon: entry.icon.clone(),
            });
        day.total += entry.temperature;
        day.count += 1;
    }

    days.into_iter()
        .map(|(date, day)| DailySummary {
            date,
            mean_temperature: day.total / day.count as f64,
            icon: day.icon,
        })
        .collect()
}
