use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Aggregated single-day view derived from the 3-hour forecast entries
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Arithmetic mean of every entry's temperature on this date
    pub mean_temperature: f64,
    /// Icon of the first entry seen for this date
    pub icon: String,
}
