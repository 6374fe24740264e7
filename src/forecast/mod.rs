mod aggregator;
pub mod models;

pub use aggregator::summarize;
pub use models::DailySummary;
