mod controller;
pub mod handlers;
mod state;

pub use controller::{QueryError, WidgetController};
