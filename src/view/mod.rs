pub mod html;
pub mod models;
pub mod render;
mod state;

pub use models::{Phase, ViewEvent, ViewModel};
pub use state::ViewState;
