mod models;
mod storage;

pub use models::{Favorites, Preferences, Theme};
pub use storage::PreferenceStore;
