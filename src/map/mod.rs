mod presenter;

pub use presenter::{MapPresenter, MapView};
