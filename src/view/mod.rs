mod intent;
mod state;
mod store;
mod warning;

pub use intent::{Intent, LayerName, OverlayName};
pub use state::{LayerVisibility, OverlayPolicy, OverlayVisibility, ViewState};
pub use store::{Change, LayerStore, Outcome};
pub use warning::Warning;
