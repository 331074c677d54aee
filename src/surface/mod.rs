mod adapter;
mod layer;
mod memory;
mod widget;

pub use adapter::MapSurface;
pub use layer::{Camera, LayerKind, LayerSpec, LoadedLayer, Slot};
pub use memory::{MemoryWidget, WidgetCall};
pub use widget::MapWidget;
