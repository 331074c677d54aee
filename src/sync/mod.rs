mod fetch;
mod synchronizer;
mod theme;

pub use fetch::{FetchKind, FetchRequest, Ticket};
pub use synchronizer::{SyncReport, SyncSettings, Synchronizer};
pub use theme::{Hazard, Theme};
