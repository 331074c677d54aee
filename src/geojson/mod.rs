mod damage;
mod document;
mod summary;

pub use damage::DamageState;
pub use document::{footprint_area, GeoDocument};
pub use summary::{BuildingSummary, CommuneStats};
