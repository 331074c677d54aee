mod builtin;
mod region;

pub use region::{FileRef, RegionEntry, Registry};
