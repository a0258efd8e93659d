//! Cached model registry with an injectable clock

pub mod cached;
pub mod clock;

pub use cached::{CachedModelRegistry, CatalogError, CatalogSource};
pub use clock::{Clock, SystemClock};
