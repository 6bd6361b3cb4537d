//! Keyed TTL caches with request coalescing

pub mod clock;
pub mod fetch;
pub mod keys;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::{CacheKey, KeyError};
pub use store::{CacheStore, DEFAULT_HIGH_WATER_MARK};
