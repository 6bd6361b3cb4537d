pub mod api;
pub mod cache;
pub mod config;
pub mod listing;
pub mod models;
pub mod service;
pub mod state;
pub mod upstream;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use api::error::ApiError;
pub use api::response::ApiResponse;
pub use api::route::{create_router, BundleRequest, ContractQuery, ScanQuery};
pub use cache::{CacheKey, CacheStore, Clock, KeyError, ManualClock, SystemClock};
pub use models::{HolderList, Nft, ScanResult};
pub use validation::{validate_evm_address, validate_fid, validate_username};
