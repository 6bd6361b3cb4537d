//! Request-level operations composed from the caches and upstream collaborators

pub mod holders;
pub mod price;
pub mod scan;

use crate::cache::KeyError;
use crate::upstream::UpstreamError;
use thiserror::Error;

pub use holders::HolderService;
pub use price::PriceService;
pub use scan::ScanService;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
