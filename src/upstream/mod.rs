//! External collaborators: identity resolution, asset listing and price data

pub mod alchemy;
pub mod client;
pub mod neynar;

use crate::models::{FloorPrice, OwnedNft, Profile};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub use alchemy::AlchemyClient;
pub use client::HttpClient;
pub use neynar::NeynarClient;

/// Failure of an upstream call. Cloneable so one failure can reach every waiter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("Missing API key: {0}")]
    MissingApiKey(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Whether a retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MissingApiKey(_) | Self::NotFound(_) | Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    /// The request URL is dropped from the message; some endpoints embed the API key in it.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// How a user is identified on the social graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Fid(u64),
    Username(String),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fid(fid) => write!(f, "fid {}", fid),
            Self::Username(name) => write!(f, "@{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub exclude_spam: bool,
    pub page_size: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            exclude_spam: true,
            page_size: 50,
        }
    }
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_identity(&self, identity: &Identity) -> Result<Profile, UpstreamError>;
}

#[async_trait]
pub trait AssetLister: Send + Sync {
    async fn list_assets(&self, owner: &str, options: &ListOptions) -> Result<Vec<OwnedNft>, UpstreamError>;

    async fn list_holders(&self, contract: &str) -> Result<Vec<String>, UpstreamError>;
}

#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn floor_price(&self, contract: &str) -> Result<FloorPrice, UpstreamError>;
}
