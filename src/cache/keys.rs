//! Cache key derivation

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Missing key input: {0}")]
    MissingKeyInput(&'static str),
}

/// A namespaced cache key. Case-insensitive identifiers are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Scan result for a Farcaster fid
    Fid(u64),
    /// Scan result looked up by username
    Username(String),
    /// Holder list for a collection contract
    Holders(String),
    /// Floor price for a collection contract
    FloorPrice(String),
}

impl CacheKey {
    /// Key for a user scan. The fid wins when both are given; the username is the fallback.
    pub fn user_scan(fid: Option<u64>, username: Option<&str>) -> Result<Self, KeyError> {
        if let Some(fid) = fid {
            return Ok(Self::Fid(fid));
        }
        match username.map(normalize_handle) {
            Some(name) if !name.is_empty() => Ok(Self::Username(name)),
            _ => Err(KeyError::MissingKeyInput("fid or username")),
        }
    }

    /// Key for a collection holder list
    pub fn holders(contract: &str) -> Result<Self, KeyError> {
        non_blank(contract, "contract").map(Self::Holders)
    }

    /// Key for a collection floor price
    pub fn floor_price(contract: &str) -> Result<Self, KeyError> {
        non_blank(contract, "contract").map(Self::FloorPrice)
    }

    /// Namespace prefix, shared by every key of the same purpose
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Fid(_) => "fid",
            Self::Username(_) => "user",
            Self::Holders(_) => "holders",
            Self::FloorPrice(_) => "price",
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Handles may arrive with a leading `@`
fn normalize_handle(value: &str) -> String {
    normalize(value.trim().trim_start_matches('@'))
}

fn non_blank(value: &str, what: &'static str) -> Result<String, KeyError> {
    let value = normalize(value);
    if value.is_empty() {
        return Err(KeyError::MissingKeyInput(what));
    }
    Ok(value)
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fid(fid) => write!(f, "{}:{}", self.namespace(), fid),
            Self::Username(name) => write!(f, "{}:{}", self.namespace(), name),
            Self::Holders(contract) | Self::FloorPrice(contract) => {
                write!(f, "{}:{}", self.namespace(), contract)
            }
        }
    }
}
