//! Bundle sale order parameters for the Seaport marketplace on Base.
//!
//! Only the unsigned order parameters are built here; the seller's wallet signs
//! them client-side.

use crate::validation::{validate_evm_address, ValidationError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seaport v1.6
pub const SEAPORT_ADDRESS: &str = "0x0000000000000068F116a894984e2DB1123eB395";
pub const BASE_CHAIN_ID: u64 = 8453;
pub const ORDER_LIFETIME_DAYS: i64 = 30;

pub const ITEM_TYPE_NATIVE: u8 = 0;
pub const ITEM_TYPE_ERC20: u8 = 1;
pub const ITEM_TYPE_ERC721: u8 = 2;

const NATIVE_TOKEN: &str = "0x0000000000000000000000000000000000000000";
const USDC_ON_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ListingError {
    #[error("Bundle must contain at least one NFT")]
    EmptyBundle,

    #[error(transparent)]
    InvalidAddress(#[from] ValidationError),

    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid encoded order: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eth,
    Usdc,
}

impl Currency {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Eth => NATIVE_TOKEN,
            Self::Usdc => USDC_ON_BASE,
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Self::Eth => 18,
            Self::Usdc => 6,
        }
    }

    fn item_type(&self) -> u8 {
        match self {
            Self::Eth => ITEM_TYPE_NATIVE,
            Self::Usdc => ITEM_TYPE_ERC20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleItem {
    pub contract_address: String,
    pub token_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferItem {
    pub item_type: u8,
    pub token: String,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsiderationItem {
    pub item_type: u8,
    pub token: String,
    /// Base units as a decimal string (wei for ETH)
    pub amount: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOrder {
    pub offerer: String,
    pub chain_id: u64,
    pub marketplace: String,
    pub offer: Vec<OfferItem>,
    pub consideration: Vec<ConsiderationItem>,
    pub start_time: i64,
    pub end_time: i64,
}

/// Build the unsigned order selling every item in `items` for `price`
pub fn build_bundle_order(
    seller: &str,
    items: &[BundleItem],
    price: &str,
    currency: Currency,
    now: DateTime<Utc>,
) -> Result<BundleOrder, ListingError> {
    validate_evm_address(seller)?;
    if items.is_empty() {
        return Err(ListingError::EmptyBundle);
    }

    let offer = items
        .iter()
        .map(|item| -> Result<OfferItem, ListingError> {
            validate_evm_address(&item.contract_address)?;
            let identifier = item.token_id.trim();
            if identifier.is_empty() || !identifier.chars().all(|c| c.is_ascii_digit()) {
                return Err(ListingError::InvalidTokenId(item.token_id.clone()));
            }
            Ok(OfferItem {
                item_type: ITEM_TYPE_ERC721,
                token: item.contract_address.trim().to_string(),
                identifier: identifier.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let amount = parse_amount(price, currency.decimals())?;
    if amount == 0 {
        return Err(ListingError::InvalidPrice("price must be greater than zero".to_string()));
    }

    let start = now.timestamp();
    let end = (now + Duration::days(ORDER_LIFETIME_DAYS)).timestamp();

    Ok(BundleOrder {
        offerer: seller.trim().to_string(),
        chain_id: BASE_CHAIN_ID,
        marketplace: SEAPORT_ADDRESS.to_string(),
        offer,
        consideration: vec![ConsiderationItem {
            item_type: currency.item_type(),
            token: currency.token().to_string(),
            amount: amount.to_string(),
            recipient: seller.trim().to_string(),
        }],
        start_time: start,
        end_time: end,
    })
}

/// Parse a human price ("0.25", "1,500", "1.5K", "2M") into base units.
///
/// The conversion is exact: input with more fractional digits than the token
/// supports is rejected rather than rounded.
pub fn parse_amount(input: &str, decimals: u32) -> Result<u128, ListingError> {
    let cleaned = input.trim().replace(',', "").to_uppercase();
    let (number, extra) = if let Some(n) = cleaned.strip_suffix('M') {
        (n, 6)
    } else if let Some(n) = cleaned.strip_suffix('K') {
        (n, 3)
    } else {
        (cleaned.as_str(), 0)
    };

    let invalid = || ListingError::InvalidPrice(input.to_string());
    let scale = decimals + extra;
    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > scale as usize {
        return Err(ListingError::InvalidPrice(format!(
            "{} has more than {} decimal places",
            input, decimals
        )));
    }

    let digits = format!("{}{:0<width$}", whole, frac, width = scale as usize);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse::<u128>().map_err(|_| invalid())
}

/// Compact URL-safe form of an order, for share links
pub fn encode_order(order: &BundleOrder) -> Result<String, ListingError> {
    let json = serde_json::to_vec(order).map_err(|e| ListingError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_order(encoded: &str) -> Result<BundleOrder, ListingError> {
    let json = URL_SAFE_NO_PAD
        .decode(encoded.trim())
        .map_err(|e| ListingError::Encoding(e.to_string()))?;
    serde_json::from_slice(&json).map_err(|e| ListingError::Encoding(e.to_string()))
}
