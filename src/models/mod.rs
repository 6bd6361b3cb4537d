use serde::{Deserialize, Serialize};

/// Linked identity of a Farcaster user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub fid: u64,
    pub username: String,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
    pub custody_address: Option<String>,
    pub verified_addresses: Vec<String>,
}

/// An NFT as returned by the asset lister, before enrichment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnedNft {
    pub token_id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub contract_address: String,
    pub contract_name: Option<String>,
}

/// Floor price reported per marketplace
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FloorPrice {
    pub primary: Option<f64>,
    pub secondary: Option<f64>,
}

// API response models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    pub token_id: String,
    pub name: String,
    pub image: String,
    pub collection_name: String,
    pub contract_address: String,
    pub is_custody: bool,
    pub floor_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub user: String,
    pub fid: u64,
    pub display_name: Option<String>,
    pub pfp: Option<String>,
    pub wallets: Vec<String>,
    pub wallet_count: usize,
    pub total_found: usize,
    pub total_value_eth: f64,
    pub nfts: Vec<Nft>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HolderList {
    pub contract_address: String,
    pub holder_count: usize,
    pub holders: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub contract_address: String,
    pub floor_price: f64,
    pub available: bool,
}
