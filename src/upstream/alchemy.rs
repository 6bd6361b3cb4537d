//! NFT ownership and floor prices over the Alchemy NFT API (v3)

use super::{AssetLister, HttpClient, ListOptions, PriceOracle, UpstreamError};
use crate::models::{FloorPrice, OwnedNft};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Upper bound on holder pages walked for one contract
const MAX_HOLDER_PAGES: usize = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnedNftsResponse {
    #[serde(default)]
    owned_nfts: Vec<AlchemyNft>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlchemyNft {
    contract: AlchemyContract,
    token_id: String,
    name: Option<String>,
    #[serde(default)]
    image: AlchemyImage,
    raw: Option<AlchemyRaw>,
}

#[derive(Debug, Deserialize)]
struct AlchemyContract {
    address: String,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlchemyImage {
    cached_url: Option<String>,
    png_url: Option<String>,
    original_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlchemyRaw {
    metadata: Option<serde_json::Value>,
}

impl AlchemyNft {
    /// Best available image: cached, png, original, then raw metadata
    fn image_url(&self) -> Option<String> {
        let raw_image = self
            .raw
            .as_ref()
            .and_then(|raw| raw.metadata.as_ref())
            .and_then(|metadata| metadata.get("image"))
            .and_then(|image| image.as_str())
            .map(str::to_string);

        [
            self.image.cached_url.clone(),
            self.image.png_url.clone(),
            self.image.original_url.clone(),
            raw_image,
        ]
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
    }
}

impl From<AlchemyNft> for OwnedNft {
    fn from(nft: AlchemyNft) -> Self {
        let image = nft.image_url();
        Self {
            token_id: nft.token_id,
            name: nft.name.filter(|n| !n.is_empty()),
            image,
            contract_address: nft.contract.address,
            contract_name: nft.contract.name.filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnersResponse {
    #[serde(default)]
    owners: Vec<String>,
    page_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FloorPriceResponse {
    open_sea: Option<MarketplaceFloor>,
    looks_rare: Option<MarketplaceFloor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketplaceFloor {
    floor_price: Option<f64>,
    error: Option<String>,
}

impl MarketplaceFloor {
    fn price(source: Option<Self>, name: &str, contract: &str) -> Option<f64> {
        let floor = source?;
        if let Some(error) = &floor.error {
            debug!("{} has no floor for {}: {}", name, contract, error);
        }
        floor.floor_price
    }
}

#[derive(Clone)]
pub struct AlchemyClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl AlchemyClient {
    pub fn new(http: HttpClient, base_url: &str, api_key: Option<String>) -> Self {
        info!("Initializing Alchemy client with endpoint: {}", base_url);
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self, method: &str) -> Result<String, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingApiKey("ALCHEMY_API_KEY"))?;
        Ok(format!("{}/nft/v3/{}/{}", self.base_url, api_key, method))
    }
}

#[async_trait]
impl AssetLister for AlchemyClient {
    async fn list_assets(&self, owner: &str, options: &ListOptions) -> Result<Vec<OwnedNft>, UpstreamError> {
        let url = self.endpoint("getNFTsForOwner")?;
        let mut query = vec![
            ("owner", owner.to_string()),
            ("pageSize", options.page_size.to_string()),
            ("withMetadata", "true".to_string()),
        ];
        if options.exclude_spam {
            query.push(("excludeFilters[]", "SPAM".to_string()));
        }

        let resource = format!("NFTs owned by {}", owner);
        let response: OwnedNftsResponse = self.http.get_json(&url, &resource, &query, &[]).await?;
        debug!("Wallet {} holds {} NFTs", owner, response.owned_nfts.len());
        Ok(response.owned_nfts.into_iter().map(OwnedNft::from).collect())
    }

    async fn list_holders(&self, contract: &str) -> Result<Vec<String>, UpstreamError> {
        let url = self.endpoint("getOwnersForContract")?;
        let resource = format!("holders of {}", contract);
        let mut holders = Vec::new();
        let mut page_key: Option<String> = None;

        for _ in 0..MAX_HOLDER_PAGES {
            let mut query = vec![("contractAddress", contract.to_string())];
            if let Some(key) = page_key.take() {
                query.push(("pageKey", key));
            }

            let page: OwnersResponse = self.http.get_json(&url, &resource, &query, &[]).await?;
            holders.extend(page.owners);

            match page.page_key {
                Some(key) if !key.is_empty() => page_key = Some(key),
                _ => return Ok(holders),
            }
        }

        warn!("Holder list for {} truncated at {} pages", contract, MAX_HOLDER_PAGES);
        Ok(holders)
    }
}

#[async_trait]
impl PriceOracle for AlchemyClient {
    async fn floor_price(&self, contract: &str) -> Result<FloorPrice, UpstreamError> {
        let url = self.endpoint("getFloorPrice")?;
        let resource = format!("floor price of {}", contract);
        let response: FloorPriceResponse = self
            .http
            .get_json(&url, &resource, &[("contractAddress", contract.to_string())], &[])
            .await?;

        Ok(FloorPrice {
            primary: MarketplaceFloor::price(response.open_sea, "OpenSea", contract),
            secondary: MarketplaceFloor::price(response.looks_rare, "LooksRare", contract),
        })
    }
}
