//! User scan: identity -> linked wallets -> NFTs -> floor prices

use super::{PriceService, ServiceError};
use crate::cache::{CacheKey, CacheStore, KeyError};
use crate::models::{Nft, OwnedNft, Profile, ScanResult};
use crate::upstream::{AssetLister, Identity, IdentityResolver, ListOptions, UpstreamError};
use futures::future::{join_all, try_join_all};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub type ScanCache = CacheStore<ScanResult, UpstreamError>;

#[derive(Clone)]
pub struct ScanService {
    identity: Arc<dyn IdentityResolver>,
    assets: Arc<dyn AssetLister>,
    prices: PriceService,
    cache: ScanCache,
    ttl: Duration,
    list_options: ListOptions,
}

impl ScanService {
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        assets: Arc<dyn AssetLister>,
        prices: PriceService,
        cache: ScanCache,
        ttl: Duration,
        list_options: ListOptions,
    ) -> Self {
        Self {
            identity,
            assets,
            prices,
            cache,
            ttl,
            list_options,
        }
    }

    /// Scan a user's wallets, by fid or (as fallback) by username
    pub async fn scan(&self, fid: Option<u64>, username: Option<&str>) -> Result<ScanResult, ServiceError> {
        let key = CacheKey::user_scan(fid, username)?;
        let identity = match &key {
            CacheKey::Fid(fid) => Identity::Fid(*fid),
            CacheKey::Username(name) => Identity::Username(name.clone()),
            _ => return Err(KeyError::MissingKeyInput("fid or username").into()),
        };

        let this = self.clone();
        let result = self
            .cache
            .fetch_through(&key, self.ttl, move || async move { this.run_scan(identity).await })
            .await?;
        Ok(result)
    }

    async fn run_scan(&self, identity: Identity) -> Result<ScanResult, UpstreamError> {
        info!("Scanning wallets for {}", identity);
        let profile = self.identity.resolve_identity(&identity).await?;
        let wallets = linked_wallets(&profile);

        let listings = try_join_all(
            wallets
                .iter()
                .map(|wallet| self.assets.list_assets(wallet, &self.list_options)),
        )
        .await?;

        let custody = profile.custody_address.as_deref().map(str::to_lowercase);
        let mut nfts = Vec::new();
        for (wallet, owned) in wallets.iter().zip(listings) {
            let is_custody = custody.as_deref() == Some(wallet.to_lowercase().as_str());
            nfts.extend(owned.into_iter().filter_map(|nft| displayable(nft, is_custody)));
        }

        self.attach_prices(&mut nfts).await;
        let total_value_eth = nfts.iter().map(|nft| nft.floor_price).sum();

        info!(
            "Scan for {} found {} NFTs across {} wallets",
            identity,
            nfts.len(),
            wallets.len()
        );

        Ok(ScanResult {
            user: profile.username,
            fid: profile.fid,
            display_name: profile.display_name,
            pfp: profile.pfp_url,
            wallet_count: wallets.len(),
            wallets,
            total_found: nfts.len(),
            total_value_eth,
            nfts,
        })
    }

    /// One price lookup per distinct contract, run concurrently
    async fn attach_prices(&self, nfts: &mut [Nft]) {
        let mut seen = HashSet::new();
        let contracts: Vec<String> = nfts
            .iter()
            .map(|nft| nft.contract_address.to_lowercase())
            .filter(|contract| seen.insert(contract.clone()))
            .collect();

        let prices = join_all(contracts.iter().map(|contract| self.prices.price_for(contract))).await;
        let by_contract: HashMap<String, f64> = contracts
            .into_iter()
            .zip(prices)
            .map(|(contract, price)| (contract, price.unwrap_or(0.0)))
            .collect();

        for nft in nfts.iter_mut() {
            nft.floor_price = by_contract
                .get(&nft.contract_address.to_lowercase())
                .copied()
                .unwrap_or(0.0);
        }
    }
}

/// Custody address first, then verified addresses; case-insensitive de-duplication
pub fn linked_wallets(profile: &Profile) -> Vec<String> {
    let mut seen = HashSet::new();
    profile
        .custody_address
        .iter()
        .chain(profile.verified_addresses.iter())
        .map(|address| address.trim())
        .filter(|address| !address.is_empty())
        .filter(|address| seen.insert(address.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// NFTs without an image are dropped; names fall back to the collection, then the token id
fn displayable(nft: OwnedNft, is_custody: bool) -> Option<Nft> {
    let image = nft.image?;
    let name = nft
        .name
        .or_else(|| nft.contract_name.clone())
        .unwrap_or_else(|| format!("Token #{}", nft.token_id));

    Some(Nft {
        token_id: nft.token_id,
        name,
        image,
        collection_name: nft
            .contract_name
            .unwrap_or_else(|| "Unknown Collection".to_string()),
        contract_address: nft.contract_address,
        is_custody,
        floor_price: 0.0,
    })
}
