use super::ServiceError;
use crate::cache::{CacheKey, CacheStore};
use crate::models::HolderList;
use crate::upstream::{AssetLister, UpstreamError};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub type HolderCache = CacheStore<HolderList, UpstreamError>;

/// Holder lists per collection contract
#[derive(Clone)]
pub struct HolderService {
    assets: Arc<dyn AssetLister>,
    cache: HolderCache,
    ttl: Duration,
}

impl HolderService {
    pub fn new(assets: Arc<dyn AssetLister>, cache: HolderCache, ttl: Duration) -> Self {
        Self { assets, cache, ttl }
    }

    pub async fn holders(&self, contract: &str) -> Result<HolderList, ServiceError> {
        let key = CacheKey::holders(contract)?;
        let contract = contract.trim().to_lowercase();
        let assets = Arc::clone(&self.assets);

        let list = self
            .cache
            .fetch_through(&key, self.ttl, move || async move {
                let holders = assets.list_holders(&contract).await?;
                info!("Collection {} has {} holders", contract, holders.len());
                Ok(HolderList {
                    holder_count: holders.len(),
                    contract_address: contract,
                    holders,
                })
            })
            .await?;
        Ok(list)
    }
}
