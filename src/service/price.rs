//! Floor price resolution with marketplace precedence

use crate::cache::{CacheKey, CacheStore};
use crate::models::FloorPrice;
use crate::upstream::{PriceOracle, UpstreamError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolved prices per contract. `None` records that no marketplace reports one.
pub type PriceCache = CacheStore<Option<f64>, UpstreamError>;

/// Pick the primary marketplace price, else the secondary. Sources are never combined.
pub fn select_price(floor: &FloorPrice) -> Option<f64> {
    let usable = |price: &f64| price.is_finite() && *price >= 0.0;
    floor.primary.filter(usable).or_else(|| floor.secondary.filter(usable))
}

#[derive(Clone)]
pub struct PriceService {
    oracle: Arc<dyn PriceOracle>,
    cache: PriceCache,
    ttl: Duration,
}

impl PriceService {
    pub fn new(oracle: Arc<dyn PriceOracle>, cache: PriceCache, ttl: Duration) -> Self {
        Self { oracle, cache, ttl }
    }

    /// Floor price for `contract`, or `None` when unknown.
    ///
    /// Price is enrichment: an oracle failure is logged and reported as unknown,
    /// and is not cached, so the next call asks again.
    pub async fn price_for(&self, contract: &str) -> Option<f64> {
        let key = match CacheKey::floor_price(contract) {
            Ok(key) => key,
            Err(e) => {
                warn!("Skipping floor price lookup: {}", e);
                return None;
            }
        };

        let oracle = Arc::clone(&self.oracle);
        let contract = contract.trim().to_lowercase();
        let lookup = contract.clone();
        let outcome = self
            .cache
            .fetch_through(&key, self.ttl, move || async move {
                let floor = oracle.floor_price(&lookup).await?;
                Ok(select_price(&floor))
            })
            .await;

        match outcome {
            Ok(price) => {
                debug!("Floor price for {}: {:?}", contract, price);
                price
            }
            Err(e) => {
                warn!("Floor price lookup for {} failed, treating as unknown: {}", contract, e);
                None
            }
        }
    }
}
