use crate::cache::{CacheStore, Clock, SystemClock};
use crate::config::Config;
use crate::service::{HolderService, PriceService, ScanService};
use crate::upstream::{
    AlchemyClient, AssetLister, HttpClient, IdentityResolver, ListOptions, NeynarClient, PriceOracle,
    UpstreamError,
};
use std::sync::Arc;

/// Shared handler state. Each service owns its own cache store so TTL policies stay independent.
pub struct AppState {
    pub config: Config,
    pub scans: ScanService,
    pub holders: HolderService,
    pub prices: PriceService,
}

impl AppState {
    /// Wire services to the real Neynar and Alchemy clients
    pub fn from_config(config: Config) -> Result<Self, UpstreamError> {
        let http = HttpClient::new(&config)?;
        let neynar = Arc::new(NeynarClient::new(
            http.clone(),
            &config.neynar_base_url,
            config.neynar_api_key.clone(),
        ));
        let alchemy = Arc::new(AlchemyClient::new(
            http,
            &config.alchemy_base_url,
            config.alchemy_api_key.clone(),
        ));

        Ok(Self::new(config, neynar, alchemy.clone(), alchemy, Arc::new(SystemClock)))
    }

    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityResolver>,
        assets: Arc<dyn AssetLister>,
        oracle: Arc<dyn PriceOracle>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mark = config.cache_high_water_mark;

        let prices = PriceService::new(
            oracle,
            CacheStore::with_clock("price", mark, Arc::clone(&clock)),
            config.price_cache_ttl,
        );
        let holders = HolderService::new(
            Arc::clone(&assets),
            CacheStore::with_clock("holders", mark, Arc::clone(&clock)),
            config.holders_cache_ttl,
        );
        let scans = ScanService::new(
            identity,
            assets,
            prices.clone(),
            CacheStore::with_clock("scan", mark, clock),
            config.scan_cache_ttl,
            ListOptions {
                exclude_spam: true,
                page_size: config.nft_page_size,
            },
        );

        Self {
            config,
            scans,
            holders,
            prices,
        }
    }
}
