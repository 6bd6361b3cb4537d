// Configuration for:
// - Server listening address/port
// - Upstream API endpoints and keys (Neynar, Alchemy)
// - Per-store cache TTLs and the sweep high-water mark
// - Upstream timeout, rate limit and retry policy

use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub neynar_base_url: String,
    pub neynar_api_key: Option<String>,
    pub alchemy_base_url: String,
    pub alchemy_api_key: Option<String>,
    pub scan_cache_ttl: Duration,
    pub price_cache_ttl: Duration,
    pub holders_cache_ttl: Duration,
    pub cache_high_water_mark: usize,
    pub rpc_timeout_secs: u64,
    pub rpc_rate_limit: Option<u32>,
    pub rpc_max_retries: usize,
    pub nft_page_size: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = parse_or("SERVER_PORT", 8080);
        let neynar_base_url = env::var("NEYNAR_BASE_URL")
            .unwrap_or_else(|_| "https://api.neynar.com".to_string());
        let neynar_api_key = secret("NEYNAR_API_KEY");
        let alchemy_base_url = env::var("ALCHEMY_BASE_URL")
            .unwrap_or_else(|_| "https://base-mainnet.g.alchemy.com".to_string());
        let alchemy_api_key = secret("ALCHEMY_API_KEY");
        let scan_cache_ttl = Duration::from_secs(parse_or("SCAN_CACHE_TTL_SECS", 300));
        let price_cache_ttl = Duration::from_secs(parse_or("PRICE_CACHE_TTL_SECS", 900));
        let holders_cache_ttl = Duration::from_secs(parse_or("HOLDERS_CACHE_TTL_SECS", 3600));
        let cache_high_water_mark = parse_or("CACHE_HIGH_WATER_MARK", 500);
        let rpc_timeout_secs = parse_or("RPC_TIMEOUT_SECS", 30);
        let rpc_rate_limit = env::var("RPC_RATE_LIMIT")
            .map(|v| v.parse().ok())
            .unwrap_or(None);
        let rpc_max_retries = parse_or("RPC_MAX_RETRIES", 3);
        let nft_page_size = parse_or("NFT_PAGE_SIZE", 50);

        Self {
            server_host,
            server_port,
            neynar_base_url,
            neynar_api_key,
            alchemy_base_url,
            alchemy_api_key,
            scan_cache_ttl,
            price_cache_ttl,
            holders_cache_ttl,
            cache_high_water_mark,
            rpc_timeout_secs,
            rpc_rate_limit,
            rpc_max_retries,
            nft_page_size,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            neynar_base_url: "https://api.neynar.com".to_string(),
            neynar_api_key: None,
            alchemy_base_url: "https://base-mainnet.g.alchemy.com".to_string(),
            alchemy_api_key: None,
            scan_cache_ttl: Duration::from_secs(300),
            price_cache_ttl: Duration::from_secs(900),
            holders_cache_ttl: Duration::from_secs(3600),
            cache_high_water_mark: 500,
            rpc_timeout_secs: 30,
            rpc_rate_limit: None,
            rpc_max_retries: 3,
            nft_page_size: 50,
        }
    }
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Blank secrets count as missing
fn secret(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
