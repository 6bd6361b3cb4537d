//! Shared fakes for the upstream collaborators

mod service_tests;

use crate::models::{FloorPrice, OwnedNft, Profile};
use crate::upstream::{AssetLister, Identity, IdentityResolver, ListOptions, PriceOracle, UpstreamError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const CUSTODY: &str = "0x1111111111111111111111111111111111111111";
pub const VERIFIED: &str = "0x2222222222222222222222222222222222222222";
pub const FIENDS: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const GHOULS: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

pub fn profile(fid: u64, username: &str, custody: &str, verified: &[&str]) -> Profile {
    Profile {
        fid,
        username: username.to_string(),
        display_name: Some(username.to_uppercase()),
        pfp_url: Some(format!("https://example.com/{}.png", username)),
        custody_address: Some(custody.to_string()),
        verified_addresses: verified.iter().map(|a| a.to_string()).collect(),
    }
}

pub fn nft(contract: &str, token_id: &str, image: Option<&str>) -> OwnedNft {
    OwnedNft {
        token_id: token_id.to_string(),
        name: Some(format!("Token {}", token_id)),
        image: image.map(str::to_string),
        contract_address: contract.to_string(),
        contract_name: Some("Collection".to_string()),
    }
}

#[derive(Default)]
pub struct FakeIdentity {
    pub profiles: Mutex<Vec<Profile>>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Identity>>,
    pub delay: Option<Duration>,
}

impl FakeIdentity {
    pub fn with(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for FakeIdentity {
    async fn resolve_identity(&self, identity: &Identity) -> Result<Profile, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(identity.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let profiles = self.profiles.lock();
        profiles
            .iter()
            .find(|p| match identity {
                Identity::Fid(fid) => p.fid == *fid,
                Identity::Username(name) => p.username == *name,
            })
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(format!("{} on Farcaster", identity)))
    }
}

#[derive(Default)]
pub struct FakeAssets {
    pub wallets: HashMap<String, Vec<OwnedNft>>,
    pub failing: HashSet<String>,
    pub holders: HashMap<String, Vec<String>>,
    pub list_calls: AtomicUsize,
    pub holder_calls: AtomicUsize,
}

impl FakeAssets {
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn holder_calls(&self) -> usize {
        self.holder_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetLister for FakeAssets {
    async fn list_assets(&self, owner: &str, options: &ListOptions) -> Result<Vec<OwnedNft>, UpstreamError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        assert!(options.exclude_spam, "scans must exclude spam");
        if self.failing.contains(owner) {
            return Err(UpstreamError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(self.wallets.get(owner).cloned().unwrap_or_default())
    }

    async fn list_holders(&self, contract: &str) -> Result<Vec<String>, UpstreamError> {
        self.holder_calls.fetch_add(1, Ordering::SeqCst);
        self.holders
            .get(contract)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(contract.to_string()))
    }
}

#[derive(Default)]
pub struct FakeOracle {
    pub prices: HashMap<String, FloorPrice>,
    pub failing: Mutex<HashSet<String>>,
    pub calls: AtomicUsize,
}

impl FakeOracle {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceOracle for FakeOracle {
    async fn floor_price(&self, contract: &str) -> Result<FloorPrice, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().contains(contract) {
            return Err(UpstreamError::Timeout);
        }
        Ok(self.prices.get(contract).copied().unwrap_or_default())
    }
}
