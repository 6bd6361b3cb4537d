//! Identity resolution over the Neynar Farcaster API

use super::{HttpClient, Identity, IdentityResolver, UpstreamError};
use crate::models::Profile;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct BulkUsersResponse {
    #[serde(default)]
    users: Vec<NeynarUser>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: Option<NeynarUser>,
}

#[derive(Debug, Deserialize)]
struct NeynarUser {
    fid: u64,
    username: String,
    display_name: Option<String>,
    pfp_url: Option<String>,
    custody_address: Option<String>,
    #[serde(default)]
    verified_addresses: VerifiedAddresses,
}

#[derive(Debug, Default, Deserialize)]
struct VerifiedAddresses {
    #[serde(default)]
    eth_addresses: Vec<String>,
}

impl From<NeynarUser> for Profile {
    fn from(user: NeynarUser) -> Self {
        Self {
            fid: user.fid,
            username: user.username,
            display_name: user.display_name,
            pfp_url: user.pfp_url,
            custody_address: user.custody_address,
            verified_addresses: user.verified_addresses.eth_addresses,
        }
    }
}

#[derive(Clone)]
pub struct NeynarClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl NeynarClient {
    pub fn new(http: HttpClient, base_url: &str, api_key: Option<String>) -> Self {
        info!("Initializing Neynar client with endpoint: {}", base_url);
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.api_key
            .as_deref()
            .ok_or(UpstreamError::MissingApiKey("NEYNAR_API_KEY"))
    }
}

#[async_trait]
impl IdentityResolver for NeynarClient {
    async fn resolve_identity(&self, identity: &Identity) -> Result<Profile, UpstreamError> {
        let api_key = self.api_key()?;
        let headers = [("accept", "application/json"), ("x-api-key", api_key)];

        let user = match identity {
            Identity::Fid(fid) => {
                let url = format!("{}/v2/farcaster/user/bulk", self.base_url);
                let response: BulkUsersResponse = self
                    .http
                    .get_json(&url, &identity.to_string(), &[("fids", fid.to_string())], &headers)
                    .await?;
                response.users.into_iter().next()
            }
            Identity::Username(name) => {
                let url = format!("{}/v2/farcaster/user/by_username", self.base_url);
                let response: UserResponse = self
                    .http
                    .get_json(&url, &identity.to_string(), &[("username", name.clone())], &headers)
                    .await?;
                response.user
            }
        };

        let user = user.ok_or_else(|| UpstreamError::NotFound(format!("{} on Farcaster", identity)))?;
        debug!("Resolved {} to fid {} ({})", identity, user.fid, user.username);
        Ok(user.into())
    }
}
