use super::UpstreamError;
use crate::config::Config;
use backon::{ExponentialBuilder, Retryable};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// JSON-over-HTTP client shared by the upstream integrations.
///
/// Every request waits on the rate limiter (if one is configured), runs under
/// the configured timeout, and is retried with exponential backoff when the
/// failure looks transient.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    max_retries: usize,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let timeout = Duration::from_secs(config.rpc_timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let limiter = config
            .rpc_rate_limit
            .and_then(NonZeroU32::new)
            .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate))));

        info!(
            "Initializing HTTP client with timeout: {:?}, rate limit: {:?}/s, max retries: {}",
            timeout, config.rpc_rate_limit, config.rpc_max_retries
        );

        Ok(Self {
            client,
            limiter,
            max_retries: config.rpc_max_retries,
        })
    }

    /// GET `url` and decode the JSON body.
    ///
    /// `resource` names what is being fetched. It is the only description of the
    /// request that reaches logs and errors, since `url` may carry an API key.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_times(self.max_retries);

        (|| self.send_once(url, resource, query, headers))
            .retry(backoff)
            .when(UpstreamError::is_retryable)
            .notify(|err: &UpstreamError, dur: Duration| {
                warn!("Request for {} failed ({}), retrying in {:?}", resource, err, dur);
            })
            .await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        debug!("GET {}", resource);
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(e.without_url().to_string()))
    }
}
