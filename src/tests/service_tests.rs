//! tests/service_tests.rs - scan, holders and price services over fake collaborators

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::cache::{KeyError, ManualClock};
    use crate::config::Config;
    use crate::models::FloorPrice;
    use crate::service::ServiceError;
    use crate::state::AppState;
    use crate::upstream::{Identity, UpstreamError};
    use futures::future::join_all;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        state: AppState,
        identity: Arc<FakeIdentity>,
        assets: Arc<FakeAssets>,
        oracle: Arc<FakeOracle>,
        clock: ManualClock,
    }

    fn default_assets() -> FakeAssets {
        let mut assets = FakeAssets::default();
        assets.wallets.insert(
            CUSTODY.to_string(),
            vec![
                nft(FIENDS, "1", Some("https://cdn/1.png")),
                nft(FIENDS, "2", None),
            ],
        );
        assets.wallets.insert(
            VERIFIED.to_string(),
            vec![
                nft(FIENDS, "3", Some("https://cdn/3.png")),
                nft(GHOULS, "4", Some("https://cdn/4.png")),
            ],
        );
        assets
            .holders
            .insert(FIENDS.to_string(), vec![CUSTODY.to_string(), VERIFIED.to_string()]);
        assets
    }

    fn default_oracle() -> FakeOracle {
        let mut oracle = FakeOracle::default();
        oracle.prices.insert(
            FIENDS.to_string(),
            FloorPrice {
                primary: Some(0.5),
                secondary: Some(0.7),
            },
        );
        oracle.prices.insert(
            GHOULS.to_string(),
            FloorPrice {
                primary: None,
                secondary: Some(0.25),
            },
        );
        oracle
    }

    fn setup_with(identity: FakeIdentity, assets: FakeAssets, oracle: FakeOracle) -> Fixture {
        let identity = Arc::new(identity);
        let assets = Arc::new(assets);
        let oracle = Arc::new(oracle);
        let clock = ManualClock::new();
        let state = AppState::new(
            Config::default(),
            identity.clone(),
            assets.clone(),
            oracle.clone(),
            Arc::new(clock.clone()),
        );
        Fixture {
            state,
            identity,
            assets,
            oracle,
            clock,
        }
    }

    fn setup() -> Fixture {
        setup_with(
            FakeIdentity::with(vec![profile(99, "fiend", CUSTODY, &[VERIFIED, CUSTODY])]),
            default_assets(),
            default_oracle(),
        )
    }

    #[tokio::test]
    async fn test_scan_aggregates_wallets_and_prices() {
        let fx = setup();
        let result = fx.state.scans.scan(Some(99), None).await.unwrap();

        assert_eq!(result.user, "fiend");
        assert_eq!(result.fid, 99);
        assert_eq!(result.wallets, vec![CUSTODY.to_string(), VERIFIED.to_string()]);
        assert_eq!(result.wallet_count, 2);
        // Token 2 has no image and is dropped
        assert_eq!(result.total_found, 3);
        assert_eq!(result.nfts.len(), 3);

        let custody: Vec<_> = result.nfts.iter().filter(|n| n.is_custody).collect();
        assert_eq!(custody.len(), 1);
        assert_eq!(custody[0].token_id, "1");

        let ghoul = result.nfts.iter().find(|n| n.token_id == "4").unwrap();
        assert_eq!(ghoul.floor_price, 0.25, "Secondary source used when primary is absent");
        assert!((result.total_value_eth - 1.25).abs() < 1e-9);

        // One oracle call per distinct contract
        assert_eq!(fx.oracle.calls(), 2);
        assert_eq!(fx.assets.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_scan_is_cached_until_ttl() {
        let fx = setup();
        fx.state.scans.scan(Some(99), None).await.unwrap();
        fx.state.scans.scan(Some(99), None).await.unwrap();
        assert_eq!(fx.identity.calls(), 1);
        assert_eq!(fx.assets.list_calls(), 2);

        fx.clock.advance(Duration::from_secs(301));
        fx.state.scans.scan(Some(99), None).await.unwrap();
        assert_eq!(fx.identity.calls(), 2);
        // Prices have a longer TTL and are still cached
        assert_eq!(fx.oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_scan_by_username_fallback() {
        let fx = setup();
        let result = fx.state.scans.scan(None, Some("Fiend")).await.unwrap();
        assert_eq!(result.fid, 99);
        assert_eq!(
            fx.identity.seen.lock().as_slice(),
            &[Identity::Username("fiend".to_string())]
        );
    }

    #[tokio::test]
    async fn test_scan_strips_handle_prefix() {
        let fx = setup();
        fx.state.scans.scan(None, Some("@Fiend")).await.unwrap();
        fx.state.scans.scan(None, Some("fiend")).await.unwrap();

        assert_eq!(
            fx.identity.seen.lock().as_slice(),
            &[Identity::Username("fiend".to_string())],
            "Both spellings share one cache entry"
        );
    }

    #[tokio::test]
    async fn test_scan_without_identifier_is_rejected() {
        let fx = setup();
        let err = fx.state.scans.scan(None, None).await.unwrap_err();
        assert_eq!(err, ServiceError::Key(KeyError::MissingKeyInput("fid or username")));
        assert_eq!(fx.identity.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user_fails_and_is_not_cached() {
        let fx = setup();
        let err = fx.state.scans.scan(Some(404), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(UpstreamError::NotFound(_))));

        fx.state.scans.scan(Some(404), None).await.unwrap_err();
        assert_eq!(fx.identity.calls(), 2, "Failed lookups must be retried, not cached");
    }

    #[tokio::test]
    async fn test_wallet_listing_failure_fails_the_scan() {
        let mut assets = default_assets();
        assets.failing.insert(VERIFIED.to_string());
        let fx = setup_with(
            FakeIdentity::with(vec![profile(99, "fiend", CUSTODY, &[VERIFIED])]),
            assets,
            default_oracle(),
        );

        let err = fx.state.scans.scan(Some(99), None).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Upstream(UpstreamError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_price_failure_degrades_to_zero() {
        let oracle = default_oracle();
        oracle.failing.lock().insert(FIENDS.to_string());
        let fx = setup_with(
            FakeIdentity::with(vec![profile(99, "fiend", CUSTODY, &[VERIFIED])]),
            default_assets(),
            oracle,
        );

        let result = fx.state.scans.scan(Some(99), None).await.unwrap();
        let fiends: Vec<_> = result.nfts.iter().filter(|n| n.contract_address == FIENDS).collect();
        assert!(fiends.iter().all(|n| n.floor_price == 0.0));
        assert!((result.total_value_eth - 0.25).abs() < 1e-9);

        // The failed price was not cached: the next lookup asks the oracle again
        fx.oracle.failing.lock().clear();
        assert_eq!(fx.state.prices.price_for(FIENDS).await, Some(0.5));
    }

    #[tokio::test]
    async fn test_unknown_price_is_cached_as_none() {
        let fx = setup();
        let unknown = "0xcccccccccccccccccccccccccccccccccccccccc";
        assert_eq!(fx.state.prices.price_for(unknown).await, None);
        assert_eq!(fx.state.prices.price_for(unknown).await, None);
        assert_eq!(fx.oracle.calls(), 1);

        fx.clock.advance(Duration::from_secs(901));
        fx.state.prices.price_for(unknown).await;
        assert_eq!(fx.oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_price_lookup_ignores_address_case() {
        let fx = setup();
        assert_eq!(fx.state.prices.price_for(&FIENDS.to_uppercase().replacen("0X", "0x", 1)).await, Some(0.5));
        assert_eq!(fx.state.prices.price_for(FIENDS).await, Some(0.5));
        assert_eq!(fx.oracle.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_scans_resolve_identity_once() {
        let mut identity = FakeIdentity::with(vec![profile(99, "fiend", CUSTODY, &[VERIFIED])]);
        identity.delay = Some(Duration::from_secs(2));
        let fx = setup_with(identity, default_assets(), default_oracle());

        let results = join_all((0..6).map(|_| fx.state.scans.scan(Some(99), None))).await;
        assert!(results.iter().all(|r| r.as_ref().map(|s| s.total_found) == Ok(3)));
        assert_eq!(fx.identity.calls(), 1);
        assert_eq!(fx.assets.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_holders_are_cached_for_an_hour() {
        let fx = setup();
        let list = fx.state.holders.holders(&FIENDS.to_uppercase().replacen("0X", "0x", 1)).await.unwrap();
        assert_eq!(list.contract_address, FIENDS);
        assert_eq!(list.holder_count, 2);

        fx.clock.advance(Duration::from_secs(59 * 60));
        fx.state.holders.holders(FIENDS).await.unwrap();
        assert_eq!(fx.assets.holder_calls(), 1);

        fx.clock.advance(Duration::from_secs(2 * 60));
        fx.state.holders.holders(FIENDS).await.unwrap();
        assert_eq!(fx.assets.holder_calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_collection_holders_fail() {
        let fx = setup();
        let err = fx.state.holders.holders(GHOULS).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(UpstreamError::NotFound(_))));
    }
}
