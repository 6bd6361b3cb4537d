use crate::{
    api::{
        error::ApiError,
        response::{with_total_count, ApiResponse},
    },
    listing::{self, BundleItem, BundleOrder, Currency},
    models::{PriceQuote, ScanResult},
    state::AppState,
    validation::{validate_evm_address, validate_fid, validate_username},
};
use axum::{
    extract::{Query, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

// GET /api/scan-fiends query parameters
#[derive(Deserialize)]
pub struct ScanQuery {
    fid: Option<String>,
    username: Option<String>,
}

// GET /api/holders and /api/floor-price query parameters
#[derive(Deserialize)]
pub struct ContractQuery {
    contract: Option<String>,
}

// POST /api/bundle body
#[derive(Deserialize)]
pub struct BundleRequest {
    seller: String,
    items: Vec<BundleItem>,
    price: String,
    #[serde(default = "default_currency")]
    currency: Currency,
}

fn default_currency() -> Currency {
    Currency::Eth
}

#[derive(Serialize)]
pub struct BundleResponse {
    order: BundleOrder,
    encoded: String,
}

// Create router with all routes
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/scan-fiends", get(scan_fiends))
        .route("/api/holders", get(get_holders))
        .route("/api/floor-price", get(get_floor_price))
        .route("/api/bundle", post(create_bundle))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn health() -> &'static str {
    "ok"
}

// GET /api/scan-fiends handler
async fn scan_fiends(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScanQuery>,
) -> Result<ApiResponse<ScanResult>, ApiError> {
    let fid = validate_fid(params.fid.as_deref())?;
    let username = validate_username(params.username.as_deref())?;

    info!("Processing scan request for fid: {:?}, username: {:?}", fid, username);
    let result = state.scans.scan(fid, username.as_deref()).await?;
    Ok(ApiResponse(result))
}

// GET /api/holders handler
async fn get_holders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContractQuery>,
) -> Result<Response, ApiError> {
    let contract = required_contract(&params)?;
    info!("Fetching holders for contract: {}", contract);

    let list = state.holders.holders(contract).await?;
    let count = list.holder_count;
    Ok(with_total_count(list, count))
}

// GET /api/floor-price handler
async fn get_floor_price(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContractQuery>,
) -> Result<ApiResponse<PriceQuote>, ApiError> {
    let contract = required_contract(&params)?;
    let price = state.prices.price_for(contract).await;

    Ok(ApiResponse(PriceQuote {
        contract_address: contract.to_lowercase(),
        floor_price: price.unwrap_or(0.0),
        available: price.is_some(),
    }))
}

// POST /api/bundle handler
async fn create_bundle(Json(request): Json<BundleRequest>) -> Result<ApiResponse<BundleResponse>, ApiError> {
    info!(
        "Building bundle order for {} with {} items at {} {:?}",
        request.seller,
        request.items.len(),
        request.price,
        request.currency
    );

    let order = listing::build_bundle_order(
        &request.seller,
        &request.items,
        &request.price,
        request.currency,
        chrono::Utc::now(),
    )?;
    let encoded = listing::encode_order(&order)?;
    Ok(ApiResponse(BundleResponse { order, encoded }))
}

fn required_contract(params: &ContractQuery) -> Result<&str, ApiError> {
    let contract = params
        .contract
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing parameter: contract".to_string()))?;
    validate_evm_address(contract)?;
    Ok(contract)
}
