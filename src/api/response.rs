use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Plain JSON body, served as-is
pub struct ApiResponse<T>(pub T);

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        json_response(&self.0, HeaderMap::new())
    }
}

/// JSON body plus an `X-Total-Count` header
pub fn with_total_count<T: Serialize>(data: T, count: usize) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("X-Total-Count", HeaderValue::from(count));
    json_response(&data, headers)
}

fn json_response<T: Serialize>(data: &T, mut headers: HeaderMap) -> Response {
    let json = match serde_json::to_string(data) {
        Ok(json) => json,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    (StatusCode::OK, headers, json).into_response()
}
