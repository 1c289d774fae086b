// Success envelope shared by all handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// Uniform success body: `{"status_code": 200, "data": ..., "message": ..., "success": true}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: StatusCode, data: T, message: &str) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
            message: message.to_string(),
            success: status_code.is_success(),
        }
    }

    pub fn ok(data: T, message: &str) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: &str) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let r = ApiResponse::ok(serde_json::json!({"a": 1}), "fetched");
        assert_eq!(r.status_code, 200);
        assert!(r.success);
        assert_eq!(r.message, "fetched");
    }

    #[test]
    fn test_created_envelope() {
        let r = ApiResponse::created((), "made");
        assert_eq!(r.status_code, 201);
        assert!(r.success);
    }
}
