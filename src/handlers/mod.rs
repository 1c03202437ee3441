// HTTP request handlers for the bridge service
pub mod auth;
pub mod system;

pub use auth::{bridge_token, exchange_code};
pub use system::{api_info, health, not_found};

use crate::utils::logging::LoggingHelper;
use crate::utils::responses::ResponseBuilder;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Maximum accepted request body
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Routes advertised by `/api/info` and the 404 response
pub const ENDPOINTS: [&str; 4] = [
    "POST /auth/kakao/custom-token",
    "POST /auth/kakao/exchange-code",
    "GET /health",
    "GET /api/info",
];

/// Register every route plus the JSON 404 fallback
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/kakao/custom-token", web::post().to(bridge_token))
        .route("/auth/kakao/exchange-code", web::post().to(exchange_code))
        .route("/health", web::get().to(health))
        .route("/api/info", web::get().to(api_info))
        .default_service(web::route().to(not_found));
}

/// Read at most [`MAX_BODY_BYTES`] of the request body and decode it into `T`
///
/// # Errors
///
/// Returns the generic internal-error response when the body is too large
/// or is not valid JSON
pub(crate) async fn read_json_body<T>(
    req: &HttpRequest,
    payload: web::Payload,
) -> Result<T, HttpResponse>
where
    T: DeserializeOwned + Default,
{
    let body = match payload.to_bytes_limited(MAX_BODY_BYTES).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            LoggingHelper::log_request_body_error(req.path(), &e);
            return Err(ResponseBuilder::internal_error());
        }
        Err(_) => {
            let reason = format!("body exceeds {MAX_BODY_BYTES} bytes");
            LoggingHelper::log_request_body_error(req.path(), &reason);
            return Err(ResponseBuilder::internal_error());
        }
    };
    decode_json_body(req, &body)
}

/// Decode a JSON request body into `T`
///
/// An empty body or a JSON document that is not an object yields
/// `T::default()`, so absent fields are reported by the outcome checks.
fn decode_json_body<T>(req: &HttpRequest, body: &[u8]) -> Result<T, HttpResponse>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let document: Value = serde_json::from_slice(body).map_err(|e| {
        LoggingHelper::log_request_body_error(req.path(), &e);
        ResponseBuilder::internal_error()
    })?;

    match document {
        Value::Object(_) => serde_json::from_value(document).map_err(|e| {
            LoggingHelper::log_request_body_error(req.path(), &e);
            ResponseBuilder::internal_error()
        }),
        _ => Ok(T::default()),
    }
}
