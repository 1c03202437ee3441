//! HTTP response handling system
//!
//! This module provides a unified interface for creating HTTP responses across the application,
//! offering consistent patterns for outcome failures and JSON responses while keeping the
//! fixed error bodies pre-serialized.

use crate::bridge::{BridgeFailure, OutcomeCode};
use actix_web::{http::header, http::StatusCode, HttpResponse};
use serde_json::{json, Value};

// ===============================
// CACHED RESPONSES FOR PERFORMANCE
// ===============================

/// Global instance of pre-serialized common responses
static CACHED_RESPONSES: std::sync::LazyLock<CachedResponses> =
    std::sync::LazyLock::new(CachedResponses::new);

/// Container for pre-serialized HTTP response bodies that never vary
struct CachedResponses {
    internal_error: String,
    rate_limited: String,
    auth_rate_limited: String,
}

impl CachedResponses {
    fn new() -> Self {
        Self {
            internal_error: Self::create_json(&json!({
                "error": ErrorType::InternalServerError.category(),
                "message": OutcomeCode::InternalError.default_message(),
                "code": OutcomeCode::InternalError.as_str(),
            })),
            rate_limited: Self::create_json(&json!({
                "error": "Too many requests",
                "message": "Too many requests from this IP, please try again later.",
            })),
            auth_rate_limited: Self::create_json(&json!({
                "error": "Too many authentication attempts",
                "message": "Too many authentication attempts, please try again later.",
            })),
        }
    }

    fn create_json(body: &Value) -> String {
        serde_json::to_string(body).unwrap_or_default()
    }

    fn respond(status: StatusCode, body: &str) -> HttpResponse {
        HttpResponse::build(status)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(body.to_string())
    }
}

/// Unified response builder that handles all types of HTTP responses
pub struct ResponseBuilder;

impl ResponseBuilder {
    // ===============================
    // ERROR RESPONSE METHODS
    // ===============================

    /// Start an error response for a specific outcome code
    #[must_use]
    pub fn outcome(code: OutcomeCode) -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::from_status(code.status())).with_code(code)
    }

    /// Render a classified failure with its elapsed time and finish timestamp
    #[must_use]
    pub fn failure(failure: &BridgeFailure, elapsed_ms: u64, timestamp: &str) -> HttpResponse {
        Self::outcome(failure.code)
            .with_additional_fields(json!({ "elapsed_ms": elapsed_ms, "timestamp": timestamp }))
            .build()
    }

    /// 404 for a route that does not exist
    #[must_use]
    pub fn not_found(method: &str, path: &str, available_endpoints: &[&str]) -> HttpResponse {
        Self::outcome(OutcomeCode::EndpointNotFound)
            .with_message(&format!("Endpoint {method} {path} not found"))
            .with_additional_fields(json!({ "available_endpoints": available_endpoints }))
            .build()
    }

    /// Use cached internal error response
    #[must_use]
    pub fn internal_error() -> HttpResponse {
        CachedResponses::respond(
            StatusCode::INTERNAL_SERVER_ERROR,
            &CACHED_RESPONSES.internal_error,
        )
    }

    /// Use cached 429 response; `auth` selects the authentication wording
    #[must_use]
    pub fn too_many_requests(auth: bool) -> HttpResponse {
        let body = if auth {
            &CACHED_RESPONSES.auth_rate_limited
        } else {
            &CACHED_RESPONSES.rate_limited
        };
        CachedResponses::respond(StatusCode::TOO_MANY_REQUESTS, body)
    }

    // ===============================
    // SUCCESS RESPONSE METHODS
    // ===============================

    /// Create an OK response (200) with JSON content
    #[must_use]
    pub fn ok() -> JsonResponseBuilder {
        JsonResponseBuilder::new(200)
    }
}

// ===============================
// BUILDER TYPES
// ===============================

/// Builder for error responses with fluent interface
pub struct ErrorResponseBuilder {
    error_type: ErrorType,
    code: Option<OutcomeCode>,
    message: Option<String>,
    additional_fields: Option<Value>,
}

/// Builder for JSON responses
pub struct JsonResponseBuilder {
    status_code: u16,
    headers: Vec<(String, String)>,
}

/// Supported HTTP error response types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ErrorType {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
    ServiceUnavailable,
}

impl ErrorType {
    fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            503 => Self::ServiceUnavailable,
            _ => Self::InternalServerError,
        }
    }

    fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Human category placed in the `error` field
    fn category(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
            Self::ServiceUnavailable => "Service Unavailable",
        }
    }
}

// ===============================
// ERROR RESPONSE BUILDER IMPL
// ===============================

impl ErrorResponseBuilder {
    fn new(error_type: ErrorType) -> Self {
        Self {
            error_type,
            code: None,
            message: None,
            additional_fields: None,
        }
    }

    #[must_use]
    fn with_code(mut self, code: OutcomeCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set a custom error message
    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Add additional JSON fields to the response
    #[must_use]
    pub fn with_additional_fields(mut self, fields: Value) -> Self {
        self.additional_fields = Some(fields);
        self
    }

    /// Build the final `HttpResponse`
    #[must_use]
    pub fn build(self) -> HttpResponse {
        let code = self.code.unwrap_or(OutcomeCode::InternalError);
        let message = self
            .message
            .unwrap_or_else(|| code.default_message().to_string());

        let mut json_body = json!({
            "error": self.error_type.category(),
            "message": message,
            "code": code.as_str(),
        });

        if let Some(Value::Object(map)) = self.additional_fields {
            for (key, value) in map {
                json_body[key] = value;
            }
        }

        HttpResponse::build(self.error_type.status())
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .json(json_body)
    }
}

// ===============================
// JSON RESPONSE BUILDER IMPL
// ===============================

impl JsonResponseBuilder {
    fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    /// Add a custom header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Build the response with JSON content
    #[must_use]
    pub fn json<T: serde::Serialize>(self, data: &T) -> HttpResponse {
        let mut builder = HttpResponse::build(
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK),
        );

        for (name, value) in self.headers {
            builder.insert_header((name, value));
        }

        builder.json(data)
    }
}
