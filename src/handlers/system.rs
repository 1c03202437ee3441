use crate::handlers::ENDPOINTS;
use crate::models::{format_timestamp, HealthResponse, InfoResponse};
use crate::settings::BridgeSettings;
use crate::utils::responses::ResponseBuilder;
use crate::VERSION;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

const SERVICE_NAME: &str = "Kakao Firebase Auth Bridge";

/// Liveness probe
pub async fn health(settings: web::Data<BridgeSettings>) -> HttpResponse {
    ResponseBuilder::ok().json(&HealthResponse {
        status: "OK".to_string(),
        timestamp: format_timestamp(Utc::now()),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        environment: settings.application.environment.clone(),
    })
}

/// Service description with the public endpoint list
pub async fn api_info(settings: web::Data<BridgeSettings>) -> HttpResponse {
    ResponseBuilder::ok().json(&InfoResponse {
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        endpoints: ENDPOINTS.iter().map(ToString::to_string).collect(),
        environment: settings.application.environment.clone(),
    })
}

pub async fn not_found(req: HttpRequest) -> HttpResponse {
    ResponseBuilder::not_found(req.method().as_str(), req.path(), &ENDPOINTS)
}
