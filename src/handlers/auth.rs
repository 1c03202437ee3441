// Bridging handlers: access token → custom token, authorization code → access token
use crate::bridge::BridgeService;
use crate::handlers::read_json_body;
use crate::models::{
    format_timestamp, BridgeRequest, BridgeResponse, ExchangeRequest, ExchangeResponse,
    IdentitySummary,
};
use crate::utils::responses::ResponseBuilder;
use actix_web::{web, HttpRequest, HttpResponse};

/// `POST /auth/kakao/custom-token`
pub async fn bridge_token(
    req: HttpRequest,
    payload: web::Payload,
    service: web::Data<BridgeService>,
) -> HttpResponse {
    let request: BridgeRequest = match read_json_body(&req, payload).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let timed = service.bridge(&request).await;
    let elapsed_ms = timed.elapsed_ms();
    let timestamp = format_timestamp(timed.finished_at);

    match timed.result {
        Ok(credential) => ResponseBuilder::ok()
            .with_header("Cache-Control", "no-store")
            .json(&BridgeResponse {
                success: true,
                identity: IdentitySummary::from(&credential.claims),
                bridged_credential: credential.token,
                elapsed_ms,
                timestamp,
            }),
        Err(failure) => ResponseBuilder::failure(&failure, elapsed_ms, &timestamp),
    }
}

/// `POST /auth/kakao/exchange-code`
pub async fn exchange_code(
    req: HttpRequest,
    payload: web::Payload,
    service: web::Data<BridgeService>,
) -> HttpResponse {
    let request: ExchangeRequest = match read_json_body(&req, payload).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let timed = service.exchange(&request).await;
    let elapsed_ms = timed.elapsed_ms();
    let timestamp = format_timestamp(timed.finished_at);

    match timed.result {
        Ok(access_token) => ResponseBuilder::ok()
            .with_header("Cache-Control", "no-store")
            .json(&ExchangeResponse {
                success: true,
                access_token,
                elapsed_ms,
                timestamp,
            }),
        Err(failure) => ResponseBuilder::failure(&failure, elapsed_ms, &timestamp),
    }
}
