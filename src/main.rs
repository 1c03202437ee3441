#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{
    middleware::{from_fn, DefaultHeaders, Logger},
    web, App, HttpServer,
};
use anyhow::{anyhow, Context};
use kakao_bridge::{
    configure_services, throttle_requests, utils::logging::LoggingHelper, BridgeService,
    BridgeSettings, RequestThrottle, ServiceAccountSigner,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Loads .env, Settings.toml and environment overrides, then initializes the logger
    let settings = BridgeSettings::load().map_err(|e| anyhow!("Failed to load settings: {e}"))?;

    // Refuse to start without a usable signing authority
    let signer = ServiceAccountSigner::from_settings(&settings.signing)
        .context("Failed to initialize signing authority")?;
    LoggingHelper::log_signing_authority_ready(signer.client_email(), signer.project_id());

    let service = BridgeService::from_settings(&settings, Arc::new(signer))
        .context("Failed to initialize provider client")?;

    start_server(service, settings).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(service: BridgeService, settings: BridgeSettings) -> anyhow::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &service, &settings);

    let service = web::Data::new(service);
    let throttle = web::Data::new(RequestThrottle::from_settings(&settings.rate_limit));
    let cors_origins = settings.get_cors_origins();
    let settings = web::Data::new(settings);

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Authorization"])
            .supports_credentials()
            .max_age(3600);

        let security_headers = DefaultHeaders::new()
            .add(("X-Content-Type-Options", "nosniff"))
            .add(("X-Frame-Options", "DENY"))
            .add(("Referrer-Policy", "no-referrer"))
            .add(("Cross-Origin-Resource-Policy", "cross-origin"));

        App::new()
            .app_data(service.clone())
            .app_data(throttle.clone())
            .app_data(settings.clone())
            .wrap(from_fn(throttle_requests))
            .wrap(security_headers)
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .run()
    .await
    .context("Server terminated unexpectedly")
}

fn print_startup_info(bind_address: &str, service: &BridgeService, settings: &BridgeSettings) {
    println!("🚀 Starting Kakao bridge on http://{bind_address}");
    println!("Environment: {}", settings.application.environment);
    println!("Provider:    {}", service.provider());
    println!();
    println!("Bridge endpoints:");
    println!("  POST /auth/kakao/custom-token  - Provider access token → custom token");
    println!("  POST /auth/kakao/exchange-code - Authorization code → provider access token");
    println!();
    println!("System endpoints:");
    println!("  GET  /health                   - Health check");
    println!("  GET  /api/info                 - Service information");
    if settings.provider.fixture_token_enabled {
        println!();
        println!("⚠️  Fixture access token is enabled");
    }
}
