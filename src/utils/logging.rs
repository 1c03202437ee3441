// Centralized logging for bridge events
use crate::bridge::BridgeFailure;
use log::{debug, error, info, warn};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log provider client initialization status
    pub fn log_provider_configured(provider: &str, has_client_id: bool, has_client_secret: bool) {
        if has_client_id {
            info!(
                "✅ {provider} provider configured (client_secret: {})",
                if has_client_secret { "present" } else { "missing" }
            );
        } else {
            warn!("❌ {provider} client id not configured - code exchange will be rejected by the provider");
        }
    }

    /// Log that the fixture identity path is wired in
    pub fn log_fixture_mode_enabled() {
        warn!("🧪 Fixture access token enabled - do not use this configuration in production");
    }

    /// Log that the fixture identity was served
    pub fn log_fixture_identity_used() {
        info!("🧪 Fixture access token received, returning canned identity");
    }

    /// Log signing authority readiness
    pub fn log_signing_authority_ready(client_email: &str, project_id: Option<&str>) {
        info!(
            "🔑 Signing authority ready: {client_email} (project: {})",
            project_id.unwrap_or("unset")
        );
    }

    /// Log token exchange start
    pub fn log_token_exchange_start(provider: &str) {
        info!("🔄 Exchanging authorization code for tokens with {provider}");
    }

    /// Raw provider error documents stay at debug level
    pub fn log_provider_error_body(provider: &str, status: u16, body: &str) {
        debug!("Raw {provider} error response ({status}): {body}");
    }

    /// Log token exchange summary
    pub fn log_token_exchange_summary(
        provider: &str,
        access_token_present: bool,
        token_type: Option<&str>,
        expires_in: Option<u64>,
    ) {
        info!(
            "🔍 Token exchange summary for {provider}: access_token={}, token_type={token_type:?}, expires_in={expires_in:?}",
            if access_token_present { "present" } else { "missing" }
        );
    }

    /// Log identity request start
    pub fn log_identity_request(provider: &str) {
        info!("👤 Requesting user info from {provider}");
    }

    /// Log a resolved identity
    pub fn log_identity_fetched(provider: &str, subject_id: &str) {
        info!("✅ {provider} user resolved: {subject_id}");
    }

    /// Log credential minting success
    pub fn log_credential_minted(subject_id: &str) {
        info!("🎫 Custom token minted for subject {subject_id}");
    }

    /// Log bridge completion
    pub fn log_bridge_completed(subject_id: &str, elapsed_ms: u64) {
        info!("✅ Bridge completed for subject {subject_id} in {elapsed_ms}ms");
    }

    /// Log code exchange completion
    pub fn log_exchange_completed(provider: &str, elapsed_ms: u64) {
        info!("✅ {provider} code exchange completed in {elapsed_ms}ms");
    }

    /// Log a classified failure; server-side codes go to error level
    pub fn log_outcome_failure(operation: &str, failure: &BridgeFailure, elapsed_ms: u64) {
        if failure.status() >= 500 {
            error!(
                "❌ {operation} failed with {} after {elapsed_ms}ms: {}",
                failure.code, failure.detail
            );
        } else {
            warn!(
                "⚠️  {operation} rejected with {} after {elapsed_ms}ms: {}",
                failure.code, failure.detail
            );
        }
    }

    /// Log a throttled request
    pub fn log_rate_limited(client: &str, path: &str, limit: u32) {
        warn!("🚫 Rate limit of {limit} exceeded by {client} on {path}");
    }

    /// Log an unreadable request body
    pub fn log_request_body_error(path: &str, err: &dyn std::fmt::Display) {
        error!("Failed to parse request body for {path}: {err}");
    }
}
