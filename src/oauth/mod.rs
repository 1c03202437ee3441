//! Provider (Kakao) OAuth relying-party legs
//!
//! This module covers the two calls the bridge makes against the provider:
//! exchanging an authorization code for an access token, and resolving an
//! access token into a verified identity. Consent/redirect handling is left to
//! the caller.

pub mod client;
pub mod exchange;
pub mod fixture;
pub mod identity;

pub use client::KakaoClient;
pub use exchange::{ExchangeError, TokenExchanger};
pub use fixture::{fixture_identity, FixtureIdentityFetcher, FIXTURE_ACCESS_TOKEN};
pub use identity::{IdentityError, IdentityFetcher, IdentityRecord};

use serde::Deserialize;

/// Error document returned by the provider on non-2xx responses.
///
/// The authorization server (`kauth`) answers with `error`/`error_description`,
/// the API server (`kapi`) with `msg`/`code`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ProviderErrorBody {
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub msg: Option<String>,
}

impl ProviderErrorBody {
    /// Best human-readable description the provider gave us, if any
    pub fn describe(&self) -> Option<String> {
        self.error_description
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error.clone())
    }

    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}
