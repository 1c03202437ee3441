//! Bridging orchestration
//!
//! [`BridgeService`] sequences the provider legs, claim mapping and minting for
//! one request, classifies whatever goes wrong into an [`OutcomeCode`], and
//! measures how long it took. It holds no per-request state and is shared
//! across workers behind `web::Data`.

pub mod outcome;
pub mod validation;

pub use outcome::{BridgeFailure, OutcomeCode};

use crate::claims::map_claims;
use crate::minting::{BridgedCredential, CredentialMinter, SigningAuthority};
use crate::models::{BridgeRequest, ExchangeRequest};
use crate::oauth::{FixtureIdentityFetcher, IdentityFetcher, KakaoClient, TokenExchanger};
use crate::settings::BridgeSettings;
use crate::utils::logging::LoggingHelper;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of one orchestration plus its wall-clock cost
#[derive(Debug)]
pub struct Timed<T> {
    pub result: Result<T, BridgeFailure>,
    pub elapsed: Duration,
    pub finished_at: DateTime<Utc>,
}

impl<T> Timed<T> {
    fn finish(result: Result<T, BridgeFailure>, started: Instant) -> Self {
        Self {
            result,
            elapsed: started.elapsed(),
            finished_at: Utc::now(),
        }
    }

    /// Elapsed whole milliseconds, saturating
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Clone)]
pub struct BridgeService {
    provider: String,
    exchanger: Arc<dyn TokenExchanger>,
    fetcher: Arc<dyn IdentityFetcher>,
    minter: CredentialMinter,
}

impl BridgeService {
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        exchanger: Arc<dyn TokenExchanger>,
        fetcher: Arc<dyn IdentityFetcher>,
        minter: CredentialMinter,
    ) -> Self {
        Self {
            provider: provider.into(),
            exchanger,
            fetcher,
            minter,
        }
    }

    /// Wire the live provider client and the given signing authority
    ///
    /// The fixture identity path is layered in front of the live fetcher only
    /// when `provider.fixture_token_enabled` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client cannot be built
    pub fn from_settings(
        settings: &BridgeSettings,
        authority: Arc<dyn SigningAuthority>,
    ) -> Result<Self, reqwest::Error> {
        let client = Arc::new(KakaoClient::from_settings(&settings.provider)?);

        let fetcher: Arc<dyn IdentityFetcher> = if settings.provider.fixture_token_enabled {
            LoggingHelper::log_fixture_mode_enabled();
            Arc::new(FixtureIdentityFetcher::new(client.clone()))
        } else {
            client.clone()
        };

        let provider = client.provider().to_string();
        Ok(Self::new(
            provider,
            client,
            fetcher,
            CredentialMinter::new(authority),
        ))
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Turn a provider access token into a bridged credential
    ///
    /// Input problems are reported before any remote call is made.
    pub async fn bridge(&self, request: &BridgeRequest) -> Timed<BridgedCredential> {
        let started = Instant::now();
        let result = self.run_bridge(request).await;

        let timed = Timed::finish(result, started);
        match &timed.result {
            Ok(credential) => {
                LoggingHelper::log_bridge_completed(&credential.subject_id, timed.elapsed_ms());
            }
            Err(failure) => LoggingHelper::log_outcome_failure("bridge", failure, timed.elapsed_ms()),
        }
        timed
    }

    async fn run_bridge(&self, request: &BridgeRequest) -> Result<BridgedCredential, BridgeFailure> {
        let access_token = validation::access_token(request.access_token())?;

        let identity = self.fetcher.fetch_identity(access_token).await?;
        let claims = map_claims(&identity, &self.provider, Utc::now());
        Ok(self.minter.mint(claims).await?)
    }

    /// Exchange an authorization code for a provider access token
    ///
    /// Both fields are checked, code first, before the provider is contacted.
    pub async fn exchange(&self, request: &ExchangeRequest) -> Timed<String> {
        let started = Instant::now();
        let result = self.run_exchange(request).await;

        let timed = Timed::finish(result, started);
        match &timed.result {
            Ok(_) => LoggingHelper::log_exchange_completed(&self.provider, timed.elapsed_ms()),
            Err(failure) => {
                LoggingHelper::log_outcome_failure("exchange", failure, timed.elapsed_ms());
            }
        }
        timed
    }

    async fn run_exchange(&self, request: &ExchangeRequest) -> Result<String, BridgeFailure> {
        let code = validation::required_text(
            request.authorization_code.as_ref(),
            OutcomeCode::MissingAuthorizationCode,
        )?;
        let redirect_uri = validation::required_text(
            request.redirect_uri.as_ref(),
            OutcomeCode::MissingRedirectUri,
        )?;

        Ok(self.exchanger.exchange_code(&code, &redirect_uri).await?)
    }
}
