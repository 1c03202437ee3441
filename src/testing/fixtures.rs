//! Test fixtures providing pre-built test objects

use crate::bridge::BridgeService;
use crate::minting::{CredentialMinter, ServiceAccountSigner, SigningAuthority};
use crate::oauth::{IdentityFetcher, IdentityRecord, TokenExchanger};
use crate::settings::{BridgeSettings, ProviderSettings};
use std::sync::Arc;

use super::constants::{
    TEST_CLIENT_ID, TEST_CLIENT_SECRET, TEST_DISPLAY_NAME, TEST_EMAIL, TEST_PROVIDER,
};

/// Service-account key checked in for tests only
pub const SERVICE_ACCOUNT_JSON: &str = include_str!("../../tests/fixtures/service_account.json");

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// A fully populated identity for `subject_id`
    #[must_use]
    pub fn identity(subject_id: &str) -> IdentityRecord {
        IdentityRecord {
            subject_id: subject_id.to_string(),
            email: Some(TEST_EMAIL.to_string()),
            display_name: Some(TEST_DISPLAY_NAME.to_string()),
            avatar_url: Some("https://k.kakaocdn.net/test/profile.jpg".to_string()),
            email_verified: true,
            has_email: true,
        }
    }

    /// An identity carrying nothing but its subject id
    #[must_use]
    pub fn sparse_identity(subject_id: &str) -> IdentityRecord {
        IdentityRecord {
            subject_id: subject_id.to_string(),
            email: None,
            display_name: None,
            avatar_url: None,
            email_verified: false,
            has_email: false,
        }
    }

    /// Settings pointing both provider endpoints at `base_url`
    ///
    /// Credentials are set directly so the environment is never consulted.
    #[must_use]
    pub fn settings_for_provider(base_url: &str) -> BridgeSettings {
        BridgeSettings {
            provider: ProviderSettings {
                token_endpoint: format!("{base_url}/oauth/token"),
                userinfo_endpoint: format!("{base_url}/v2/user/me"),
                client_id: Some(TEST_CLIENT_ID.to_string()),
                client_secret: Some(TEST_CLIENT_SECRET.to_string()),
                client_id_env: None,
                client_secret_env: None,
                request_timeout_secs: 2,
                ..ProviderSettings::default()
            },
            ..BridgeSettings::default()
        }
    }

    /// Signer backed by the checked-in service-account key
    ///
    /// # Panics
    ///
    /// Panics if the fixture key cannot be parsed
    #[must_use]
    pub fn signer() -> ServiceAccountSigner {
        match ServiceAccountSigner::from_json(SERVICE_ACCOUNT_JSON, 3600) {
            Ok(signer) => signer,
            Err(e) => panic!("fixture service account is invalid: {e}"),
        }
    }

    /// Wire a bridge service from arbitrary collaborators
    #[must_use]
    pub fn bridge_service(
        exchanger: Arc<dyn TokenExchanger>,
        fetcher: Arc<dyn IdentityFetcher>,
        authority: Arc<dyn SigningAuthority>,
    ) -> BridgeService {
        BridgeService::new(
            TEST_PROVIDER,
            exchanger,
            fetcher,
            CredentialMinter::new(authority),
        )
    }
}
