//! Deterministic identity for integration environments
//!
//! [`FixtureIdentityFetcher`] is only wired in when
//! `provider.fixture_token_enabled` is set; a production deployment never
//! constructs it, so the sentinel token cannot reach this path there.

use crate::oauth::{IdentityError, IdentityFetcher, IdentityRecord};
use crate::utils::logging::LoggingHelper;
use async_trait::async_trait;
use std::sync::Arc;

/// Reserved access token that resolves to [`fixture_identity`]
pub const FIXTURE_ACCESS_TOKEN: &str = "demo_kakao_access_token_for_testing";

/// The canned identity returned for [`FIXTURE_ACCESS_TOKEN`]
#[must_use]
pub fn fixture_identity() -> IdentityRecord {
    IdentityRecord {
        subject_id: "99999999".to_string(),
        email: Some("demo.user@kakao.demo".to_string()),
        display_name: Some("Demo User".to_string()),
        avatar_url: Some("https://via.placeholder.com/256x256.png?text=Demo".to_string()),
        email_verified: true,
        has_email: true,
    }
}

/// Answers the sentinel token locally and delegates everything else
pub struct FixtureIdentityFetcher {
    live: Arc<dyn IdentityFetcher>,
}

impl FixtureIdentityFetcher {
    #[must_use]
    pub fn new(live: Arc<dyn IdentityFetcher>) -> Self {
        Self { live }
    }
}

#[async_trait]
impl IdentityFetcher for FixtureIdentityFetcher {
    async fn fetch_identity(&self, access_token: &str) -> Result<IdentityRecord, IdentityError> {
        if access_token == FIXTURE_ACCESS_TOKEN {
            LoggingHelper::log_fixture_identity_used();
            return Ok(fixture_identity());
        }
        self.live.fetch_identity(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher(AtomicUsize);

    #[async_trait]
    impl IdentityFetcher for CountingFetcher {
        async fn fetch_identity(&self, _: &str) -> Result<IdentityRecord, IdentityError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(IdentityError::Network("offline".to_string()))
        }
    }

    #[actix_web::test]
    async fn test_sentinel_never_reaches_live_fetcher() {
        let live = Arc::new(CountingFetcher(AtomicUsize::new(0)));
        let fetcher = FixtureIdentityFetcher::new(live.clone());

        let identity = fetcher.fetch_identity(FIXTURE_ACCESS_TOKEN).await.unwrap();
        assert_eq!(identity, fixture_identity());
        assert_eq!(identity.subject_id, "99999999");
        assert_eq!(live.0.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn test_other_tokens_are_delegated() {
        let live = Arc::new(CountingFetcher(AtomicUsize::new(0)));
        let fetcher = FixtureIdentityFetcher::new(live.clone());

        let err = fetcher.fetch_identity("real-token").await.unwrap_err();
        assert!(matches!(err, IdentityError::Network(_)));
        assert_eq!(live.0.load(Ordering::SeqCst), 1);
    }
}
