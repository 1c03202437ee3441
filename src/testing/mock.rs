//! Mock collaborators for isolated orchestration tests
//!
//! Each mock returns a preconfigured result, optionally after a delay, and
//! counts how often it was invoked.

use crate::minting::{MintError, SigningAuthority};
use crate::oauth::{ExchangeError, IdentityError, IdentityFetcher, IdentityRecord, TokenExchanger};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

/// Mock authorization-code exchanger
pub struct MockTokenExchanger {
    result: Result<String, ExchangeError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockTokenExchanger {
    #[must_use]
    pub fn succeeding(access_token: &str) -> Self {
        Self {
            result: Ok(access_token.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing(error: ExchangeError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchanger for MockTokenExchanger {
    async fn exchange_code(&self, _: &str, _: &str) -> Result<String, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        self.result.clone()
    }
}

/// Mock identity fetcher
pub struct MockIdentityFetcher {
    result: Result<IdentityRecord, IdentityError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockIdentityFetcher {
    #[must_use]
    pub fn succeeding(identity: IdentityRecord) -> Self {
        Self {
            result: Ok(identity),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing(error: IdentityError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityFetcher for MockIdentityFetcher {
    async fn fetch_identity(&self, _: &str) -> Result<IdentityRecord, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        self.result.clone()
    }
}

/// Mock signing authority
///
/// Successful mints return `mock-token:<subject_id>` and remember what they
/// were asked to sign.
pub struct MockSigningAuthority {
    failure: Option<MintError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, Map<String, Value>)>>,
}

impl MockSigningAuthority {
    #[must_use]
    pub fn succeeding() -> Self {
        Self {
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(MintError(message.to_string())),
            ..Self::succeeding()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Subject id of the most recent mint request
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn last_subject(&self) -> Option<String> {
        self.last_request
            .lock()
            .unwrap()
            .as_ref()
            .map(|(subject, _)| subject.clone())
    }

    /// Claims of the most recent mint request
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn last_claims(&self) -> Option<Map<String, Value>> {
        self.last_request
            .lock()
            .unwrap()
            .as_ref()
            .map(|(_, claims)| claims.clone())
    }
}

#[async_trait]
impl SigningAuthority for MockSigningAuthority {
    async fn mint(&self, subject_id: &str, claims: &Map<String, Value>) -> Result<String, MintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some((subject_id.to_string(), claims.clone()));
        }
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(format!("mock-token:{subject_id}")),
        }
    }
}
