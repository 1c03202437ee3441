//! Credential minting against the internal signing authority

pub mod service_account;

pub use service_account::ServiceAccountSigner;

use crate::claims::ClaimSet;
use crate::utils::logging::LoggingHelper;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Opaque minting failure; the authority's own error taxonomy is not interpreted
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to create custom token: {0}")]
pub struct MintError(pub String);

/// Anything able to issue a signed token bound to a subject id
#[async_trait]
pub trait SigningAuthority: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`MintError`] if the authority is unreachable, misconfigured,
    /// or rejects the claims
    async fn mint(&self, subject_id: &str, claims: &Map<String, Value>) -> Result<String, MintError>;
}

/// A signed token together with what was bound into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgedCredential {
    pub token: String,
    pub subject_id: String,
    pub claims: ClaimSet,
}

/// Binds claim sets to subject ids through a [`SigningAuthority`]
#[derive(Clone)]
pub struct CredentialMinter {
    authority: Arc<dyn SigningAuthority>,
}

impl CredentialMinter {
    #[must_use]
    pub fn new(authority: Arc<dyn SigningAuthority>) -> Self {
        Self { authority }
    }

    /// Mint a credential for `claims`, bound to the claims' own subject id
    ///
    /// # Errors
    ///
    /// Returns a [`MintError`] if the signing authority fails
    pub async fn mint(&self, claims: ClaimSet) -> Result<BridgedCredential, MintError> {
        let subject_id = claims.subject_id.clone();
        let token = self
            .authority
            .mint(&subject_id, &claims.to_claims_map())
            .await?;

        LoggingHelper::log_credential_minted(&subject_id);
        Ok(BridgedCredential {
            token,
            subject_id,
            claims,
        })
    }
}
