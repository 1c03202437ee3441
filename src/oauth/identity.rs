//! Access token → verified identity record

use crate::oauth::{KakaoClient, ProviderErrorBody};
use crate::utils::logging::LoggingHelper;
use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Identity resolved from the provider for one request
///
/// Every field is present; optional profile data is `None` and the flags
/// default to `false` when the provider omits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Provider-scoped subject id in canonical string form
    pub subject_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub email_verified: bool,
    pub has_email: bool,
}

/// Failures of the token-for-identity leg
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// DNS resolution or TCP connect to the provider failed
    #[error("Network error connecting to Kakao: {0}")]
    Network(String),

    #[error("Invalid or expired Kakao access token")]
    InvalidToken,

    /// Covers both app misconfiguration and restricted individual tokens
    #[error("Kakao API access forbidden")]
    Forbidden,

    #[error("Failed to get user info from Kakao: {0}")]
    Failed(String),
}

/// Resolves an access token into an [`IdentityRecord`]
#[async_trait]
pub trait IdentityFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`IdentityError`] classifying why no identity was obtained
    async fn fetch_identity(&self, access_token: &str) -> Result<IdentityRecord, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct KakaoUserDocument {
    id: Option<Value>,
    #[serde(default)]
    kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KakaoAccount {
    email: Option<String>,
    has_email: Option<bool>,
    is_email_verified: Option<bool>,
    profile: Option<KakaoProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KakaoProfile {
    nickname: Option<String>,
    profile_image_url: Option<String>,
}

impl IdentityRecord {
    /// Normalize a `/v2/user/me` document
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Failed`] when the document is not an identity
    /// document or carries no usable subject id
    pub fn from_kakao_document(document: Value) -> Result<Self, IdentityError> {
        let document: KakaoUserDocument = serde_json::from_value(document)
            .map_err(|e| IdentityError::Failed(format!("Malformed identity document: {e}")))?;

        let subject_id = match document.id {
            Some(Value::Number(id)) => id.to_string(),
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            _ => {
                return Err(IdentityError::Failed(
                    "Identity document has no subject id".to_string(),
                ))
            }
        };

        let account = document.kakao_account.unwrap_or_default();
        let profile = account.profile.unwrap_or_default();

        Ok(Self {
            subject_id,
            email: account.email,
            display_name: profile.nickname,
            avatar_url: profile.profile_image_url,
            email_verified: account.is_email_verified.unwrap_or(false),
            has_email: account.has_email.unwrap_or(false),
        })
    }
}

fn classify_transport_error(error: &reqwest::Error) -> IdentityError {
    // A connect timeout is still a timeout: only refused/unresolvable hosts count as network errors
    if error.is_connect() && !error.is_timeout() {
        IdentityError::Network(error.to_string())
    } else {
        IdentityError::Failed(error.to_string())
    }
}

#[async_trait]
impl IdentityFetcher for KakaoClient {
    async fn fetch_identity(&self, access_token: &str) -> Result<IdentityRecord, IdentityError> {
        LoggingHelper::log_identity_request(&self.provider);

        let response = self
            .http_client
            .get(&self.userinfo_endpoint)
            .bearer_auth(access_token)
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded;charset=utf-8",
            )
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            LoggingHelper::log_provider_error_body(&self.provider, status.as_u16(), &body);

            return Err(match status {
                StatusCode::UNAUTHORIZED => IdentityError::InvalidToken,
                StatusCode::FORBIDDEN => IdentityError::Forbidden,
                other => {
                    let mut message = format!("Request failed with status code {}", other.as_u16());
                    if let Some(detail) = ProviderErrorBody::parse(&body).describe() {
                        message.push_str(": ");
                        message.push_str(&detail);
                    }
                    IdentityError::Failed(message)
                }
            });
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| IdentityError::Failed(format!("Failed to parse identity response: {e}")))?;

        let identity = IdentityRecord::from_kakao_document(document)?;
        LoggingHelper::log_identity_fetched(&self.provider, &identity.subject_id);
        Ok(identity)
    }
}
