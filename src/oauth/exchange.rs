//! Authorization code → provider access token

use crate::oauth::{KakaoClient, ProviderErrorBody};
use crate::utils::logging::LoggingHelper;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failures of the code-for-token leg, classified where they happen
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// Code reused, expired, or redirect URI mismatch (provider answered 400)
    #[error("Invalid authorization code: {0}")]
    InvalidAuthorizationCode(String),

    /// Provider rejected our application credentials (provider answered 401)
    #[error("Invalid Kakao application credentials")]
    InvalidClientCredentials,

    /// Anything else, timeouts included
    #[error("Kakao token exchange failed: {0}")]
    Failed(String),
}

/// Exchanges a single-use authorization code for an access token
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Perform exactly one call to the provider's token endpoint
    ///
    /// # Errors
    ///
    /// Returns an [`ExchangeError`] classifying why no access token was obtained
    async fn exchange_code(
        &self,
        authorization_code: &str,
        redirect_uri: &str,
    ) -> Result<String, ExchangeError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
}

#[async_trait]
impl TokenExchanger for KakaoClient {
    async fn exchange_code(
        &self,
        authorization_code: &str,
        redirect_uri: &str,
    ) -> Result<String, ExchangeError> {
        LoggingHelper::log_token_exchange_start(&self.provider);

        let mut params: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", authorization_code),
            ("redirect_uri", redirect_uri),
        ];
        if let Some(client_id) = self.client_id.as_deref() {
            params.push(("client_id", client_id));
        }
        if let Some(client_secret) = self.client_secret.as_deref() {
            params.push(("client_secret", client_secret));
        }

        let response = self
            .http_client
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| ExchangeError::Failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            LoggingHelper::log_provider_error_body(&self.provider, status.as_u16(), &body);
            let details = ProviderErrorBody::parse(&body);

            return Err(match status {
                StatusCode::BAD_REQUEST => ExchangeError::InvalidAuthorizationCode(
                    details
                        .describe()
                        .unwrap_or_else(|| "rejected by provider".to_string()),
                ),
                StatusCode::UNAUTHORIZED => ExchangeError::InvalidClientCredentials,
                other => ExchangeError::Failed(format!(
                    "Request failed with status code {}",
                    other.as_u16()
                )),
            });
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| ExchangeError::Failed(format!("Failed to parse token response: {e}")))?;

        LoggingHelper::log_token_exchange_summary(
            &self.provider,
            token_response.access_token.is_some(),
            token_response.token_type.as_deref(),
            token_response.expires_in,
        );

        token_response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ExchangeError::Failed("No access token in Kakao response".to_string()))
    }
}
