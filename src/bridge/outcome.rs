//! Stable outcome codes and the classified failure type

use crate::minting::MintError;
use crate::oauth::{ExchangeError, IdentityError};
use std::fmt;

/// Machine-readable outcome attached to every failure response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCode {
    MissingAccessToken,
    InvalidAccessTokenFormat,
    InvalidKakaoToken,
    KakaoApiForbidden,
    KakaoApiUnavailable,
    FirebaseTokenCreationFailed,
    MissingAuthorizationCode,
    MissingRedirectUri,
    InvalidAuthorizationCode,
    KakaoAuthFailed,
    CodeExchangeFailed,
    AuthenticationFailed,
    EndpointNotFound,
    InternalError,
}

impl OutcomeCode {
    pub const ALL: [OutcomeCode; 14] = [
        Self::MissingAccessToken,
        Self::InvalidAccessTokenFormat,
        Self::InvalidKakaoToken,
        Self::KakaoApiForbidden,
        Self::KakaoApiUnavailable,
        Self::FirebaseTokenCreationFailed,
        Self::MissingAuthorizationCode,
        Self::MissingRedirectUri,
        Self::InvalidAuthorizationCode,
        Self::KakaoAuthFailed,
        Self::CodeExchangeFailed,
        Self::AuthenticationFailed,
        Self::EndpointNotFound,
        Self::InternalError,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingAccessToken => "MISSING_ACCESS_TOKEN",
            Self::InvalidAccessTokenFormat => "INVALID_ACCESS_TOKEN_FORMAT",
            Self::InvalidKakaoToken => "INVALID_KAKAO_TOKEN",
            Self::KakaoApiForbidden => "KAKAO_API_FORBIDDEN",
            Self::KakaoApiUnavailable => "KAKAO_API_UNAVAILABLE",
            Self::FirebaseTokenCreationFailed => "FIREBASE_TOKEN_CREATION_FAILED",
            Self::MissingAuthorizationCode => "MISSING_AUTHORIZATION_CODE",
            Self::MissingRedirectUri => "MISSING_REDIRECT_URI",
            Self::InvalidAuthorizationCode => "INVALID_AUTHORIZATION_CODE",
            Self::KakaoAuthFailed => "KAKAO_AUTH_FAILED",
            Self::CodeExchangeFailed => "CODE_EXCHANGE_FAILED",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::EndpointNotFound => "ENDPOINT_NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status a caller sees for this outcome
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::MissingAccessToken
            | Self::InvalidAccessTokenFormat
            | Self::MissingAuthorizationCode
            | Self::MissingRedirectUri
            | Self::InvalidAuthorizationCode => 400,
            Self::InvalidKakaoToken | Self::KakaoAuthFailed => 401,
            Self::KakaoApiForbidden => 403,
            Self::EndpointNotFound => 404,
            Self::KakaoApiUnavailable => 503,
            Self::FirebaseTokenCreationFailed
            | Self::CodeExchangeFailed
            | Self::AuthenticationFailed
            | Self::InternalError => 500,
        }
    }

    /// Safe, caller-facing summary; upstream details are only logged
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::MissingAccessToken => "provider_access_token is required",
            Self::InvalidAccessTokenFormat => "provider_access_token must be a non-empty string",
            Self::InvalidKakaoToken => "Invalid or expired Kakao access token",
            Self::KakaoApiForbidden => "Kakao API access forbidden. Check your app configuration.",
            Self::KakaoApiUnavailable => "Unable to connect to Kakao servers",
            Self::FirebaseTokenCreationFailed => "Firebase authentication failed",
            Self::MissingAuthorizationCode => "authorization_code is required",
            Self::MissingRedirectUri => "redirect_uri is required",
            Self::InvalidAuthorizationCode => "Invalid authorization code or redirect URI",
            Self::KakaoAuthFailed => "Invalid Kakao application credentials",
            Self::CodeExchangeFailed => "Code exchange failed. Please try again.",
            Self::AuthenticationFailed => "Authentication failed. Please try again.",
            Self::EndpointNotFound => "Endpoint not found",
            Self::InternalError => "Something went wrong on our end",
        }
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure: the outcome code plus the internal detail for logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeFailure {
    pub code: OutcomeCode,
    pub detail: String,
}

impl BridgeFailure {
    #[must_use]
    pub fn new(code: OutcomeCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// A failure whose only detail is the code's own message
    #[must_use]
    pub fn from_code(code: OutcomeCode) -> Self {
        Self::new(code, code.default_message())
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        self.code.default_message()
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.code.status()
    }
}

impl fmt::Display for BridgeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.detail)
    }
}

impl std::error::Error for BridgeFailure {}

impl From<ExchangeError> for BridgeFailure {
    fn from(err: ExchangeError) -> Self {
        let code = match &err {
            ExchangeError::InvalidAuthorizationCode(_) => OutcomeCode::InvalidAuthorizationCode,
            ExchangeError::InvalidClientCredentials => OutcomeCode::KakaoAuthFailed,
            ExchangeError::Failed(_) => OutcomeCode::CodeExchangeFailed,
        };
        Self::new(code, err.to_string())
    }
}

impl From<IdentityError> for BridgeFailure {
    fn from(err: IdentityError) -> Self {
        let code = match &err {
            IdentityError::Network(_) => OutcomeCode::KakaoApiUnavailable,
            IdentityError::InvalidToken => OutcomeCode::InvalidKakaoToken,
            IdentityError::Forbidden => OutcomeCode::KakaoApiForbidden,
            IdentityError::Failed(_) => OutcomeCode::AuthenticationFailed,
        };
        Self::new(code, err.to_string())
    }
}

impl From<MintError> for BridgeFailure {
    fn from(err: MintError) -> Self {
        Self::new(OutcomeCode::FirebaseTokenCreationFailed, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique_and_screaming_snake() {
        let mut seen = std::collections::HashSet::new();
        for code in OutcomeCode::ALL {
            assert!(seen.insert(code.as_str()));
            assert!(code
                .as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
            assert!(!code.default_message().is_empty());
        }
    }

    #[test]
    fn test_identity_errors_keep_their_classification() {
        let cases = [
            (IdentityError::Network("refused".into()), OutcomeCode::KakaoApiUnavailable, 503),
            (IdentityError::InvalidToken, OutcomeCode::InvalidKakaoToken, 401),
            (IdentityError::Forbidden, OutcomeCode::KakaoApiForbidden, 403),
            (IdentityError::Failed("boom".into()), OutcomeCode::AuthenticationFailed, 500),
        ];
        for (err, code, status) in cases {
            let failure = BridgeFailure::from(err);
            assert_eq!(failure.code, code);
            assert_eq!(failure.status(), status);
        }
    }

    #[test]
    fn test_exchange_errors_keep_their_classification() {
        let cases = [
            (
                ExchangeError::InvalidAuthorizationCode("KOE320".into()),
                OutcomeCode::InvalidAuthorizationCode,
                400,
            ),
            (ExchangeError::InvalidClientCredentials, OutcomeCode::KakaoAuthFailed, 401),
            (ExchangeError::Failed("timeout".into()), OutcomeCode::CodeExchangeFailed, 500),
        ];
        for (err, code, status) in cases {
            let failure = BridgeFailure::from(err);
            assert_eq!(failure.code, code);
            assert_eq!(failure.status(), status);
        }
    }

    #[test]
    fn test_mint_error_is_opaque() {
        let failure = BridgeFailure::from(MintError("quota exceeded".into()));
        assert_eq!(failure.code, OutcomeCode::FirebaseTokenCreationFailed);
        assert_eq!(failure.message(), "Firebase authentication failed");
        assert!(failure.detail.contains("quota exceeded"));
    }
}
