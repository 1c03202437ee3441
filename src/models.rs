use crate::bridge::validation::is_absent;
use crate::claims::ClaimSet;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /auth/kakao/custom-token`
///
/// The token is kept as a raw JSON value so shape errors can be told apart
/// from a missing field.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BridgeRequest {
    pub provider_access_token: Option<Value>,
    /// Legacy field name, consulted when `provider_access_token` is absent
    pub kakao_access_token: Option<Value>,
}

impl BridgeRequest {
    /// The submitted token, preferring `provider_access_token`
    #[must_use]
    pub fn access_token(&self) -> Option<&Value> {
        if is_absent(self.provider_access_token.as_ref()) {
            self.kakao_access_token
                .as_ref()
                .or(self.provider_access_token.as_ref())
        } else {
            self.provider_access_token.as_ref()
        }
    }
}

/// Body of `POST /auth/kakao/exchange-code`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExchangeRequest {
    pub authorization_code: Option<Value>,
    pub redirect_uri: Option<Value>,
}

/// Identity echo returned with a bridged credential
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentitySummary {
    pub subject_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub provider: String,
    pub subject_verified: bool,
    pub has_email: bool,
}

impl From<&ClaimSet> for IdentitySummary {
    fn from(claims: &ClaimSet) -> Self {
        Self {
            subject_id: claims.subject_id.clone(),
            email: claims.email.clone(),
            display_name: claims.display_name.clone(),
            avatar: claims.avatar.clone(),
            provider: claims.provider.clone(),
            subject_verified: claims.subject_verified,
            has_email: claims.has_email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    pub bridged_credential: String,
    pub identity: IdentitySummary,
    pub elapsed_ms: u64,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub success: bool,
    pub access_token: String,
    pub elapsed_ms: u64,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub version: String,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub service: String,
    pub version: String,
    pub endpoints: Vec<String>,
    pub environment: String,
}

/// ISO-8601 with millisecond precision and a `Z` suffix
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_bridge_request_accepts_legacy_field_name() {
        let request: BridgeRequest =
            serde_json::from_value(json!({"kakao_access_token": "abc"})).unwrap();
        assert_eq!(request.access_token(), Some(&json!("abc")));

        let request: BridgeRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.access_token().is_none());
    }

    #[test]
    fn test_bridge_request_with_both_field_names() {
        let request: BridgeRequest = serde_json::from_value(json!({
            "provider_access_token": "current",
            "kakao_access_token": "legacy"
        }))
        .unwrap();
        assert_eq!(request.access_token(), Some(&json!("current")));

        let request: BridgeRequest = serde_json::from_value(json!({
            "provider_access_token": "",
            "kakao_access_token": "legacy"
        }))
        .unwrap();
        assert_eq!(request.access_token(), Some(&json!("legacy")));
    }

    #[test]
    fn test_exchange_request_keeps_raw_values() {
        let request: ExchangeRequest =
            serde_json::from_value(json!({"authorization_code": 42, "redirect_uri": null}))
                .unwrap();
        assert_eq!(request.authorization_code, Some(json!(42)));
        // serde maps an explicit null onto None
        assert!(request.redirect_uri.is_none());
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(at), "2024-01-02T03:04:05.000Z");
    }
}
