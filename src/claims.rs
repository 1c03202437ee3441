//! Provider identity → provider-agnostic claim set

use crate::oauth::IdentityRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

/// Claims embedded into every bridged credential
///
/// The key set is fixed; absent source fields stay present as `null`/`false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    pub provider: String,
    pub subject_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub subject_verified: bool,
    pub has_email: bool,
    pub issued_at: DateTime<Utc>,
}

/// Map an identity into claims
///
/// Pure: the issuance time is supplied by the caller.
#[must_use]
pub fn map_claims(identity: &IdentityRecord, provider: &str, issued_at: DateTime<Utc>) -> ClaimSet {
    ClaimSet {
        provider: provider.to_string(),
        subject_id: identity.subject_id.clone(),
        email: identity.email.clone(),
        display_name: identity.display_name.clone(),
        avatar: identity.avatar_url.clone(),
        subject_verified: identity.email_verified,
        has_email: identity.has_email,
        issued_at,
    }
}

impl ClaimSet {
    /// Claim names as they appear inside the signed token
    pub const CLAIM_NAMES: [&'static str; 8] = [
        "provider",
        "provider_subject_id",
        "email",
        "display_name",
        "avatar",
        "subject_verified",
        "has_email",
        "issued_at",
    ];

    /// Custom-claims object handed to the signing authority
    #[must_use]
    pub fn to_claims_map(&self) -> Map<String, Value> {
        let claims = json!({
            "provider": self.provider,
            "provider_subject_id": self.subject_id,
            "email": self.email,
            "display_name": self.display_name,
            "avatar": self.avatar,
            "subject_verified": self.subject_verified,
            "has_email": self.has_email,
            "issued_at": self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        match claims {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}
