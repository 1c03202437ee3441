//! RS256 custom tokens signed with a Google service-account key
//!
//! Tokens follow the Firebase custom-token layout so the client SDK can
//! exchange them with `signInWithCustomToken`.

use crate::minting::{MintError, SigningAuthority};
use crate::settings::SigningSettings;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sha2::Sha256;
use std::path::Path;

/// Audience every custom token is issued for
pub const CUSTOM_TOKEN_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";

/// Custom tokens may live at most one hour
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 3600;

const MAX_UID_LENGTH: usize = 128;
const MAX_CLAIMS_BYTES: usize = 1000;

/// Claim names the identity platform reserves for itself
pub const RESERVED_CLAIMS: [&str; 16] = [
    "acr", "amr", "at_hash", "aud", "auth_time", "azp", "cnf", "c_hash", "exp", "iat", "iss",
    "jti", "nbf", "nonce", "sub", "firebase",
];

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    project_id: Option<String>,
}

pub struct ServiceAccountSigner {
    client_email: String,
    project_id: Option<String>,
    signing_key: SigningKey<Sha256>,
    token_lifetime_secs: u64,
}

impl ServiceAccountSigner {
    /// Build the signer described by the `[signing]` settings section
    ///
    /// # Errors
    ///
    /// Returns an error if no key path is configured or the key file is unusable
    pub fn from_settings(settings: &SigningSettings) -> Result<Self, MintError> {
        let path = settings.service_account_path.as_deref().ok_or_else(|| {
            MintError("signing.service_account_path is not configured".to_string())
        })?;

        let mut signer = Self::from_file(Path::new(path), settings.token_lifetime_secs)?;
        if let Some(project_id) = &settings.project_id {
            signer.project_id = Some(project_id.clone());
        }
        Ok(signer)
    }

    /// Load a service-account JSON key file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a valid key
    pub fn from_file(path: &Path, token_lifetime_secs: u64) -> Result<Self, MintError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MintError(format!(
                "Failed to read service account file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&contents, token_lifetime_secs)
    }

    /// Parse a service-account JSON key
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the private key is not PKCS#8 PEM RSA
    pub fn from_json(json: &str, token_lifetime_secs: u64) -> Result<Self, MintError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| MintError(format!("Invalid service account JSON: {e}")))?;

        let private_key = RsaPrivateKey::from_pkcs8_pem(&key.private_key)
            .map_err(|e| MintError(format!("Invalid service account private key: {e}")))?;

        Ok(Self {
            client_email: key.client_email,
            project_id: key.project_id,
            signing_key: SigningKey::<Sha256>::new(private_key),
            token_lifetime_secs: token_lifetime_secs.clamp(1, MAX_TOKEN_LIFETIME_SECS),
        })
    }

    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Sign a custom token issued at `now`
    ///
    /// # Errors
    ///
    /// Returns an error if the uid or claims are not acceptable, or signing fails
    pub fn sign_custom_token(
        &self,
        uid: &str,
        claims: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<String, MintError> {
        validate_uid(uid)?;
        validate_claims(claims)?;

        let issued_at = now.timestamp();
        let expires_at = issued_at.saturating_add_unsigned(self.token_lifetime_secs);

        let header = json!({ "alg": "RS256", "typ": "JWT" });
        let mut payload = json!({
            "iss": self.client_email,
            "sub": self.client_email,
            "aud": CUSTOM_TOKEN_AUDIENCE,
            "iat": issued_at,
            "exp": expires_at,
            "uid": uid,
        });
        if !claims.is_empty() {
            payload["claims"] = Value::Object(claims.clone());
        }

        let header_json = serde_json::to_string(&header)
            .map_err(|e| MintError(format!("Failed to serialize token header: {e}")))?;
        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| MintError(format!("Failed to serialize token payload: {e}")))?;

        let header_b64 = general_purpose::URL_SAFE_NO_PAD.encode(header_json.as_bytes());
        let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
        let message = format!("{header_b64}.{payload_b64}");

        let signature = self
            .signing_key
            .try_sign(message.as_bytes())
            .map_err(|e| MintError(format!("Failed to sign custom token: {e}")))?;
        let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature.to_vec());

        Ok(format!("{message}.{signature_b64}"))
    }
}

#[async_trait]
impl SigningAuthority for ServiceAccountSigner {
    async fn mint(&self, subject_id: &str, claims: &Map<String, Value>) -> Result<String, MintError> {
        self.sign_custom_token(subject_id, claims, Utc::now())
    }
}

fn validate_uid(uid: &str) -> Result<(), MintError> {
    if uid.is_empty() {
        return Err(MintError("uid must be a non-empty string".to_string()));
    }
    if uid.chars().count() > MAX_UID_LENGTH {
        return Err(MintError(format!(
            "uid must not be longer than {MAX_UID_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_claims(claims: &Map<String, Value>) -> Result<(), MintError> {
    if let Some(reserved) = claims
        .keys()
        .find(|name| RESERVED_CLAIMS.contains(&name.as_str()))
    {
        return Err(MintError(format!(
            "Developer claim \"{reserved}\" is reserved and cannot be specified"
        )));
    }

    let encoded = serde_json::to_string(claims)
        .map_err(|e| MintError(format!("Failed to serialize claims: {e}")))?;
    if encoded.len() > MAX_CLAIMS_BYTES {
        return Err(MintError(format!(
            "Developer claims payload must not exceed {MAX_CLAIMS_BYTES} characters"
        )));
    }
    Ok(())
}
