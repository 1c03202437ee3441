use crate::settings::ProviderSettings;
use crate::utils::logging::LoggingHelper;

/// HTTP client for the provider's token and identity endpoints
///
/// Holds the registered application credentials; these are process-wide
/// configuration and never come from the request.
#[derive(Clone)]
pub struct KakaoClient {
    pub(crate) provider: String,
    pub(crate) http_client: reqwest::Client,
    pub(crate) token_endpoint: String,
    pub(crate) userinfo_endpoint: String,
    pub(crate) client_id: Option<String>,
    pub(crate) client_secret: Option<String>,
}

impl KakaoClient {
    /// Build a client whose every request is bounded by the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed
    /// (for example when the TLS backend fails to initialize)
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        let client_id = settings.get_client_id();
        let client_secret = settings.get_client_secret();
        LoggingHelper::log_provider_configured(
            &settings.name,
            client_id.is_some(),
            client_secret.is_some(),
        );

        Ok(Self {
            provider: settings.name.clone(),
            http_client,
            token_endpoint: settings.token_endpoint.clone(),
            userinfo_endpoint: settings.userinfo_endpoint.clone(),
            client_id,
            client_secret,
        })
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }
}
