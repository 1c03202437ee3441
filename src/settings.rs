use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BridgeSettings {
    pub application: ApplicationSettings,
    pub provider: ProviderSettings,
    pub signing: SigningSettings,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
    /// Free-form deployment label reported by the health and info probes
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub name: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,

    // Direct values (can be overridden by environment variables)
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    // Environment variable names for overrides
    pub client_id_env: Option<String>,
    pub client_secret_env: Option<String>,

    /// Upper bound for every call to the provider, in seconds
    pub request_timeout_secs: u64,

    /// Route the reserved demo access token to a canned identity instead of the provider.
    /// Only meant for integration environments.
    pub fixture_token_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    pub project_id: Option<String>,
    pub service_account_path: Option<String>,
    pub token_lifetime_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub general_max: u32,
    pub auth_max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            cors_origins: "http://localhost:3000".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: "kakao".to_string(),
            token_endpoint: "https://kauth.kakao.com/oauth/token".to_string(),
            userinfo_endpoint: "https://kapi.kakao.com/v2/user/me".to_string(),
            client_id: None,
            client_secret: None,
            client_id_env: Some("KAKAO_REST_API_KEY".to_string()),
            client_secret_env: Some("KAKAO_CLIENT_SECRET".to_string()),
            request_timeout_secs: 10,
            fixture_token_enabled: false,
        }
    }
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            project_id: None,
            service_account_path: None,
            token_lifetime_secs: 3600,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            general_max: 100,
            auth_max: 10,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl BridgeSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    /// - A configured endpoint is not a valid URL
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_file();

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        Self::init_logger(&settings.logging)?;
        settings.validate()?;

        Ok(settings)
    }

    fn init_logger(logging: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
        env_logger::Builder::new()
            .parse_filters(&logging.level)
            .try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `BRIDGE_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            let toml_content = fs::read_to_string(&default_config_path)?;
            settings = basic_toml::from_str(&toml_content)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("BRIDGE_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                let secrets_toml_content = fs::read_to_string(&secrets_path)?;
                settings = basic_toml::from_str(&secrets_toml_content)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ BRIDGE_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_provider_env_overrides(&mut settings.provider);
        Self::apply_signing_env_overrides(&mut settings.signing);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
        if let Ok(environment) = std::env::var("APP_ENV") {
            app_settings.environment = environment;
        }
    }

    fn apply_provider_env_overrides(provider_settings: &mut ProviderSettings) {
        if let Ok(enabled) = std::env::var("ENABLE_FIXTURE_TOKEN") {
            if let Ok(enabled) = enabled.parse::<bool>() {
                provider_settings.fixture_token_enabled = enabled;
            }
        }
        if let Ok(timeout) = std::env::var("PROVIDER_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                provider_settings.request_timeout_secs = timeout;
            }
        }
    }

    fn apply_signing_env_overrides(signing_settings: &mut SigningSettings) {
        if let Ok(project_id) = std::env::var("FIREBASE_PROJECT_ID") {
            signing_settings.project_id = Some(project_id);
        }
        if let Ok(path) = std::env::var("FIREBASE_SERVICE_ACCOUNT_PATH") {
            signing_settings.service_account_path = Some(path);
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Check that the provider endpoints are usable URLs
    ///
    /// # Errors
    ///
    /// Returns an error naming the first endpoint that fails to parse
    pub fn validate(&self) -> Result<(), String> {
        for (label, endpoint) in [
            ("token_endpoint", &self.provider.token_endpoint),
            ("userinfo_endpoint", &self.provider.userinfo_endpoint),
        ] {
            url::Url::parse(endpoint)
                .map_err(|e| format!("Invalid provider {label} '{endpoint}': {e}"))?;
        }
        if self.provider.request_timeout_secs == 0 {
            return Err("provider.request_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl ProviderSettings {
    /// Get the client ID, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_id(&self) -> Option<String> {
        if let Some(env_var) = &self.client_id_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.client_id.clone()
    }

    /// Get the client secret, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_secret(&self) -> Option<String> {
        if let Some(env_var) = &self.client_secret_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.client_secret.clone()
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clean_env_vars() {
        for var in [
            "HOST",
            "PORT",
            "CORS_ORIGINS",
            "APP_ENV",
            "ENABLE_FIXTURE_TOKEN",
            "PROVIDER_TIMEOUT_SECS",
            "FIREBASE_PROJECT_ID",
            "FIREBASE_SERVICE_ACCOUNT_PATH",
            "KAKAO_REST_API_KEY",
            "KAKAO_CLIENT_SECRET",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_match_provider_contract() {
        let settings = BridgeSettings::default();
        assert_eq!(settings.provider.name, "kakao");
        assert_eq!(settings.provider.request_timeout(), Duration::from_secs(10));
        assert!(!settings.provider.fixture_token_enabled);
        assert_eq!(settings.rate_limit.window_secs, 900);
        assert_eq!(settings.rate_limit.general_max, 100);
        assert_eq!(settings.rate_limit.auth_max, 10);
        assert_eq!(settings.application.port, 3001);
        assert!(settings.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clean_env_vars();
        std::env::set_var("PORT", "8088");
        std::env::set_var("ENABLE_FIXTURE_TOKEN", "true");
        std::env::set_var("FIREBASE_PROJECT_ID", "silso-prod");

        let mut settings = BridgeSettings::default();
        BridgeSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.application.port, 8088);
        assert!(settings.provider.fixture_token_enabled);
        assert_eq!(settings.signing.project_id.as_deref(), Some("silso-prod"));

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_client_credentials_prefer_environment() {
        clean_env_vars();
        let provider = ProviderSettings {
            client_id: Some("from-file".to_string()),
            client_secret: Some("file-secret".to_string()),
            ..Default::default()
        };
        assert_eq!(provider.get_client_id().as_deref(), Some("from-file"));

        std::env::set_var("KAKAO_REST_API_KEY", "from-env");
        assert_eq!(provider.get_client_id().as_deref(), Some("from-env"));
        assert_eq!(provider.get_client_secret().as_deref(), Some("file-secret"));

        clean_env_vars();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: BridgeSettings = basic_toml::from_str(
            r#"
            [provider]
            token_endpoint = "http://127.0.0.1:9000/oauth/token"

            [rate_limit]
            auth_max = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.provider.token_endpoint, "http://127.0.0.1:9000/oauth/token");
        assert_eq!(settings.provider.userinfo_endpoint, "https://kapi.kakao.com/v2/user/me");
        assert_eq!(settings.rate_limit.auth_max, 3);
        assert_eq!(settings.rate_limit.general_max, 100);
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut settings = BridgeSettings::default();
        settings.provider.userinfo_endpoint = "not a url".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.contains("userinfo_endpoint"));
    }

    #[test]
    fn test_cors_origins_split() {
        let mut settings = BridgeSettings::default();
        settings.application.cors_origins =
            "http://localhost:3000, https://app.example.com,".to_string();
        assert_eq!(
            settings.get_cors_origins(),
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }
}
