//! Auth configuration and shared request state.

use secrecy::SecretString;
use std::sync::Arc;

use crate::api::email::EmailSender;

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_REGISTRATION_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_MEDIA_DIR: &str = "media";

/// Tunables for token lifetimes, link targets, and media storage.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_seconds: i64,
    registration_token_ttl_seconds: i64,
    media_dir: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            registration_token_ttl_seconds: DEFAULT_REGISTRATION_TOKEN_TTL_SECONDS,
            media_dir: DEFAULT_MEDIA_DIR.to_string(),
        }
    }

    #[must_use]
    pub const fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_refresh_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_registration_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.registration_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_media_dir(mut self, media_dir: String) -> Self {
        self.media_dir = media_dir;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(crate) const fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    pub(crate) const fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_seconds
    }

    pub(crate) const fn registration_token_ttl_seconds(&self) -> i64 {
        self.registration_token_ttl_seconds
    }

    pub(crate) fn media_dir(&self) -> &str {
        &self.media_dir
    }
}

/// Per-process auth state shared with handlers through an `Extension`.
pub struct AuthState {
    config: AuthConfig,
    jwt_secret: SecretString,
    emailer: Arc<dyn EmailSender>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, jwt_secret: SecretString, emailer: Arc<dyn EmailSender>) -> Self {
        Self {
            config,
            jwt_secret,
            emailer,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }

    pub(crate) fn emailer(&self) -> &dyn EmailSender {
        self.emailer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;

    #[test]
    fn test_config_defaults() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        assert_eq!(config.frontend_base_url(), "http://localhost:3000");
        assert_eq!(config.access_token_ttl_seconds(), 3600);
        assert_eq!(config.refresh_token_ttl_seconds(), 604_800);
        assert_eq!(config.registration_token_ttl_seconds(), 604_800);
        assert_eq!(config.media_dir(), "media");
    }

    #[test]
    fn test_config_overrides() {
        let config = AuthConfig::new("https://app.dungi.dev".to_string())
            .with_access_token_ttl_seconds(300)
            .with_refresh_token_ttl_seconds(86_400)
            .with_registration_token_ttl_seconds(3600)
            .with_media_dir("/var/lib/dungi/media".to_string());

        assert_eq!(config.access_token_ttl_seconds(), 300);
        assert_eq!(config.refresh_token_ttl_seconds(), 86_400);
        assert_eq!(config.registration_token_ttl_seconds(), 3600);
        assert_eq!(config.media_dir(), "/var/lib/dungi/media");
    }

    #[test]
    fn test_state_exposes_config() {
        let state = AuthState::new(
            AuthConfig::new("http://localhost:3000".to_string()),
            SecretString::from("secret"),
            Arc::new(LogEmailSender),
        );
        assert_eq!(state.config().frontend_base_url(), "http://localhost:3000");
    }
}
