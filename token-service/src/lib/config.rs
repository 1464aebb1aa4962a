use std::env;

use auth::TokenLifetimes;
use axum_extra::extract::cookie::SameSite;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::token::errors::ConfigurationError;
use crate::domain::token::models::TokenModel;
use crate::domain::token::rotation::RotationPolicy;
use crate::domain::token::service::TokenServiceSettings;
use crate::inbound::http::cookies::CookieSettings;
use crate::inbound::http::router::HttpSettings;
use crate::outbound::identity::UserRecord;

const MIN_SIGNING_KEY_BYTES: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub tokens: TokensConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub blacklist: BlacklistConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub signing_key: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    #[serde(default)]
    pub leeway_secs: i64,
}

/// Token model, lifetimes and rotation (ACCESS_TOKEN_LIFETIME,
/// REFRESH_TOKEN_LIFETIME, ROTATE_REFRESH_TOKENS).
#[derive(Debug, Deserialize, Clone)]
pub struct TokensConfig {
    #[serde(default)]
    pub model: TokenModel,
    #[serde(default = "default_access_lifetime")]
    pub access_token_lifetime_secs: i64,
    #[serde(default = "default_refresh_lifetime")]
    pub refresh_token_lifetime_secs: i64,
    #[serde(default = "default_access_lifetime")]
    pub sliding_token_lifetime_secs: i64,
    #[serde(default = "default_refresh_lifetime")]
    pub sliding_token_refresh_lifetime_secs: i64,
    #[serde(default)]
    pub rotate_refresh_tokens: bool,
    #[serde(default)]
    pub blacklist_after_rotation: bool,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            model: TokenModel::default(),
            access_token_lifetime_secs: default_access_lifetime(),
            refresh_token_lifetime_secs: default_refresh_lifetime(),
            sliding_token_lifetime_secs: default_access_lifetime(),
            sliding_token_refresh_lifetime_secs: default_refresh_lifetime(),
            rotate_refresh_tokens: false,
            blacklist_after_rotation: false,
        }
    }
}

/// Cookie transport (AUTH_COOKIE, AUTH_COOKIE_DOMAIN, AUTH_COOKIE_PATH,
/// AUTH_COOKIE_SECURE, AUTH_COOKIE_SAMESITE). Tokens travel in response
/// bodies only while `name` is unset.
#[derive(Debug, Deserialize, Clone)]
pub struct CookieConfig {
    pub name: Option<String>,
    pub domain: Option<String>,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: SameSitePolicy,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: None,
            domain: None,
            path: default_cookie_path(),
            secure: false,
            same_site: SameSitePolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    #[default]
    Lax,
    None,
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BlacklistConfig {
    #[serde(default)]
    pub backend: RevocationBackend,
    pub database_url: Option<String>,
    /// Mount the blacklist endpoint
    #[serde(default = "default_true")]
    pub expose_endpoint: bool,
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            backend: RevocationBackend::default(),
            database_url: None,
            expose_endpoint: true,
            purge_interval_secs: default_purge_interval(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RevocationBackend {
    Disabled,
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    pub user_id: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<UserConfig> for UserRecord {
    fn from(user: UserConfig) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            password_hash: user.password_hash,
            is_active: user.is_active,
        }
    }
}

fn default_access_lifetime() -> i64 {
    300
}

fn default_refresh_lifetime() -> i64 {
    86400
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_purge_interval() -> u64 {
    3600
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SIGNING_KEY, COOKIE__NAME, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: TOKENS__ROTATE_REFRESH_TOKENS=true overrides tokens.rotate_refresh_tokens
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let key_length = self.jwt.signing_key.len();
        if key_length < MIN_SIGNING_KEY_BYTES {
            return Err(ConfigurationError::WeakSigningKey {
                min: MIN_SIGNING_KEY_BYTES,
                actual: key_length,
            });
        }

        let lifetimes = [
            ("access_token_lifetime_secs", self.tokens.access_token_lifetime_secs),
            ("refresh_token_lifetime_secs", self.tokens.refresh_token_lifetime_secs),
            ("sliding_token_lifetime_secs", self.tokens.sliding_token_lifetime_secs),
            (
                "sliding_token_refresh_lifetime_secs",
                self.tokens.sliding_token_refresh_lifetime_secs,
            ),
        ];
        if let Some((name, _)) = lifetimes.iter().find(|(_, secs)| *secs <= 0) {
            return Err(ConfigurationError::InvalidLifetime(name));
        }

        let has_store = self.blacklist.backend != RevocationBackend::Disabled;
        if !has_store && (self.blacklist.expose_endpoint || self.tokens.blacklist_after_rotation) {
            return Err(ConfigurationError::MissingRevocationStore);
        }
        if self.blacklist.backend == RevocationBackend::Postgres
            && self.blacklist.database_url.is_none()
        {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }

        if let Some(name) = &self.cookie.name {
            if name.trim().is_empty() {
                return Err(ConfigurationError::EmptyCookieName);
            }
            if self.cookie.same_site == SameSitePolicy::None && !self.cookie.secure {
                return Err(ConfigurationError::InsecureSameSiteNone);
            }
        }

        Ok(())
    }

    pub fn token_lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            access: Duration::seconds(self.tokens.access_token_lifetime_secs),
            refresh: Duration::seconds(self.tokens.refresh_token_lifetime_secs),
            sliding: Duration::seconds(self.tokens.sliding_token_lifetime_secs),
            sliding_refresh: Duration::seconds(self.tokens.sliding_token_refresh_lifetime_secs),
        }
    }

    pub fn token_service_settings(&self) -> TokenServiceSettings {
        TokenServiceSettings {
            model: self.tokens.model,
            rotation: RotationPolicy {
                rotate_refresh_tokens: self.tokens.rotate_refresh_tokens,
                blacklist_after_rotation: self.tokens.blacklist_after_rotation,
            },
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        let cookie = self.cookie.name.as_ref().map(|name| CookieSettings {
            name: name.clone(),
            domain: self.cookie.domain.clone(),
            path: self.cookie.path.clone(),
            secure: self.cookie.secure,
            same_site: self.cookie.same_site.into(),
        });

        HttpSettings {
            cookie,
            blacklist_endpoint: self.blacklist.expose_endpoint,
        }
    }

    pub fn user_records(&self) -> Vec<UserRecord> {
        self.users.iter().cloned().map(UserRecord::from).collect()
    }
}
