use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub oauth: OAuthSettings,
    pub session: SessionSettings,
    pub redis: RedisSettings,
    pub drive: DriveSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub cookie_name: String,
    pub ttl_secs: u64,
    pub store: SessionBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DriveSettings {
    pub api_base: String,
    pub folder_link_base: String,
    pub max_depth: usize,
    pub request_timeout_secs: u64,
    pub http_timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("DRIVETREE"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 5000)?
            .set_default("app.static_dir", None::<String>)?
            .set_default("oauth.client_id", "")?
            .set_default("oauth.client_secret", "")?
            .set_default("oauth.redirect_uri", "")?
            .set_default("oauth.auth_url", "https://accounts.google.com/o/oauth2/auth")?
            .set_default("oauth.token_url", "https://oauth2.googleapis.com/token")?
            .set_default("oauth.scope", "https://www.googleapis.com/auth/drive.readonly")?
            .set_default("session.secret", "")?
            .set_default("session.cookie_name", "drivetree_session")?
            .set_default("session.ttl_secs", 86400)?
            .set_default("session.store", "memory")?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("drive.api_base", "https://www.googleapis.com/drive/v3")?
            .set_default("drive.folder_link_base", "https://drive.google.com/drive/folders")?
            .set_default("drive.max_depth", 32)?
            .set_default("drive.request_timeout_secs", 60)?
            .set_default("drive.http_timeout_secs", 30)?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects configurations the server cannot run with: the OAuth client
    /// triple and the session signing secret must all be present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("oauth.client_id", &self.oauth.client_id),
            ("oauth.client_secret", &self.oauth.client_secret),
            ("oauth.redirect_uri", &self.oauth.redirect_uri),
            ("session.secret", &self.session.secret),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Message(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.drive.max_depth == 0 {
            return Err(ConfigError::Message(
                "drive.max_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
