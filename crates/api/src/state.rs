use std::sync::Arc;
use std::time::Duration;

use drivetree_config::{SessionBackend, Settings};
use drivetree_services::{
    CredentialGate, GoogleDriveService, Materializer, OAuthService,
    session::{CookieSigner, MemorySessionStore, RedisSessionStore, SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub sessions: Arc<dyn SessionStore>,
    pub cookies: CookieSigner,
    pub gate: CredentialGate,
    pub materializer: Materializer,
}

impl AppState {
    /// Builds state with the session backend named in the settings.
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let ttl = settings.session.ttl_secs;
        let sessions: Arc<dyn SessionStore> = match settings.session.store {
            SessionBackend::Memory => Arc::new(MemorySessionStore::new(Duration::from_secs(ttl))),
            SessionBackend::Redis => {
                Arc::new(RedisSessionStore::connect(&settings.redis.url, ttl).await?)
            }
        };
        Self::with_sessions(settings, sessions)
    }

    pub fn with_sessions(
        settings: Settings,
        sessions: Arc<dyn SessionStore>,
    ) -> anyhow::Result<Self> {
        let http_timeout = Duration::from_secs(settings.drive.http_timeout_secs);

        let oauth = Arc::new(OAuthService::new(settings.oauth.clone(), http_timeout)?);
        let drive = Arc::new(GoogleDriveService::new(
            settings.drive.api_base.clone(),
            http_timeout,
        )?);

        let cookies = CookieSigner::new(&settings.session.secret)?;
        let gate = CredentialGate::new(oauth);
        let materializer = Materializer::new(
            drive,
            settings.drive.max_depth,
            settings.drive.folder_link_base.clone(),
        );

        Ok(Self {
            settings,
            sessions,
            cookies,
            gate,
            materializer,
        })
    }
}
