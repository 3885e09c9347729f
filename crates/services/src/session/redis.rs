use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::info;

use super::{SessionData, SessionError, SessionStore};

const KEY_PREFIX: &str = "session:";

/// Session store backed by Redis; each record is a JSON string with a TTL.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub async fn connect(url: &str, ttl_secs: u64) -> Result<Self, SessionError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!("Connected session store to Redis");
        Ok(Self { conn, ttl_secs })
    }

    fn key(id: &str) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    fn encode(data: &SessionData) -> Result<String, SessionError> {
        Ok(serde_json::to_string(data)?)
    }

    fn decode(raw: Option<String>) -> Result<Option<SessionData>, SessionError> {
        Ok(raw
            .map(|json| serde_json::from_str::<SessionData>(&json))
            .transpose()?)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> Result<Option<SessionData>, SessionError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(Self::key(id)).await?;
        Self::decode(raw)
    }

    async fn save(&self, id: &str, data: &SessionData) -> Result<(), SessionError> {
        let json = Self::encode(data)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(id), json, self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(id)).await?;
        Ok(())
    }
}
