use async_trait::async_trait;
use models::Prize;
use redis::{aio::ConnectionManager, AsyncCommands};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use super::{decode_blob, encode_blob, PrizeStore};
use crate::errors::ServiceError;

/// Redis string key holding the prize blob.
///
/// The connection manager is opened on first use and then cloned for every
/// call.
pub struct RedisStore {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    key: String,
}

impl RedisStore {
    /// Parse the URL. No connection is attempted until the first load or save.
    pub fn new(url: &str, key: &str) -> Result<Self, ServiceError> {
        let client = redis::Client::open(url.trim())
            .map_err(|e| ServiceError::StorageUnavailable(format!("redis url: {e}")))?;
        Ok(Self { client, conn: OnceCell::new(), key: key.to_string() })
    }

    async fn conn(&self) -> Result<ConnectionManager, ServiceError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                // single attempt; a failed connect is reported, the next call tries again
                let conn = ConnectionManager::new_with_backoff(self.client.clone(), 2, 100, 0).await?;
                info!(event = "redis_connected", "redis connection established");
                Ok::<_, redis::RedisError>(conn)
            })
            .await
            .map_err(|e| ServiceError::StorageUnavailable(format!("redis connect: {e}")))?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl PrizeStore for RedisStore {
    async fn load_all(&self) -> Vec<Prize> {
        let mut conn = match self.conn().await {
            Ok(c) => c,
            Err(e) => {
                error!(backend = self.backend(), error = %e, "failed to load prizes");
                return Vec::new();
            }
        };
        match conn.get::<_, Option<String>>(&self.key).await {
            Ok(Some(raw)) => decode_blob(self.backend(), raw.as_bytes()),
            Ok(None) => {
                debug!(key = %self.key, "redis key not set");
                Vec::new()
            }
            Err(e) => {
                error!(backend = self.backend(), error = %e, "failed to load prizes");
                Vec::new()
            }
        }
    }

    async fn save_all(&self, prizes: &[Prize]) -> Result<(), ServiceError> {
        let blob = encode_blob(prizes)?;
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(&self.key, blob).await.map_err(|e| {
            error!(backend = self.backend(), error = %e, "failed to save prizes");
            ServiceError::Storage(format!("redis set: {e}"))
        })?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{prize::now_millis, PrizeInput};

    #[test]
    fn rejects_malformed_url() {
        assert!(matches!(RedisStore::new("not a url", "prizes"), Err(ServiceError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn unreachable_server_degrades_reads_and_fails_writes() {
        // port 1 on localhost: nothing listens there
        let store = RedisStore::new("redis://127.0.0.1:1/", "prizes").expect("valid url");
        assert!(store.load_all().await.is_empty());
        assert!(matches!(store.save_all(&[]).await, Err(ServiceError::StorageUnavailable(_))));
    }

    // Runs only with a live server: REDIS_URL=redis://127.0.0.1:6379 cargo test
    #[tokio::test]
    async fn redis_roundtrip_when_available() -> Result<(), anyhow::Error> {
        let Ok(url) = std::env::var("REDIS_URL") else {
            eprintln!("REDIS_URL missing; skip redis roundtrip");
            return Ok(());
        };
        let key = format!("prizes-test-{}", uuid::Uuid::new_v4());
        let store = RedisStore::new(&url, &key)?;
        assert!(store.load_all().await.is_empty());

        let prize = PrizeInput {
            name: Some("Mug".into()),
            description: Some("Ceramic mug".into()),
            image: None,
            required_stamps: Some(5),
        }
        .into_prize(now_millis())?;
        store.save_all(std::slice::from_ref(&prize)).await?;
        assert_eq!(store.load_all().await, vec![prize]);

        let mut conn = store.conn().await?;
        let _: () = conn.del(&key).await?;
        Ok(())
    }
}
