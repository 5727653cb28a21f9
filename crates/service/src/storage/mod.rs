//! Storage abstractions for the prize collection
//!
//! The whole collection is one JSON array (the blob) stored under a single
//! key or file path. Backends only know how to load and overwrite that blob;
//! there is no indexing and no partial write.

use std::sync::Arc;

use async_trait::async_trait;
use configs::{BackendKind, StorageConfig};
use models::Prize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::errors::ServiceError;

pub mod file_store;
pub mod kv_rest_store;
pub mod read_only;
pub mod redis_store;

pub use file_store::FileStore;
pub use kv_rest_store::KvRestStore;
pub use read_only::ReadOnlyStore;
pub use redis_store::RedisStore;

/// Load/overwrite the full prize collection against one backend.
///
/// `load_all` never fails: a missing blob is an empty collection, and read
/// errors are logged and degraded to empty. `save_all` replaces the blob and
/// reports failures; concurrent writers race and the last one wins.
#[async_trait]
pub trait PrizeStore: Send + Sync {
    async fn load_all(&self) -> Vec<Prize>;
    async fn save_all(&self, prizes: &[Prize]) -> Result<(), ServiceError>;
    fn backend(&self) -> &'static str;
}

/// Build the store selected by `cfg` (KV REST, then Redis, then local file;
/// read-only on serverless platforms with nothing remote configured).
pub async fn connect(cfg: &StorageConfig) -> Result<Arc<dyn PrizeStore>, ServiceError> {
    let store: Arc<dyn PrizeStore> = match cfg.backend_kind() {
        BackendKind::KvRest => {
            Arc::new(KvRestStore::new(&cfg.kv_rest_api_url, &cfg.kv_rest_api_token, &cfg.key)?)
        }
        BackendKind::Redis => Arc::new(RedisStore::new(&cfg.redis_url, &cfg.key)?),
        BackendKind::File => FileStore::new(&cfg.data_file).await?,
        BackendKind::ReadOnly => Arc::new(ReadOnlyStore),
    };
    info!(event = "storage_selected", backend = store.backend(), "prize storage ready");
    Ok(store)
}

/// Decode a stored blob. A blob that is not a JSON array counts as an empty
/// collection; inside an array, records that do not decode are logged and
/// skipped so the rest survive the next save.
pub(crate) fn decode_blob(backend: &'static str, raw: &[u8]) -> Vec<Prize> {
    match serde_json::from_slice::<Vec<Value>>(raw) {
        Ok(items) => decode_records(backend, items),
        Err(e) => {
            error!(backend, error = %e, "stored prize blob is not a JSON array; using empty collection");
            Vec::new()
        }
    }
}

pub(crate) fn decode_records(backend: &'static str, items: Vec<Value>) -> Vec<Prize> {
    let total = items.len();
    let prizes: Vec<Prize> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let id = item.get("id").and_then(Value::as_str).map(str::to_owned);
            match serde_json::from_value::<Prize>(item) {
                Ok(prize) => Some(prize),
                Err(e) => {
                    error!(backend, index, id = ?id, error = %e, "skipping stored prize that does not decode");
                    None
                }
            }
        })
        .collect();
    if prizes.len() < total {
        warn!(backend, kept = prizes.len(), skipped = total - prizes.len(), "stored prize blob partly unreadable");
    }
    prizes
}

pub(crate) fn encode_blob(prizes: &[Prize]) -> Result<String, ServiceError> {
    serde_json::to_string(prizes).map_err(|e| ServiceError::Storage(e.to_string()))
}
