use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::Prize;
use tokio::fs;
use tracing::{debug, error};

use super::{decode_blob, PrizeStore};
use crate::errors::ServiceError;

/// JSON file holding the prize array, pretty-printed.
///
/// The file is re-read on every load so that external edits and other
/// processes sharing the path are seen.
#[derive(Clone, Debug)]
pub struct FileStore {
    file_path: PathBuf,
}

impl FileStore {
    /// Prepare the store at `path`, creating its directory if missing. The file itself
    /// is only written on the first save.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = Self { file_path: path.into() };
        store.ensure_dir().await?;
        Ok(Arc::new(store))
    }

    async fn ensure_dir(&self) -> Result<(), ServiceError> {
        match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Storage(format!("create {}: {e}", parent.display()))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PrizeStore for FileStore {
    async fn load_all(&self) -> Vec<Prize> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => decode_blob(self.backend(), &bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "no prize file yet");
                Vec::new()
            }
            Err(e) => {
                error!(path = %self.file_path.display(), error = %e, "failed to read prize file");
                Vec::new()
            }
        }
    }

    async fn save_all(&self, prizes: &[Prize]) -> Result<(), ServiceError> {
        self.ensure_dir().await?;
        let data = serde_json::to_vec_pretty(prizes).map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.file_path, data).await.map_err(|e| {
            error!(path = %self.file_path.display(), error = %e, "failed to write prize file");
            ServiceError::Storage(format!("write {}: {e}", self.file_path.display()))
        })?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
