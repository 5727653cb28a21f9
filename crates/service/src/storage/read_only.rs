use async_trait::async_trait;
use models::Prize;
use tracing::{debug, warn};

use super::PrizeStore;
use crate::errors::ServiceError;

/// Stand-in for platforms with a read-only filesystem and no remote store:
/// reads are empty and every write is refused.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadOnlyStore;

#[async_trait]
impl PrizeStore for ReadOnlyStore {
    async fn load_all(&self) -> Vec<Prize> {
        debug!("read-only storage: returning empty collection");
        Vec::new()
    }

    async fn save_all(&self, _prizes: &[Prize]) -> Result<(), ServiceError> {
        warn!("write refused: serverless environment without KV or Redis configured");
        Err(ServiceError::StorageUnavailable(
            "serverless environment has no writable storage; configure KV or Redis".into(),
        ))
    }

    fn backend(&self) -> &'static str {
        "read-only"
    }
}
