use std::sync::Arc;

use models::{
    prize::{next_after, now_millis},
    Prize, PrizeInput, PrizeUpdate, StatusFilter,
};
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::storage::PrizeStore;

/// CRUD over the prize collection.
///
/// Every mutation loads the whole collection, changes it in memory and writes
/// it back. Nothing serializes concurrent mutations, so two overlapping
/// writers can lose one another's change.
#[derive(Clone)]
pub struct PrizeService {
    store: Arc<dyn PrizeStore>,
}

impl PrizeService {
    pub fn new(store: Arc<dyn PrizeStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// The stored collection, unfiltered and in stored order.
    pub async fn get_all(&self) -> Vec<Prize> {
        self.store.load_all().await
    }

    pub async fn list(&self, filter: StatusFilter) -> Vec<Prize> {
        let mut all = self.get_all().await;
        all.retain(|p| filter.matches(p));
        all
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Prize> {
        self.get_all().await.into_iter().find(|p| p.id == id)
    }

    /// Validate, assign id/defaults/timestamps, append and save.
    pub async fn create(&self, input: PrizeInput) -> Result<Prize, ServiceError> {
        let prize = input.into_prize(now_millis())?;
        let mut prizes = self.store.load_all().await;
        prizes.push(prize.clone());
        self.store.save_all(&prizes).await?;
        info!(event = "prize_created", id = %prize.id, required_stamps = prize.required_stamps, "prize created");
        Ok(prize)
    }

    /// Merge the given fields over the stored record and refresh `updated_at`.
    ///
    /// Values are not re-validated here: only creation enforces the stamp range.
    pub async fn update(&self, id: &str, patch: PrizeUpdate) -> Result<Prize, ServiceError> {
        let mut prizes = self.store.load_all().await;
        let existing = prizes
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ServiceError::not_found("prize"))?;
        if patch.is_empty() {
            debug!(event = "prize_touched", %id, "update names no fields; refreshing updatedAt only");
        }
        patch.apply_to(existing);
        existing.updated_at = next_after(existing.updated_at);
        let updated = existing.clone();
        self.store.save_all(&prizes).await?;
        info!(event = "prize_updated", id = %updated.id, is_redeemed = updated.is_redeemed, "prize updated");
        Ok(updated)
    }

    /// Remove the record if present; the collection is only rewritten when something was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let mut prizes = self.store.load_all().await;
        let before = prizes.len();
        prizes.retain(|p| p.id != id);
        if prizes.len() == before {
            return Ok(false);
        }
        self.store.save_all(&prizes).await?;
        info!(event = "prize_deleted", %id, "prize deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, ReadOnlyStore};
    use models::{errors::ModelError, PLACEHOLDER_IMAGE};
    use uuid::Uuid;

    async fn setup() -> PrizeService {
        let tmp = std::env::temp_dir().join(format!("prize_service_{}.json", Uuid::new_v4()));
        let store = FileStore::new(&tmp).await.expect("store init");
        PrizeService::new(store)
    }

    fn mug() -> PrizeInput {
        PrizeInput {
            name: Some("Mug".into()),
            description: Some("Ceramic mug".into()),
            image: None,
            required_stamps: Some(5),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_record() -> Result<(), anyhow::Error> {
        let svc = setup().await;
        let created = svc.create(mug()).await?;
        assert_eq!(created.image, PLACEHOLDER_IMAGE);
        assert!(!created.is_redeemed);
        assert_eq!(created.created_at, created.updated_at);

        let found = svc.get_by_id(&created.id).await.expect("found");
        assert_eq!(found, created);
        assert_eq!(svc.get_all().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_and_missing() {
        let svc = setup().await;
        for stamps in [0, 101, -3] {
            let mut input = mug();
            input.required_stamps = Some(stamps);
            assert!(matches!(
                svc.create(input).await,
                Err(ServiceError::Validation(ModelError::StampsOutOfRange { .. }))
            ));
        }
        let mut input = mug();
        input.name = None;
        assert!(matches!(svc.create(input).await, Err(ServiceError::Validation(ModelError::MissingFields))));
        // nothing was written
        assert!(svc.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn ids_are_unique() -> Result<(), anyhow::Error> {
        let svc = setup().await;
        let a = svc.create(mug()).await?;
        let b = svc.create(mug()).await?;
        assert_ne!(a.id, b.id);
        assert_eq!(svc.get_all().await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn update_toggles_redeemed_and_advances_timestamp() -> Result<(), anyhow::Error> {
        let svc = setup().await;
        let created = svc.create(mug()).await?;
        let patch = PrizeUpdate { is_redeemed: Some(true), ..Default::default() };
        let updated = svc.update(&created.id, patch).await?;
        assert!(updated.is_redeemed);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, created.name);

        let found = svc.get_by_id(&created.id).await.expect("found");
        assert!(found.is_redeemed);
        assert_eq!(found.updated_at, updated.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn empty_update_only_refreshes_timestamp() -> Result<(), anyhow::Error> {
        let svc = setup().await;
        let created = svc.create(mug()).await?;
        let touched = svc.update(&created.id, PrizeUpdate::default()).await?;
        assert!(touched.updated_at > created.updated_at);
        assert_eq!(touched.name, created.name);
        assert_eq!(touched.required_stamps, created.required_stamps);
        assert_eq!(touched.is_redeemed, created.is_redeemed);
        assert_eq!(touched.created_at, created.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn update_does_not_validate_range() -> Result<(), anyhow::Error> {
        let svc = setup().await;
        let created = svc.create(mug()).await?;
        let patch = PrizeUpdate { required_stamps: Some(250), ..Default::default() };
        assert_eq!(svc.update(&created.id, patch).await?.required_stamps, 250);
        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let svc = setup().await;
        let res = svc.update("missing", PrizeUpdate::default()).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_twice() -> Result<(), anyhow::Error> {
        let svc = setup().await;
        let keep = svc.create(mug()).await?;
        let gone = svc.create(mug()).await?;
        assert!(svc.delete(&gone.id).await?);
        assert!(svc.get_by_id(&gone.id).await.is_none());
        assert!(!svc.delete(&gone.id).await?);
        assert_eq!(svc.get_all().await, vec![keep]);
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_status() -> Result<(), anyhow::Error> {
        let svc = setup().await;
        let a = svc.create(mug()).await?;
        let b = svc.create(mug()).await?;
        svc.update(&b.id, PrizeUpdate { is_redeemed: Some(true), ..Default::default() }).await?;

        let available = svc.list(StatusFilter::Available).await;
        assert_eq!(available.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec![a.id.as_str()]);
        let redeemed = svc.list(StatusFilter::Redeemed).await;
        assert_eq!(redeemed.len(), 1);
        assert_eq!(redeemed[0].id, b.id);
        assert_eq!(svc.list(StatusFilter::All).await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn read_only_store_refuses_create() {
        let svc = PrizeService::new(Arc::new(ReadOnlyStore));
        assert!(svc.get_all().await.is_empty());
        assert!(matches!(svc.create(mug()).await, Err(ServiceError::StorageUnavailable(_))));
        // deleting an unknown id needs no write
        assert!(!svc.delete("x").await.unwrap());
    }
}
