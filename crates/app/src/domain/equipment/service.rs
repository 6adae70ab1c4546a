//! Equipment catalog service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::equipment::{
        data::{EquipmentUpdate, NewEquipment},
        errors::EquipmentServiceError,
        records::{EquipmentRecord, EquipmentUuid},
        repository::PgEquipmentRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgEquipmentService {
    db: Db,
    repository: PgEquipmentRepository,
}

impl PgEquipmentService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgEquipmentRepository::new(),
        }
    }
}

#[async_trait]
impl EquipmentService for PgEquipmentService {
    async fn get_equipment(
        &self,
        equipment: EquipmentUuid,
    ) -> Result<EquipmentRecord, EquipmentServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let equipment = self.repository.get_equipment(&mut tx, equipment).await?;

        tx.commit().await?;

        Ok(equipment)
    }

    async fn create_equipment(
        &self,
        equipment: NewEquipment,
    ) -> Result<EquipmentRecord, EquipmentServiceError> {
        i64::try_from(equipment.price)?;

        let mut tx = self.db.begin_transaction().await?;

        let created = self.repository.create_equipment(&mut tx, equipment).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_equipment(
        &self,
        equipment: EquipmentUuid,
        update: EquipmentUpdate,
    ) -> Result<EquipmentRecord, EquipmentServiceError> {
        if let Some(price) = update.price {
            i64::try_from(price)?;
        }

        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .repository
            .update_equipment(&mut tx, equipment, update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait EquipmentService: Send + Sync {
    /// Retrieve a single, non-deleted equipment item.
    async fn get_equipment(
        &self,
        equipment: EquipmentUuid,
    ) -> Result<EquipmentRecord, EquipmentServiceError>;

    /// Adds an equipment item to the catalog.
    async fn create_equipment(
        &self,
        equipment: NewEquipment,
    ) -> Result<EquipmentRecord, EquipmentServiceError>;

    /// Changes the price and/or stock status of an equipment item.
    async fn update_equipment(
        &self,
        equipment: EquipmentUuid,
        update: EquipmentUpdate,
    ) -> Result<EquipmentRecord, EquipmentServiceError>;
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::new_equipment};

    use super::*;

    #[tokio::test]
    async fn create_equipment_returns_catalog_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = EquipmentUuid::new();

        let equipment = ctx
            .equipment
            .create_equipment(new_equipment(uuid, 49_99))
            .await?;

        assert_eq!(equipment.uuid, uuid);
        assert_eq!(equipment.price, 49_99);
        assert!(equipment.in_stock);
        assert_eq!(equipment.images.len(), 1);
        assert!(equipment.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn get_equipment_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.equipment.get_equipment(EquipmentUuid::new()).await;

        assert!(
            matches!(result, Err(EquipmentServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_equipment_keeps_unspecified_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = EquipmentUuid::new();

        ctx.equipment
            .create_equipment(new_equipment(uuid, 20_00))
            .await?;

        let updated = ctx
            .equipment
            .update_equipment(
                uuid,
                EquipmentUpdate {
                    price: None,
                    in_stock: Some(false),
                },
            )
            .await?;

        assert_eq!(updated.price, 20_00);
        assert!(!updated.in_stock);

        Ok(())
    }

    #[tokio::test]
    async fn create_equipment_rejects_price_beyond_bigint() -> TestResult {
        // Never connects: the price is rejected before a transaction is opened.
        let pool = PgPool::connect_lazy("postgres://localhost/sportspro")?;
        let service = PgEquipmentService::new(Db::new(pool));

        let result = service
            .create_equipment(new_equipment(EquipmentUuid::new(), u64::MAX))
            .await;

        assert!(
            matches!(result, Err(EquipmentServiceError::InvalidPrice(_))),
            "expected InvalidPrice, got {result:?}"
        );

        Ok(())
    }
}
