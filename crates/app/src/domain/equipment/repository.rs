//! Equipment Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::equipment::{
    data::{EquipmentUpdate, NewEquipment},
    records::{EquipmentRecord, EquipmentUuid},
};

const GET_EQUIPMENT_SQL: &str = include_str!("sql/get_equipment.sql");
const CREATE_EQUIPMENT_SQL: &str = include_str!("sql/create_equipment.sql");
const UPDATE_EQUIPMENT_SQL: &str = include_str!("sql/update_equipment.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgEquipmentRepository;

impl PgEquipmentRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_equipment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        equipment: EquipmentUuid,
    ) -> Result<EquipmentRecord, sqlx::Error> {
        query_as::<Postgres, EquipmentRecord>(GET_EQUIPMENT_SQL)
            .bind(equipment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_equipment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        equipment: NewEquipment,
    ) -> Result<EquipmentRecord, sqlx::Error> {
        query_as::<Postgres, EquipmentRecord>(CREATE_EQUIPMENT_SQL)
            .bind(equipment.uuid.into_uuid())
            .bind(equipment.name)
            .bind(equipment.brand)
            .bind(equipment.category)
            .bind(encode_u64("price", equipment.price)?)
            .bind(equipment.in_stock)
            .bind(equipment.images)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_equipment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        equipment: EquipmentUuid,
        update: EquipmentUpdate,
    ) -> Result<EquipmentRecord, sqlx::Error> {
        let price = update
            .price
            .map(|price| encode_u64("price", price))
            .transpose()?;

        query_as::<Postgres, EquipmentRecord>(UPDATE_EQUIPMENT_SQL)
            .bind(equipment.into_uuid())
            .bind(price)
            .bind(update.in_stock)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for EquipmentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: EquipmentUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            brand: row.try_get("brand")?,
            category: row.try_get("category")?,
            price: decode_u64(row, "price")?,
            in_stock: row.try_get("in_stock")?,
            images: row.try_get("images")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

/// Non-negative `BIGINT` columns (money in minor units, counters) are `u64` in the domain.
pub(crate) fn decode_u64(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn encode_u64(col: &str, amount: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
