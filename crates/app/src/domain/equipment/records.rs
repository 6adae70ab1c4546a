//! Equipment Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Equipment UUID
pub type EquipmentUuid = TypedUuid<EquipmentRecord>;

/// Equipment Record
#[derive(Debug, Clone)]
pub struct EquipmentRecord {
    pub uuid: EquipmentUuid,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: u64,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}
