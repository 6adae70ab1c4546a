//! Equipment Data

use crate::domain::equipment::records::EquipmentUuid;

/// New Equipment Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewEquipment {
    pub uuid: EquipmentUuid,
    pub name: String,
    pub brand: String,
    pub category: String,

    /// Price in minor units.
    pub price: u64,

    pub in_stock: bool,
    pub images: Vec<String>,
}

/// Equipment Update Data
///
/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentUpdate {
    pub price: Option<u64>,
    pub in_stock: Option<bool>,
}
