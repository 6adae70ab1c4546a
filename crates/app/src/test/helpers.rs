//! Test Helpers

use crate::domain::equipment::{data::NewEquipment, records::EquipmentUuid};

/// An in-stock catalog item with the given price.
pub(crate) fn new_equipment(uuid: EquipmentUuid, price: u64) -> NewEquipment {
    NewEquipment {
        uuid,
        name: "Adjustable Dumbbell".to_string(),
        brand: "IronWorks".to_string(),
        category: "strength".to_string(),
        price,
        in_stock: true,
        images: vec!["https://cdn.sportspro.test/dumbbell.jpg".to_string()],
    }
}
