use clap::Args;
use sportspro_app::{
    database::{self, Db},
    domain::equipment::{
        EquipmentService, PgEquipmentService, data::EquipmentUpdate, records::EquipmentUuid,
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct UpdateEquipmentArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long)]
    equipment_uuid: Uuid,

    /// New price in cents. Existing cart lines keep the price they were added at.
    #[arg(long)]
    price: Option<u64>,

    /// New stock status
    #[arg(long)]
    in_stock: Option<bool>,
}

pub(crate) async fn run(args: UpdateEquipmentArgs) -> Result<(), String> {
    if args.price.is_none() && args.in_stock.is_none() {
        return Err("nothing to update; pass --price and/or --in-stock".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgEquipmentService::new(Db::new(pool));

    let equipment = service
        .update_equipment(
            EquipmentUuid::from_uuid(args.equipment_uuid),
            EquipmentUpdate {
                price: args.price,
                in_stock: args.in_stock,
            },
        )
        .await
        .map_err(|error| format!("failed to update equipment: {error}"))?;

    println!("equipment_uuid: {}", equipment.uuid);
    println!("price: {}", equipment.price);
    println!("in_stock: {}", equipment.in_stock);

    Ok(())
}
