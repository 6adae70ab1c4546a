use clap::Args;
use sportspro_app::{
    database::{self, Db},
    domain::equipment::{
        EquipmentService, PgEquipmentService, data::NewEquipment, records::EquipmentUuid,
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateEquipmentArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Optional equipment UUID; generated when omitted
    #[arg(long)]
    equipment_uuid: Option<Uuid>,

    #[arg(long)]
    name: String,

    #[arg(long)]
    brand: String,

    #[arg(long)]
    category: String,

    /// Price in cents
    #[arg(long)]
    price: u64,

    /// Create the item as out of stock
    #[arg(long)]
    out_of_stock: bool,

    /// Image URL; may be repeated
    #[arg(long = "image")]
    images: Vec<String>,
}

pub(crate) async fn run(args: CreateEquipmentArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgEquipmentService::new(Db::new(pool));

    let equipment = service
        .create_equipment(NewEquipment {
            uuid: args
                .equipment_uuid
                .map_or_else(EquipmentUuid::new, EquipmentUuid::from_uuid),
            name: args.name,
            brand: args.brand,
            category: args.category,
            price: args.price,
            in_stock: !args.out_of_stock,
            images: args.images,
        })
        .await
        .map_err(|error| format!("failed to create equipment: {error}"))?;

    println!("equipment_uuid: {}", equipment.uuid);
    println!("name: {}", equipment.name);
    println!("price: {}", equipment.price);
    println!("in_stock: {}", equipment.in_stock);

    Ok(())
}
