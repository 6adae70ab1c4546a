use clap::{Args, Subcommand};

mod create;
mod update;

#[derive(Debug, Args)]
pub(crate) struct EquipmentCommand {
    #[command(subcommand)]
    command: EquipmentSubcommand,
}

#[derive(Debug, Subcommand)]
enum EquipmentSubcommand {
    Create(create::CreateEquipmentArgs),
    Update(update::UpdateEquipmentArgs),
}

pub(crate) async fn run(command: EquipmentCommand) -> Result<(), String> {
    match command.command {
        EquipmentSubcommand::Create(args) => create::run(args).await,
        EquipmentSubcommand::Update(args) => update::run(args).await,
    }
}
