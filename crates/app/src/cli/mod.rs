use clap::{Parser, Subcommand};

mod db;
mod equipment;
mod token;
mod user;

#[derive(Debug, Parser)]
#[command(name = "sportspro-app", about = "SportsPro CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(user::UserCommand),
    Token(token::TokenCommand),
    Equipment(equipment::EquipmentCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Token(command) => token::run(command).await,
            Commands::Equipment(command) => equipment::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_equipment_create_with_repeated_images() {
        let cli = Cli::try_parse_from([
            "sportspro-app",
            "equipment",
            "create",
            "--database-url",
            "postgres://localhost/sportspro",
            "--name",
            "Kettlebell 16kg",
            "--brand",
            "IronWorks",
            "--category",
            "strength",
            "--price",
            "4999",
            "--image",
            "front.jpg",
            "--image",
            "side.jpg",
        ]);

        assert!(cli.is_ok(), "expected equipment create to parse: {cli:?}");
    }

    #[test]
    fn rejects_negative_price() {
        let cli = Cli::try_parse_from([
            "sportspro-app",
            "equipment",
            "update",
            "--database-url",
            "postgres://localhost/sportspro",
            "--equipment-uuid",
            "0192d7a4-5c8e-7000-8000-000000000000",
            "--price",
            "-1",
        ]);

        assert!(cli.is_err(), "negative prices must be rejected");
    }
}
