pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "issues")]
#[command(about = "Issue Tracker admin CLI - database and account management")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the database if it does not exist, then apply migrations")]
    InitDb,

    #[command(about = "Apply pending migrations")]
    Migrate,

    #[command(about = "Drop every application table")]
    DropDb {
        #[arg(long, help = "Confirm the destructive operation")]
        yes: bool,
    },

    #[command(about = "Create a user with the global admin role")]
    CreateAdmin(commands::admin::CreateAdminArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();
    config.validate()?;

    match cli.command {
        Commands::InitDb => commands::db::init_db(config, output_format).await,
        Commands::Migrate => commands::db::migrate(config, output_format).await,
        Commands::DropDb { yes } => commands::db::drop_db(config, yes, output_format).await,
        Commands::CreateAdmin(args) => commands::admin::create_admin(config, args, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_drop_db_confirmation() {
        let cli = Cli::try_parse_from(["issues", "drop-db", "--yes"]).unwrap();
        assert!(matches!(cli.command, Commands::DropDb { yes: true }));

        let cli = Cli::try_parse_from(["issues", "drop-db"]).unwrap();
        assert!(matches!(cli.command, Commands::DropDb { yes: false }));
    }

    #[test]
    fn test_parse_create_admin() {
        let cli = Cli::try_parse_from([
            "issues",
            "--json",
            "create-admin",
            "--username",
            "root",
            "--email",
            "root@example.com",
            "--password",
            "Secret123",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::CreateAdmin(args) => {
                assert_eq!(args.username, "root");
                assert_eq!(args.password.as_deref(), Some("Secret123"));
            }
            _ => panic!("expected create-admin"),
        }
    }
}
