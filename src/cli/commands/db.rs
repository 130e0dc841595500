use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;
use crate::database::{manager::COLLECTIONS, Database};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the collection tables if they do not exist")]
    Init,

    #[command(about = "Check that the database answers")]
    Ping,
}

pub async fn handle(cmd: DbCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let result = match cmd {
        DbCommands::Init => db.ensure_collections().await.map(|_| {
            (
                "Collections ready".to_string(),
                json!({ "collections": COLLECTIONS }),
            )
        }),
        DbCommands::Ping => db.health_check().await.map(|_| {
            (
                format!("Database {}:{}/{} is reachable", config.database.host, config.database.port, config.database.name),
                json!({ "database": "ok" }),
            )
        }),
    };
    db.close().await;

    let (message, data) = result?;
    output_success(output_format, &message, Some(data))
}
