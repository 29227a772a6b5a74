use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use bank_analytics::database::{establish_connection, get_database_url, seed_data, setup_database};
use bank_analytics::server;
use bank_analytics::services::TaskImportService;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        #[clap(short, long, default_value = "3000")]
        port: u16,
        #[clap(short, long, default_value = "bank_analytics.db")]
        database: String,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Import tasks from an Excel workbook and print the summary as JSON
    Import {
        #[clap(short, long)]
        file: String,
        #[clap(short, long, default_value = "bank_analytics.db")]
        database: String,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = "bank_analytics.db")]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long, default_value = "bank_analytics.db")]
        database: String,
    },
    /// Create the head office division and default users if missing
    Seed {
        #[clap(short, long, default_value = "bank_analytics.db")]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Serve {
            port,
            database,
            cors_origin,
        } => {
            info!("Starting server on port {}", port);
            server::start_server(port, &database, cors_origin.as_deref()).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                info!("Initializing database: {}", database);
                server::migrate_database(&database, server::MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&database, direction).await?;
            }
            DbCommands::Seed { database } => {
                info!("Seeding database: {}", database);
                let db = open_database(&database).await?;
                seed_data::seed_defaults(&db).await?;
            }
        },
        Commands::Import { file, database } => {
            info!("Importing tasks from {}", file);
            let bytes = std::fs::read(&file).with_context(|| format!("Failed to read {}", file))?;
            let db = open_database(&database).await?;
            let result = TaskImportService::new(db).import_bytes(&bytes).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

async fn open_database(path: &str) -> Result<sea_orm::DatabaseConnection> {
    let db = establish_connection(&get_database_url(Some(path))).await?;
    setup_database(&db).await?;
    Ok(db)
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_deref()
        .unwrap_or("info")
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
