use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carpool::config::Config;
use carpool::db::{Database, DeletePolicy};
use carpool::api;

#[derive(Parser)]
#[command(name = "carpool")]
#[command(about = "Cars, owners and transportations for the bookstore carpool")]
struct Cli {
    /// SQLite database file (overrides CARPOOL_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP (overrides CARPOOL_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// What to do with a car's transportations when it is deleted
        #[arg(long)]
        delete_policy: Option<DeletePolicy>,
    },
    /// Apply pending schema migrations and exit
    Migrate,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "carpool=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let db = match &config.database_path {
        Some(path) => Database::open(path.clone())
            .with_context(|| format!("Failed to open database at {}", path.display()))?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db.with_delete_policy(config.delete_policy))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let db = open_database(&config)?;
    let app = api::create_router(db);

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(
        delete_policy = %config.delete_policy,
        "Carpool server listening on http://{}",
        addr
    );

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::from_env()?;
    if let Some(path) = cli.database {
        config.database_path = Some(path);
    }

    match cli.command {
        Some(Commands::Serve {
            port,
            delete_policy,
        }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(policy) = delete_policy {
                config.delete_policy = policy;
            }
            serve(config).await?;
        }
        Some(Commands::Migrate) => {
            open_database(&config)?;
            tracing::info!("Database is up to date");
        }
        None => serve(config).await?,
    }

    Ok(())
}
