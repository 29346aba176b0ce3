use std::sync::Arc;

use clap::Parser;
use engine::{TokenBucketConfig, TokenBucketGate};
use migration::{Migrator, MigratorTrait};
use server::{JwtIdentityResolver, ServerState};
use settings::Database;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "finboard")]
#[command(about = "Personal finance dashboard API")]
struct Cli {
    /// Settings file, without extension.
    #[arg(long, env = "FINBOARD_CONFIG", default_value = "settings")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finboard={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;

    let engine = engine::Engine::builder()
        .database(db)
        .caches((&settings.cache).into())
        .build()
        .await?;

    let gate = TokenBucketConfig::from(&settings.admission);
    tracing::info!(
        capacity = gate.capacity,
        refill_rate = gate.refill_rate,
        interval = ?gate.interval,
        "account creation gate configured"
    );

    let state = ServerState::new(
        engine,
        Arc::new(JwtIdentityResolver::new(&settings.auth.jwt_secret)),
        Arc::new(TokenBucketGate::new(gate)),
    );

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(state, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
