//! Combined binary for development - API and job worker in one process.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_lib::config::GatewayConfig;

#[derive(Parser)]
#[command(name = "daily-report")]
#[command(about = "Daily report API and worker in a single process")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API and run the job worker (development mode)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value = "3000")]
        port: u16,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let config = GatewayConfig {
                host,
                port,
                ..GatewayConfig::from_env()
            };
            info!("Starting API and worker in development mode");
            info!("  Gateway: http://{}", config.addr());

            let runtime = report_service_lib::connect_from_env().await?;

            // Either side stopping ends the process
            tokio::select! {
                result = gateway_lib::run_embedded(&runtime, config) => {
                    if let Err(e) = result {
                        error!("Gateway failed: {}", e);
                    }
                }
                result = runtime.run_worker() => {
                    match result {
                        Ok(()) => info!("Worker stopped"),
                        Err(e) => error!("Worker failed: {}", e),
                    }
                }
            }
        }
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateAction::Up => report_service_lib::MigrateAction::Up,
                MigrateAction::Down => report_service_lib::MigrateAction::Down,
                MigrateAction::Status => report_service_lib::MigrateAction::Status,
                MigrateAction::Fresh => report_service_lib::MigrateAction::Fresh,
            };
            report_service_lib::run_migrations(migrate_action).await?;
        }
    }

    Ok(())
}
