//! Report Service - migrations, background worker and scheduled jobs.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use report_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "report-service")]
#[command(about = "Daily report persistence, jobs and maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Background job commands
    Jobs {
        #[command(subcommand)]
        action: JobsCommands,
    },
    /// Statistics commands
    Stats {
        #[command(subcommand)]
        action: StatsCommands,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[derive(Subcommand)]
enum JobsCommands {
    /// Start the job worker
    Work,
}

#[derive(Subcommand)]
enum StatsCommands {
    /// Queue the monthly statistics mail for every active department
    EnqueueMonthly,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            report_service_lib::run_migrations(migrate_action).await?;
        }
        Commands::Jobs {
            action: JobsCommands::Work,
        } => {
            let runtime = report_service_lib::connect_from_env().await?;
            runtime.run_worker().await?;
        }
        Commands::Stats {
            action: StatsCommands::EnqueueMonthly,
        } => {
            let runtime = report_service_lib::connect_from_env().await?;
            let queued = runtime.enqueue_monthly_stats().await?;
            println!("Queued monthly statistics for {} department(s).", queued);
        }
    }

    Ok(())
}
