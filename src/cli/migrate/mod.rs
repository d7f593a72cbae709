//! Migrate command - manages the PostgreSQL schema

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{
    connect_pool, postgres_config, MigrationStatus, Migrator, PostgresMigrator,
};

#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration
    #[arg(long, conflicts_with = "status")]
    pub revert: bool,

    /// List applied and pending migration versions and exit
    #[arg(long)]
    pub status: bool,
}

/// Run the migrate command
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let pool = connect_pool(&postgres_config(&config.storage)?).await?;
    let migrator = PostgresMigrator::new(pool);

    if args.status {
        report_status(&migrator.status().await?);
    } else if args.revert {
        match migrator.revert().await? {
            Some(version) => info!(version, "Migration reverted"),
            None => info!("Nothing to revert"),
        }
    } else {
        let applied = migrator.run().await?;
        info!(applied, "Migrations complete");
    }

    Ok(())
}

fn report_status(status: &MigrationStatus) {
    info!(applied = ?status.applied, pending = ?status.pending, "Migration status");

    if status.pending.is_empty() {
        info!("Schema is up to date");
    }
}
