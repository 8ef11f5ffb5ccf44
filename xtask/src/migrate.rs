use chrono::Utc;
use database::{PgPool, MIGRATOR};
use eyre::{eyre, WrapErr};
use sqlx::migrate::{Migrate, MigrationType};
use std::{collections::HashMap, fs, path::Path, path::PathBuf};
use tracing::{info, warn};

pub async fn run(args: Args) -> eyre::Result<()> {
    match args.command {
        Command::Add { name } => add(&args.source, &name.join("_")),
        Command::Info => {
            let db = connect(args.database_url.as_deref()).await?;
            info(&db).await
        }
        Command::Apply => {
            let db = connect(args.database_url.as_deref()).await?;
            database::migrate(&db)
                .await
                .wrap_err("failed to apply migrations")
        }
        Command::Revert { target } => {
            let db = connect(args.database_url.as_deref()).await?;
            revert(&db, target).await
        }
    }
}

async fn connect(url: Option<&str>) -> eyre::Result<PgPool> {
    let url = url.ok_or_else(|| eyre!("a database URL is required"))?;
    database::connect(url)
        .await
        .wrap_err("failed to connect to the database")
}

/// Create a new reversible migration in the source directory
fn add(source: &Path, name: &str) -> eyre::Result<()> {
    let version = Utc::now().format("%Y%m%d%H%M%S");

    for kind in [MigrationType::ReversibleUp, MigrationType::ReversibleDown] {
        let path = source.join(format!("{version}_{name}{}", kind.suffix()));
        fs::write(&path, kind.file_content()).wrap_err("failed to create migration")?;

        info!(path = %path.display(), "created migration");
    }

    Ok(())
}

/// Show which of the embedded migrations have been applied
async fn info(db: &PgPool) -> eyre::Result<()> {
    let mut conn = db.acquire().await?;
    conn.ensure_migrations_table().await?;

    let applied = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| (m.version, m))
        .collect::<HashMap<_, _>>();

    for migration in MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
    {
        let is_applied = match applied.get(&migration.version) {
            Some(applied) => {
                if applied.checksum != migration.checksum {
                    warn!(version = migration.version, description = %migration.description, "applied checksum is different from source checksum");
                }
                true
            }
            None => false,
        };

        info!(version = migration.version, description = %migration.description, applied = is_applied);
    }

    Ok(())
}

/// Revert migrations newer than the target, or only the latest when there is no target
async fn revert(db: &PgPool, target: Option<i64>) -> eyre::Result<()> {
    let target = match target {
        Some(target) => target,
        None => {
            let mut conn = db.acquire().await?;
            conn.ensure_migrations_table().await?;

            let mut versions = conn
                .list_applied_migrations()
                .await?
                .into_iter()
                .map(|m| m.version)
                .collect::<Vec<_>>();
            versions.sort_unstable();
            versions.pop();

            versions.last().copied().unwrap_or(0)
        }
    };

    MIGRATOR
        .undo(db, target)
        .await
        .wrap_err("failed to revert migrations")?;
    info!(target, "reverted migrations");

    Ok(())
}

#[derive(clap::Args, Debug)]
pub struct Args {
    /// The database to run migrations on
    #[arg(short, long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Where new migrations are created
    #[arg(short, long, default_value = "./database/migrations")]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Create a new migration
    Add {
        /// The name of the migration
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// List all available migrations
    Info,
    /// Apply all pending migrations
    Apply,
    /// Revert migrations
    ///
    /// If no target is provided, the most recent migration is reverted.
    Revert {
        /// The version to revert back to
        target: Option<i64>,
    },
}
