use sqlx::{
    migrate::{MigrateError, Migrator},
    postgres::PgConnectOptions,
    ConnectOptions,
};
use std::str::FromStr;
use tracing::{info, instrument, log::LevelFilter};

#[cfg(feature = "graphql")]
pub mod loaders;
mod member;
mod organization;
pub mod pagination;
mod user;

pub use member::OrganizationMember;
pub use organization::{Organization, OrganizationFilter, OrganizationUpdater};
pub use pagination::{CursorSource, CursorValue, OrderBy, PaginationArgs};
pub use sqlx::PgPool;
pub use user::{User, UserFilter, UserUpdater};

/// Errors raised by the database
pub type Error = sqlx::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The migrations for the schema the entities are stored in
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Connect to the database
#[instrument(name = "database::connect", skip_all)]
pub async fn connect(url: &str) -> Result<PgPool> {
    let options = PgConnectOptions::from_str(url)?.log_statements(LevelFilter::Debug);
    let db = PgPool::connect_with(options).await?;

    info!("connected to the database");

    Ok(db)
}

/// Apply any pending migrations
#[instrument(name = "database::migrate", skip_all)]
pub async fn migrate(db: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(db).await?;
    info!("migrations applied");

    Ok(())
}
