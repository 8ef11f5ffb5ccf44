use clap::{Parser, Subcommand};
use tracing::{debug, Level};

mod export_schema;
mod migrate;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let env_file = common::dotenv()?;

    let args = Args::parse();
    common::logging::init(args.log_level, args.log_statements)?;

    debug!(?env_file, ?args);

    match args.command {
        Command::ExportSchema(args) => export_schema::run(args),
        Command::Migrate(args) => migrate::run(args).await,
    }
}

/// Development tasks for the pagination service
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// The level the workspace crates log at
    ///
    /// Set `RUST_LOG` to replace the default directives entirely.
    #[arg(short, long, default_value_t = Level::INFO, env = "LOG_LEVEL")]
    log_level: Level,

    /// Log every SQL statement that is executed
    #[arg(long, default_value_t, env = "LOG_STATEMENTS")]
    log_statements: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print or save the GraphQL schema
    ExportSchema(export_schema::Args),
    /// Manage database migrations
    Migrate(migrate::Args),
}
