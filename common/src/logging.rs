use eyre::WrapErr;
use tracing::Level;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// The crates in this workspace, logged at the requested level
const WORKSPACE_TARGETS: &[&str] = &["common", "database", "graphql", "relay", "xtask"];

/// The target sqlx logs executed statements under
const STATEMENTS_TARGET: &str = "sqlx::query";

/// Setup logging and error reporting
///
/// When `RUST_LOG` is set, it replaces the default directives entirely. Otherwise, the workspace
/// crates log at `level`, dependencies only log warnings, and the SQL statements emitted by
/// `database::connect` are shown when `log_statements` is set.
pub fn init(level: Level, log_statements: bool) -> eyre::Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(directives).wrap_err("invalid RUST_LOG directives")?,
        Err(_) => EnvFilter::try_new(default_directives(level, log_statements))
            .wrap_err("invalid default log directives")?,
    };

    let debug = cfg!(debug_assertions);

    Registry::default()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(debug)
                .with_line_number(debug)
                .with_target(true),
        )
        .with(ErrorLayer::default())
        .try_init()
        .wrap_err("failed to initialize logging")
}

fn default_directives(level: Level, log_statements: bool) -> String {
    let level = level.as_str().to_lowercase();
    let statements = if log_statements { "debug" } else { "warn" };

    let mut directives = vec![String::from("warn")];
    directives.extend(
        WORKSPACE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.push(format!("{STATEMENTS_TARGET}={statements}"));

    directives.join(",")
}
