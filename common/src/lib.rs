use eyre::WrapErr;
use std::path::PathBuf;

pub mod logging;

/// Load environment variables from the nearest .env file
///
/// Returns the path of the loaded file, or `None` when there is no .env file.
pub fn dotenv() -> eyre::Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(error) if error.not_found() => Ok(None),
        Err(error) => Err(error).wrap_err("failed to load .env"),
    }
}
