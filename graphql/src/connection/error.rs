use super::CursorError;
use async_graphql::ErrorExtensions;
use std::fmt::{Display, Formatter};

/// An error raised while resolving a connection
#[derive(Debug)]
pub enum Error<E> {
    /// The pagination arguments cannot be satisfied
    InvalidArguments(&'static str),
    /// A cursor could not be decoded or encoded
    InvalidCursor(CursorError),
    /// The underlying store failed
    Store(E),
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArguments(reason) => write!(f, "invalid pagination arguments: {reason}"),
            Self::InvalidCursor(error) => write!(f, "invalid cursor: {error}"),
            Self::Store(error) => write!(f, "{error}"),
        }
    }
}

impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidArguments(_) => None,
            Self::InvalidCursor(error) => Some(error),
            Self::Store(error) => Some(error),
        }
    }
}

impl<E: Display> ErrorExtensions for Error<E> {
    fn extend(&self) -> async_graphql::Error {
        let error = async_graphql::Error::new(self.to_string());
        match self {
            Self::InvalidArguments(_) => {
                error.extend_with(|_, extensions| extensions.set("code", "INVALID_ARGUMENTS"))
            }
            Self::InvalidCursor(_) => {
                error.extend_with(|_, extensions| extensions.set("code", "INVALID_CURSOR"))
            }
            Self::Store(_) => error,
        }
    }
}
