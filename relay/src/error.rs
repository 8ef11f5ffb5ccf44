use base64::DecodeError;
use std::fmt::{Display, Formatter};

/// Errors that can occur when encoding or decoding an ID
#[derive(Debug)]
pub enum Error {
    /// The ID is not valid base64
    Base64(DecodeError),
    /// The decoded ID is not valid UTF-8
    Utf8,
    /// The ID does not contain a kind
    MissingKind,
    /// The ID belongs to a different kind of object
    KindMismatch { expected: String, found: String },
    /// The payload could not be deserialized
    Payload(serde_json::Error),
    /// The payload could not be serialized
    Serialize(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base64(_) => write!(f, "invalid base64 encoding"),
            Self::Utf8 => write!(f, "invalid utf-8 content"),
            Self::MissingKind => write!(f, "missing kind"),
            Self::KindMismatch { expected, found } => {
                write!(f, "expected kind {expected:?}, found {found:?}")
            }
            Self::Payload(_) => write!(f, "invalid payload"),
            Self::Serialize(_) => write!(f, "payload cannot be serialized"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Base64(e) => Some(e),
            Self::Payload(e) | Self::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecodeError> for Error {
    fn from(error: DecodeError) -> Self {
        Self::Base64(error)
    }
}
