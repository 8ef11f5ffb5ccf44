//! Opaque, type-tagged identifiers in the style of Relay global object IDs.
//!
//! An ID is the URL-safe base64 encoding of `<kind>:<json payload>`. The kind keeps IDs for
//! different entities mutually unintelligible: decoding with an expected kind rejects any other.

use base64::prelude::{Engine, BASE64_URL_SAFE};
use serde::{de::DeserializeOwned, Serialize};

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

const SEPARATOR: char = ':';

/// Encode a payload under the given kind
///
/// Fails when the payload cannot be represented as JSON, such as maps with non-string keys.
pub fn marshal<T>(kind: &str, payload: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string(payload).map_err(Error::Serialize)?;
    Ok(encode(kind, &payload))
}

/// Encode a database ID under the given kind
///
/// Produces the same ID as [`marshal`] would for the integer.
pub fn marshal_id(kind: &str, id: i32) -> String {
    encode(kind, &id.to_string())
}

fn encode(kind: &str, payload: &str) -> String {
    BASE64_URL_SAFE.encode(format!("{kind}{SEPARATOR}{payload}"))
}

/// Get the kind of an encoded ID without decoding it's payload
pub fn unmarshal_kind(id: &str) -> Result<String> {
    let (kind, _) = split(id)?;
    Ok(kind)
}

/// Decode an ID, returning it's kind and payload
pub fn unmarshal_spec<T>(id: &str) -> Result<(String, T)>
where
    T: DeserializeOwned,
{
    let (kind, payload) = split(id)?;
    let spec = serde_json::from_str(&payload).map_err(Error::Payload)?;
    Ok((kind, spec))
}

/// Decode an ID that must be of the expected kind
pub fn unmarshal<T>(expected: &str, id: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let (kind, payload) = split(id)?;
    if kind != expected {
        return Err(Error::KindMismatch {
            expected: expected.to_owned(),
            found: kind,
        });
    }

    serde_json::from_str(&payload).map_err(Error::Payload)
}

/// Decode the base64 layer and split off the kind
fn split(id: &str) -> Result<(String, String)> {
    let raw = BASE64_URL_SAFE.decode(id)?;
    let raw = String::from_utf8(raw).map_err(|_| Error::Utf8)?;

    let Some((kind, payload)) = raw.split_once(SEPARATOR) else {
        return Err(Error::MissingKind);
    };
    if kind.is_empty() {
        return Err(Error::MissingKind);
    }

    Ok((kind.to_owned(), payload.to_owned()))
}
