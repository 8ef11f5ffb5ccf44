use database::{CursorSource, CursorValue, OrderBy};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The position of a node within an ordering, as stored in a cursor
#[derive(Debug, Deserialize, Serialize)]
struct Position {
    columns: Vec<String>,
    values: Vec<CursorValue>,
}

/// Encode the position of the node as an opaque cursor of the given kind
pub fn encode<N>(kind: &str, node: &N, order_by: &OrderBy) -> Result<String, CursorError>
where
    N: CursorSource + ?Sized,
{
    let values = order_by
        .columns()
        .iter()
        .map(|column| {
            node.column_value(column)
                .ok_or_else(|| CursorError::UnknownColumn(column.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let position = Position {
        columns: order_by.names(),
        values,
    };
    Ok(relay::marshal(kind, &position)?)
}

/// Decode a cursor of the given kind into the values of the ordering columns
///
/// Cursors are only valid for the ordering they were created with.
pub fn decode(kind: &str, cursor: &str, order_by: &OrderBy) -> Result<Vec<CursorValue>, CursorError> {
    let position = relay::unmarshal::<Position>(kind, cursor)?;

    let expected = order_by.names();
    if position.columns != expected {
        return Err(CursorError::OrderMismatch {
            expected,
            found: position.columns,
        });
    }

    if position.values.len() != position.columns.len() {
        return Err(CursorError::ValueCount {
            expected: position.columns.len(),
            found: position.values.len(),
        });
    }

    Ok(position.values)
}

/// An error raised while encoding or decoding a cursor
#[derive(Debug)]
pub enum CursorError {
    /// The cursor could not be decoded
    Relay(relay::Error),
    /// The cursor was created for a different ordering
    OrderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// The cursor has the wrong number of values for its ordering
    ValueCount { expected: usize, found: usize },
    /// The node has no value for an ordering column
    UnknownColumn(String),
}

impl Display for CursorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relay(error) => write!(f, "{error}"),
            Self::OrderMismatch { expected, found } => write!(
                f,
                "cursor is for ordering ({}), expected ({})",
                found.join(", "),
                expected.join(", ")
            ),
            Self::ValueCount { expected, found } => {
                write!(f, "cursor has {found} values, expected {expected}")
            }
            Self::UnknownColumn(column) => write!(f, "no value for ordering column {column:?}"),
        }
    }
}

impl std::error::Error for CursorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Relay(error) => Some(error),
            _ => None,
        }
    }
}

impl From<relay::Error> for CursorError {
    fn from(error: relay::Error) -> Self {
        Self::Relay(error)
    }
}
