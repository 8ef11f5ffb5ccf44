use super::CursorError;
use async_trait::async_trait;
use database::{CursorValue, OrderBy, PaginationArgs};

/// A source of nodes that can be paginated by a [`ConnectionResolver`](super::ConnectionResolver)
///
/// Stores fetch rows in the direction given by [`PaginationArgs`]. For backward pages the rows are
/// returned nearest to the cursor first, including the extra row used to detect further pages.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// The type of node being paginated
    type Node: Send + Sync;
    /// The error raised when fetching fails
    type Error: Send + Sync;

    /// Count all the nodes, ignoring pagination
    ///
    /// Stores that cannot count return `None`, which is reported as zero.
    async fn compute_total(&self) -> Result<Option<i32>, Self::Error>;

    /// Fetch the nodes for a page
    async fn compute_nodes(&self, args: &PaginationArgs) -> Result<Vec<Self::Node>, Self::Error>;

    /// Create an opaque cursor for the node's position within the ordering
    fn marshal_cursor(&self, node: &Self::Node, order_by: &OrderBy) -> Result<String, CursorError>;

    /// Recover the ordering column values from a cursor
    fn unmarshal_cursor(
        &self,
        cursor: &str,
        order_by: &OrderBy,
    ) -> Result<Vec<CursorValue>, CursorError>;
}
