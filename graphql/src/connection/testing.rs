//! An in-memory store for exercising the connection engine

use super::{decode, encode, ConnectionStore, CursorError};
use async_graphql::SimpleObject;
use async_trait::async_trait;
use database::{CursorSource, CursorValue, OrderBy, PaginationArgs};
use std::{
    fmt::{Display, Formatter},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

#[derive(Clone, Debug, Eq, PartialEq, SimpleObject)]
pub(crate) struct Item {
    pub id: i64,
}

impl CursorSource for Item {
    fn column_value(&self, column: &str) -> Option<CursorValue> {
        match column {
            "id" => Some(self.id.into()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct StoreFailed;

impl Display for StoreFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "store failed")
    }
}

#[derive(Default)]
struct Calls {
    nodes: AtomicUsize,
    total: AtomicUsize,
}

/// Holds items with IDs `1..=n`, applying [`PaginationArgs`] the way the SQL stores do
#[derive(Clone)]
pub(crate) struct MemoryStore {
    items: Arc<Vec<Item>>,
    calls: Arc<Calls>,
    countable: bool,
    failing: bool,
}

impl MemoryStore {
    pub const KIND: &'static str = "ItemCursor";

    pub fn with_items(count: i32) -> Self {
        let items = (1..=i64::from(count)).map(|id| Item { id }).collect();
        Self {
            items: Arc::new(items),
            calls: Arc::default(),
            countable: true,
            failing: false,
        }
    }

    pub fn uncountable(mut self) -> Self {
        self.countable = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn cursor(&self, id: i64) -> String {
        encode(Self::KIND, &Item { id }, &OrderBy::default()).unwrap()
    }

    pub fn node_calls(&self) -> usize {
        self.calls.nodes.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.total.load(Ordering::SeqCst)
    }
}

fn bound(values: &Option<Vec<CursorValue>>) -> Option<i64> {
    match values.as_deref() {
        Some([CursorValue::Int(id)]) => Some(*id),
        _ => None,
    }
}

#[async_trait]
impl ConnectionStore for MemoryStore {
    type Node = Item;
    type Error = StoreFailed;

    async fn compute_total(&self) -> Result<Option<i32>, Self::Error> {
        self.calls.total.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(StoreFailed);
        }

        Ok(self.countable.then(|| self.items.len() as i32))
    }

    async fn compute_nodes(&self, args: &PaginationArgs) -> Result<Vec<Item>, Self::Error> {
        self.calls.nodes.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(StoreFailed);
        }

        let after = bound(&args.after);
        let before = bound(&args.before);
        let ascending = args.ascending;

        let mut items = self
            .items
            .iter()
            .filter(|item| match after {
                Some(after) if ascending => item.id > after,
                Some(after) => item.id < after,
                None => true,
            })
            .filter(|item| match before {
                Some(before) if ascending => item.id < before,
                Some(before) => item.id > before,
                None => true,
            })
            .cloned()
            .collect::<Vec<_>>();

        // fetch order, same as the ORDER BY emitted for the arguments
        if ascending == args.is_backward() {
            items.reverse();
        }

        if let Some(limit) = args.limit() {
            items.truncate(limit as usize);
        }

        Ok(items)
    }

    fn marshal_cursor(&self, node: &Item, order_by: &OrderBy) -> Result<String, CursorError> {
        encode(Self::KIND, node, order_by)
    }

    fn unmarshal_cursor(
        &self,
        cursor: &str,
        order_by: &OrderBy,
    ) -> Result<Vec<CursorValue>, CursorError> {
        decode(Self::KIND, cursor, order_by)
    }
}
