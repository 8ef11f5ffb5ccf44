//! Relay-style cursor connections over any [`ConnectionStore`].
//!
//! A [`ConnectionResolver`] validates the pagination arguments, asks the store for one more row
//! than requested to find out whether another page exists, and derives the [`PageInfo`] from the
//! result. The [`connection!`] macro turns a resolver over a concrete store into a GraphQL object.

mod cursor;
mod error;
mod resolver;
mod store;
#[cfg(test)]
pub(crate) mod testing;

pub use cursor::{decode, encode, CursorError};
pub use error::Error;
pub use resolver::{
    ConnectionArgs, ConnectionOptions, ConnectionResolver, PageInfo, DEFAULT_MAX_PAGE_SIZE,
};
pub use store::ConnectionStore;

/// Declare a GraphQL connection object backed by a [`ConnectionResolver`]
///
/// The store's nodes are converted into the exposed node type using [`From`].
macro_rules! connection {
    (
        $( #[$meta:meta] )*
        $name:ident for $store:ty => $node:ty
    ) => {
        $( #[$meta] )*
        pub(crate) struct $name($crate::connection::ConnectionResolver<$store>);

        impl From<$crate::connection::ConnectionResolver<$store>> for $name {
            fn from(resolver: $crate::connection::ConnectionResolver<$store>) -> Self {
                Self(resolver)
            }
        }

        #[async_graphql::Object]
        impl $name {
            /// The nodes in the current page
            async fn nodes(&self) -> async_graphql::Result<Vec<$node>> {
                use async_graphql::ResultExt;

                let nodes = self.0.nodes().await.extend()?;
                Ok(nodes.iter().cloned().map(<$node>::from).collect())
            }

            /// The total number of nodes, regardless of pagination
            async fn total_count(&self) -> async_graphql::Result<i32> {
                use async_graphql::ResultExt;

                self.0.total_count().await.extend()
            }

            /// Information for fetching adjacent pages
            async fn page_info(&self) -> async_graphql::Result<$crate::connection::PageInfo> {
                use async_graphql::ResultExt;

                self.0.page_info().await.extend()
            }
        }
    };
}

pub(crate) use connection;
