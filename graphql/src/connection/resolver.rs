use super::{ConnectionStore, Error};
use async_graphql::SimpleObject;
use database::{OrderBy, PaginationArgs};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// The largest page that can be requested unless overridden
pub const DEFAULT_MAX_PAGE_SIZE: i32 = 100;

/// The relay-style arguments for paginating a connection
#[derive(Clone, Debug, Default)]
pub struct ConnectionArgs {
    pub first: Option<i32>,
    pub after: Option<String>,
    pub last: Option<i32>,
    pub before: Option<String>,
}

impl ConnectionArgs {
    fn is_forward(&self) -> bool {
        self.first.is_some() || self.after.is_some()
    }

    fn is_backward(&self) -> bool {
        self.last.is_some() || self.before.is_some()
    }
}

/// Controls how a connection is paginated
#[derive(Clone, Debug)]
pub struct ConnectionOptions {
    /// The columns defining the order of the nodes
    pub order_by: OrderBy,
    /// Whether the nodes are sorted in ascending order
    pub ascending: bool,
    /// Whether backward pages are returned in connection order rather than the order they were
    /// fetched in
    pub reverse: bool,
    /// Permit omitting both `first` and `last`, returning every node
    pub allow_no_limit: bool,
    /// Requested page sizes are clamped to this value
    pub max_page_size: i32,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            order_by: OrderBy::default(),
            ascending: true,
            reverse: true,
            allow_no_limit: false,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Information about the current page of a connection
#[derive(Clone, Debug, Default, Eq, PartialEq, SimpleObject)]
pub struct PageInfo {
    /// Whether there are more nodes after this page
    pub has_next_page: bool,
    /// Whether there are more nodes before this page
    pub has_previous_page: bool,
    /// The cursor of the first node in the page
    pub start_cursor: Option<String>,
    /// The cursor of the last node in the page
    pub end_cursor: Option<String>,
}

/// A fetched page, with the extra row removed
struct Page<N> {
    nodes: Vec<N>,
    has_more: bool,
}

/// Resolves a single page of a connection from a [`ConnectionStore`]
///
/// The page and total count are each fetched at most once, no matter how many times they are
/// requested.
pub struct ConnectionResolver<S: ConnectionStore> {
    store: S,
    args: ConnectionArgs,
    options: ConnectionOptions,
    pagination: PaginationArgs,
    page_size: Option<i32>,
    page: OnceCell<Page<S::Node>>,
    total: OnceCell<Option<i32>>,
}

impl<S: ConnectionStore> ConnectionResolver<S> {
    /// Validate the pagination arguments and prepare to fetch the page
    ///
    /// The store is not called until the nodes, count or page info are requested.
    pub fn new(
        store: S,
        args: ConnectionArgs,
        options: ConnectionOptions,
    ) -> Result<Self, Error<S::Error>> {
        let backward = args.is_backward();
        if args.is_forward() && backward {
            return Err(Error::InvalidArguments(
                "cannot combine `first` or `after` with `last` or `before`",
            ));
        }

        let requested = args.first.or(args.last);
        match requested {
            Some(size) if size < 0 => {
                return Err(Error::InvalidArguments(
                    "`first` and `last` cannot be negative",
                ))
            }
            None if !options.allow_no_limit => {
                return Err(Error::InvalidArguments(
                    "you must provide a `first` or `last` value to properly paginate",
                ))
            }
            _ => {}
        }
        let page_size = requested.map(|size| size.min(options.max_page_size));

        let after = args
            .after
            .as_deref()
            .map(|cursor| store.unmarshal_cursor(cursor, &options.order_by))
            .transpose()
            .map_err(Error::InvalidCursor)?;
        let before = args
            .before
            .as_deref()
            .map(|cursor| store.unmarshal_cursor(cursor, &options.order_by))
            .transpose()
            .map_err(Error::InvalidCursor)?;

        // one extra row tells us whether there is another page
        let limit = page_size.map(|size| i64::from(size) + 1);
        let pagination = PaginationArgs {
            first: if backward { None } else { limit },
            last: if backward { limit } else { None },
            after,
            before,
            order_by: options.order_by.clone(),
            ascending: options.ascending,
        };

        Ok(Self {
            store,
            args,
            options,
            pagination,
            page_size,
            page: OnceCell::new(),
            total: OnceCell::new(),
        })
    }

    /// The nodes in the current page
    pub async fn nodes(&self) -> Result<&[S::Node], Error<S::Error>> {
        let page = self.page().await?;
        Ok(&page.nodes)
    }

    /// The total number of nodes, independent of the page
    pub async fn total_count(&self) -> Result<i32, Error<S::Error>> {
        let total = self
            .total
            .get_or_try_init(|| async { self.store.compute_total().await.map_err(Error::Store) })
            .await?;

        Ok(total.unwrap_or_default())
    }

    /// Information for fetching the adjacent pages
    pub async fn page_info(&self) -> Result<PageInfo, Error<S::Error>> {
        let page = self.page().await?;

        let (has_next_page, has_previous_page) = if self.pagination.is_backward() {
            (self.args.before.is_some(), page.has_more)
        } else {
            (page.has_more, self.args.after.is_some())
        };

        let start_cursor = page
            .nodes
            .first()
            .map(|node| self.store.marshal_cursor(node, &self.options.order_by))
            .transpose()
            .map_err(Error::InvalidCursor)?;
        let end_cursor = page
            .nodes
            .last()
            .map(|node| self.store.marshal_cursor(node, &self.options.order_by))
            .transpose()
            .map_err(Error::InvalidCursor)?;

        Ok(PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor,
            end_cursor,
        })
    }

    async fn page(&self) -> Result<&Page<S::Node>, Error<S::Error>> {
        self.page.get_or_try_init(|| self.fetch_page()).await
    }

    #[instrument(name = "ConnectionResolver::fetch_page", skip_all)]
    async fn fetch_page(&self) -> Result<Page<S::Node>, Error<S::Error>> {
        let backward = self.pagination.is_backward();
        debug!(limit = ?self.pagination.limit(), backward, "fetching page");

        let mut nodes = self
            .store
            .compute_nodes(&self.pagination)
            .await
            .map_err(Error::Store)?;

        let has_more = match self.page_size {
            Some(size) => {
                let size = usize::try_from(size).unwrap_or_default();
                let has_more = nodes.len() > size;
                nodes.truncate(size);
                has_more
            }
            None => false,
        };

        // backward pages arrive nearest to the cursor first
        if backward && self.options.reverse {
            nodes.reverse();
        }

        debug!(count = nodes.len(), has_more, "fetched page");
        Ok(Page { nodes, has_more })
    }
}
