use super::saturating_total;
use crate::{
    connection::{connection, decode, encode, ConnectionOptions, ConnectionStore, CursorError},
    objects::UserResolver,
};
use async_graphql::Enum;
use async_trait::async_trait;
use database::{CursorValue, OrderBy, PaginationArgs, PgPool, User, UserFilter};

connection! {
    /// A paginated list of users
    UserConnection for UserConnectionStore => UserResolver
}

/// The fields users can be ordered by
#[derive(Clone, Copy, Debug, Default, Enum, Eq, PartialEq)]
pub(crate) enum UserOrderBy {
    /// When the user was created
    #[default]
    CreatedAt,
    /// The user's ID
    Id,
    /// The user's username
    Username,
}

impl UserOrderBy {
    /// The columns giving a total order for the field
    fn order_by(self) -> OrderBy {
        match self {
            Self::CreatedAt => OrderBy::new(["created_at", "id"]),
            Self::Id => OrderBy::new(["id"]),
            Self::Username => OrderBy::new(["username", "id"]),
        }
    }
}

/// Paginates all the users matching a filter
pub(crate) struct UserConnectionStore {
    db: PgPool,
    filter: UserFilter,
}

impl UserConnectionStore {
    pub const KIND: &'static str = "UserCursor";

    pub fn new(db: PgPool, filter: UserFilter) -> Self {
        Self { db, filter }
    }

    /// The pagination options for the requested ordering
    pub fn options(order_by: UserOrderBy, descending: bool) -> ConnectionOptions {
        ConnectionOptions {
            order_by: order_by.order_by(),
            ascending: !descending,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ConnectionStore for UserConnectionStore {
    type Node = User;
    type Error = database::Error;

    async fn compute_total(&self) -> database::Result<Option<i32>> {
        let count = User::count(&self.filter, &self.db).await?;
        Ok(saturating_total(count))
    }

    async fn compute_nodes(&self, args: &PaginationArgs) -> database::Result<Vec<User>> {
        User::list(&self.filter, args, &self.db).await
    }

    fn marshal_cursor(&self, node: &User, order_by: &OrderBy) -> Result<String, CursorError> {
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
