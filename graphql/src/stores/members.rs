use super::saturating_total;
use crate::{
    connection::{connection, decode, encode, ConnectionOptions, ConnectionStore, CursorError},
    objects::UserResolver,
};
use async_trait::async_trait;
use database::{CursorValue, OrderBy, PaginationArgs, PgPool, User};

connection! {
    /// A paginated list of the members of an organization
    OrganizationMemberConnection for MemberConnectionStore => UserResolver
}

/// Paginates the users that are members of an organization
pub(crate) struct MemberConnectionStore {
    db: PgPool,
    organization_id: i32,
}

impl MemberConnectionStore {
    pub const KIND: &'static str = "OrganizationMemberCursor";

    pub fn new(db: PgPool, organization_id: i32) -> Self {
        Self {
            db,
            organization_id,
        }
    }

    /// Members are always listed in the order of their user IDs
    pub fn options() -> ConnectionOptions {
        ConnectionOptions {
            order_by: OrderBy::new(["users.id"]),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ConnectionStore for MemberConnectionStore {
    type Node = User;
    type Error = database::Error;

    async fn compute_total(&self) -> database::Result<Option<i32>> {
        let count = User::count_for_organization(self.organization_id, &self.db).await?;
        Ok(saturating_total(count))
    }

    async fn compute_nodes(&self, args: &PaginationArgs) -> database::Result<Vec<User>> {
        User::list_for_organization(self.organization_id, args, &self.db).await
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
