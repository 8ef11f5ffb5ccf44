use super::saturating_total;
use crate::{
    connection::{connection, decode, encode, ConnectionOptions, ConnectionStore, CursorError},
    objects::OrganizationResolver,
};
use async_graphql::Enum;
use async_trait::async_trait;
use database::{CursorValue, OrderBy, Organization, OrganizationFilter, PaginationArgs, PgPool};

connection! {
    /// A paginated list of organizations
    OrganizationConnection for OrganizationConnectionStore => OrganizationResolver
}

/// The fields organizations can be ordered by
#[derive(Clone, Copy, Debug, Default, Enum, Eq, PartialEq)]
pub(crate) enum OrganizationOrderBy {
    /// The organization's ID
    #[default]
    Id,
    /// The organization's unique name
    Name,
}

impl OrganizationOrderBy {
    fn order_by(self) -> OrderBy {
        match self {
            Self::Id => OrderBy::new(["id"]),
            Self::Name => OrderBy::new(["name", "id"]),
        }
    }
}

/// Paginates all the organizations matching a filter
pub(crate) struct OrganizationConnectionStore {
    db: PgPool,
    filter: OrganizationFilter,
}

impl OrganizationConnectionStore {
    pub const KIND: &'static str = "OrganizationCursor";

    pub fn new(db: PgPool, filter: OrganizationFilter) -> Self {
        Self { db, filter }
    }

    pub fn options(order_by: OrganizationOrderBy, descending: bool) -> ConnectionOptions {
        ConnectionOptions {
            order_by: order_by.order_by(),
            ascending: !descending,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ConnectionStore for OrganizationConnectionStore {
    type Node = Organization;
    type Error = database::Error;

    async fn compute_total(&self) -> database::Result<Option<i32>> {
        let count = Organization::count(&self.filter, &self.db).await?;
        Ok(saturating_total(count))
    }

    async fn compute_nodes(&self, args: &PaginationArgs) -> database::Result<Vec<Organization>> {
        Organization::list(&self.filter, args, &self.db).await
    }

    fn marshal_cursor(
        &self,
        node: &Organization,
        order_by: &OrderBy,
    ) -> Result<String, CursorError> {
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

#[cfg(test)]
mod tests {
    use super::{OrganizationConnectionStore, OrganizationOrderBy};
    use crate::{
        connection::{ConnectionStore, CursorError},
        stores::{
            tests::{lazy_pool, organization, user},
            UserConnectionStore,
        },
    };
    use database::{CursorValue, OrganizationFilter, UserFilter};

    #[tokio::test]
    async fn cursor_round_trip_by_name() {
        let store = OrganizationConnectionStore::new(lazy_pool(), OrganizationFilter::default());
        let order_by = OrganizationConnectionStore::options(OrganizationOrderBy::Name, false).order_by;

        let cursor = store
            .marshal_cursor(&organization(7, "initech"), &order_by)
            .unwrap();
        assert_eq!(
            store.unmarshal_cursor(&cursor, &order_by).unwrap(),
            vec![CursorValue::from("initech"), CursorValue::Int(7)]
        );
    }

    #[tokio::test]
    async fn rejects_user_cursors() {
        let db = lazy_pool();
        let users = UserConnectionStore::new(db.clone(), UserFilter::default());
        let organizations = OrganizationConnectionStore::new(db, OrganizationFilter::default());
        let order_by = OrganizationConnectionStore::options(OrganizationOrderBy::Id, false).order_by;

        let cursor = users.marshal_cursor(&user(7, "eve"), &order_by).unwrap();
        let error = organizations
            .unmarshal_cursor(&cursor, &order_by)
            .unwrap_err();
        assert!(matches!(
            error,
            CursorError::Relay(relay::Error::KindMismatch { .. })
        ));
    }
}
