use crate::{
    auth::{self, Actor},
    connection::{ConnectionArgs, ConnectionResolver},
    errors::InvalidId,
    objects::{Node, OrganizationResolver, UserResolver},
    stores::{
        OrganizationConnection, OrganizationConnectionStore, OrganizationOrderBy, UserConnection,
        UserConnectionStore, UserOrderBy,
    },
};
use async_graphql::{Context, Object, OneofObject, Result, ResultExt, ID};
use database::{
    loaders::{OrganizationLoader, UserByUsernameLoader, UserLoader},
    Organization, OrganizationFilter, PgPool, UserFilter,
};
use tracing::instrument;

pub struct Query;

#[Object]
impl Query {
    /// The user making the request, if signed in
    #[instrument(name = "Query::current_user", skip_all)]
    async fn current_user(&self, ctx: &Context<'_>) -> Result<Option<UserResolver>> {
        let Actor::User { id, .. } = Actor::from_context(ctx) else {
            return Ok(None);
        };

        let loader = ctx.data_unchecked::<UserLoader>();
        let user = loader.load_one(id).await?;

        Ok(user.map(UserResolver::from))
    }

    /// Get a user by their ID or username
    #[instrument(name = "Query::user", skip(self, ctx))]
    async fn user(&self, ctx: &Context<'_>, by: UserBy) -> Result<Option<UserResolver>> {
        let user = match by {
            UserBy::Id(id) => {
                let id = UserResolver::unmarshal_id(&id)?;
                let loader = ctx.data_unchecked::<UserLoader>();
                loader.load_one(id).await?
            }
            UserBy::Username(username) => {
                let loader = ctx.data_unchecked::<UserByUsernameLoader>();
                loader.load_one(username).await?
            }
        };

        Ok(user.map(UserResolver::from))
    }

    /// Get an organization by it's ID or name
    #[instrument(name = "Query::organization", skip(self, ctx))]
    async fn organization(
        &self,
        ctx: &Context<'_>,
        by: OrganizationBy,
    ) -> Result<Option<OrganizationResolver>> {
        let organization = match by {
            OrganizationBy::Id(id) => {
                let id = OrganizationResolver::unmarshal_id(&id)?;
                let loader = ctx.data_unchecked::<OrganizationLoader>();
                loader.load_one(id).await?
            }
            OrganizationBy::Name(name) => {
                let db = ctx.data_unchecked::<PgPool>();
                Organization::find_by_name(&name, db).await?
            }
        };

        Ok(organization.map(OrganizationResolver::from))
    }

    /// Fetch any object by it's globally unique ID
    #[instrument(name = "Query::node", skip(self, ctx))]
    async fn node(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Node>> {
        let kind = relay::unmarshal_kind(&id).map_err(InvalidId)?;

        let node = match kind.as_str() {
            UserResolver::KIND => {
                let id = UserResolver::unmarshal_id(&id)?;
                let loader = ctx.data_unchecked::<UserLoader>();
                let user = loader.load_one(id).await?;
                user.map(|user| Node::User(user.into()))
            }
            OrganizationResolver::KIND => {
                let id = OrganizationResolver::unmarshal_id(&id)?;
                let loader = ctx.data_unchecked::<OrganizationLoader>();
                let organization = loader.load_one(id).await?;
                organization.map(|organization| Node::Organization(organization.into()))
            }
            _ => None,
        };

        Ok(node)
    }

    /// List all the users, only available to site admins
    #[allow(clippy::too_many_arguments)]
    #[instrument(name = "Query::users", skip(self, ctx))]
    async fn users(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        #[graphql(desc = "Only users whose username or display name contains the query")]
        query: Option<String>,
        #[graphql(desc = "Only users that are, or are not, site admins")] site_admin: Option<bool>,
        #[graphql(default)] order_by: UserOrderBy,
        #[graphql(default)] descending: bool,
    ) -> Result<UserConnection> {
        auth::check_site_admin(Actor::from_context(ctx))?;

        let db = ctx.data_unchecked::<PgPool>();
        let store = UserConnectionStore::new(db.clone(), UserFilter { query, site_admin });
        let args = ConnectionArgs {
            first,
            after,
            last,
            before,
        };
        let options = UserConnectionStore::options(order_by, descending);
        let resolver = ConnectionResolver::new(store, args, options).extend()?;

        Ok(resolver.into())
    }

    /// List all the organizations, only available to site admins
    #[allow(clippy::too_many_arguments)]
    #[instrument(name = "Query::organizations", skip(self, ctx))]
    async fn organizations(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        #[graphql(desc = "Only organizations whose name or display name contains the query")]
        query: Option<String>,
        #[graphql(default)] order_by: OrganizationOrderBy,
        #[graphql(default)] descending: bool,
    ) -> Result<OrganizationConnection> {
        auth::check_site_admin(Actor::from_context(ctx))?;

        let db = ctx.data_unchecked::<PgPool>();
        let store = OrganizationConnectionStore::new(db.clone(), OrganizationFilter { query });
        let args = ConnectionArgs {
            first,
            after,
            last,
            before,
        };
        let options = OrganizationConnectionStore::options(order_by, descending);
        let resolver = ConnectionResolver::new(store, args, options).extend()?;

        Ok(resolver.into())
    }
}

/// How to lookup a user
#[derive(Debug, OneofObject)]
enum UserBy {
    /// By ID
    Id(ID),
    /// By username
    Username(String),
}

/// How to lookup an organization
#[derive(Debug, OneofObject)]
enum OrganizationBy {
    /// By ID
    Id(ID),
    /// By name
    Name(String),
}
