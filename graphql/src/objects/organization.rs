use crate::{
    auth::{self, Actor},
    connection::{ConnectionArgs, ConnectionResolver},
    errors::InvalidId,
    stores::{MemberConnectionStore, OrganizationMemberConnection},
};
use async_graphql::{Context, Object, Result, ResultExt, ID};
use chrono::{DateTime, Utc};
use database::{Organization, PgPool};
use tracing::instrument;

/// Resolves the fields of an [`Organization`]
#[derive(Clone, Debug)]
pub(crate) struct OrganizationResolver(Organization);

impl OrganizationResolver {
    /// The relay kind for organization IDs
    pub const KIND: &'static str = "Organization";

    /// Decode a relay ID into the organization's database ID
    pub fn unmarshal_id(id: &ID) -> Result<i32, InvalidId> {
        relay::unmarshal(Self::KIND, id).map_err(InvalidId)
    }
}

impl From<Organization> for OrganizationResolver {
    fn from(organization: Organization) -> Self {
        Self(organization)
    }
}

/// A group of users
#[Object(name = "Organization")]
impl OrganizationResolver {
    /// The unique ID of the organization
    async fn id(&self) -> ID {
        ID(relay::marshal_id(Self::KIND, self.0.id))
    }

    /// The ID of the organization in the database
    async fn database_id(&self) -> i32 {
        self.0.id
    }

    /// The unique name of the organization
    async fn name(&self) -> &str {
        &self.0.name
    }

    /// The name shown to users
    async fn display_name(&self) -> Option<&str> {
        self.0.display_name.as_deref()
    }

    /// When the organization was created
    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    /// When the organization was last updated
    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    /// The users that are members of the organization
    #[instrument(name = "Organization::members", skip(self, ctx))]
    async fn members(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<OrganizationMemberConnection> {
        let db = ctx.data_unchecked::<PgPool>();
        auth::check_org_member_or_site_admin(Actor::from_context(ctx), self.0.id, db).await?;

        let args = ConnectionArgs {
            first,
            after,
            last,
            before,
        };
        let store = MemberConnectionStore::new(db.clone(), self.0.id);
        let resolver =
            ConnectionResolver::new(store, args, MemberConnectionStore::options()).extend()?;

        Ok(resolver.into())
    }
}
