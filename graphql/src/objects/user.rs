use super::OrganizationResolver;
use crate::{
    auth::{self, Actor},
    errors::InvalidId,
};
use async_graphql::{Context, Object, Result, ID};
use chrono::{DateTime, Utc};
use database::{loaders::OrganizationsForUserLoader, User};
use tracing::instrument;

/// Resolves the fields of a [`User`]
#[derive(Clone, Debug)]
pub(crate) struct UserResolver(User);

impl UserResolver {
    /// The relay kind for user IDs
    pub const KIND: &'static str = "User";

    /// Decode a relay ID into the user's database ID
    pub fn unmarshal_id(id: &ID) -> Result<i32, InvalidId> {
        relay::unmarshal(Self::KIND, id).map_err(InvalidId)
    }
}

impl From<User> for UserResolver {
    fn from(user: User) -> Self {
        Self(user)
    }
}

/// A user of the service
#[Object(name = "User")]
impl UserResolver {
    /// The unique ID of the user
    async fn id(&self) -> ID {
        ID(relay::marshal_id(Self::KIND, self.0.id))
    }

    /// The ID of the user in the database
    async fn database_id(&self) -> i32 {
        self.0.id
    }

    /// The unique name the user is referred to by
    async fn username(&self) -> &str {
        &self.0.username
    }

    /// The name shown to other users
    async fn display_name(&self) -> Option<&str> {
        self.0.display_name.as_deref()
    }

    /// The user's primary email, only visible to the user themselves and site admins
    async fn primary_email(&self, ctx: &Context<'_>) -> Result<&str> {
        auth::check_same_user_or_site_admin(Actor::from_context(ctx), self.0.id)?;
        Ok(&self.0.primary_email)
    }

    /// Whether the user administers the site
    async fn site_admin(&self) -> bool {
        self.0.site_admin
    }

    /// When the user was created
    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    /// When the user was last updated
    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    /// The organizations the user is a member of
    #[instrument(name = "User::organizations", skip_all)]
    async fn organizations(&self, ctx: &Context<'_>) -> Result<Vec<OrganizationResolver>> {
        let loader = ctx.data_unchecked::<OrganizationsForUserLoader>();
        let organizations = loader.load_one(self.0.id).await?.unwrap_or_default();

        Ok(organizations.into_iter().map(OrganizationResolver::from).collect())
    }
}
