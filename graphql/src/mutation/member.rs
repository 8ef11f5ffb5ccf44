use super::{results, UserError};
use crate::{
    auth::{self, Actor},
    objects::{OrganizationResolver, UserResolver},
};
use async_graphql::{Context, InputObject, Object, Result, ID};
use database::{loaders::UserByUsernameLoader, Organization, OrganizationMember, PgPool, User};
use tracing::instrument;

results! {
    AddUserToOrganizationResult {
        /// The user that was added to the organization
        user: UserResolver,
    }
    RemoveUserFromOrganizationResult {
        /// The ID of the user that was removed from the organization
        removed_user_id: ID,
    }
}

#[derive(Default)]
pub(crate) struct MemberMutation;

#[Object]
impl MemberMutation {
    /// Add a user to an organization
    #[instrument(name = "Mutation::add_user_to_organization", skip(self, ctx))]
    async fn add_user_to_organization(
        &self,
        ctx: &Context<'_>,
        input: AddUserToOrganizationInput,
    ) -> Result<AddUserToOrganizationResult> {
        let organization_id = OrganizationResolver::unmarshal_id(&input.organization)?;
        let db = ctx.data_unchecked::<PgPool>();
        auth::check_org_member_or_site_admin(Actor::from_context(ctx), organization_id, db)
            .await?;

        if !Organization::exists(organization_id, db).await? {
            return Ok(UserError::new(&["organization"], "organization does not exist").into());
        }

        let loader = ctx.data_unchecked::<UserByUsernameLoader>();
        let Some(user) = loader.load_one(input.username).await? else {
            return Ok(UserError::new(&["username"], "user does not exist").into());
        };

        if OrganizationMember::exists(organization_id, user.id, db).await? {
            return Ok(UserError::new(&["username"], "already a member").into());
        }

        OrganizationMember::create(organization_id, user.id, db).await?;

        Ok(UserResolver::from(user).into())
    }

    /// Remove a user from an organization
    #[instrument(name = "Mutation::remove_user_from_organization", skip(self, ctx))]
    async fn remove_user_from_organization(
        &self,
        ctx: &Context<'_>,
        input: RemoveUserFromOrganizationInput,
    ) -> Result<RemoveUserFromOrganizationResult> {
        let organization_id = OrganizationResolver::unmarshal_id(&input.organization)?;
        let user_id = UserResolver::unmarshal_id(&input.user)?;
        let db = ctx.data_unchecked::<PgPool>();
        auth::check_org_member_or_site_admin(Actor::from_context(ctx), organization_id, db)
            .await?;

        if !User::exists(user_id, db).await? {
            return Ok(UserError::new(&["user"], "user does not exist").into());
        }

        OrganizationMember::delete(organization_id, user_id, db).await?;

        Ok(input.user.into())
    }
}

/// Input for adding a user to an organization
#[derive(Debug, InputObject)]
struct AddUserToOrganizationInput {
    /// The ID of the organization to add the user to
    organization: ID,
    /// The username of the user to add
    username: String,
}

/// Input for removing a user from an organization
#[derive(Debug, InputObject)]
struct RemoveUserFromOrganizationInput {
    /// The ID of the organization to remove the user from
    organization: ID,
    /// The ID of the user to remove
    user: ID,
}
