use super::{results, validators, UserError};
use crate::{
    auth::{self, Actor},
    objects::OrganizationResolver,
};
use async_graphql::{Context, InputObject, MaybeUndefined, Object, Result, ID};
use database::{loaders::OrganizationLoader, Organization, OrganizationMember, PgPool};
use tracing::instrument;

results! {
    CreateOrganizationResult {
        /// The created organization
        organization: OrganizationResolver,
    }
    UpdateOrganizationResult {
        /// The organization
        organization: OrganizationResolver,
    }
    DeleteOrganizationResult {
        /// The ID of the deleted organization
        deleted_id: ID,
    }
}

#[derive(Default)]
pub(crate) struct OrganizationMutation;

#[Object]
impl OrganizationMutation {
    /// Add a new organization, with the current user as it's first member
    #[instrument(name = "Mutation::create_organization", skip(self, ctx))]
    async fn create_organization(
        &self,
        ctx: &Context<'_>,
        input: CreateOrganizationInput,
    ) -> Result<CreateOrganizationResult> {
        let user_id = auth::check_authenticated(Actor::from_context(ctx))?;

        if let Some(user_error) = validators::name(&["name"], &input.name) {
            return Ok(user_error.into());
        }

        let db = ctx.data_unchecked::<PgPool>();
        if Organization::find_by_name(&input.name, db).await?.is_some() {
            return Ok(UserError::new(&["name"], "already in use").into());
        }

        let mut tx = db.begin().await?;
        let organization =
            Organization::create(&input.name, input.display_name.as_deref(), &mut *tx).await?;
        OrganizationMember::create(organization.id, user_id, &mut *tx).await?;
        tx.commit().await?;

        Ok(OrganizationResolver::from(organization).into())
    }

    /// Update the details of an organization
    #[instrument(name = "Mutation::update_organization", skip(self, ctx))]
    async fn update_organization(
        &self,
        ctx: &Context<'_>,
        input: UpdateOrganizationInput,
    ) -> Result<UpdateOrganizationResult> {
        let id = OrganizationResolver::unmarshal_id(&input.id)?;
        let db = ctx.data_unchecked::<PgPool>();
        auth::check_org_member_or_site_admin(Actor::from_context(ctx), id, db).await?;

        let mut user_errors = Vec::new();

        if let Some(name) = &input.name {
            if let Some(user_error) = validators::name(&["name"], name) {
                user_errors.push(user_error);
            } else if Organization::find_by_name(name, db)
                .await?
                .is_some_and(|existing| existing.id != id)
            {
                user_errors.push(UserError::new(&["name"], "already in use"));
            }
        }

        if let MaybeUndefined::Value(display_name) = &input.display_name {
            if display_name.is_empty() {
                user_errors.push(UserError::new(&["display_name"], "cannot be empty"));
            }
        }

        if !user_errors.is_empty() {
            return Ok(user_errors.into());
        }

        let loader = ctx.data_unchecked::<OrganizationLoader>();
        let Some(mut organization) = loader.load_one(id).await? else {
            return Ok(UserError::new(&["id"], "organization does not exist").into());
        };

        organization
            .update()
            .override_name(input.name)
            .override_display_name(input.display_name.into())
            .save(db)
            .await?;

        Ok(OrganizationResolver::from(organization).into())
    }

    /// Delete an organization, only available to site admins
    #[instrument(name = "Mutation::delete_organization", skip(self, ctx))]
    async fn delete_organization(&self, ctx: &Context<'_>, id: ID) -> Result<DeleteOrganizationResult> {
        auth::check_site_admin(Actor::from_context(ctx))?;
        let database_id = OrganizationResolver::unmarshal_id(&id)?;

        let db = ctx.data_unchecked::<PgPool>();
        if !Organization::exists(database_id, db).await? {
            return Ok(UserError::new(&["id"], "organization does not exist").into());
        }

        Organization::delete(database_id, db).await?;

        Ok(id.into())
    }
}

/// Input fields for creating an organization
#[derive(Debug, InputObject)]
struct CreateOrganizationInput {
    /// The unique name
    name: String,
    /// The name shown to users
    display_name: Option<String>,
}

/// Input fields for updating an organization
#[derive(Debug, InputObject)]
struct UpdateOrganizationInput {
    /// The ID of the organization to update
    id: ID,
    /// The unique name
    name: Option<String>,
    /// The name shown to users
    display_name: MaybeUndefined<String>,
}
