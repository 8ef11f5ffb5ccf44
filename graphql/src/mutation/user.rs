use super::{results, validators, UserError};
use crate::{
    auth::{self, Actor},
    errors::Forbidden,
    objects::UserResolver,
};
use async_graphql::{Context, InputObject, MaybeUndefined, Object, Result, ID};
use database::{loaders::UserLoader, PgPool, User};
use tracing::instrument;

results! {
    CreateUserResult {
        /// The created user
        user: UserResolver,
    }
    UpdateUserResult {
        /// The user
        user: UserResolver,
    }
    DeleteUserResult {
        /// The ID of the deleted user
        deleted_id: ID,
    }
}

#[derive(Default)]
pub(crate) struct UserMutation;

#[Object]
impl UserMutation {
    /// Create a new user, only available to site admins
    #[instrument(name = "Mutation::create_user", skip(self, ctx))]
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        input: CreateUserInput,
    ) -> Result<CreateUserResult> {
        auth::check_site_admin(Actor::from_context(ctx))?;

        let mut user_errors = Vec::new();

        if let Some(user_error) = validators::name(&["username"], &input.username) {
            user_errors.push(user_error);
        }

        if !input.primary_email.contains('@') {
            user_errors.push(UserError::new(&["primary_email"], "must be an email"));
        }

        if !user_errors.is_empty() {
            return Ok(user_errors.into());
        }

        let db = ctx.data_unchecked::<PgPool>();
        if User::find_by_username(&input.username, db).await?.is_some() {
            return Ok(UserError::new(&["username"], "already in use").into());
        }

        let user = User::create(
            &input.username,
            input.display_name.as_deref(),
            &input.primary_email,
            db,
        )
        .await?;

        Ok(UserResolver::from(user).into())
    }

    /// Update the details of a user
    #[instrument(name = "Mutation::update_user", skip(self, ctx))]
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        input: UpdateUserInput,
    ) -> Result<UpdateUserResult> {
        let id = UserResolver::unmarshal_id(&input.id)?;
        let actor = Actor::from_context(ctx);
        auth::check_same_user_or_site_admin(actor, id)?;

        if input.site_admin.is_some() {
            if let Actor::User {
                site_admin: false, ..
            } = actor
            {
                return Err(Forbidden.into());
            }
        }

        let mut user_errors = Vec::new();

        if let MaybeUndefined::Value(display_name) = &input.display_name {
            if display_name.is_empty() {
                user_errors.push(UserError::new(&["display_name"], "cannot be empty"));
            }
        }

        if let Some(primary_email) = &input.primary_email {
            if !primary_email.contains('@') {
                user_errors.push(UserError::new(&["primary_email"], "must be an email"));
            }
        }

        if !user_errors.is_empty() {
            return Ok(user_errors.into());
        }

        let loader = ctx.data_unchecked::<UserLoader>();
        let Some(mut user) = loader.load_one(id).await? else {
            return Ok(UserError::new(&["id"], "user does not exist").into());
        };

        let db = ctx.data_unchecked::<PgPool>();
        user.update()
            .override_display_name(input.display_name.into())
            .override_primary_email(input.primary_email)
            .override_site_admin(input.site_admin)
            .save(db)
            .await?;

        Ok(UserResolver::from(user).into())
    }

    /// Delete a user, only available to site admins
    #[instrument(name = "Mutation::delete_user", skip(self, ctx))]
    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> Result<DeleteUserResult> {
        auth::check_site_admin(Actor::from_context(ctx))?;
        let database_id = UserResolver::unmarshal_id(&id)?;

        let db = ctx.data_unchecked::<PgPool>();
        if !User::exists(database_id, db).await? {
            return Ok(UserError::new(&["id"], "user does not exist").into());
        }

        User::delete(database_id, db).await?;

        Ok(id.into())
    }
}

/// Input fields for creating a user
#[derive(Debug, InputObject)]
struct CreateUserInput {
    /// The unique name the user is referred to by
    username: String,
    /// The name shown to other users
    display_name: Option<String>,
    /// The user's primary email
    primary_email: String,
}

/// Input fields for updating a user
#[derive(Debug, InputObject)]
struct UpdateUserInput {
    /// The ID of the user to update
    id: ID,
    /// The name shown to other users
    display_name: MaybeUndefined<String>,
    /// The user's primary email
    primary_email: Option<String>,
    /// Whether the user administers the site
    site_admin: Option<bool>,
}
