//! Per-field authorization checks.
//!
//! The HTTP layer attaches the [`Actor`] making the request to the request data. Resolvers check
//! the actor before touching the database; pagination never performs checks of its own.

use crate::errors::{Forbidden, Unauthorized};
use async_graphql::{Context, Result};
use database::{OrganizationMember, PgPool};

/// Who is making the request
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Actor {
    /// No user is signed in
    #[default]
    Anonymous,
    /// A signed in user
    User { id: i32, site_admin: bool },
}

impl Actor {
    /// Get the actor for the current request, treating a missing actor as anonymous
    pub fn from_context(ctx: &Context<'_>) -> Actor {
        ctx.data_opt::<Actor>().copied().unwrap_or_default()
    }
}

/// Require a signed in user, returning their ID
pub(crate) fn check_authenticated(actor: Actor) -> Result<i32> {
    match actor {
        Actor::Anonymous => Err(Unauthorized.into()),
        Actor::User { id, .. } => Ok(id),
    }
}

/// Require a site admin
pub(crate) fn check_site_admin(actor: Actor) -> Result<()> {
    match actor {
        Actor::Anonymous => Err(Unauthorized.into()),
        Actor::User {
            site_admin: true, ..
        } => Ok(()),
        Actor::User { .. } => Err(Forbidden.into()),
    }
}

/// Require the user themselves or a site admin
pub(crate) fn check_same_user_or_site_admin(actor: Actor, user_id: i32) -> Result<()> {
    match actor {
        Actor::Anonymous => Err(Unauthorized.into()),
        Actor::User { id, site_admin } if id == user_id || site_admin => Ok(()),
        Actor::User { .. } => Err(Forbidden.into()),
    }
}

/// Require a member of the organization or a site admin
pub(crate) async fn check_org_member_or_site_admin(
    actor: Actor,
    organization_id: i32,
    db: &PgPool,
) -> Result<()> {
    match actor {
        Actor::Anonymous => Err(Unauthorized.into()),
        Actor::User {
            site_admin: true, ..
        } => Ok(()),
        Actor::User { id, .. } => {
            if OrganizationMember::exists(organization_id, id, db).await? {
                Ok(())
            } else {
                Err(Forbidden.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        check_authenticated, check_org_member_or_site_admin, check_same_user_or_site_admin,
        check_site_admin, Actor,
    };
    use crate::stores::tests::lazy_pool;

    const ADMIN: Actor = Actor::User {
        id: 1,
        site_admin: true,
    };
    const MEMBER: Actor = Actor::User {
        id: 2,
        site_admin: false,
    };

    fn code(result: async_graphql::Result<impl Sized>) -> Option<String> {
        let error = result.err()?;
        let extensions = serde_json::to_value(error.extensions?).ok()?;
        extensions["code"].as_str().map(ToOwned::to_owned)
    }

    #[test]
    fn authenticated() {
        assert_eq!(check_authenticated(MEMBER).unwrap(), 2);
        assert_eq!(
            code(check_authenticated(Actor::Anonymous)).as_deref(),
            Some("UNAUTHORIZED")
        );
    }

    #[test]
    fn site_admin() {
        assert!(check_site_admin(ADMIN).is_ok());
        assert_eq!(code(check_site_admin(MEMBER)).as_deref(), Some("FORBIDDEN"));
        assert_eq!(
            code(check_site_admin(Actor::Anonymous)).as_deref(),
            Some("UNAUTHORIZED")
        );
    }

    #[test]
    fn same_user_or_site_admin() {
        assert!(check_same_user_or_site_admin(MEMBER, 2).is_ok());
        assert!(check_same_user_or_site_admin(ADMIN, 2).is_ok());
        assert_eq!(
            code(check_same_user_or_site_admin(MEMBER, 3)).as_deref(),
            Some("FORBIDDEN")
        );
        assert_eq!(
            code(check_same_user_or_site_admin(Actor::Anonymous, 2)).as_deref(),
            Some("UNAUTHORIZED")
        );
    }

    #[tokio::test]
    async fn org_member_checks_skip_the_database_when_possible() {
        let db = lazy_pool();

        assert!(check_org_member_or_site_admin(ADMIN, 1, &db).await.is_ok());
        assert_eq!(
            code(check_org_member_or_site_admin(Actor::Anonymous, 1, &db).await).as_deref(),
            Some("UNAUTHORIZED")
        );
    }
}
