use crate::Result;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, Executor, FromRow, PgPool, Postgres};
use tracing::instrument;

/// Maps a user to an organization they are a member of
#[derive(Clone, Debug, Eq, FromRow, PartialEq)]
pub struct OrganizationMember {
    /// The organization ID
    pub organization_id: i32,
    /// The user ID
    pub user_id: i32,
    /// When the user joined
    pub created_at: DateTime<Utc>,
}

impl OrganizationMember {
    /// Check if a user is a member of an organization
    #[instrument(name = "OrganizationMember::exists", skip(db))]
    pub async fn exists(organization_id: i32, user_id: i32, db: &PgPool) -> Result<bool> {
        let (exists,) = query_as::<_, (bool,)>(
            "SELECT exists(SELECT 1 FROM organization_members WHERE organization_id = $1 AND user_id = $2)",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(db)
        .await?;

        Ok(exists)
    }

    /// Add a user to an organization
    #[instrument(name = "OrganizationMember::create", skip(db))]
    pub async fn create<'c, 'e, E>(
        organization_id: i32,
        user_id: i32,
        db: E,
    ) -> Result<OrganizationMember>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let member = query_as::<_, OrganizationMember>(
            "INSERT INTO organization_members (organization_id, user_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(db)
        .await?;

        Ok(member)
    }

    /// Remove a user from an organization
    #[instrument(name = "OrganizationMember::delete", skip(db))]
    pub async fn delete(organization_id: i32, user_id: i32, db: &PgPool) -> Result<()> {
        query("DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2")
            .bind(organization_id)
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(())
    }
}
