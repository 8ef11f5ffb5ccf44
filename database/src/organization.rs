use crate::{
    pagination::{contains_pattern, CursorSource, CursorValue, PaginationArgs},
    Result,
};
use chrono::{DateTime, Utc};
#[cfg(feature = "graphql")]
use futures::TryStreamExt;
use sqlx::{query, query_as, Executor, FromRow, PgPool, Postgres, QueryBuilder};
#[cfg(feature = "graphql")]
use std::collections::HashMap;
use tracing::instrument;

/// A group of users
#[derive(Clone, Debug, Eq, FromRow, PartialEq)]
pub struct Organization {
    /// A unique ID
    pub id: i32,
    /// The unique name of the organization
    pub name: String,
    /// The name shown to users
    pub display_name: Option<String>,
    /// When the organization was first created
    pub created_at: DateTime<Utc>,
    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl CursorSource for Organization {
    fn column_value(&self, column: &str) -> Option<CursorValue> {
        let column = column.strip_prefix("organizations.").unwrap_or(column);
        match column {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

/// Restricts which organizations are listed and counted
#[derive(Clone, Debug, Default)]
pub struct OrganizationFilter {
    /// Case-insensitive match against the name or display name
    pub query: Option<String>,
}

impl OrganizationFilter {
    /// Add the filter's conditions to the query, returning whether a `WHERE` clause was started
    fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) -> bool {
        let Some(query) = &self.query else {
            return false;
        };

        let pattern = contains_pattern(query);
        builder.push(" WHERE (name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(r" ESCAPE '\' OR display_name ILIKE ");
        builder.push_bind(pattern);
        builder.push(r" ESCAPE '\')");

        true
    }
}

/// An organization a user belongs to, for use in dataloaders
#[cfg(feature = "graphql")]
#[derive(FromRow)]
struct Membership {
    user_id: i32,
    #[sqlx(flatten)]
    organization: Organization,
}

impl Organization {
    /// Load all the organizations by the IDs, for use in dataloaders
    #[cfg(feature = "graphql")]
    #[instrument(name = "Organization::load", skip(db))]
    pub(crate) async fn load(ids: &[i32], db: &PgPool) -> Result<HashMap<i32, Organization>> {
        let by_id = query_as::<_, Organization>("SELECT * FROM organizations WHERE id = ANY($1)")
            .bind(ids)
            .fetch(db)
            .map_ok(|organization| (organization.id, organization))
            .try_collect()
            .await?;
        Ok(by_id)
    }

    /// Load all the organizations the users are members of, for use in dataloaders
    #[cfg(feature = "graphql")]
    #[instrument(name = "Organization::load_for_user", skip(db))]
    pub(crate) async fn load_for_user(
        user_ids: &[i32],
        db: &PgPool,
    ) -> Result<HashMap<i32, Vec<Organization>>> {
        let by_user = query_as::<_, Membership>(
            r#"
            SELECT organization_members.user_id, organizations.*
            FROM organizations
            INNER JOIN organization_members ON organization_members.organization_id = organizations.id
            WHERE organization_members.user_id = ANY($1)
            ORDER BY organizations.name
            "#,
        )
        .bind(user_ids)
        .fetch(db)
        .try_fold(
            HashMap::<i32, Vec<Organization>>::new(),
            |mut by_user, membership| async move {
                by_user
                    .entry(membership.user_id)
                    .or_default()
                    .push(membership.organization);
                Ok(by_user)
            },
        )
        .await?;
        Ok(by_user)
    }

    /// Check if an organization exists
    #[instrument(name = "Organization::exists", skip(db))]
    pub async fn exists(id: i32, db: &PgPool) -> Result<bool> {
        let (exists,) =
            query_as::<_, (bool,)>("SELECT exists(SELECT 1 FROM organizations WHERE id = $1)")
                .bind(id)
                .fetch_one(db)
                .await?;

        Ok(exists)
    }

    /// Get an organization by it's ID
    #[instrument(name = "Organization::find", skip(db))]
    pub async fn find(id: i32, db: &PgPool) -> Result<Option<Organization>> {
        let organization = query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;

        Ok(organization)
    }

    /// Get an organization by it's name
    #[instrument(name = "Organization::find_by_name", skip(db))]
    pub async fn find_by_name(name: &str, db: &PgPool) -> Result<Option<Organization>> {
        let organization =
            query_as::<_, Organization>("SELECT * FROM organizations WHERE name = $1")
                .bind(name)
                .fetch_optional(db)
                .await?;

        Ok(organization)
    }

    /// Count the organizations matching the filter
    #[instrument(name = "Organization::count", skip(db))]
    pub async fn count(filter: &OrganizationFilter, db: &PgPool) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT count(*) FROM organizations");
        filter.push_conditions(&mut builder);

        let (count,) = builder.build_query_as::<(i64,)>().fetch_one(db).await?;
        Ok(count)
    }

    /// List a page of the organizations matching the filter
    #[instrument(name = "Organization::list", skip(db))]
    pub async fn list(
        filter: &OrganizationFilter,
        args: &PaginationArgs,
        db: &PgPool,
    ) -> Result<Vec<Organization>> {
        let mut builder = Self::list_query(filter, args);
        let organizations = builder
            .build_query_as::<Organization>()
            .fetch_all(db)
            .await?;

        Ok(organizations)
    }

    fn list_query(
        filter: &OrganizationFilter,
        args: &PaginationArgs,
    ) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT * FROM organizations");
        let has_where = filter.push_conditions(&mut builder);
        args.push_conditions(&mut builder, has_where);
        args.push_order_and_limit(&mut builder);
        builder
    }

    /// Create a new organization
    #[instrument(name = "Organization::create", skip(db))]
    pub async fn create<'c, 'e, E>(
        name: &str,
        display_name: Option<&str>,
        db: E,
    ) -> Result<Organization>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let organization = query_as::<_, Organization>(
            "INSERT INTO organizations (name, display_name) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(display_name)
        .fetch_one(db)
        .await?;

        Ok(organization)
    }

    /// Update the organization's fields
    pub fn update(&mut self) -> OrganizationUpdater<'_> {
        OrganizationUpdater::new(self)
    }

    /// Delete an organization
    #[instrument(name = "Organization::delete", skip(db))]
    pub async fn delete(id: i32, db: &PgPool) -> Result<()> {
        query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}

/// Handles updating individual fields of the organization
pub struct OrganizationUpdater<'o> {
    organization: &'o mut Organization,
    name: Option<String>,
    display_name: Option<Option<String>>,
}

impl<'o> OrganizationUpdater<'o> {
    fn new(organization: &'o mut Organization) -> OrganizationUpdater<'o> {
        Self {
            organization,
            name: None,
            display_name: None,
        }
    }

    /// Directly set the name
    pub fn override_name(mut self, name: Option<String>) -> OrganizationUpdater<'o> {
        self.name = name;
        self
    }

    /// Override the display name
    pub fn override_display_name(
        mut self,
        display_name: Option<Option<String>>,
    ) -> OrganizationUpdater<'o> {
        self.display_name = display_name;
        self
    }

    /// Perform the update
    #[instrument(name = "Organization::update", skip_all, fields(self.id = self.organization.id))]
    pub async fn save(self, db: &PgPool) -> Result<()> {
        if self.name.is_none() && self.display_name.is_none() {
            // nothing was changed
            return Ok(());
        }

        let mut builder = QueryBuilder::new("UPDATE organizations SET ");
        let mut separated = builder.separated(", ");

        if let Some(name) = &self.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }

        if let Some(display_name) = &self.display_name {
            separated.push("display_name = ");
            separated.push_bind_unseparated(display_name.clone());
        }

        builder.push(" WHERE id = ");
        builder.push_bind(self.organization.id);
        builder.build().execute(db).await?;

        if let Some(name) = self.name {
            self.organization.name = name;
        }

        if let Some(display_name) = self.display_name {
            self.organization.display_name = display_name;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Organization, OrganizationFilter};
    use crate::pagination::{CursorValue, OrderBy, PaginationArgs};

    #[test]
    fn list_query_by_name_descending() {
        let filter = OrganizationFilter {
            query: Some(String::from("acme")),
        };
        let args = PaginationArgs {
            first: Some(4),
            after: Some(vec![CursorValue::Text(String::from("globex")), CursorValue::Int(2)]),
            order_by: OrderBy::new(["name", "id"]),
            ascending: false,
            ..Default::default()
        };

        let builder = Organization::list_query(&filter, &args);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM organizations WHERE (name ILIKE $1 ESCAPE '\\' OR display_name ILIKE $2 ESCAPE '\\') \
            AND (name, id) < ($3, $4) ORDER BY name DESC, id DESC LIMIT $5"
        );
    }

    #[test]
    fn list_query_backward_without_filter() {
        let args = PaginationArgs {
            last: Some(2),
            before: Some(vec![CursorValue::Int(10)]),
            ..Default::default()
        };

        let builder = Organization::list_query(&OrganizationFilter::default(), &args);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM organizations WHERE (id) < ($1) ORDER BY id DESC LIMIT $2"
        );
    }
}
