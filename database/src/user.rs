use crate::{
    pagination::{contains_pattern, CursorSource, CursorValue, PaginationArgs},
    Result,
};
use chrono::{DateTime, Utc};
#[cfg(feature = "graphql")]
use futures::stream::TryStreamExt;
use sqlx::{query, query_as, Executor, FromRow, Postgres, QueryBuilder};
#[cfg(feature = "graphql")]
use std::collections::HashMap;
use tracing::instrument;

/// A user of the service
#[derive(Clone, Debug, Eq, FromRow, PartialEq)]
pub struct User {
    /// A unique ID
    pub id: i32,
    /// The unique name the user is referred to by
    pub username: String,
    /// The name shown to other users
    pub display_name: Option<String>,
    /// The primary email as selected by the user
    pub primary_email: String,
    /// Whether the user administers the site
    pub site_admin: bool,
    /// When the user was first created
    pub created_at: DateTime<Utc>,
    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl CursorSource for User {
    fn column_value(&self, column: &str) -> Option<CursorValue> {
        let column = column.strip_prefix("users.").unwrap_or(column);
        match column {
            "id" => Some(self.id.into()),
            "username" => Some(self.username.as_str().into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

/// Restricts which users are listed and counted
#[derive(Clone, Debug, Default)]
pub struct UserFilter {
    /// Case-insensitive match against the username or display name
    pub query: Option<String>,
    /// Only users that are (or are not) site admins
    pub site_admin: Option<bool>,
}

impl UserFilter {
    /// Add the filter's conditions to the query, returning whether a `WHERE` clause was started
    fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) -> bool {
        let mut separated = builder.separated(" AND ");
        let mut has_where = false;

        if let Some(query) = &self.query {
            let pattern = contains_pattern(query);
            separated.push_unseparated(" WHERE ");
            separated.push("(username ILIKE ");
            separated.push_bind_unseparated(pattern.clone());
            separated.push_unseparated(r" ESCAPE '\' OR display_name ILIKE ");
            separated.push_bind_unseparated(pattern);
            separated.push_unseparated(r" ESCAPE '\')");
            has_where = true;
        }

        if let Some(site_admin) = self.site_admin {
            if !has_where {
                separated.push_unseparated(" WHERE ");
            }
            separated.push("site_admin = ");
            separated.push_bind_unseparated(site_admin);
            has_where = true;
        }

        has_where
    }
}

impl User {
    /// Load all the users by their IDs, for use in dataloaders
    #[cfg(feature = "graphql")]
    #[instrument(name = "User::load", skip(db))]
    pub(crate) async fn load<'c, 'e, E>(ids: &[i32], db: E) -> Result<HashMap<i32, User>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let by_id = query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch(db)
            .map_ok(|user| (user.id, user))
            .try_collect()
            .await?;
        Ok(by_id)
    }

    /// Load all the users by their usernames, for use in dataloaders
    #[cfg(feature = "graphql")]
    #[instrument(name = "User::load_by_username", skip(db))]
    pub(crate) async fn load_by_username<'c, 'e, E>(
        usernames: &[String],
        db: E,
    ) -> Result<HashMap<String, User>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let by_username = query_as::<_, User>("SELECT * FROM users WHERE username = ANY($1)")
            .bind(usernames)
            .fetch(db)
            .map_ok(|user| (user.username.clone(), user))
            .try_collect()
            .await?;
        Ok(by_username)
    }

    /// Check if a user exists
    #[instrument(name = "User::exists", skip(db))]
    pub async fn exists<'c, 'e, E>(id: i32, db: E) -> Result<bool>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let (exists,) =
            query_as::<_, (bool,)>("SELECT exists(SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(db)
                .await?;

        Ok(exists)
    }

    /// Get a user by it's ID
    #[instrument(name = "User::find", skip(db))]
    pub async fn find<'c, 'e, E>(id: i32, db: E) -> Result<Option<User>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let user = query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Get a user by it's username
    #[instrument(name = "User::find_by_username", skip(db))]
    pub async fn find_by_username<'c, 'e, E>(username: &str, db: E) -> Result<Option<User>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let user = query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Count the users matching the filter
    #[instrument(name = "User::count", skip(db))]
    pub async fn count<'c, 'e, E>(filter: &UserFilter, db: E) -> Result<i64>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let mut builder = QueryBuilder::new("SELECT count(*) FROM users");
        filter.push_conditions(&mut builder);

        let (count,) = builder.build_query_as::<(i64,)>().fetch_one(db).await?;
        Ok(count)
    }

    /// List a page of the users matching the filter
    #[instrument(name = "User::list", skip(db))]
    pub async fn list<'c, 'e, E>(
        filter: &UserFilter,
        args: &PaginationArgs,
        db: E,
    ) -> Result<Vec<User>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let mut builder = Self::list_query(filter, args);
        let users = builder.build_query_as::<User>().fetch_all(db).await?;
        Ok(users)
    }

    fn list_query(filter: &UserFilter, args: &PaginationArgs) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT * FROM users");
        let has_where = filter.push_conditions(&mut builder);
        args.push_conditions(&mut builder, has_where);
        args.push_order_and_limit(&mut builder);
        builder
    }

    /// Count the members of an organization
    #[instrument(name = "User::count_for_organization", skip(db))]
    pub async fn count_for_organization<'c, 'e, E>(organization_id: i32, db: E) -> Result<i64>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let (count,) = query_as::<_, (i64,)>(
            "SELECT count(*) FROM organization_members WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_one(db)
        .await?;
        Ok(count)
    }

    /// List a page of the members of an organization
    ///
    /// Ordering columns must be qualified with the `users` table.
    #[instrument(name = "User::list_for_organization", skip(db))]
    pub async fn list_for_organization<'c, 'e, E>(
        organization_id: i32,
        args: &PaginationArgs,
        db: E,
    ) -> Result<Vec<User>>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let mut builder = Self::list_for_organization_query(organization_id, args);
        let users = builder.build_query_as::<User>().fetch_all(db).await?;
        Ok(users)
    }

    fn list_for_organization_query(
        organization_id: i32,
        args: &PaginationArgs,
    ) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(
            "SELECT users.* FROM users \
            INNER JOIN organization_members ON organization_members.user_id = users.id \
            WHERE organization_members.organization_id = ",
        );
        builder.push_bind(organization_id);
        args.push_conditions(&mut builder, true);
        args.push_order_and_limit(&mut builder);
        builder
    }

    /// Create a new user
    #[instrument(name = "User::create", skip(db))]
    pub async fn create<'c, 'e, E>(
        username: &str,
        display_name: Option<&str>,
        primary_email: &str,
        db: E,
    ) -> Result<User>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        let user = query_as::<_, User>(
            r#"
            INSERT INTO users (username, display_name, primary_email)
            VALUES ($1, $2, $3) RETURNING *
            "#,
        )
        .bind(username)
        .bind(display_name)
        .bind(primary_email)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Update the fields of a user
    pub fn update(&mut self) -> UserUpdater<'_> {
        UserUpdater::new(self)
    }

    /// Delete a user by it's ID
    #[instrument(name = "User::delete", skip(db))]
    pub async fn delete<'c, 'e, E>(id: i32, db: E) -> Result<()>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}

/// Handles updating individual fields of the user
pub struct UserUpdater<'u> {
    user: &'u mut User,
    display_name: Option<Option<String>>,
    primary_email: Option<String>,
    site_admin: Option<bool>,
}

impl<'u> UserUpdater<'u> {
    fn new(user: &'u mut User) -> UserUpdater<'u> {
        Self {
            user,
            display_name: None,
            primary_email: None,
            site_admin: None,
        }
    }

    /// Override the display name
    pub fn override_display_name(
        mut self,
        display_name: Option<Option<String>>,
    ) -> UserUpdater<'u> {
        self.display_name = display_name;
        self
    }

    /// Directly set the primary email
    pub fn override_primary_email(mut self, primary_email: Option<String>) -> UserUpdater<'u> {
        self.primary_email = primary_email;
        self
    }

    /// Directly set whether the user is a site admin
    pub fn override_site_admin(mut self, site_admin: Option<bool>) -> UserUpdater<'u> {
        self.site_admin = site_admin;
        self
    }

    /// Perform the update
    #[instrument(name = "User::update", skip_all, fields(self.id = %self.user.id))]
    pub async fn save<'c, 'e, E>(self, db: E) -> Result<()>
    where
        'c: 'e,
        E: 'e + Executor<'c, Database = Postgres>,
    {
        if self.display_name.is_none() && self.primary_email.is_none() && self.site_admin.is_none()
        {
            // nothing was changed
            return Ok(());
        }

        let mut builder = QueryBuilder::new("UPDATE users SET ");
        let mut separated = builder.separated(", ");

        if let Some(display_name) = &self.display_name {
            separated.push("display_name = ");
            separated.push_bind_unseparated(display_name.clone());
        }

        if let Some(primary_email) = &self.primary_email {
            separated.push("primary_email = ");
            separated.push_bind_unseparated(primary_email.clone());
        }

        if let Some(site_admin) = self.site_admin {
            separated.push("site_admin = ");
            separated.push_bind_unseparated(site_admin);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(self.user.id);
        builder.build().execute(db).await?;

        if let Some(display_name) = self.display_name {
            self.user.display_name = display_name;
        }

        if let Some(primary_email) = self.primary_email {
            self.user.primary_email = primary_email;
        }

        if let Some(site_admin) = self.site_admin {
            self.user.site_admin = site_admin;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{User, UserFilter};
    use crate::pagination::{CursorSource, CursorValue, OrderBy, PaginationArgs};
    use chrono::Utc;

    fn user(id: i32, username: &str) -> User {
        User {
            id,
            username: username.to_owned(),
            display_name: None,
            primary_email: format!("{username}@example.com"),
            site_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn cursor_columns() {
        let user = user(3, "carol");
        assert_eq!(user.column_value("id"), Some(CursorValue::Int(3)));
        assert_eq!(user.column_value("users.id"), Some(CursorValue::Int(3)));
        assert_eq!(
            user.column_value("username"),
            Some(CursorValue::Text(String::from("carol")))
        );
        assert_eq!(
            user.column_value("created_at"),
            Some(CursorValue::Timestamp(user.created_at))
        );
        assert_eq!(user.column_value("primary_email"), None);
    }

    #[test]
    fn list_query_with_filter() {
        let filter = UserFilter {
            query: Some(String::from("ali")),
            site_admin: Some(true),
        };
        let args = PaginationArgs {
            first: Some(11),
            after: Some(vec![CursorValue::Text(String::from("alice")), CursorValue::Int(1)]),
            order_by: OrderBy::new(["username", "id"]),
            ..Default::default()
        };

        let builder = User::list_query(&filter, &args);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM users WHERE (username ILIKE $1 ESCAPE '\\' OR display_name ILIKE $2 ESCAPE '\\') AND site_admin = $3 \
            AND (username, id) > ($4, $5) ORDER BY username ASC, id ASC LIMIT $6"
        );
    }

    #[test]
    fn list_query_site_admin_only() {
        let filter = UserFilter {
            query: None,
            site_admin: Some(false),
        };
        let args = PaginationArgs {
            last: Some(6),
            ..Default::default()
        };

        let builder = User::list_query(&filter, &args);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM users WHERE site_admin = $1 ORDER BY id DESC LIMIT $2"
        );
    }

    #[test]
    fn list_query_without_filter() {
        let args = PaginationArgs {
            first: Some(3),
            ..Default::default()
        };

        let builder = User::list_query(&UserFilter::default(), &args);
        assert_eq!(builder.sql(), "SELECT * FROM users ORDER BY id ASC LIMIT $1");
    }

    #[test]
    fn list_for_organization_query_backward() {
        let args = PaginationArgs {
            last: Some(3),
            before: Some(vec![CursorValue::Int(8)]),
            order_by: OrderBy::new(["users.id"]),
            ..Default::default()
        };

        let builder = User::list_for_organization_query(5, &args);
        assert_eq!(
            builder.sql(),
            "SELECT users.* FROM users \
            INNER JOIN organization_members ON organization_members.user_id = users.id \
            WHERE organization_members.organization_id = $1 \
            AND (users.id) < ($2) ORDER BY users.id DESC LIMIT $3"
        );
    }

    #[test]
    fn list_for_organization_query_forward() {
        let args = PaginationArgs {
            first: Some(3),
            after: Some(vec![CursorValue::Int(8)]),
            order_by: OrderBy::new(["users.id"]),
            ..Default::default()
        };

        let builder = User::list_for_organization_query(5, &args);
        assert_eq!(
            builder.sql(),
            "SELECT users.* FROM users \
            INNER JOIN organization_members ON organization_members.user_id = users.id \
            WHERE organization_members.organization_id = $1 \
            AND (users.id) > ($2) ORDER BY users.id ASC LIMIT $3"
        );
    }
}
