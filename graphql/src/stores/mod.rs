//! The database-backed stores for each paginated field

mod members;
mod organizations;
mod users;

pub(crate) use members::{MemberConnectionStore, OrganizationMemberConnection};
pub(crate) use organizations::{
    OrganizationConnection, OrganizationConnectionStore, OrganizationOrderBy,
};
pub(crate) use users::{UserConnection, UserConnectionStore, UserOrderBy};

/// Convert a database count into a GraphQL `Int`
fn saturating_total(count: i64) -> Option<i32> {
    Some(i32::try_from(count).unwrap_or(i32::MAX))
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{TimeZone, Utc};
    use database::{Organization, PgPool, User};

    /// A pool that never connects unless a query is run
    pub fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://postgres@localhost/directory").unwrap()
    }

    pub fn user(id: i32, username: &str) -> User {
        let at = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        User {
            id,
            username: username.to_owned(),
            display_name: None,
            primary_email: format!("{username}@example.com"),
            site_admin: false,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn organization(id: i32, name: &str) -> Organization {
        let at = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        Organization {
            id,
            name: name.to_owned(),
            display_name: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn totals_saturate() {
        assert_eq!(super::saturating_total(12), Some(12));
        assert_eq!(super::saturating_total(i64::MAX), Some(i32::MAX));
    }
}
