use async_graphql::{
    extensions::{Analyzer, Tracing},
    EmptySubscription, Schema as BaseSchema, SchemaBuilder,
};
use database::{loaders::RegisterDataLoaders, PgPool};

mod auth;
pub mod connection;
mod errors;
mod mutation;
mod objects;
mod query;
mod stores;

pub use auth::Actor;
use mutation::Mutation;
use query::Query;

/// The graphql schema for the service
pub type Schema = BaseSchema<Query, Mutation, EmptySubscription>;

/// Create a schema builder with the necessary extensions
fn builder() -> SchemaBuilder<Query, Mutation, EmptySubscription> {
    Schema::build(Query, Mutation::default(), EmptySubscription)
        .extension(Tracing)
        .extension(Analyzer)
}

/// Build the schema with the necessary extensions
///
/// The [`Actor`] making each request must be attached to the request's data, otherwise the
/// request is treated as anonymous.
pub fn schema(db: PgPool) -> Schema {
    builder().register_dataloaders(&db).data(db).finish()
}

/// Export the GraphQL schema
pub fn sdl() -> String {
    builder().finish().sdl()
}

#[cfg(test)]
mod tests {
    use super::{schema, sdl, Actor};
    use crate::stores::tests::lazy_pool;
    use async_graphql::Request;
    use serde_json::{json, Value};

    const ADMIN: Actor = Actor::User {
        id: 1,
        site_admin: true,
    };
    const USER: Actor = Actor::User {
        id: 2,
        site_admin: false,
    };

    async fn execute(query: &str, actor: Option<Actor>) -> Value {
        let mut request = Request::new(query);
        if let Some(actor) = actor {
            request = request.data(actor);
        }

        let response = schema(lazy_pool()).execute(request).await;
        serde_json::to_value(&response).unwrap()
    }

    fn code(response: &Value) -> &str {
        response["errors"][0]["extensions"]["code"]
            .as_str()
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn anonymous_current_user_is_null() {
        let response = execute("{ currentUser { id } }", None).await;
        assert_eq!(response["data"], json!({ "currentUser": null }));
    }

    #[tokio::test]
    async fn listing_users_requires_authentication() {
        let response = execute("{ users(first: 10) { totalCount } }", None).await;
        assert_eq!(code(&response), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn listing_users_requires_site_admin() {
        let response = execute("{ users(first: 10) { totalCount } }", Some(USER)).await;
        assert_eq!(code(&response), "FORBIDDEN");

        let response = execute("{ organizations(first: 10) { totalCount } }", Some(USER)).await;
        assert_eq!(code(&response), "FORBIDDEN");
    }

    #[tokio::test]
    async fn conflicting_pagination_arguments() {
        let response = execute(
            "{ users(first: 10, last: 10) { nodes { id } } }",
            Some(ADMIN),
        )
        .await;
        assert_eq!(code(&response), "INVALID_ARGUMENTS");

        let response = execute("{ organizations { nodes { id } } }", Some(ADMIN)).await;
        assert_eq!(code(&response), "INVALID_ARGUMENTS");
    }

    #[tokio::test]
    async fn malformed_cursor() {
        let response = execute(
            r#"{ users(first: 10, after: "not-a-cursor") { nodes { id } } }"#,
            Some(ADMIN),
        )
        .await;
        assert_eq!(code(&response), "INVALID_CURSOR");
    }

    #[tokio::test]
    async fn cursor_for_another_ordering() {
        let cursor = relay::marshal(
            "UserCursor",
            &json!({ "columns": ["id"], "values": [{ "type": "int", "value": 4 }] }),
        )
        .unwrap();
        let query = format!(
            r#"{{ users(first: 10, after: "{cursor}", orderBy: USERNAME) {{ nodes {{ id }} }} }}"#
        );

        let response = execute(&query, Some(ADMIN)).await;
        assert_eq!(code(&response), "INVALID_CURSOR");
    }

    #[tokio::test]
    async fn malformed_node_id() {
        let response = execute(r#"{ node(id: "garbage!") { __typename } }"#, Some(ADMIN)).await;
        assert_eq!(code(&response), "INVALID_ID");
    }

    #[tokio::test]
    async fn unknown_node_kind() {
        let id = relay::marshal_id("Repository", 1);
        let query = format!(r#"{{ node(id: "{id}") {{ __typename }} }}"#);

        let response = execute(&query, Some(ADMIN)).await;
        assert_eq!(response["data"], json!({ "node": null }));
    }

    #[tokio::test]
    async fn user_lookup_rejects_organization_ids() {
        let id = relay::marshal_id("Organization", 1);
        let query = format!(r#"{{ user(by: {{ id: "{id}" }}) {{ username }} }}"#);

        let response = execute(&query, None).await;
        assert_eq!(code(&response), "INVALID_ID");
    }

    #[tokio::test]
    async fn mutations_check_permissions_first() {
        let id = relay::marshal_id("User", 2);
        let query = format!(
            r#"mutation {{ updateUser(input: {{ id: "{id}", siteAdmin: true }}) {{ user {{ id }} }} }}"#
        );

        let response = execute(&query, Some(USER)).await;
        assert_eq!(code(&response), "FORBIDDEN");

        let response = execute(
            r#"mutation { createOrganization(input: { name: "acme" }) { organization { id } } }"#,
            None,
        )
        .await;
        assert_eq!(code(&response), "UNAUTHORIZED");
    }

    #[test]
    fn exported_schema_has_connections() {
        let sdl = sdl();
        for ty in [
            "type UserConnection",
            "type OrganizationConnection",
            "type OrganizationMemberConnection",
            "type PageInfo",
            "union Node",
        ] {
            assert!(sdl.contains(ty), "missing {ty}");
        }
    }
}
