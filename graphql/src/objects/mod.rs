use async_graphql::Union;

mod organization;
mod user;

pub(crate) use organization::OrganizationResolver;
pub(crate) use user::UserResolver;

/// An object with a globally unique ID
#[derive(Debug, Union)]
pub(crate) enum Node {
    Organization(OrganizationResolver),
    User(UserResolver),
}
