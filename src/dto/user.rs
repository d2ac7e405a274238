use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Credentials submitted to create a new account.
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Credentials submitted to log in.
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A user as exposed through the API, without credential data.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
}

impl From<domain::auth::User> for AuthenticatedUser {
    fn from(value: domain::auth::User) -> Self {
        AuthenticatedUser {
            id: value.id,
            email: value.email,
        }
    }
}

/// Payload returned from a successful login: the session token plus the
/// authenticated user.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub user: AuthenticatedUser,
}

impl From<domain::auth::LoginSuccess> for LoginData {
    fn from(value: domain::auth::LoginSuccess) -> Self {
        LoginData {
            token: value.token,
            user: value.user.into(),
        }
    }
}
