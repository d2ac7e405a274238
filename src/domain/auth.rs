use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::external_connections::ExternalConnectivity;

/// Cost factor applied to stored password hashes.
const HASH_COST: u32 = 10;
/// Lifetime of an issued session token.
const TOKEN_TTL_DAYS: i64 = 1;

/// A registered user, as exposed to the rest of the system. The password hash
/// never leaves the auth module.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct User {
    pub id: i64,
    pub email: String,
}

/// A user's stored credential record, fetched for password verification.
#[cfg_attr(test, derive(Clone))]
pub struct UserCredentials {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

/// Data needed to persist a new user.
#[cfg_attr(test, derive(Clone))]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
}

/// The result of a successful login.
#[cfg_attr(test, derive(Clone, Debug))]
pub struct LoginSuccess {
    pub token: String,
    pub user: User,
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader: Sync {
        async fn user_by_email(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<UserCredentials>, anyhow::Error>;
    }

    pub trait UserWriter: Sync {
        async fn create_user(
            &self,
            user: &CreateUser,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum RegisterError {
        #[error("a user with this email is already registered")]
        EmailInUse,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum LoginError {
        #[error("invalid credentials")]
        BadCredentials,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait AuthPort {
        async fn register(
            &self,
            email: &str,
            password: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            u_read: &impl driven_ports::UserReader,
            u_write: &impl driven_ports::UserWriter,
        ) -> Result<User, RegisterError>;

        async fn login(
            &self,
            email: &str,
            password: &str,
            signer: &TokenSigner,
            ext_cxn: &mut impl ExternalConnectivity,
            u_read: &impl driven_ports::UserReader,
        ) -> Result<LoginSuccess, LoginError>;
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid,
}

/// JWT claims carried by a session token. Wire names match the API contract.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: i64,
    exp: i64,
}

/// Issues and verifies the signed session tokens handed out at login. Tokens
/// embed the user's ID and expire after [TOKEN_TTL_DAYS]; nothing is persisted
/// server-side, so validity is purely cryptographic and time-based.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str) -> TokenSigner {
        TokenSigner {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Produces a signed token embedding the given user ID.
    pub fn issue(&self, user_id: i64) -> Result<String, anyhow::Error> {
        let claims = Claims {
            user_id,
            exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .context("signing a session token")
    }

    /// Returns the user ID embedded in the token, or [TokenError::Invalid] if
    /// the signature doesn't check out or the token expired.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let decoded =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
                .map_err(|_| TokenError::Invalid)?;

        Ok(decoded.claims.user_id)
    }
}

pub struct AuthService {}

impl driving_ports::AuthPort for AuthService {
    async fn register(
        &self,
        email: &str,
        password: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        u_read: &impl driven_ports::UserReader,
        u_write: &impl driven_ports::UserWriter,
    ) -> Result<User, driving_ports::RegisterError> {
        let existing_user = u_read
            .user_by_email(email, &mut *ext_cxn)
            .await
            .context("looking up email during registration")?;
        if existing_user.is_some() {
            return Err(driving_ports::RegisterError::EmailInUse);
        }

        let password_hash =
            bcrypt::hash(password, HASH_COST).context("hashing a new user's password")?;
        let new_user = CreateUser {
            email: email.to_owned(),
            password_hash,
        };
        let new_id = u_write
            .create_user(&new_user, &mut *ext_cxn)
            .await
            .context("persisting a new user")?;

        Ok(User {
            id: new_id,
            email: new_user.email,
        })
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        signer: &TokenSigner,
        ext_cxn: &mut impl ExternalConnectivity,
        u_read: &impl driven_ports::UserReader,
    ) -> Result<LoginSuccess, driving_ports::LoginError> {
        let Some(credentials) = u_read
            .user_by_email(email, &mut *ext_cxn)
            .await
            .context("looking up email during login")?
        else {
            return Err(driving_ports::LoginError::BadCredentials);
        };

        let password_matches = bcrypt::verify(password, &credentials.password_hash)
            .context("verifying a login password")?;
        if !password_matches {
            return Err(driving_ports::LoginError::BadCredentials);
        }

        let token = signer
            .issue(credentials.id)
            .context("issuing a session token at login")?;

        Ok(LoginSuccess {
            token,
            user: User {
                id: credentials.id,
                email: credentials.email,
            },
        })
    }
}
