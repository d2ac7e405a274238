use crate::domain;
use crate::domain::auth::{CreateUser, UserCredentials};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::query_as;

pub struct DbUserReader;

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    id: i64,
    email: String,
    password_hash: String,
}

impl From<UserCredentialsRow> for UserCredentials {
    fn from(value: UserCredentialsRow) -> Self {
        UserCredentials {
            id: value.id,
            email: value.email,
            password_hash: value.password_hash,
        }
    }
}

impl domain::auth::driven_ports::UserReader for DbUserReader {
    async fn user_by_email(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<UserCredentials>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let user_row = query_as::<_, UserCredentialsRow>(
            "SELECT au.id, au.email, au.password_hash FROM app_user au WHERE au.email = $1",
        )
        .bind(email)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a user by email")?;

        Ok(user_row.map(UserCredentials::from))
    }
}

pub struct DbUserWriter;

impl domain::auth::driven_ports::UserWriter for DbUserWriter {
    async fn create_user(
        &self,
        user: &CreateUser,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i64, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let new_id = query_as::<_, super::NewId>(
            "INSERT INTO app_user(email, password_hash) VALUES ($1, $2) RETURNING app_user.id",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new user into the database")?;

        Ok(new_id.id)
    }
}
