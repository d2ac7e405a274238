use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use crate::routing_utils::{
    ApiResponse, GenericErrorResponse, Json, ValidationErrorResponse, error_response,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::post;
use domain::auth::driving_ports::{AuthPort, LoginError, RegisterError};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(register_user, login_user))]
pub struct AuthApi;

/// Builds a router for the authentication endpoints
pub fn auth_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/register",
            post(
                |State(app_state): AppState, Json(new_user): Json<dto::user::RegisterUser>| async move {
                    let auth_service = domain::auth::AuthService {};

                    register_user(new_user, &app_state.ext_cxn, &auth_service).await
                },
            ),
        )
        .route(
            "/login",
            post(
                |State(app_state): AppState, Json(credentials): Json<dto::user::LoginUser>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let auth_service = domain::auth::AuthService {};

                    login_user(credentials, &app_state.token_signer, &mut ext_cxn, &auth_service)
                        .await
                },
            ),
        )
}

/// Registers a new user account. The duplicate check and the insert run in a
/// single transaction so concurrent registrations cannot both succeed.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = crate::dto::user::RegisterUser,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid credentials payload, or email already registered", body = crate::routing_utils::ErrorBody),
    ),
)]
async fn register_user(
    new_user: dto::user::RegisterUser,
    ext_cxn: &impl Transactable,
    auth_service: &impl AuthPort,
) -> Result<(StatusCode, ApiResponse<dto::user::AuthenticatedUser>), ErrorResponse> {
    info!("Registration attempt for {}", new_user.email);
    new_user.validate().map_err(ValidationErrorResponse::from)?;

    let mut txn = ext_cxn
        .start_transaction()
        .await
        .map_err(GenericErrorResponse)?;

    let user_reader = persistence::db_user_driven_ports::DbUserReader {};
    let user_writer = persistence::db_user_driven_ports::DbUserWriter {};

    let registered_user = auth_service
        .register(
            &new_user.email,
            &new_user.password,
            &mut txn,
            &user_reader,
            &user_writer,
        )
        .await
        .map_err(|register_err| -> ErrorResponse {
            match register_err {
                RegisterError::EmailInUse => {
                    error_response(StatusCode::BAD_REQUEST, "Email already registered").into()
                }
                RegisterError::PortError(port_err) => {
                    error!("User registration failure: {port_err}");
                    GenericErrorResponse(port_err).into()
                }
            }
        })?;

    txn.commit().await.map_err(GenericErrorResponse)?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success("User registered successfully", registered_user.into()),
    ))
}

/// Verifies a user's credentials and issues a session token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = crate::dto::user::LoginUser,
    responses(
        (status = 200, description = "Login succeeded", body = crate::dto::user::LoginData),
        (status = 401, description = "Unknown email or wrong password", body = crate::routing_utils::ErrorBody),
    ),
)]
async fn login_user(
    credentials: dto::user::LoginUser,
    token_signer: &domain::auth::TokenSigner,
    ext_cxn: &mut impl ExternalConnectivity,
    auth_service: &impl AuthPort,
) -> Result<ApiResponse<dto::user::LoginData>, ErrorResponse> {
    info!("Login attempt for {}", credentials.email);
    credentials
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let user_reader = persistence::db_user_driven_ports::DbUserReader {};

    let login_success = auth_service
        .login(
            &credentials.email,
            &credentials.password,
            token_signer,
            &mut *ext_cxn,
            &user_reader,
        )
        .await
        .map_err(|login_err| -> ErrorResponse {
            match login_err {
                LoginError::BadCredentials => {
                    error_response(StatusCode::UNAUTHORIZED, "Invalid credentials").into()
                }
                LoginError::PortError(port_err) => {
                    error!("Login failure: {port_err}");
                    GenericErrorResponse(port_err).into()
                }
            }
        })?;

    Ok(ApiResponse::success("Login successful", login_success.into()))
}
