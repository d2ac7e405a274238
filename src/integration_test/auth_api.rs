use super::test_util::prepare_app_and_test;
use crate::api::test_util::deserialize_body;
use crate::dto;
use crate::routing_utils::{ApiResponse, ErrorBody};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn can_register_and_log_in() {
    prepare_app_and_test(|app| async move {
        let register_response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/register",
                json!({ "email": "jdoe@example.com", "password": "hunter22" }),
            ))
            .await
            .expect("registration request failed");
        assert_eq!(StatusCode::CREATED, register_response.status());

        let registered: ApiResponse<dto::user::AuthenticatedUser> =
            deserialize_body(register_response.into_body()).await;
        assert!(registered.success);
        assert_eq!("jdoe@example.com", registered.data.email);

        let login_response = app
            .oneshot(json_request(
                "POST",
                "/auth/login",
                json!({ "email": "jdoe@example.com", "password": "hunter22" }),
            ))
            .await
            .expect("login request failed");
        assert_eq!(StatusCode::OK, login_response.status());

        let logged_in: ApiResponse<dto::user::LoginData> =
            deserialize_body(login_response.into_body()).await;
        assert!(!logged_in.data.token.is_empty());
        assert_eq!(registered.data.id, logged_in.data.user.id);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn rejects_duplicate_registration() {
    prepare_app_and_test(|app| async move {
        let first_response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/register",
                json!({ "email": "jdoe@example.com", "password": "hunter22" }),
            ))
            .await
            .expect("registration request failed");
        assert_eq!(StatusCode::CREATED, first_response.status());

        let second_response = app
            .oneshot(json_request(
                "POST",
                "/auth/register",
                json!({ "email": "jdoe@example.com", "password": "different" }),
            ))
            .await
            .expect("registration request failed");
        assert_eq!(StatusCode::BAD_REQUEST, second_response.status());

        let body: ErrorBody = deserialize_body(second_response.into_body()).await;
        assert_eq!("Email already registered", body.error);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn rejects_a_wrong_password() {
    prepare_app_and_test(|app| async move {
        let register_response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/register",
                json!({ "email": "jdoe@example.com", "password": "hunter22" }),
            ))
            .await
            .expect("registration request failed");
        assert_eq!(StatusCode::CREATED, register_response.status());

        let login_response = app
            .oneshot(json_request(
                "POST",
                "/auth/login",
                json!({ "email": "jdoe@example.com", "password": "wrong" }),
            ))
            .await
            .expect("login request failed");
        assert_eq!(StatusCode::UNAUTHORIZED, login_response.status());
    });
}
