use super::auth_api::json_request;
use super::test_util::prepare_app_and_test;
use crate::api::test_util::deserialize_body;
use crate::dto;
use crate::routing_utils::ApiResponse;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

/// Registers an account and returns its session token.
async fn register_and_log_in(app: &Router, email: &str) -> String {
    let register_response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            json!({ "email": email, "password": "hunter22" }),
        ))
        .await
        .expect("registration request failed");
    assert_eq!(StatusCode::CREATED, register_response.status());

    let login_response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "email": email, "password": "hunter22" }),
        ))
        .await
        .expect("login request failed");
    let logged_in: ApiResponse<dto::user::LoginData> =
        deserialize_body(login_response.into_body()).await;

    logged_in.data.token
}

fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build")
}

async fn create_task(app: &Router, token: &str, title: &str) -> dto::task::Task {
    let create_response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/tasks",
            token,
            json!({ "title": title }),
        ))
        .await
        .expect("task creation request failed");
    assert_eq!(StatusCode::CREATED, create_response.status());

    let created: ApiResponse<dto::task::Task> =
        deserialize_body(create_response.into_body()).await;

    created.data
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn rejects_requests_without_a_token() {
    prepare_app_and_test(|app| async move {
        let list_response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/tasks")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("task list request failed");

        assert_eq!(StatusCode::UNAUTHORIZED, list_response.status());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn created_tasks_appear_in_the_listing() {
    prepare_app_and_test(|app| async move {
        let token = register_and_log_in(&app, "jdoe@example.com").await;

        let created = create_task(&app, &token, "Buy milk").await;
        assert_eq!("Buy milk", created.title);
        assert!(!created.completed);

        let list_response = app
            .oneshot(authed_request("GET", "/tasks", &token))
            .await
            .expect("task list request failed");
        assert_eq!(StatusCode::OK, list_response.status());

        let page: ApiResponse<dto::task::TaskPage> =
            deserialize_body(list_response.into_body()).await;
        assert_eq!(1, page.data.pagination.total);
        assert!(matches!(page.data.tasks.as_slice(), [task] if task.id == created.id));
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn filtering_and_pagination_apply_to_listings() {
    prepare_app_and_test(|app| async move {
        let token = register_and_log_in(&app, "jdoe@example.com").await;

        for task_num in 1..=12 {
            create_task(&app, &token, &format!("chore {task_num}")).await;
        }
        let milk_task = create_task(&app, &token, "Buy milk").await;

        // Mark one task complete, then slice by status
        let complete_response = app
            .clone()
            .oneshot(authed_json_request(
                "PUT",
                &format!("/tasks/{}", milk_task.id),
                &token,
                json!({ "completed": true }),
            ))
            .await
            .expect("task update request failed");
        assert_eq!(StatusCode::OK, complete_response.status());

        let completed_response = app
            .clone()
            .oneshot(authed_request("GET", "/tasks?status=completed", &token))
            .await
            .expect("task list request failed");
        let completed_page: ApiResponse<dto::task::TaskPage> =
            deserialize_body(completed_response.into_body()).await;
        assert_eq!(1, completed_page.data.pagination.total);
        assert_eq!(milk_task.id, completed_page.data.tasks[0].id);

        let second_page_response = app
            .clone()
            .oneshot(authed_request("GET", "/tasks?page=2&limit=10", &token))
            .await
            .expect("task list request failed");
        let second_page: ApiResponse<dto::task::TaskPage> =
            deserialize_body(second_page_response.into_body()).await;
        assert_eq!(13, second_page.data.pagination.total);
        assert_eq!(2, second_page.data.pagination.total_pages);
        assert_eq!(3, second_page.data.tasks.len());

        let search_response = app
            .oneshot(authed_request("GET", "/tasks?search=milk", &token))
            .await
            .expect("task list request failed");
        let search_page: ApiResponse<dto::task::TaskPage> =
            deserialize_body(search_response.into_body()).await;
        assert_eq!(1, search_page.data.pagination.total);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn pages_partition_tasks_with_tied_sort_values() {
    prepare_app_and_test(|app| async move {
        let token = register_and_log_in(&app, "jdoe@example.com").await;

        // Identical titles force the listing to fall back to the ID tiebreaker
        for _ in 0..15 {
            create_task(&app, &token, "identical chore").await;
        }

        let mut seen_ids: Vec<i64> = Vec::new();
        for page_num in 1..=2 {
            let page_response = app
                .clone()
                .oneshot(authed_request(
                    "GET",
                    &format!("/tasks?sortBy=title&order=asc&page={page_num}&limit=10"),
                    &token,
                ))
                .await
                .expect("task list request failed");
            let page: ApiResponse<dto::task::TaskPage> =
                deserialize_body(page_response.into_body()).await;
            assert_eq!(15, page.data.pagination.total);
            seen_ids.extend(page.data.tasks.iter().map(|task| task.id));
        }

        seen_ids.sort_unstable();
        seen_ids.dedup();
        assert_eq!(15, seen_ids.len());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn tasks_cannot_be_touched_by_other_users() {
    prepare_app_and_test(|app| async move {
        let owner_token = register_and_log_in(&app, "owner@example.com").await;
        let intruder_token = register_and_log_in(&app, "intruder@example.com").await;

        let task = create_task(&app, &owner_token, "private business").await;

        let update_response = app
            .clone()
            .oneshot(authed_json_request(
                "PUT",
                &format!("/tasks/{}", task.id),
                &intruder_token,
                json!({ "title": "hijacked" }),
            ))
            .await
            .expect("task update request failed");
        assert_eq!(StatusCode::UNAUTHORIZED, update_response.status());

        let delete_response = app
            .clone()
            .oneshot(authed_request(
                "DELETE",
                &format!("/tasks/{}", task.id),
                &intruder_token,
            ))
            .await
            .expect("task deletion request failed");
        assert_eq!(StatusCode::UNAUTHORIZED, delete_response.status());

        // The intruder's listing must not include the task either
        let intruder_list_response = app
            .oneshot(authed_request("GET", "/tasks", &intruder_token))
            .await
            .expect("task list request failed");
        let intruder_page: ApiResponse<dto::task::TaskPage> =
            deserialize_body(intruder_list_response.into_body()).await;
        assert_eq!(0, intruder_page.data.pagination.total);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn deleting_a_missing_task_is_not_found() {
    prepare_app_and_test(|app| async move {
        let token = register_and_log_in(&app, "jdoe@example.com").await;

        let delete_response = app
            .oneshot(authed_request("DELETE", "/tasks/999999", &token))
            .await
            .expect("task deletion request failed");

        assert_eq!(StatusCode::NOT_FOUND, delete_response.status());
    });
}
