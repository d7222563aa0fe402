use super::*;

use axum::http;
use hyper::{Request, StatusCode};
use serial_test::serial;
use tower::ServiceExt;

use campus_events_shared::account::handle::{AccountLoginDescriptor, ChangePasswordDescriptor, RegisterDescriptor};

fn register_descriptor(username: &str, role: Role, staff_code: Option<&str>) -> RegisterDescriptor {
    RegisterDescriptor {
        username: username.to_string(),
        email: lettre::Address::new(username, "campus.edu").unwrap(),
        first_name: "Alice".to_string(),
        last_name: "Woods".to_string(),
        password: "Secret#2026".to_string(),
        phone: 1919810,
        department: "CSE".to_string(),
        role,
        staff_code: staff_code.map(str::to_string),
    }
}

#[serial]
#[tokio::test]
async fn register_and_login() {
    reset_all();

    let app = crate::router();

    let descriptor = register_descriptor("alice", Role::Student, None);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/account/register")
                .method("POST")
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(serde_json::to_vec(&descriptor).unwrap().into())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // the same username could not be registered twice
    let descriptor = register_descriptor("alice", Role::Student, None);

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/register")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(serde_json::to_vec(&descriptor).unwrap().into())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::CONFLICT
    );

    let descriptor = AccountLoginDescriptor {
        username: "alice".to_string(),
        password: "wrong password".to_string(),
    };

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/login")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(serde_json::to_vec(&descriptor).unwrap().into())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::FORBIDDEN
    );

    let descriptor = AccountLoginDescriptor {
        username: "alice".to_string(),
        password: "Secret#2026".to_string(),
    };

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/account/login")
                .method("POST")
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(serde_json::to_vec(&descriptor).unwrap().into())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let response_json: serde_json::Value =
        serde_json::from_slice(&hyper::body::to_bytes(response.into_body()).await.unwrap())
            .unwrap();

    let obj = response_json.as_object().unwrap();
    assert!(obj.get("token").is_some());
    assert_eq!(
        obj.get("account_id").unwrap().as_u64().unwrap(),
        crate::account::id_of("alice")
    );
    assert_eq!(
        obj.get("user")
            .unwrap()
            .as_object()
            .unwrap()
            .get("role")
            .unwrap()
            .as_str()
            .unwrap(),
        "student"
    );
}

#[serial]
#[tokio::test]
async fn register_staff_code() {
    reset_all();

    let app = crate::router();

    let descriptor = register_descriptor("bob", Role::Staff, Some("wrong code"));

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/register")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(serde_json::to_vec(&descriptor).unwrap().into())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::FORBIDDEN
    );

    let descriptor = register_descriptor(
        "bob",
        Role::Staff,
        Some(crate::config::INSTANCE.staff_code.as_str()),
    );

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/register")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(serde_json::to_vec(&descriptor).unwrap().into())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::OK
    );

    // administrators are never self-registered
    let descriptor = register_descriptor("carol", Role::Admin, None);

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/register")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(serde_json::to_vec(&descriptor).unwrap().into())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::FORBIDDEN
    );
}

#[serial]
#[tokio::test]
async fn register_weak_password() {
    reset_all();

    let app = crate::router();

    let mut descriptor = register_descriptor("alice", Role::Student, None);
    descriptor.password = "lowercase".to_string();

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/register")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(serde_json::to_vec(&descriptor).unwrap().into())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::BAD_REQUEST
    );

    assert!(crate::account::INSTANCE.inner().read().is_empty());
}

#[serial]
#[tokio::test]
async fn change_password() {
    reset_all();

    let app = crate::router();

    let (account_id, token) = push_account("alice", Role::Student, "CSE", "Secret#2026");

    let descriptor = ChangePasswordDescriptor {
        old: "wrong password".to_string(),
        new: "Replaced#2026".to_string(),
    };

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/change-password")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .header("Token", &token)
                    .header("AccountId", account_id)
                    .body(serde_json::to_vec(&descriptor).unwrap().into())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::FORBIDDEN
    );

    let descriptor = ChangePasswordDescriptor {
        old: "Secret#2026".to_string(),
        new: "Replaced#2026".to_string(),
    };

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/change-password")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .header("Token", &token)
                    .header("AccountId", account_id)
                    .body(serde_json::to_vec(&descriptor).unwrap().into())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::OK
    );

    let descriptor = AccountLoginDescriptor {
        username: "alice".to_string(),
        password: "Replaced#2026".to_string(),
    };

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/login")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(serde_json::to_vec(&descriptor).unwrap().into())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::OK
    );
}

#[serial]
#[tokio::test]
async fn vanished_account_is_not_found() {
    reset_all();

    // a context whose account was removed after extraction
    let ctx = || crate::RequirePermissionContext {
        token: "stale".to_string(),
        account_id: 42,
    };

    let (status, _) = crate::account::handle::logout_account(ctx()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(
        crate::account::handle::view_account(ctx())
            .await
            .err()
            .unwrap()
            .0,
        StatusCode::NOT_FOUND
    );

    let (status, _) = crate::account::handle::change_password(
        ctx(),
        axum::Json(ChangePasswordDescriptor {
            old: "Secret#2026".to_string(),
            new: "Replaced#2026".to_string(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[serial]
#[tokio::test]
async fn logout() {
    reset_all();

    let app = crate::router();

    let (account_id, token) = push_account("alice", Role::Student, "CSE", "Secret#2026");

    assert_eq!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/logout")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .header("Token", &token)
                    .header("AccountId", account_id)
                    .body(hyper::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::OK
    );

    // the token is no longer usable
    assert_ne!(
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/account/view")
                    .method("POST")
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .header("Token", &token)
                    .header("AccountId", account_id)
                    .body(hyper::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status(),
        StatusCode::OK
    );
}
