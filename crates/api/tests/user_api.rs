//! HTTP-level integration tests for the `/api/users` resource.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, delete_auth, get_auth, get_with_cookie, login, patch_json_auth,
    post_json, post_json_auth, PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;
use sitelog_core::roles::{ROLE_CODE_ADMIN, ROLE_CODE_REGULAR, ROLE_CODE_SUPER_ADMIN};

// ---------------------------------------------------------------------------
// Create / list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn super_admin_creates_users_defaulting_to_admin(pool: PgPool) {
    create_user(&pool, "super01", ROLE_CODE_SUPER_ADMIN).await;
    let test = common::build_test_app(pool);
    let (root, _) = login(test.app(), "super01", PASSWORD).await;

    let body = json!({ "username": "admin01", "password": "Welcome9" });
    let response = post_json_auth(test.app(), "/api/users", &root, body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Create User Success");
    assert_eq!(json["data"]["username"], "admin01");
    assert_eq!(json["data"]["role"], ROLE_CODE_ADMIN);
    assert_eq!(json["data"]["role_name"], "admin");
    assert!(json["data"].get("password_hash").is_none());

    login(test.app(), "admin01", "Welcome9").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_duplicates_and_weak_input(pool: PgPool) {
    create_user(&pool, "super01", ROLE_CODE_SUPER_ADMIN).await;
    create_user(&pool, "admin01", ROLE_CODE_ADMIN).await;
    let test = common::build_test_app(pool);
    let (root, _) = login(test.app(), "super01", PASSWORD).await;

    let body = json!({ "username": "admin01", "password": "Welcome9" });
    let response = post_json_auth(test.app(), "/api/users", &root, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Username already exists");

    let body = json!({ "username": "bad name", "password": "Welcome9" });
    let response = post_json_auth(test.app(), "/api/users", &root, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "Username must be 5-50 characters and contain only letters and digits"
    );

    let body = json!({ "username": "admin02", "password": "weakpass" });
    let response = post_json_auth(test.app(), "/api/users", &root, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "username": "admin02", "password": "Welcome9", "role": 7 });
    let response = post_json_auth(test.app(), "/api/users", &root, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid role");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_super_admin_lists_and_creates(pool: PgPool) {
    create_user(&pool, "super01", ROLE_CODE_SUPER_ADMIN).await;
    create_user(&pool, "admin01", ROLE_CODE_ADMIN).await;
    create_user(&pool, "user01", ROLE_CODE_REGULAR).await;
    let test = common::build_test_app(pool);
    let (root, _) = login(test.app(), "super01", PASSWORD).await;
    let (admin, _) = login(test.app(), "admin01", PASSWORD).await;

    let response = get_auth(test.app(), "/api/users", &admin).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json!({ "username": "admin02", "password": "Welcome9" });
    let response = post_json_auth(test.app(), "/api/users", &admin, body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(test.app(), "/api/users", &root).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["recordsTotal"], 3);

    let response = get_auth(test.app(), &format!("/api/users?role={ROLE_CODE_REGULAR}"), &root).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["users"][0]["username"], "user01");
}

// ---------------------------------------------------------------------------
// Read / update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn users_read_themselves_only(pool: PgPool) {
    let admin_id = create_user(&pool, "admin01", ROLE_CODE_ADMIN).await;
    let other_id = create_user(&pool, "admin02", ROLE_CODE_ADMIN).await;
    create_user(&pool, "super01", ROLE_CODE_SUPER_ADMIN).await;
    let test = common::build_test_app(pool);
    let (admin, _) = login(test.app(), "admin01", PASSWORD).await;
    let (root, _) = login(test.app(), "super01", PASSWORD).await;

    let response = get_auth(test.app(), &format!("/api/users/{admin_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "admin01");

    let response = get_auth(test.app(), &format!("/api/users/{other_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(test.app(), &format!("/api/users/{other_id}"), &root).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(test.app(), "/api/users/abc", &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid user id");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn self_update_renames_but_keeps_role(pool: PgPool) {
    let admin_id = create_user(&pool, "admin01", ROLE_CODE_ADMIN).await;
    create_user(&pool, "admin02", ROLE_CODE_ADMIN).await;
    let test = common::build_test_app(pool);
    let (admin, _) = login(test.app(), "admin01", PASSWORD).await;
    let uri = format!("/api/users/{admin_id}");

    let body = json!({ "username": "builder01", "role": ROLE_CODE_SUPER_ADMIN });
    let response = patch_json_auth(test.app(), &uri, &admin, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "builder01");
    assert_eq!(json["data"]["role"], ROLE_CODE_ADMIN);

    let body = json!({ "username": "admin02" });
    let response = patch_json_auth(test.app(), &uri, &admin, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn super_admin_changes_roles(pool: PgPool) {
    let admin_id = create_user(&pool, "admin01", ROLE_CODE_ADMIN).await;
    create_user(&pool, "super01", ROLE_CODE_SUPER_ADMIN).await;
    let test = common::build_test_app(pool);
    let (admin, _) = login(test.app(), "admin01", PASSWORD).await;
    let (root, _) = login(test.app(), "super01", PASSWORD).await;

    let body = json!({ "username": "admin01", "role": ROLE_CODE_REGULAR });
    let response = patch_json_auth(test.app(), &format!("/api/users/{admin_id}"), &root, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], ROLE_CODE_REGULAR);

    // The new role applies to the existing token at once.
    let response = get_auth(test.app(), "/api/projects", &admin).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Password
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_change_needs_old_password_and_ends_sessions(pool: PgPool) {
    let admin_id = create_user(&pool, "admin01", ROLE_CODE_ADMIN).await;
    let test = common::build_test_app(pool);
    let (token, cookie) = login(test.app(), "admin01", PASSWORD).await;
    let uri = format!("/api/users/{admin_id}/password");

    let body = json!({ "old_password": "Wrong999", "new_password": "Changed42" });
    let response = patch_json_auth(test.app(), &uri, &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Old password is incorrect");

    let body = json!({ "old_password": PASSWORD, "new_password": "Changed42" });
    let response = patch_json_auth(test.app(), &uri, &token, body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_with_cookie(test.app(), "/", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = json!({ "username": "admin01", "password": PASSWORD });
    let response = post_json(test.app(), "/api/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    login(test.app(), "admin01", "Changed42").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_of_another_user_cannot_be_changed(pool: PgPool) {
    create_user(&pool, "super01", ROLE_CODE_SUPER_ADMIN).await;
    let admin_id = create_user(&pool, "admin01", ROLE_CODE_ADMIN).await;
    let test = common::build_test_app(pool);
    let (root, _) = login(test.app(), "super01", PASSWORD).await;

    let body = json!({ "old_password": PASSWORD, "new_password": "Changed42" });
    let response =
        patch_json_auth(test.app(), &format!("/api/users/{admin_id}/password"), &root, body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_delete_frees_the_username(pool: PgPool) {
    let root_id = create_user(&pool, "super01", ROLE_CODE_SUPER_ADMIN).await;
    let admin_id = create_user(&pool, "admin01", ROLE_CODE_ADMIN).await;
    let test = common::build_test_app(pool);
    let (root, _) = login(test.app(), "super01", PASSWORD).await;
    let (admin, admin_cookie) = login(test.app(), "admin01", PASSWORD).await;

    let response = delete_auth(test.app(), &format!("/api/users/{admin_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = delete_auth(test.app(), &format!("/api/users/{root_id}"), &root).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Cannot delete your own account");

    let response = delete_auth(test.app(), &format!("/api/users/{admin_id}"), &root).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(test.app(), &format!("/api/users/{admin_id}"), &root).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_with_cookie(test.app(), "/", &admin_cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = json!({ "username": "admin01", "password": PASSWORD });
    let response = post_json(test.app(), "/api/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json!({ "username": "admin01", "password": "Welcome9" });
    let response = post_json_auth(test.app(), "/api/users", &root, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(test.app(), "/api/users", &root).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
}
