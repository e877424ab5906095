#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use sitelog_api::auth::jwt::JwtConfig;
use sitelog_api::auth::password::hash_password;
use sitelog_api::config::ServerConfig;
use sitelog_api::router::build_app_router;
use sitelog_api::session::SessionConfig;
use sitelog_api::state::AppState;
use sitelog_core::roles::RoleCode;
use sitelog_core::types::DbId;
use sitelog_db::models::user::CreateUser;
use sitelog_db::repositories::UserRepo;

/// Password given to every user created through [`create_user`].
pub const PASSWORD: &str = "Secret123";

/// Build a test `ServerConfig` with safe defaults and the given uploads root.
pub fn test_config(uploads_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        uploads_dir: uploads_dir.to_path_buf(),
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            expiry_hours: 8,
        },
        session: SessionConfig {
            expiry_hours: 7,
            cookie_secure: false,
        },
        bootstrap_admin: None,
    }
}

/// The application under test plus the temporary uploads directory it
/// writes attachments to. The directory lives as long as this value.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub uploads: TempDir,
}

impl TestApp {
    /// A fresh handle on the router for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Number of files stored under `uploads/logs`.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.uploads.path().join("logs"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub fn file_exists(&self, relative: &str) -> bool {
        self.uploads.path().join(relative).exists()
    }
}

/// Build the full application router through the same
/// [`build_app_router`] that `main.rs` uses.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let uploads = tempfile::tempdir().expect("tempdir should be created");
    let config = test_config(uploads.path());
    let state = AppState::new(pool.clone(), config.clone());
    TestApp {
        router: build_app_router(state, &config),
        pool,
        uploads,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`PASSWORD`] and return its id.
pub async fn create_user(pool: &PgPool, username: &str, role: RoleCode) -> DbId {
    let mut conn = pool.acquire().await.unwrap();
    let input = CreateUser {
        username: username.to_string(),
        password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
        role,
    };
    UserRepo::create(&mut conn, &input)
        .await
        .expect("user creation should succeed")
        .id
}

/// Log in through the API and return `(access_token, session_cookie_value)`.
pub async fn login(app: Router, username: &str, password: &str) -> (String, String) {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");

    let cookie = session_cookie(&response).expect("login should set the session cookie");
    let json = body_json(response).await;
    let token = json["data"]["access_token"]
        .as_str()
        .expect("login should return an access token")
        .to_string();
    (token, cookie)
}

/// Create a project through the API and return its id.
pub async fn create_project(app: Router, token: &str, name: &str, budget: i64) -> DbId {
    let body = serde_json::json!({
        "name": name,
        "description": "",
        "start_date": "2024-01-01",
        "end_date": "2024-12-31",
        "status": 2,
        "budget": budget,
    });
    let response = post_json_auth(app, "/api/projects", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "project creation should succeed");
    body_json(response).await["data"]["id"]
        .as_i64()
        .expect("created project should have an id")
}

/// Value of the `sitelog_session` cookie set by a response, if any.
pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("sitelog_session="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(COOKIE, format!("sitelog_session={cookie}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, None, body).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, Some(token), body).await
}

pub async fn patch_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    json_request(app, Method::PATCH, uri, Some(token), body).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "sitelog-test-boundary";

/// A `multipart/form-data` body under construction.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }
}

pub async fn multipart_auth(
    app: Router,
    method: Method,
    uri: &str,
    token: &str,
    body: MultipartBody,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body.finish()))
        .unwrap();
    send(app, request).await
}
