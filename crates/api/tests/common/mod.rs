#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use yamdb_api::auth::jwt::{generate_access_token, JwtConfig};
use yamdb_api::config::ServerConfig;
use yamdb_api::router::{build_app_router, App};
use yamdb_api::state::AppState;
use yamdb_core::roles::Role;
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::UserRepo;
use yamdb_mail::MemoryMailer;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hs256";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// A test application plus the outbox its sign-up handler mails into.
pub struct TestApp {
    pub app: App,
    pub mailer: Arc<MemoryMailer>,
    pub pool: PgPool,
}

impl TestApp {
    /// Build the full application (same middleware stack as the binary)
    /// backed by `pool` and an in-memory mailer.
    pub fn new(pool: PgPool) -> Self {
        let config = test_config();
        let mailer = Arc::new(MemoryMailer::new());
        let state = AppState {
            pool: pool.clone(),
            config: Arc::new(config.clone()),
            mailer: mailer.clone(),
        };
        Self {
            app: build_app_router(state, &config),
            mailer,
            pool,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.request("GET", uri, token, None).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn patch_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response {
        self.request("PATCH", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.request("DELETE", uri, token, None).await
    }
}

/// Read the response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status, then return the JSON body.
pub async fn expect_json(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

/// Insert a user directly and mint a token for them.
pub async fn create_user_with_token(pool: &PgPool, username: &str, role: Role) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role,
            ..Default::default()
        },
    )
    .await
    .expect("user creation should succeed");
    let token = generate_access_token(user.id, role.as_str(), &test_config().jwt)
        .expect("token generation should succeed");
    (user, token)
}

/// Create a category and a genre as `admin_token`, then a title using them.
/// Returns the title id.
pub async fn seed_title(app: &TestApp, admin_token: &str, name: &str) -> i64 {
    app.post_json(
        "/api/v1/categories/",
        Some(admin_token),
        serde_json::json!({ "name": "Films", "slug": "films" }),
    )
    .await;
    app.post_json(
        "/api/v1/genres/",
        Some(admin_token),
        serde_json::json!({ "name": "Drama", "slug": "drama" }),
    )
    .await;
    let response = app
        .post_json(
            "/api/v1/titles/",
            Some(admin_token),
            serde_json::json!({
                "name": name,
                "year": 1972,
                "description": "",
                "genre": ["drama"],
                "category": "films",
            }),
        )
        .await;
    let json = expect_json(response, StatusCode::CREATED).await;
    json["id"].as_i64().unwrap()
}
