//! Integration tests for user administration and the own-profile endpoint.

mod common;

use axum::http::StatusCode;
use common::{create_user_with_token, expect_json, TestApp};
use serde_json::json;
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_db::repositories::UserRepo;

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_manages_users(pool: PgPool) {
    let (_admin, token) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let app = TestApp::new(pool);

    let response = app
        .post_json(
            "/api/v1/users/",
            Some(&token),
            json!({
                "username": "critic",
                "email": "critic@example.com",
                "first_name": "Ann",
                "role": "moderator",
            }),
        )
        .await;
    let json = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(
        json,
        json!({
            "username": "critic",
            "email": "critic@example.com",
            "first_name": "Ann",
            "last_name": "",
            "bio": "",
            "role": "moderator",
        })
    );

    let response = app.get("/api/v1/users/?search=crit", Some(&token)).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["count"], 1);

    let response = app
        .patch_json(
            "/api/v1/users/critic/",
            Some(&token),
            json!({ "bio": "Film buff", "role": "user" }),
        )
        .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["bio"], "Film buff");
    assert_eq!(json["role"], "user");
    assert_eq!(json["first_name"], "Ann");

    let response = app.delete("/api/v1/users/critic/", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.get("/api/v1/users/critic/", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn users_endpoints_are_admin_only(pool: PgPool) {
    let (_m, moder) = create_user_with_token(&pool, "moder", Role::Moderator).await;
    let app = TestApp::new(pool);

    let response = app.get("/api/v1/users/", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = app.get("/api/v1/users/", Some(&moder)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.get("/api/v1/users/moder/", Some(&moder)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_role_is_rejected(pool: PgPool) {
    let (_admin, token) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let app = TestApp::new(pool);

    let response = app
        .post_json(
            "/api/v1/users/",
            Some(&token),
            json!({ "username": "x", "email": "x@example.com", "role": "owner" }),
        )
        .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn superuser_flag_grants_admin_access(pool: PgPool) {
    let (user, token) = create_user_with_token(&pool, "root", Role::User).await;
    sqlx::query("UPDATE users SET is_superuser = true WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = TestApp::new(pool);

    let response = app.get("/api/v1/users/", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_can_edit_profile_but_not_role(pool: PgPool) {
    let (_u, token) = create_user_with_token(&pool, "critic", Role::User).await;
    let app = TestApp::new(pool);

    let response = app
        .patch_json(
            "/api/v1/users/me/",
            Some(&token),
            json!({ "first_name": "Ann", "role": "admin" }),
        )
        .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["first_name"], "Ann");
    assert_eq!(json["role"], "user");

    let response = app.get("/api/v1/users/me", Some(&token)).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["first_name"], "Ann");

    let response = app.get("/api/v1/users/me/", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn nul_in_profile_fields_is_a_field_error(pool: PgPool) {
    let (_u, token) = create_user_with_token(&pool, "critic", Role::User).await;
    let app = TestApp::new(pool);

    let response = app
        .patch_json(
            "/api/v1/users/me/",
            Some(&token),
            json!({ "bio": "x\u{0000}y", "last_name": "\u{0000}" }),
        )
        .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["bio"].is_array());
    assert!(json["fields"]["last_name"].is_array());

    let response = app.get("/api/v1/users/me/", Some(&token)).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["bio"], "");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn role_changes_apply_to_existing_tokens(pool: PgPool) {
    let (user, token) = create_user_with_token(&pool, "rising", Role::User).await;
    let app = TestApp::new(pool.clone());

    let response = app.get("/api/v1/users/", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    UserRepo::update(
        &pool,
        user.id,
        &yamdb_db::models::user::UpdateUser {
            role: Some(Role::Admin),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let response = app.get("/api/v1/users/", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    UserRepo::delete(&pool, user.id).await.unwrap();
    let response = app.get("/api/v1/users/me/", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_token_is_unauthorized(pool: PgPool) {
    let app = TestApp::new(pool);

    let response = app.get("/api/v1/users/me/", Some("not-a-token")).await;
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}
