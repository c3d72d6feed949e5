//! Integration tests for reviews and comments: ownership, uniqueness,
//! rating aggregation and cascading deletes.

mod common;

use axum::http::StatusCode;
use common::{create_user_with_token, expect_json, seed_title, TestApp};
use serde_json::json;
use sqlx::PgPool;
use yamdb_core::roles::Role;

async fn post_review(
    app: &TestApp,
    token: &str,
    title_id: i64,
    score: i32,
) -> axum::response::Response {
    app.post_json(
        &format!("/api/v1/titles/{title_id}/reviews/"),
        Some(token),
        json!({ "text": "Worth watching", "score": score }),
    )
    .await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rating_is_mean_of_scores(pool: PgPool) {
    let (_admin, admin) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let (_a, alice) = create_user_with_token(&pool, "alice", Role::User).await;
    let (_b, bob) = create_user_with_token(&pool, "bob", Role::User).await;
    let app = TestApp::new(pool);
    let title_id = seed_title(&app, &admin, "Solaris").await;
    let title_uri = format!("/api/v1/titles/{title_id}/");

    let response = app.get(&title_uri, None).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert!(json["rating"].is_null());

    let response = post_review(&app, &alice, title_id, 8).await;
    let json = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(json["author"], "alice");
    assert_eq!(json["score"], 8);
    assert!(json["pub_date"].is_string());
    assert!(json.get("title_id").is_none());

    post_review(&app, &bob, title_id, 5).await;

    let response = app.get(&title_uri, None).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["rating"].as_f64(), Some(6.5));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn one_review_per_user_per_title(pool: PgPool) {
    let (_admin, admin) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let (_a, alice) = create_user_with_token(&pool, "alice", Role::User).await;
    let app = TestApp::new(pool);
    let title_id = seed_title(&app, &admin, "Solaris").await;

    let response = post_review(&app, &alice, title_id, 8).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_review(&app, &alice, title_id, 3).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert!(json["fields"]["non_field_errors"].is_array());

    let list = expect_json(
        app.get(&format!("/api/v1/titles/{title_id}/reviews/"), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(list["count"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn score_outside_bounds_is_rejected(pool: PgPool) {
    let (_admin, admin) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let (_a, alice) = create_user_with_token(&pool, "alice", Role::User).await;
    let app = TestApp::new(pool);
    let title_id = seed_title(&app, &admin, "Solaris").await;

    for score in [0, 11, -3] {
        let json = expect_json(
            post_review(&app, &alice, title_id, score).await,
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert!(json["fields"]["score"].is_array());
    }
    let response = post_review(&app, &alice, title_id, 10).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn anonymous_can_read_but_not_write(pool: PgPool) {
    let (_admin, admin) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let app = TestApp::new(pool);
    let title_id = seed_title(&app, &admin, "Solaris").await;

    let response = app
        .get(&format!("/api/v1/titles/{title_id}/reviews/"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post_json(
            &format!("/api/v1/titles/{title_id}/reviews/"),
            None,
            json!({ "text": "Anonymous", "score": 5 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_author_moderator_or_admin_may_edit(pool: PgPool) {
    let (_admin, admin) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let (_a, alice) = create_user_with_token(&pool, "alice", Role::User).await;
    let (_b, bob) = create_user_with_token(&pool, "bob", Role::User).await;
    let (_m, moder) = create_user_with_token(&pool, "moder", Role::Moderator).await;
    let app = TestApp::new(pool);
    let title_id = seed_title(&app, &admin, "Solaris").await;

    let response = post_review(&app, &alice, title_id, 8).await;
    let json = expect_json(response, StatusCode::CREATED).await;
    let review_uri = format!("/api/v1/titles/{title_id}/reviews/{}/", json["id"]);

    let response = app
        .patch_json(&review_uri, Some(&bob), json!({ "score": 1 }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = expect_json(
        app.patch_json(&review_uri, Some(&alice), json!({ "score": 9 }))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["score"], 9);
    assert_eq!(json["text"], "Worth watching");

    let json = expect_json(
        app.patch_json(&review_uri, Some(&moder), json!({ "text": "Edited" }))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["text"], "Edited");
    assert_eq!(json["author"], "alice");

    let response = app.delete(&review_uri, Some(&bob)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.delete(&review_uri, Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn comments_follow_review_ownership_rules(pool: PgPool) {
    let (_admin, admin) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let (_a, alice) = create_user_with_token(&pool, "alice", Role::User).await;
    let (_b, bob) = create_user_with_token(&pool, "bob", Role::User).await;
    let app = TestApp::new(pool);
    let title_id = seed_title(&app, &admin, "Solaris").await;
    let response = post_review(&app, &alice, title_id, 8).await;
    let review = expect_json(response, StatusCode::CREATED).await;
    let comments_uri = format!(
        "/api/v1/titles/{title_id}/reviews/{}/comments/",
        review["id"]
    );

    let comment = expect_json(
        app.post_json(&comments_uri, Some(&bob), json!({ "text": "Agreed" }))
            .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(comment["author"], "bob");
    let comment_uri = format!("{comments_uri}{}/", comment["id"]);

    let response = app
        .post_json(&comments_uri, Some(&bob), json!({ "text": "   " }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .patch_json(&comment_uri, Some(&alice), json!({ "text": "Hijacked" }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = expect_json(
        app.patch_json(&comment_uri, Some(&bob), json!({ "text": "Strongly agreed" }))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["text"], "Strongly agreed");

    let response = app.get(&comments_uri, None).await;
    let list = expect_json(response, StatusCode::OK).await;
    assert_eq!(list["count"], 1);

    let response = app.delete(&comment_uri, Some(&bob)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.get(&comment_uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn review_of_another_title_is_not_found(pool: PgPool) {
    let (_admin, admin) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let (_a, alice) = create_user_with_token(&pool, "alice", Role::User).await;
    let app = TestApp::new(pool);
    let solaris = seed_title(&app, &admin, "Solaris").await;
    let stalker = seed_title(&app, &admin, "Stalker").await;
    let response = post_review(&app, &alice, solaris, 8).await;
    let review = expect_json(response, StatusCode::CREATED).await;

    let response = app
        .get(&format!("/api/v1/titles/{stalker}/reviews/{}/", review["id"]), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .get(
            &format!("/api/v1/titles/{stalker}/reviews/{}/comments/", review["id"]),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/api/v1/titles/999999/reviews/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_title_removes_reviews_and_comments(pool: PgPool) {
    let (_admin, admin) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let (_a, alice) = create_user_with_token(&pool, "alice", Role::User).await;
    let app = TestApp::new(pool.clone());
    let title_id = seed_title(&app, &admin, "Solaris").await;
    let response = post_review(&app, &alice, title_id, 8).await;
    let review = expect_json(response, StatusCode::CREATED).await;
    app.post_json(
        &format!("/api/v1/titles/{title_id}/reviews/{}/comments/", review["id"]),
        Some(&alice),
        json!({ "text": "Self reply" }),
    )
    .await;

    let response = app
        .delete(&format!("/api/v1/titles/{title_id}/"), Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((reviews, comments), (0, 0));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn nul_in_text_is_a_field_error(pool: PgPool) {
    let (_admin, admin) = create_user_with_token(&pool, "admin", Role::Admin).await;
    let (_a, alice) = create_user_with_token(&pool, "alice", Role::User).await;
    let app = TestApp::new(pool);
    let title_id = seed_title(&app, &admin, "Solaris").await;
    let reviews_uri = format!("/api/v1/titles/{title_id}/reviews/");

    let response = app
        .post_json(
            &reviews_uri,
            Some(&alice),
            json!({ "text": "bad\u{0000}text", "score": 5 }),
        )
        .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["text"].is_array());

    let response = post_review(&app, &alice, title_id, 5).await;
    let json = expect_json(response, StatusCode::CREATED).await;
    let review_id = json["id"].as_i64().unwrap();

    let response = app
        .post_json(
            &format!("{reviews_uri}{review_id}/comments/"),
            Some(&alice),
            json!({ "text": "\u{0000}" }),
        )
        .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert!(json["fields"]["text"].is_array());
}
