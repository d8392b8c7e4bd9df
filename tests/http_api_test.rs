//! End-to-end tests over the HTTP surface: the real route table, session
//! middleware, policy checks and response shaping, backed by an in-memory
//! database.

mod common;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, cookie::Key, http::StatusCode, test, web};
use serde_json::{Value, json};

use common::{make_admin, seed_category, setup_test_db};
use corkboard::handlers;
use corkboard::models::favorite;

fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_secure(false)
        .build()
}

/// Build the service under test with the production route table.
macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .wrap(session_middleware())
                .app_data(web::Data::new($pool.clone()))
                .configure(handlers::configure),
        )
        .await
    };
}

/// Register a user through the API, returning (user id, session cookie).
macro_rules! register {
    ($app:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/users/register/")
            .set_json(json!({
                "username": $username,
                "password": "Password1!",
                "email": format!("{}@test.com", $username),
            }))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let cookie = resp
            .response()
            .cookies()
            .next()
            .expect("session cookie")
            .into_owned();
        let body: Value = test::read_body_json(resp).await;
        (body["id"].as_i64().expect("user id"), cookie)
    }};
}

/// Create a post through the API as the given session, returning its id.
macro_rules! create_post_via_api {
    ($app:expr, $cookie:expr, $category:expr, $title:expr) => {{
        let req = test::TestRequest::post()
            .uri("/posts/")
            .cookie($cookie.clone())
            .set_json(json!({"title": $title, "category": $category}))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["id"].as_i64().expect("post id")
    }};
}

#[actix_web::test]
async fn user_directory_requires_a_session() {
    let pool = setup_test_db().await;
    let app = test_app!(pool);

    let req = test::TestRequest::get().uri("/users/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (alice_id, cookie) = register!(&app, "alice");

    let req = test::TestRequest::get()
        .uri("/users/")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["username"], "alice");
    assert!(items[0].get("email").is_none(), "list shape is abbreviated");

    let req = test::TestRequest::get()
        .uri(&format!("/users/{alice_id}/"))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "alice@test.com");
}

#[actix_web::test]
async fn post_create_validates_and_forces_ownership() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let app = test_app!(pool);

    // Anonymous creation is rejected before any validation
    let req = test::TestRequest::post()
        .uri("/posts/")
        .set_json(json!({"title": "Nope", "category": category}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (bob_id, cookie) = register!(&app, "bob");

    // Mutations must be JSON
    let req = test::TestRequest::post()
        .uri("/posts/")
        .cookie(cookie.clone())
        .insert_header(("content-type", "text/plain"))
        .set_payload("title=x")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Missing category is a field-level validation error and writes nothing
    let req = test::TestRequest::post()
        .uri("/posts/")
        .cookie(cookie.clone())
        .set_json(json!({"title": "No category"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("category").is_some());
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(count, 0);

    // A spoofed owner field in the payload is ignored; the session wins
    let req = test::TestRequest::post()
        .uri("/posts/")
        .cookie(cookie)
        .set_json(json!({
            "title": "Two images",
            "category": category,
            "owner": 9999,
            "images": [{"image": "uploads/a.jpg"}, {"image": "uploads/b.jpg"}],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["owner"].as_i64(), Some(bob_id));
    assert_eq!(body["images"].as_array().expect("images").len(), 2);
}

#[actix_web::test]
async fn post_list_paginates_and_abbreviates() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let app = test_app!(pool);

    let (_carol_id, cookie) = register!(&app, "carol");
    for i in 0..3 {
        create_post_via_api!(&app, cookie, category, format!("Post {i}"));
    }
    create_post_via_api!(&app, cookie, category, "A singular headline");

    let req = test::TestRequest::get().uri("/posts/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"].as_i64(), Some(4));
    let items = body["items"].as_array().expect("items");
    assert_eq!(items.len(), 3, "fixed page size");
    assert!(items[0].get("body").is_none(), "list shape has no body");
    assert!(items[0].get("comments_count").is_some());
    assert!(
        items[0].get("is_liked").is_none(),
        "anonymous viewers get no flags"
    );

    let req = test::TestRequest::get().uri("/posts/?page=2").to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["items"].as_array().expect("items").len(), 1);

    let req = test::TestRequest::get()
        .uri("/posts/?search=singular")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"].as_i64(), Some(1));
}

#[actix_web::test]
async fn favorite_toggle_is_race_safe_and_idempotent_failing() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let app = test_app!(pool);

    let (_author_id, author_cookie) = register!(&app, "author");
    let post_id = create_post_via_api!(&app, author_cookie, category, "Keeper");
    let (fan_id, fan_cookie) = register!(&app, "fan");

    let uri = format!("/posts/{post_id}/favorites/");

    // Anonymous toggling is rejected
    let req = test::TestRequest::post().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // First add succeeds, second answers "already exists" without a 500
    let req = test::TestRequest::post()
        .uri(&uri)
        .cookie(fan_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri(&uri)
        .cookie(fan_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        favorite::count_for_pair(&pool, fan_id, post_id)
            .await
            .expect("count"),
        1
    );

    let req = test::TestRequest::get()
        .uri(&format!("/users/{fan_id}/favorites/"))
        .cookie(fan_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().expect("array").len(), 1);
    assert_eq!(body[0]["post_title"], "Keeper");

    // Remove once, then removing again reports "not found" without a 500
    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(fan_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(fan_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn liking_enriches_the_post_for_its_viewer() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let app = test_app!(pool);

    let (_author_id, author_cookie) = register!(&app, "author");
    let post_id = create_post_via_api!(&app, author_cookie, category, "Likeable");
    let (fan_id, fan_cookie) = register!(&app, "fan");

    let req = test::TestRequest::post()
        .uri("/likes/")
        .cookie(fan_cookie.clone())
        .set_json(json!({"post": post_id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["owner"].as_i64(), Some(fan_id));
    let like_id = body["id"].as_i64().expect("like id");

    // A repeat like is a conflict, never a server error
    let req = test::TestRequest::post()
        .uri("/likes/")
        .cookie(fan_cookie.clone())
        .set_json(json!({"post": post_id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // The liker sees their flag; anonymous viewers see no flag at all
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/"))
        .cookie(fan_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["is_liked"], Value::Bool(true));
    assert_eq!(body["is_favorite"], Value::Bool(false));
    assert_eq!(body["likes_count"].as_i64(), Some(1));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("is_liked").is_none());
    assert_eq!(body["likes_count"].as_i64(), Some(1));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/likes/"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().expect("array").len(), 1);
    assert_eq!(body[0]["owner_username"], "fan");

    // Only the like's owner may remove it
    let req = test::TestRequest::delete()
        .uri(&format!("/likes/{like_id}/"))
        .cookie(author_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/likes/{like_id}/"))
        .cookie(fan_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/"))
        .cookie(fan_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["is_liked"], Value::Bool(false));
    assert_eq!(body["likes_count"].as_i64(), Some(0));
}

#[actix_web::test]
async fn comment_deletion_is_owner_only() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let app = test_app!(pool);

    let (_author_id, author_cookie) = register!(&app, "author");
    let post_id = create_post_via_api!(&app, author_cookie, category, "Discussed");
    let (_commenter_id, commenter_cookie) = register!(&app, "commenter");

    let req = test::TestRequest::post()
        .uri("/comments/")
        .set_json(json!({"post": post_id, "body": "anonymous?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/comments/")
        .cookie(commenter_cookie.clone())
        .set_json(json!({"post": post_id, "body": "well said"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let comment_id = body["id"].as_i64().expect("comment id");

    // Detail view embeds the full comment list, not just the count
    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["comments_count"].as_i64(), Some(1));
    assert_eq!(body["comments"].as_array().expect("comments").len(), 1);
    assert_eq!(body["comments"][0]["body"], "well said");

    let req = test::TestRequest::get()
        .uri("/comments/mine/")
        .cookie(commenter_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().expect("array").len(), 1);

    // The post's owner is not the comment's owner
    let req = test::TestRequest::delete()
        .uri(&format!("/comments/{comment_id}/"))
        .cookie(author_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/comments/{comment_id}/"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete()
        .uri(&format!("/comments/{comment_id}/"))
        .cookie(commenter_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn post_update_and_destroy_respect_ownership_and_admin() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let app = test_app!(pool);

    let (_author_id, author_cookie) = register!(&app, "author");
    let post_id = create_post_via_api!(&app, author_cookie, category, "Original");
    let (rival_id, rival_cookie) = register!(&app, "rival");

    let uri = format!("/posts/{post_id}/");

    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(rival_cookie.clone())
        .set_json(json!({"title": "Hijacked", "category": category}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(author_cookie.clone())
        .set_json(json!({"title": "Rewritten", "category": category, "body": "fresh"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Rewritten");

    // PATCH keeps unmentioned fields
    let req = test::TestRequest::patch()
        .uri(&uri)
        .cookie(author_cookie.clone())
        .set_json(json!({"title": "Patched"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Patched");
    assert_eq!(body["category"].as_i64(), Some(category));
    assert_eq!(body["body"], "fresh");

    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(rival_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // An admin may destroy any post; a fresh login picks up the flag
    make_admin(&pool, rival_id).await;
    let req = test::TestRequest::post()
        .uri("/users/login/")
        .set_json(json!({"username": "rival", "password": "Password1!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let admin_cookie = resp
        .response()
        .cookies()
        .next()
        .expect("session cookie")
        .into_owned();

    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(admin_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn logout_invalidates_the_session() {
    let pool = setup_test_db().await;
    let app = test_app!(pool);

    let req = test::TestRequest::post().uri("/users/logout/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (_dave_id, cookie) = register!(&app, "dave");

    let req = test::TestRequest::post()
        .uri("/users/logout/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp
        .response()
        .cookies()
        .next()
        .expect("cleared session cookie")
        .into_owned();

    let req = test::TestRequest::get()
        .uri("/users/")
        .cookie(cleared)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn wrong_credentials_do_not_log_in() {
    let pool = setup_test_db().await;
    let app = test_app!(pool);

    let (_eve_id, _cookie) = register!(&app, "eve");

    let req = test::TestRequest::post()
        .uri("/users/login/")
        .set_json(json!({"username": "eve", "password": "WrongPass1!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/users/login/")
        .set_json(json!({"username": "nobody", "password": "Password1!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
