//! Model-level tests for comments.

use corkboard::models::comment;

mod common;
use common::{create_post, create_user, seed_category, setup_test_db};

#[tokio::test]
async fn create_and_read_back_with_owner_username() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let author = create_user(&pool, "author").await;
    let reader = create_user(&pool, "reader").await;
    let post_id = create_post(&pool, author, category, "Discussed").await;

    let comment_id = comment::create(&pool, reader, post_id, "well said")
        .await
        .expect("create comment");

    let display = comment::find_display_by_id(&pool, comment_id)
        .await
        .expect("query")
        .expect("comment exists");
    assert_eq!(display.owner_id, reader);
    assert_eq!(display.owner_username, "reader");
    assert_eq!(display.post_id, post_id);
    assert_eq!(display.body, "well said");
}

#[tokio::test]
async fn post_comments_come_back_in_creation_order() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let author = create_user(&pool, "author").await;
    let reader = create_user(&pool, "reader").await;
    let post_id = create_post(&pool, author, category, "Discussed").await;

    comment::create(&pool, reader, post_id, "first").await.expect("comment");
    comment::create(&pool, author, post_id, "second").await.expect("comment");
    comment::create(&pool, reader, post_id, "third").await.expect("comment");

    let comments = comment::find_by_post(&pool, post_id).await.expect("list");
    let bodies: Vec<&str> = comments.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, ["first", "second", "third"]);
    assert_eq!(comment::count_by_post(&pool, post_id).await.expect("count"), 3);
}

#[tokio::test]
async fn find_by_owner_only_returns_that_users_comments() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let author = create_user(&pool, "author").await;
    let reader = create_user(&pool, "reader").await;
    let post_id = create_post(&pool, author, category, "Discussed").await;

    comment::create(&pool, reader, post_id, "mine").await.expect("comment");
    comment::create(&pool, author, post_id, "theirs").await.expect("comment");

    let mine = comment::find_by_owner(&pool, reader).await.expect("list");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].body, "mine");
}

#[tokio::test]
async fn delete_removes_the_row() {
    let pool = setup_test_db().await;
    let category = seed_category(&pool, "general").await;
    let author = create_user(&pool, "author").await;
    let post_id = create_post(&pool, author, category, "Discussed").await;

    let comment_id = comment::create(&pool, author, post_id, "fleeting")
        .await
        .expect("comment");
    comment::delete(&pool, comment_id).await.expect("delete");

    assert!(
        comment::find_by_id(&pool, comment_id)
            .await
            .expect("query")
            .is_none()
    );
}
