//! Shared test infrastructure.
//!
//! `setup_test_db()` opens a fresh in-memory SQLite database per test and
//! applies the schema, so tests are fully isolated from each other and
//! from any on-disk state.

#![allow(dead_code)]

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use corkboard::db::{DbPool, MIGRATIONS};
use corkboard::models::post::{self, NewPost};
use corkboard::models::user::{self, NewUser};

/// Open an isolated in-memory database with the schema applied.
/// A single pooled connection keeps the in-memory database alive and
/// shared for the whole test.
pub async fn setup_test_db() -> DbPool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Failed to parse sqlite options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory test DB");
    sqlx::raw_sql(MIGRATIONS)
        .execute(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

pub async fn seed_category(pool: &DbPool, name: &str) -> i64 {
    let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .expect("Failed to insert category");
    result.last_insert_rowid()
}

/// Create a user directly at the model layer. The stored password is a
/// placeholder; tests that exercise login go through the HTTP surface
/// and hash for real.
pub async fn create_user(pool: &DbPool, username: &str) -> i64 {
    user::create(
        pool,
        &NewUser {
            username: username.to_string(),
            password: "not-a-real-hash".to_string(),
            email: format!("{username}@test.com"),
        },
    )
    .await
    .expect("Failed to create user")
}

pub async fn make_admin(pool: &DbPool, user_id: i64) {
    sqlx::query("UPDATE users SET is_admin = 1 WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to set admin flag");
}

pub async fn create_post(pool: &DbPool, owner_id: i64, category_id: i64, title: &str) -> i64 {
    post::create_with_images(
        pool,
        &NewPost {
            owner_id,
            category_id,
            title: title.to_string(),
            body: String::new(),
            preview_image: String::new(),
            images: Vec::new(),
        },
    )
    .await
    .expect("Failed to create post")
}
