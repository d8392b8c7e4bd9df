use sqlx::FromRow;

use crate::db::DbPool;

/// Internal user struct for authentication — includes password hash.
/// API response shapes live in `schemas` and never carry the hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
}

pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

const SELECT_USER: &str =
    "SELECT id, username, password, email, is_admin, created_at FROM users";

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find user by username for authentication.
pub async fn find_by_username(pool: &DbPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE username = ?"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn find_all(pool: &DbPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY id"))
        .fetch_all(pool)
        .await
}

/// Create a new user, returning its id. A duplicate username surfaces as a
/// UNIQUE violation for the caller to translate.
pub async fn create(pool: &DbPool, new: &NewUser) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO users (username, password, email) VALUES (?, ?, ?)")
        .bind(&new.username)
        .bind(&new.password)
        .bind(&new.email)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}
