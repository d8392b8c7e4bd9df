use sqlx::FromRow;

use crate::db::DbPool;

#[derive(Debug, Clone, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub owner_id: i64,
    pub post_id: i64,
}

/// Favorite row joined with the post title, for the per-user listing.
#[derive(Debug, Clone, FromRow)]
pub struct FavoriteDisplay {
    pub id: i64,
    pub owner_id: i64,
    pub post_id: i64,
    pub post_title: String,
}

/// Insert a favorite. Same UNIQUE (owner, post) contract as likes.
pub async fn create(pool: &DbPool, owner_id: i64, post_id: i64) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO favorites (owner_id, post_id) VALUES (?, ?)")
        .bind(owner_id)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn exists(pool: &DbPool, owner_id: i64, post_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM favorites WHERE owner_id = ? AND post_id = ?)")
        .bind(owner_id)
        .bind(post_id)
        .fetch_one(pool)
        .await
}

/// Remove the favorite for (owner, post). Returns whether a row was
/// actually deleted, so the handler can answer "not found" honestly.
pub async fn remove(pool: &DbPool, owner_id: i64, post_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM favorites WHERE owner_id = ? AND post_id = ?")
        .bind(owner_id)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_by_owner(pool: &DbPool, owner_id: i64) -> Result<Vec<FavoriteDisplay>, sqlx::Error> {
    sqlx::query_as::<_, FavoriteDisplay>(
        "SELECT f.id, f.owner_id, f.post_id, p.title AS post_title \
         FROM favorites f \
         JOIN posts p ON p.id = f.post_id \
         WHERE f.owner_id = ? ORDER BY f.id",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn count_for_pair(pool: &DbPool, owner_id: i64, post_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE owner_id = ? AND post_id = ?")
        .bind(owner_id)
        .bind(post_id)
        .fetch_one(pool)
        .await
}
