use sqlx::FromRow;

use crate::db::DbPool;

#[derive(Debug, Clone, FromRow)]
pub struct Like {
    pub id: i64,
    pub owner_id: i64,
    pub post_id: i64,
}

/// Like row joined with the owner's username, for the likers sub-view.
#[derive(Debug, Clone, FromRow)]
pub struct LikeDisplay {
    pub id: i64,
    pub owner_id: i64,
    pub owner_username: String,
    pub post_id: i64,
}

const SELECT_LIKE_DISPLAY: &str = "\
    SELECT l.id, l.owner_id, u.username AS owner_username, l.post_id \
    FROM likes l \
    JOIN users u ON u.id = l.owner_id";

/// Insert a like. The (owner, post) pair is UNIQUE; a second insert for the
/// same pair surfaces as a UNIQUE violation for the caller to translate.
pub async fn create(pool: &DbPool, owner_id: i64, post_id: i64) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO likes (owner_id, post_id) VALUES (?, ?)")
        .bind(owner_id)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Like>, sqlx::Error> {
    sqlx::query_as::<_, Like>("SELECT id, owner_id, post_id FROM likes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Whether a like row exists for (owner, post). One indexed probe.
pub async fn exists(pool: &DbPool, owner_id: i64, post_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM likes WHERE owner_id = ? AND post_id = ?)")
        .bind(owner_id)
        .bind(post_id)
        .fetch_one(pool)
        .await
}

pub async fn count_by_post(pool: &DbPool, post_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(pool)
        .await
}

pub async fn find_by_post(pool: &DbPool, post_id: i64) -> Result<Vec<LikeDisplay>, sqlx::Error> {
    sqlx::query_as::<_, LikeDisplay>(&format!(
        "{SELECT_LIKE_DISPLAY} WHERE l.post_id = ? ORDER BY l.id"
    ))
    .bind(post_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_owner(pool: &DbPool, owner_id: i64) -> Result<Vec<LikeDisplay>, sqlx::Error> {
    sqlx::query_as::<_, LikeDisplay>(&format!(
        "{SELECT_LIKE_DISPLAY} WHERE l.owner_id = ? ORDER BY l.id"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM likes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
