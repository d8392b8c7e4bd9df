use sqlx::FromRow;

use crate::db::DbPool;

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub owner_id: i64,
    pub post_id: i64,
    pub body: String,
    pub created_at: String,
}

/// Comment row joined with the owner's username.
#[derive(Debug, Clone, FromRow)]
pub struct CommentDisplay {
    pub id: i64,
    pub owner_id: i64,
    pub owner_username: String,
    pub post_id: i64,
    pub body: String,
    pub created_at: String,
}

const SELECT_COMMENT_DISPLAY: &str = "\
    SELECT c.id, c.owner_id, u.username AS owner_username, \
           c.post_id, c.body, c.created_at \
    FROM comments c \
    JOIN users u ON u.id = c.owner_id";

pub async fn create(
    pool: &DbPool,
    owner_id: i64,
    post_id: i64,
    body: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO comments (owner_id, post_id, body) VALUES (?, ?, ?)")
        .bind(owner_id)
        .bind(post_id)
        .bind(body)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "SELECT id, owner_id, post_id, body, created_at FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_display_by_id(
    pool: &DbPool,
    id: i64,
) -> Result<Option<CommentDisplay>, sqlx::Error> {
    sqlx::query_as::<_, CommentDisplay>(&format!("{SELECT_COMMENT_DISPLAY} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Comments on a post in creation order.
pub async fn find_by_post(pool: &DbPool, post_id: i64) -> Result<Vec<CommentDisplay>, sqlx::Error> {
    sqlx::query_as::<_, CommentDisplay>(&format!(
        "{SELECT_COMMENT_DISPLAY} WHERE c.post_id = ? ORDER BY c.id"
    ))
    .bind(post_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_owner(pool: &DbPool, owner_id: i64) -> Result<Vec<CommentDisplay>, sqlx::Error> {
    sqlx::query_as::<_, CommentDisplay>(&format!(
        "{SELECT_COMMENT_DISPLAY} WHERE c.owner_id = ? ORDER BY c.id"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn count_by_post(pool: &DbPool, post_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(pool)
        .await
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
