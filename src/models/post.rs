use sqlx::FromRow;

use crate::db::DbPool;

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub owner_id: i64,
    pub category_id: i64,
    pub title: String,
    pub body: String,
    pub preview_image: String,
    pub created_at: String,
}

/// Post row joined with owner username and category name, the shape every
/// read path serializes from.
#[derive(Debug, Clone, FromRow)]
pub struct PostDisplay {
    pub id: i64,
    pub owner_id: i64,
    pub owner_username: String,
    pub category_id: i64,
    pub category_name: String,
    pub title: String,
    pub body: String,
    pub preview_image: String,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct PostImage {
    pub id: i64,
    pub post_id: i64,
    pub image: String,
}

/// SQL for post display: post + owner username + category name.
const SELECT_POST_DISPLAY: &str = "\
    SELECT p.id, p.owner_id, u.username AS owner_username, \
           p.category_id, c.name AS category_name, \
           p.title, p.body, p.preview_image, p.created_at \
    FROM posts p \
    JOIN users u ON u.id = p.owner_id \
    JOIN categories c ON c.id = p.category_id";

pub struct NewPost {
    pub owner_id: i64,
    pub category_id: i64,
    pub title: String,
    pub body: String,
    pub preview_image: String,
    pub images: Vec<String>,
}

/// Filter params for the post list. Matching logic is plain SQL; the
/// parameter names (`search`, `owner`, `category`) are the stable contract.
#[derive(Debug, Default)]
pub struct PostFilter {
    pub search: Option<String>,
    pub owner: Option<i64>,
    pub category: Option<i64>,
}

/// Pagination metadata for the post list.
pub struct PostPage {
    pub posts: Vec<PostDisplay>,
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

/// Find posts with pagination, optional title/body search and owner and
/// category filters.
pub async fn find_paginated(
    pool: &DbPool,
    page: i64,
    per_page: i64,
    filter: &PostFilter,
) -> Result<PostPage, sqlx::Error> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;

    let pattern = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{q}%"));

    let mut where_sql = String::new();
    if pattern.is_some() {
        where_sql.push_str(" AND (p.title LIKE ? OR p.body LIKE ?)");
    }
    if filter.owner.is_some() {
        where_sql.push_str(" AND p.owner_id = ?");
    }
    if filter.category.is_some() {
        where_sql.push_str(" AND p.category_id = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM posts p WHERE 1=1{where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(pat) = &pattern {
        count_query = count_query.bind(pat.clone()).bind(pat.clone());
    }
    if let Some(owner) = filter.owner {
        count_query = count_query.bind(owner);
    }
    if let Some(category) = filter.category {
        count_query = count_query.bind(category);
    }
    let total_count = count_query.fetch_one(pool).await?;
    let total_pages = (total_count as f64 / per_page as f64).ceil() as i64;

    let sql = format!("{SELECT_POST_DISPLAY} WHERE 1=1{where_sql} ORDER BY p.id LIMIT ? OFFSET ?");
    let mut query = sqlx::query_as::<_, PostDisplay>(&sql);
    if let Some(pat) = &pattern {
        query = query.bind(pat.clone()).bind(pat.clone());
    }
    if let Some(owner) = filter.owner {
        query = query.bind(owner);
    }
    if let Some(category) = filter.category {
        query = query.bind(category);
    }
    let posts = query.bind(per_page).bind(offset).fetch_all(pool).await?;

    Ok(PostPage {
        posts,
        page,
        per_page,
        total_count,
        total_pages,
    })
}

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "SELECT id, owner_id, category_id, title, body, preview_image, created_at \
         FROM posts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_display_by_id(pool: &DbPool, id: i64) -> Result<Option<PostDisplay>, sqlx::Error> {
    sqlx::query_as::<_, PostDisplay>(&format!("{SELECT_POST_DISPLAY} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Create a post and its image rows in one transaction; a failed image
/// insert rolls back the post as well.
pub async fn create_with_images(pool: &DbPool, new: &NewPost) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO posts (owner_id, category_id, title, body, preview_image) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(new.owner_id)
    .bind(new.category_id)
    .bind(&new.title)
    .bind(&new.body)
    .bind(&new.preview_image)
    .execute(&mut *tx)
    .await?;
    let post_id = result.last_insert_rowid();

    for image in &new.images {
        sqlx::query("INSERT INTO post_images (post_id, image) VALUES (?, ?)")
            .bind(post_id)
            .bind(image)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(post_id)
}

/// Update a post's mutable fields. Owner is immutable and not part of the
/// update surface; images only exist as a creation side effect.
pub async fn update(
    pool: &DbPool,
    id: i64,
    category_id: i64,
    title: &str,
    body: &str,
    preview_image: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE posts SET category_id = ?, title = ?, body = ?, preview_image = ? WHERE id = ?",
    )
    .bind(category_id)
    .bind(title)
    .bind(body)
    .bind(preview_image)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a post (cascades to images, comments, likes, favorites via FK).
pub async fn delete(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_images(pool: &DbPool, post_id: i64) -> Result<Vec<PostImage>, sqlx::Error> {
    sqlx::query_as::<_, PostImage>(
        "SELECT id, post_id, image FROM post_images WHERE post_id = ? ORDER BY id",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}
