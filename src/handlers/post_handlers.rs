use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;
use std::collections::HashMap;

use crate::aggregate;
use crate::auth::session::{Identity, current_identity};
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::{self, AppError};
use crate::models::post::{NewPost, PostDisplay, PostFilter};
use crate::models::{category, comment, favorite, like, post};
use crate::policy::{self, Action, Resource};
use crate::schemas::{
    CommentOut, LikeOut, PaginatedResponse, PostDetail, PostInput, PostListItem, PostShape,
    PostWrite, Shape, shape_for,
};

/// Fixed page size for post lists.
const PAGE_SIZE: i64 = 3;

/// Serialize a post in the shape the action calls for. List and retrieve
/// both enrich with viewer-relative engagement; the write echo does not.
async fn project(
    pool: &DbPool,
    p: &PostDisplay,
    viewer: Option<&Identity>,
    action: Action,
) -> Result<PostShape, AppError> {
    match shape_for(action) {
        Shape::List => {
            let engagement = aggregate::enrich(pool, p.id, viewer).await?;
            Ok(PostShape::List(PostListItem {
                id: p.id,
                title: p.title.clone(),
                owner: p.owner_id,
                owner_username: p.owner_username.clone(),
                category: p.category_id,
                category_name: p.category_name.clone(),
                preview_image: p.preview_image.clone(),
                engagement,
            }))
        }
        Shape::Write => {
            let images = post::find_images(pool, p.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            Ok(PostShape::Write(PostWrite {
                id: p.id,
                title: p.title.clone(),
                body: p.body.clone(),
                owner: p.owner_id,
                category: p.category_id,
                preview_image: p.preview_image.clone(),
                images,
                created_at: p.created_at.clone(),
            }))
        }
        Shape::Detail => {
            let engagement = aggregate::enrich(pool, p.id, viewer).await?;
            let images = post::find_images(pool, p.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            let comments: Vec<CommentOut> = comment::find_by_post(pool, p.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            Ok(PostShape::Detail(Box::new(PostDetail {
                id: p.id,
                title: p.title.clone(),
                body: p.body.clone(),
                owner: p.owner_id,
                owner_username: p.owner_username.clone(),
                category: p.category_id,
                category_name: p.category_name.clone(),
                preview_image: p.preview_image.clone(),
                images,
                created_at: p.created_at.clone(),
                comments,
                engagement,
            })))
        }
    }
}

/// Validate the write payload, returning the resolved category id.
/// `fallback` carries the existing row's values for PATCH merges.
async fn validated_category(
    pool: &DbPool,
    input: &PostInput,
    fallback: Option<i64>,
) -> Result<i64, AppError> {
    let category_id = match (input.category, fallback) {
        (Some(id), _) => id,
        (None, Some(existing)) => existing,
        (None, None) => {
            return Err(AppError::Validation(vec![(
                "category".to_string(),
                "This field is required".to_string(),
            )]));
        }
    };
    if !category::exists(pool, category_id).await? {
        return Err(AppError::Validation(vec![(
            "category".to_string(),
            "Unknown category".to_string(),
        )]));
    }
    Ok(category_id)
}

/// GET /posts/ - paginated list; query params: page, search, owner, category
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::Post, Action::List, None)?;

    let page = query
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let filter = PostFilter {
        search: query.get("search").cloned(),
        owner: query.get("owner").and_then(|v| v.parse::<i64>().ok()),
        category: query.get("category").and_then(|v| v.parse::<i64>().ok()),
    };

    let page_data = post::find_paginated(&pool, page, PAGE_SIZE, &filter).await?;

    let mut items = Vec::with_capacity(page_data.posts.len());
    for p in &page_data.posts {
        items.push(project(&pool, p, viewer.as_ref(), Action::List).await?);
    }

    Ok(HttpResponse::Ok().json(PaginatedResponse {
        items,
        page: page_data.page,
        per_page: page_data.per_page,
        total: page_data.total_count,
    }))
}

/// POST /posts/ - create a post with optional image attachments. Owner is
/// always the session identity; the payload carries no owner field.
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<PostInput>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::Post, Action::Create, None)?;
    let caller = viewer.ok_or(AppError::Unauthenticated)?;

    let title = body.title.as_deref().unwrap_or("");
    if let Some(e) = validate::validate_required(title, "Title", 200) {
        return Err(AppError::Validation(vec![("title".to_string(), e)]));
    }
    let category_id = validated_category(&pool, &body, None).await?;

    let new = NewPost {
        owner_id: caller.id,
        category_id,
        title: title.trim().to_string(),
        body: body.body.clone().unwrap_or_default(),
        preview_image: body.preview_image.clone().unwrap_or_default(),
        images: body
            .images
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|i| i.image.clone())
            .collect(),
    };
    let post_id = post::create_with_images(&pool, &new).await?;

    let created = post::find_display_by_id(&pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let shape = project(&pool, &created, Some(&caller), Action::Create).await?;
    Ok(HttpResponse::Created().json(shape))
}

/// GET /posts/{id}/ - fully expanded detail with embedded comments
pub async fn retrieve(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    let p = post::find_display_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    policy::check(viewer.as_ref(), Resource::Post, Action::Retrieve, Some(p.owner_id))?;

    let shape = project(&pool, &p, viewer.as_ref(), Action::Retrieve).await?;
    Ok(HttpResponse::Ok().json(shape))
}

/// PUT /posts/{id}/ - full update, owner only
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<PostInput>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    let existing = post::find_display_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    policy::check(
        viewer.as_ref(),
        Resource::Post,
        Action::Update,
        Some(existing.owner_id),
    )?;

    let title = body.title.as_deref().unwrap_or("");
    if let Some(e) = validate::validate_required(title, "Title", 200) {
        return Err(AppError::Validation(vec![("title".to_string(), e)]));
    }
    let category_id = validated_category(&pool, &body, None).await?;

    post::update(
        &pool,
        existing.id,
        category_id,
        title.trim(),
        body.body.as_deref().unwrap_or(""),
        body.preview_image.as_deref().unwrap_or(""),
    )
    .await?;

    let updated = post::find_display_by_id(&pool, existing.id)
        .await?
        .ok_or(AppError::NotFound)?;
    let shape = project(&pool, &updated, viewer.as_ref(), Action::Update).await?;
    Ok(HttpResponse::Ok().json(shape))
}

/// PATCH /posts/{id}/ - partial update, owner only; absent fields keep
/// their stored values
pub async fn partial_update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<PostInput>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    let existing = post::find_display_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    policy::check(
        viewer.as_ref(),
        Resource::Post,
        Action::Update,
        Some(existing.owner_id),
    )?;

    let title = body.title.as_deref().unwrap_or(&existing.title);
    if let Some(e) = validate::validate_required(title, "Title", 200) {
        return Err(AppError::Validation(vec![("title".to_string(), e)]));
    }
    let category_id = validated_category(&pool, &body, Some(existing.category_id)).await?;

    post::update(
        &pool,
        existing.id,
        category_id,
        title.trim(),
        body.body.as_deref().unwrap_or(&existing.body),
        body.preview_image.as_deref().unwrap_or(&existing.preview_image),
    )
    .await?;

    let updated = post::find_display_by_id(&pool, existing.id)
        .await?
        .ok_or(AppError::NotFound)?;
    let shape = project(&pool, &updated, viewer.as_ref(), Action::Update).await?;
    Ok(HttpResponse::Ok().json(shape))
}

/// DELETE /posts/{id}/ - owner or admin
pub async fn destroy(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    let existing = post::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    policy::check(
        viewer.as_ref(),
        Resource::Post,
        Action::Destroy,
        Some(existing.owner_id),
    )?;

    post::delete(&pool, existing.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /posts/{id}/comments/ - the raw comment list, not just the count
pub async fn comments(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::Comment, Action::List, None)?;

    let p = post::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    let items: Vec<CommentOut> = comment::find_by_post(&pool, p.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /posts/{id}/likes/ - who liked this post
pub async fn likes(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::Like, Action::Retrieve, None)?;

    let p = post::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    let items: Vec<LikeOut> = like::find_by_post(&pool, p.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(items))
}

/// The favorite toggle as one domain operation: `desired` true adds to the
/// caller's favorites, false removes. A repeat add answers "already in
/// favorites" with a distinct status, never a 500; the UNIQUE constraint
/// backstops two adds racing past the existence check. A remove with
/// nothing to remove answers "not in favorites".
async fn set_favorite(
    pool: &DbPool,
    caller: &Identity,
    post_id: i64,
    desired: bool,
) -> Result<HttpResponse, AppError> {
    let p = post::find_by_id(pool, post_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if desired {
        if favorite::exists(pool, caller.id, p.id).await? {
            return Ok(HttpResponse::BadRequest().json(json!({"detail": "Already in favorites"})));
        }
        match favorite::create(pool, caller.id, p.id).await {
            Ok(_) => Ok(HttpResponse::Created().json(json!({"detail": "Added to favorites"}))),
            Err(e) if errors::is_unique_violation(&e) => {
                Ok(HttpResponse::BadRequest().json(json!({"detail": "Already in favorites"})))
            }
            Err(e) => Err(e.into()),
        }
    } else if favorite::remove(pool, caller.id, p.id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(HttpResponse::NotFound().json(json!({"detail": "Not in favorites"})))
    }
}

/// POST /posts/{id}/favorites/ - the verb maps to desired=true here only
pub async fn favorite_add(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::Favorite, Action::Create, None)?;
    let caller = viewer.ok_or(AppError::Unauthenticated)?;
    set_favorite(&pool, &caller, path.into_inner(), true).await
}

/// DELETE /posts/{id}/favorites/ - the verb maps to desired=false here only
pub async fn favorite_remove(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::Favorite, Action::Destroy, None)?;
    let caller = viewer.ok_or(AppError::Unauthenticated)?;
    set_favorite(&pool, &caller, path.into_inner(), false).await
}
