use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session::{current_identity, require_identity};
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{comment, post};
use crate::policy::{self, Action, Resource};
use crate::schemas::{CommentInput, CommentOut};

/// POST /comments/ - create a comment; owner is always the caller
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<CommentInput>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::Comment, Action::Create, None)?;
    let caller = viewer.ok_or(AppError::Unauthenticated)?;

    let mut errors: Vec<(String, String)> = Vec::new();
    let text = body.body.as_deref().unwrap_or("");
    if let Some(e) = validate::validate_required(text, "Body", 2000) {
        errors.push(("body".to_string(), e));
    }
    if body.post.is_none() {
        errors.push(("post".to_string(), "This field is required".to_string()));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let post_id = body.post.unwrap_or_default();
    if post::find_by_id(&pool, post_id).await?.is_none() {
        return Err(AppError::Validation(vec![(
            "post".to_string(),
            "Unknown post".to_string(),
        )]));
    }

    let comment_id = comment::create(&pool, caller.id, post_id, text.trim()).await?;
    let created = comment::find_display_by_id(&pool, comment_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(CommentOut::from(created)))
}

/// GET /comments/{id}/ - anyone may read a comment
pub async fn retrieve(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    let c = comment::find_display_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    policy::check(viewer.as_ref(), Resource::Comment, Action::Retrieve, Some(c.owner_id))?;
    Ok(HttpResponse::Ok().json(CommentOut::from(c)))
}

/// DELETE /comments/{id}/ - only the comment's owner
pub async fn destroy(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    let c = comment::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    policy::check(viewer.as_ref(), Resource::Comment, Action::Destroy, Some(c.owner_id))?;

    comment::delete(&pool, c.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /comments/mine/ - the caller's own comments
pub async fn mine(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let caller = require_identity(&session)?;
    let items: Vec<CommentOut> = comment::find_by_owner(&pool, caller.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(items))
}
