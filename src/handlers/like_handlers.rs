use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session::{current_identity, require_identity};
use crate::db::DbPool;
use crate::errors::{self, AppError};
use crate::models::{like, post};
use crate::policy::{self, Action, Resource};
use crate::schemas::{LikeInput, LikeOut};

/// POST /likes/ - like a post; owner is always the caller. A duplicate
/// insert is translated into a conflict response, never a 500.
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<LikeInput>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::Like, Action::Create, None)?;
    let caller = viewer.ok_or(AppError::Unauthenticated)?;

    let Some(post_id) = body.post else {
        return Err(AppError::Validation(vec![(
            "post".to_string(),
            "This field is required".to_string(),
        )]));
    };
    if post::find_by_id(&pool, post_id).await?.is_none() {
        return Err(AppError::Validation(vec![(
            "post".to_string(),
            "Unknown post".to_string(),
        )]));
    }

    match like::create(&pool, caller.id, post_id).await {
        Ok(like_id) => Ok(HttpResponse::Created().json(LikeOut {
            id: like_id,
            owner: caller.id,
            owner_username: caller.username.clone(),
            post: post_id,
        })),
        Err(e) if errors::is_unique_violation(&e) => {
            Err(AppError::Conflict("Already liked".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// DELETE /likes/{id}/ - only the like's owner
pub async fn destroy(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    let l = like::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    policy::check(viewer.as_ref(), Resource::Like, Action::Destroy, Some(l.owner_id))?;

    like::delete(&pool, l.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /likes/mine/ - the caller's own likes
pub async fn mine(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let caller = require_identity(&session)?;
    let items: Vec<LikeOut> = like::find_by_owner(&pool, caller.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(items))
}
