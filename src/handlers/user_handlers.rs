use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::auth::session::{self as auth_session, current_identity, require_identity};
use crate::auth::{password, validate};
use crate::db::DbPool;
use crate::errors::{self, AppError};
use crate::models::favorite;
use crate::models::user::{self, NewUser, User};
use crate::policy::{self, Action, Resource};
use crate::schemas::{FavoriteOut, LoginInput, RegisterInput, Shape, UserShape, shape_for};

/// Serialize a user in the shape the action calls for.
fn project(u: &User, action: Action) -> UserShape {
    match shape_for(action) {
        Shape::List => UserShape::List(u.into()),
        Shape::Write => UserShape::Write(u.into()),
        Shape::Detail => UserShape::Detail(u.into()),
    }
}

/// POST /users/register/ - create an account and log it in
pub async fn register(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<RegisterInput>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::User, Action::Create, None)?;

    let username = body.username.as_deref().unwrap_or("");
    let email = body.email.as_deref().unwrap_or("");
    let pwd = body.password.as_deref().unwrap_or("");

    let mut field_errors: Vec<(String, String)> = Vec::new();
    if let Some(e) = validate::validate_username(username) {
        field_errors.push(("username".to_string(), e));
    }
    if let Some(e) = validate::validate_email(email) {
        field_errors.push(("email".to_string(), e));
    }
    if let Some(e) = validate::validate_password(pwd) {
        field_errors.push(("password".to_string(), e));
    }
    if !field_errors.is_empty() {
        return Err(AppError::Validation(field_errors));
    }

    let hashed = password::hash_password(pwd).map_err(AppError::Hash)?;
    let new = NewUser {
        username: username.trim().to_string(),
        password: hashed,
        email: email.trim().to_string(),
    };
    let user_id = match user::create(&pool, &new).await {
        Ok(id) => id,
        Err(e) if errors::is_unique_violation(&e) => {
            return Err(AppError::Validation(vec![(
                "username".to_string(),
                "A user with that username already exists".to_string(),
            )]));
        }
        Err(e) => return Err(e.into()),
    };

    let created = user::find_by_id(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    auth_session::start(&session, &created)?;
    Ok(HttpResponse::Created().json(project(&created, Action::Create)))
}

/// POST /users/login/ - verify credentials, start a session
pub async fn login(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    let found = user::find_by_username(&pool, &body.username).await?;
    let Some(u) = found else {
        return Ok(
            HttpResponse::BadRequest().json(json!({"detail": "Invalid username or password"}))
        );
    };

    match password::verify_password(&body.password, &u.password) {
        Ok(true) => {
            auth_session::start(&session, &u)?;
            log::info!("User {} logged in", u.username);
            Ok(HttpResponse::Ok().json(project(&u, Action::Retrieve)))
        }
        Ok(false) => {
            Ok(HttpResponse::BadRequest().json(json!({"detail": "Invalid username or password"})))
        }
        Err(e) => Err(AppError::Hash(e)),
    }
}

/// POST /users/logout/ - drop the session; callers must be logged in
pub async fn logout(session: Session) -> Result<HttpResponse, AppError> {
    require_identity(&session)?;
    auth_session::clear(&session);
    Ok(HttpResponse::Ok().json(json!({"detail": "Logged out"})))
}

/// GET /users/ - abbreviated listing, authenticated callers only
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::User, Action::List, None)?;

    let items: Vec<UserShape> = user::find_all(&pool)
        .await?
        .iter()
        .map(|u| project(u, Action::List))
        .collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /users/{id}/ - expanded detail, authenticated callers only
pub async fn retrieve(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::User, Action::Retrieve, None)?;

    let u = user::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(project(&u, Action::Retrieve)))
}

/// GET /users/{id}/favorites/ - the favorites of that user
pub async fn favorites(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let viewer = current_identity(&session);
    policy::check(viewer.as_ref(), Resource::Favorite, Action::List, None)?;

    let target = user::find_by_id(&pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    let items: Vec<FavoriteOut> = favorite::find_by_owner(&pool, target.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(items))
}
