use actix_session::Session;

use crate::errors::AppError;
use crate::models::user::User;

/// The caller identity resolved from the session cookie. `None` at the
/// call sites means an anonymous request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

/// Read the caller identity from the session, if any.
pub fn current_identity(session: &Session) -> Option<Identity> {
    let id = session.get::<i64>("user_id").unwrap_or(None)?;
    let username = session
        .get::<String>("username")
        .unwrap_or(None)
        .unwrap_or_default();
    let is_admin = session
        .get::<bool>("is_admin")
        .unwrap_or(None)
        .unwrap_or(false);
    Some(Identity { id, username, is_admin })
}

/// Read the caller identity or fail with `Unauthenticated`.
pub fn require_identity(session: &Session) -> Result<Identity, AppError> {
    current_identity(session).ok_or(AppError::Unauthenticated)
}

/// Store the identity of a freshly authenticated user in the session.
pub fn start(session: &Session, user: &User) -> Result<(), AppError> {
    session
        .insert("user_id", user.id)
        .map_err(|e| AppError::Session(e.to_string()))?;
    session
        .insert("username", user.username.clone())
        .map_err(|e| AppError::Session(e.to_string()))?;
    session
        .insert("is_admin", user.is_admin)
        .map_err(|e| AppError::Session(e.to_string()))?;
    Ok(())
}

pub fn clear(session: &Session) {
    session.purge();
}
