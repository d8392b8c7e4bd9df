use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Hash(String),
    Session(String),
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict(String),
    /// Field-level validation failures as (field, message) pairs.
    Validation(Vec<(String, String)>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Unauthenticated => write!(f, "Authentication required"),
            AppError::Forbidden => write!(f, "Permission denied"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::Validation(errors) => {
                write!(f, "Validation failed:")?;
                for (field, msg) in errors {
                    write!(f, " {field}: {msg};")?;
                }
                Ok(())
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthenticated => HttpResponse::Unauthorized()
                .json(json!({"detail": "Authentication credentials were not provided"})),
            AppError::Forbidden => HttpResponse::Forbidden()
                .json(json!({"detail": "You do not have permission to perform this action"})),
            AppError::NotFound => {
                HttpResponse::NotFound().json(json!({"detail": "Not found"}))
            }
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({"detail": msg})),
            AppError::Validation(errors) => {
                let mut map = serde_json::Map::new();
                for (field, msg) in errors {
                    map.insert(field.clone(), json!(msg));
                }
                HttpResponse::BadRequest().json(serde_json::Value::Object(map))
            }
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError()
                    .json(json!({"detail": "Internal server error"}))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

/// True when a database error is a UNIQUE constraint violation. Used to
/// translate racing like/favorite inserts into "already exists" responses
/// instead of 500s.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
