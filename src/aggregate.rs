//! Viewer-relative enrichment of posts.
//!
//! Read-only aggregation composed after the post row is loaded: related
//! counts for everyone, plus per-viewer membership flags for authenticated
//! viewers. Anonymous viewers get no `is_liked`/`is_favorite` keys at all —
//! omission, not `false`, is the contract.

use serde::Serialize;

use crate::auth::session::Identity;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{comment, favorite, like};

#[derive(Debug, Serialize)]
pub struct Engagement {
    pub comments_count: i64,
    pub likes_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

/// Compute derived fields for one post. Two indexed counts, plus two
/// indexed existence probes when the viewer is authenticated. Never
/// mutates anything.
pub async fn enrich(
    pool: &DbPool,
    post_id: i64,
    viewer: Option<&Identity>,
) -> Result<Engagement, AppError> {
    let comments_count = comment::count_by_post(pool, post_id).await?;
    let likes_count = like::count_by_post(pool, post_id).await?;

    let (is_liked, is_favorite) = match viewer {
        Some(v) => (
            Some(like::exists(pool, v.id, post_id).await?),
            Some(favorite::exists(pool, v.id, post_id).await?),
        ),
        None => (None, None),
    };

    Ok(Engagement {
        comments_count,
        likes_count,
        is_liked,
        is_favorite,
    })
}
