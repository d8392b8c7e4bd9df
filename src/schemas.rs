//! Request and response shapes for the JSON API.
//!
//! Serializer selection is action-dependent: list requests get an
//! abbreviated shape, create/update echo a write-oriented shape, retrieve
//! gets the fully expanded one. `shape_for` is the single mapping; both
//! GET operations (list vs retrieve) resolve through it rather than by
//! HTTP method.

use serde::{Deserialize, Serialize};

use crate::aggregate::Engagement;
use crate::models::comment::CommentDisplay;
use crate::models::favorite::FavoriteDisplay;
use crate::models::like::LikeDisplay;
use crate::models::post::PostImage;
use crate::models::user::User;
use crate::policy::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    List,
    Write,
    Detail,
}

/// The action → shape map, evaluated once per request.
pub fn shape_for(action: Action) -> Shape {
    match action {
        Action::List => Shape::List,
        Action::Create | Action::Update => Shape::Write,
        Action::Retrieve | Action::Destroy => Shape::Detail,
    }
}

#[derive(Serialize, Debug)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

// --- Posts ---

/// Write payload for post create/update. Everything optional so missing
/// fields surface as field-level validation errors instead of a bare
/// deserialization failure; `owner` is deliberately absent — it is always
/// taken from the session.
#[derive(Deserialize, Debug)]
pub struct PostInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<i64>,
    pub preview_image: Option<String>,
    pub images: Option<Vec<PostImageInput>>,
}

#[derive(Deserialize, Debug)]
pub struct PostImageInput {
    pub image: String,
}

#[derive(Serialize, Debug)]
pub struct PostImageOut {
    pub id: i64,
    pub post: i64,
    pub image: String,
}

impl From<PostImage> for PostImageOut {
    fn from(img: PostImage) -> Self {
        PostImageOut {
            id: img.id,
            post: img.post_id,
            image: img.image,
        }
    }
}

/// Abbreviated shape for list pages: no body, no image list, counts and
/// viewer flags flattened in.
#[derive(Serialize, Debug)]
pub struct PostListItem {
    pub id: i64,
    pub title: String,
    pub owner: i64,
    pub owner_username: String,
    pub category: i64,
    pub category_name: String,
    pub preview_image: String,
    #[serde(flatten)]
    pub engagement: Engagement,
}

/// Fully expanded shape for detail pages: images, the whole comment list,
/// counts and viewer flags.
#[derive(Serialize, Debug)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub owner: i64,
    pub owner_username: String,
    pub category: i64,
    pub category_name: String,
    pub preview_image: String,
    pub images: Vec<PostImageOut>,
    pub created_at: String,
    pub comments: Vec<CommentOut>,
    #[serde(flatten)]
    pub engagement: Engagement,
}

/// Echo shape for create/update responses.
#[derive(Serialize, Debug)]
pub struct PostWrite {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub owner: i64,
    pub category: i64,
    pub preview_image: String,
    pub images: Vec<PostImageOut>,
    pub created_at: String,
}

/// The three post shapes behind one serializable type, so handlers can
/// dispatch on `shape_for` and still return a single value.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum PostShape {
    List(PostListItem),
    Write(PostWrite),
    Detail(Box<PostDetail>),
}

// --- Comments ---

#[derive(Deserialize, Debug)]
pub struct CommentInput {
    pub post: Option<i64>,
    pub body: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CommentOut {
    pub id: i64,
    pub owner: i64,
    pub owner_username: String,
    pub post: i64,
    pub body: String,
    pub created_at: String,
}

impl From<CommentDisplay> for CommentOut {
    fn from(c: CommentDisplay) -> Self {
        CommentOut {
            id: c.id,
            owner: c.owner_id,
            owner_username: c.owner_username,
            post: c.post_id,
            body: c.body,
            created_at: c.created_at,
        }
    }
}

// --- Likes and favorites ---

#[derive(Deserialize, Debug)]
pub struct LikeInput {
    pub post: Option<i64>,
}

#[derive(Serialize, Debug)]
pub struct LikeOut {
    pub id: i64,
    pub owner: i64,
    pub owner_username: String,
    pub post: i64,
}

impl From<LikeDisplay> for LikeOut {
    fn from(l: LikeDisplay) -> Self {
        LikeOut {
            id: l.id,
            owner: l.owner_id,
            owner_username: l.owner_username,
            post: l.post_id,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct FavoriteOut {
    pub id: i64,
    pub owner: i64,
    pub post: i64,
    pub post_title: String,
}

impl From<FavoriteDisplay> for FavoriteOut {
    fn from(fav: FavoriteDisplay) -> Self {
        FavoriteOut {
            id: fav.id,
            owner: fav.owner_id,
            post: fav.post_id,
            post_title: fav.post_title,
        }
    }
}

// --- Users ---

#[derive(Deserialize, Debug)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Abbreviated user shape for list pages.
#[derive(Serialize, Debug)]
pub struct UserListItem {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserListItem {
    fn from(u: &User) -> Self {
        UserListItem {
            id: u.id,
            username: u.username.clone(),
        }
    }
}

/// Expanded user shape for detail pages. Never carries the password hash.
#[derive(Serialize, Debug)]
pub struct UserDetail {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<&User> for UserDetail {
    fn from(u: &User) -> Self {
        UserDetail {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            created_at: u.created_at.clone(),
        }
    }
}

/// Echo shape for registration.
#[derive(Serialize, Debug)]
pub struct UserWrite {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserWrite {
    fn from(u: &User) -> Self {
        UserWrite {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum UserShape {
    List(UserListItem),
    Write(UserWrite),
    Detail(UserDetail),
}
