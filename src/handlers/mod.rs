pub mod comment_handlers;
pub mod like_handlers;
pub mod post_handlers;
pub mod user_handlers;

use actix_web::{
    Error, HttpResponse, web,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

/// CSRF protection for REST mutation endpoints.
///
/// Rejects body-carrying mutations (POST/PUT/PATCH) that don't have
/// Content-Type: application/json. Browsers cannot send cross-origin JSON
/// with cookies via simple form POST — the Content-Type check acts as a
/// CSRF guard without requiring tokens. GET and bodyless DELETE are exempt.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::PATCH
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "detail": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Configure the resource routes. Literal segments (`/mine/`, `/register/`)
/// are registered before `/{id}/` so they are not swallowed by the id
/// matcher.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/register/", web::post().to(user_handlers::register))
            .route("/login/", web::post().to(user_handlers::login))
            .route("/logout/", web::post().to(user_handlers::logout))
            .route("/", web::get().to(user_handlers::list))
            .route("/{id}/", web::get().to(user_handlers::retrieve))
            .route("/{id}/favorites/", web::get().to(user_handlers::favorites)),
    );
    cfg.service(
        web::scope("/posts")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/", web::get().to(post_handlers::list))
            .route("/", web::post().to(post_handlers::create))
            .route("/{id}/", web::get().to(post_handlers::retrieve))
            .route("/{id}/", web::put().to(post_handlers::update))
            .route("/{id}/", web::patch().to(post_handlers::partial_update))
            .route("/{id}/", web::delete().to(post_handlers::destroy))
            .route("/{id}/comments/", web::get().to(post_handlers::comments))
            .route("/{id}/likes/", web::get().to(post_handlers::likes))
            .route("/{id}/favorites/", web::post().to(post_handlers::favorite_add))
            .route("/{id}/favorites/", web::delete().to(post_handlers::favorite_remove)),
    );
    cfg.service(
        web::scope("/comments")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/", web::post().to(comment_handlers::create))
            .route("/mine/", web::get().to(comment_handlers::mine))
            .route("/{id}/", web::get().to(comment_handlers::retrieve))
            .route("/{id}/", web::delete().to(comment_handlers::destroy)),
    );
    cfg.service(
        web::scope("/likes")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/", web::post().to(like_handlers::create))
            .route("/mine/", web::get().to(like_handlers::mine))
            .route("/{id}/", web::delete().to(like_handlers::destroy)),
    );
}
