//! HTTP handlers and route configuration.

mod auth;
mod context;
mod health;
mod posts;


use actix_web::{
    HttpMessage, HttpRequest, HttpResponse, HttpResponseBuilder, http::header, web,
};
use serde::Serialize;

use yatube_shared::{ErrorResponse, Rendered};

use crate::middleware::error::AppError;
use crate::observability::RequestId;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/", web::get().to(posts::index))
    .route("/group/{slug}/", web::get().to(posts::group_posts))
    .route("/profile/{username}/", web::get().to(posts::profile))
    .route("/posts/{post_id}/", web::get().to(posts::post_detail))
    .service(
        web::resource("/posts/{post_id}/edit/")
            .route(web::get().to(posts::edit_form))
            .route(web::post().to(posts::edit)),
    )
    .service(
        web::resource("/create/")
            .route(web::get().to(posts::create_form))
            .route(web::post().to(posts::create)),
    )
    .service(
        web::scope("/auth")
            .service(
                web::resource("/signup/")
                    .route(web::get().to(auth::signup_form))
                    .route(web::post().to(auth::signup)),
            )
            .service(
                web::resource("/login/")
                    .route(web::get().to(auth::login_form))
                    .route(web::post().to(auth::login)),
            )
            .service(
                web::resource("/logout/")
                    .route(web::get().to(auth::logout))
                    .route(web::post().to(auth::logout)),
            ),
    )
    .route("/health/", web::get().to(health::health_check))
    .default_service(web::to(not_found));
}

/// A page: the template to render and its context, as JSON.
fn render<C: Serialize>(template: &str, context: C) -> HttpResponse {
    HttpResponse::Ok().json(Rendered::new(template, context))
}

/// `302 Found` pointing at `location`.
fn found(location: impl Into<String>) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location.into()));
    builder
}

fn redirect(location: impl Into<String>) -> HttpResponse {
    found(location).finish()
}

/// Fallback for paths no route matches.
async fn not_found(req: HttpRequest) -> HttpResponse {
    let mut error = ErrorResponse::not_found(format!("No page at {}", req.path()));
    if let Some(id) = req.extensions().get::<RequestId>() {
        error = error.with_request_id(id.as_str());
    }

    HttpResponse::NotFound().json(error)
}
