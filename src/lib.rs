use axum::{body::Body, extract::DefaultBodyLimit, http::Request, routing::get, Router};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use uuid::Uuid;

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod manage;
pub mod models;
pub mod notify;
pub mod routes;
pub mod urls;
pub mod viewer;
pub mod views;

#[cfg(test)]
pub mod test_support;

pub const MAX_BODY_BYTES: usize = 200 * 1024 * 1024;

pub fn app(api: api::ApiClient, static_dir: impl AsRef<Path>) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %req.method(),
            uri = %req.uri(),
        )
    });

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(routes::router(routes::AppState { api }))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(
            ServiceBuilder::new()
                .layer(trace)
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_is_served_without_backend() {
        let api = test_support::client_for("http://127.0.0.1:9".into());
        let res = app(api, "static")
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stylesheet_is_served_from_static_dir() {
        let api = test_support::client_for("http://127.0.0.1:9".into());
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static");
        let res = app(api, dir)
            .oneshot(Request::get("/static/app.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/css");
    }
}
