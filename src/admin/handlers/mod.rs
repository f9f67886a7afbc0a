pub mod assets;
pub mod dashboard;
pub mod health;
pub mod login;
pub mod logout;
pub mod status;

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
};

pub(crate) const HTML: &str = "text/html; charset=utf-8";

// axum fallback for unknown paths
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, [(CONTENT_TYPE, HTML)], "Not Found")
}
