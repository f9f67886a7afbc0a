use axum::{
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};

static LOGO: &[u8] = include_bytes!("../../../assets/favicon.png");

pub async fn logo() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "image/png"), (CACHE_CONTROL, "max-age=3600")],
        LOGO,
    )
}

pub async fn favicon() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "image/png"), (CACHE_CONTROL, "max-age=86400")],
        LOGO,
    )
}
