use super::handlers::{health, status};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        description = "Admin session gate of the DarkCode remote control server",
        contact(name = "DarkCode Team", email = "team@darkcode.dev"),
        license(name = "BSD-3-Clause")
    ),
    paths(health::health, status::status),
    components(schemas(
        health::Health,
        status::StatusResponse,
        status::ErrorResponse,
        super::monitor::ServerState
    )),
    tags(
        (name = "admin", description = "Admin session gate"),
        (name = "health", description = "Liveness probe")
    )
)]
struct AdminApi;

/// `OpenAPI` document for the JSON endpoints of the admin gate.
///
/// HTML pages are not described; only `/health` and `/admin/api/status`.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    AdminApi::openapi()
}
