//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every annotated handler from the inbound layer, the
//! error schema wrappers and the bearer-token security scheme. Swagger UI
//! serves it in debug builds and `cargo run --bin openapi-dump` prints it.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Register the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Product tracker API",
        description = "Product catalogue, daily video logs and monthly goal tracking."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("bearerAuth" = [])),
    paths(
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::list_trash,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::set_purchased,
        crate::inbound::http::products::trash_product,
        crate::inbound::http::products::restore_product,
        crate::inbound::http::products::delete_product_permanently,
        crate::inbound::http::products::add_tag,
        crate::inbound::http::products::remove_tag,
        crate::inbound::http::video_logs::log_video,
        crate::inbound::http::video_logs::video_log_for_date,
        crate::inbound::http::video_logs::list_video_logs,
        crate::inbound::http::goals::list_goals,
        crate::inbound::http::goals::create_or_update_goal,
        crate::inbound::http::goals::goal_stats,
        crate::inbound::http::goals::get_goal,
        crate::inbound::http::goals::delete_goal,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "products", description = "Product catalogue, trash and tags"),
        (name = "video-logs", description = "Per-day video counts"),
        (name = "goals", description = "Monthly goals and progress"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
