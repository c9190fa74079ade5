//! OpenAPI document for the REST API.
//!
//! Served through Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::{health, notifications, orders, products, users};

/// OpenAPI document covering every `/api/v1` endpoint and the health checks.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory backend API",
        description = "Orders with atomic stock reservation, catalogue and user administration, and stock notifications."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    paths(
        orders::create_order,
        orders::get_order,
        orders::list_orders_for_user,
        orders::change_order_status,
        products::create_product,
        products::list_products,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::adjust_stock,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        notifications::create_notification,
        notifications::list_notifications,
        notifications::mark_all_read,
        notifications::delete_for_user,
        notifications::mark_read,
        notifications::delete_notification,
        health::ready,
        health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "orders", description = "Order placement and status"),
        (name = "products", description = "Catalogue and manual stock corrections"),
        (name = "users", description = "User administration"),
        (name = "notifications", description = "Stock alerts and other notifications"),
        (name = "health", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api/v1/orders")]
    #[case("/api/v1/orders/{id}/status")]
    #[case("/api/v1/products/{id}/stock-adjustments")]
    #[case("/api/v1/users/{id}/notifications/read")]
    #[case("/api/v1/notifications")]
    #[case("/health/ready")]
    fn document_lists_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("crate.domain.Error"));
        assert!(schemas.contains_key("crate.domain.ErrorCode"));
    }
}
