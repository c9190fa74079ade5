//! Route table for the `/api/v1` scope.
//!
//! Extractor failures (malformed JSON, non-numeric ids, bad query strings)
//! are rewritten into the domain error shape so every 400 looks the same.

use actix_web::{HttpRequest, web};
use serde_json::json;

use crate::domain::Error;
use crate::inbound::http::{notifications, orders, products, users};

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}"))
        .with_details(json!({ "code": "invalid_body" }))
        .into()
}

fn path_error(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid path parameter: {err}"))
        .with_details(json!({ "code": "invalid_path" }))
        .into()
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}"))
        .with_details(json!({ "code": "invalid_query" }))
        .into()
}

/// Register every API handler and extractor configuration on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use inventory::inbound::http::routes::configure_api;
///
/// let _app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(orders::create_order)
        .service(orders::get_order)
        .service(orders::change_order_status)
        .service(orders::list_orders_for_user)
        .service(products::create_product)
        .service(products::list_products)
        .service(products::get_product)
        .service(products::update_product)
        .service(products::delete_product)
        .service(products::adjust_stock)
        .service(users::create_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(notifications::create_notification)
        .service(notifications::list_notifications)
        .service(notifications::mark_all_read)
        .service(notifications::delete_for_user)
        .service(notifications::mark_read)
        .service(notifications::delete_notification);
}
