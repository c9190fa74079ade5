//! Order API handlers.
//!
//! ```text
//! POST  /api/v1/orders {"userId":1,"lines":[{"productId":3,"quantity":2}]}
//! GET   /api/v1/orders/{id}
//! GET   /api/v1/users/{id}/orders
//! PATCH /api/v1/orders/{id}/status {"status":"shipped"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    Error, Order, OrderDraft, OrderId, OrderLine, OrderLineDraft, OrderStatus, ProductId, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// One requested line of `POST /api/v1/orders`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i32,
    /// Optional price override; the catalogue price is used when omitted.
    #[schema(value_type = Option<String>, example = "10.00")]
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

/// Request body for `POST /api/v1/orders`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: i64,
    #[serde(default)]
    pub lines: Vec<OrderLineRequest>,
}

impl From<CreateOrderRequest> for OrderDraft {
    fn from(value: CreateOrderRequest) -> Self {
        Self {
            user_id: UserId::new(value.user_id),
            lines: value
                .lines
                .into_iter()
                .map(|line| OrderLineDraft {
                    product_id: ProductId::new(line.product_id),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
        }
    }
}

/// Request body for `PATCH /api/v1/orders/{id}/status`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ChangeStatusRequest {
    #[schema(example = "shipped")]
    pub status: String,
}

/// Order line as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    #[schema(value_type = String, example = "10.00")]
    pub unit_price: Decimal,
    #[schema(value_type = String, example = "30.00")]
    pub subtotal: Decimal,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(value: OrderLine) -> Self {
        Self {
            id: value.id.get(),
            product_id: value.product_id.get(),
            quantity: value.quantity,
            unit_price: value.unit_price,
            subtotal: value.subtotal,
        }
    }
}

/// Order as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(value_type = String, example = "30.00")]
    pub total: Decimal,
    pub lines: Vec<OrderLineResponse>,
}

impl From<Order> for OrderResponse {
    fn from(value: Order) -> Self {
        Self {
            id: value.id.get(),
            user_id: value.user_id.get(),
            status: value.status.as_str().to_owned(),
            total: value.total,
            lines: value.lines.into_iter().map(OrderLineResponse::from).collect(),
        }
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus, Error> {
    raw.parse::<OrderStatus>().map_err(|err| {
        let allowed: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "status",
            "code": "invalid_status",
            "allowed": allowed,
        }))
    })
}

/// Place an order atomically.
///
/// Stock for every line is locked, checked, and decremented in one
/// transaction; any failure leaves stock untouched.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Unknown user or product", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 409, description = "Insufficient stock or lock timeout", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "createOrder"
)]
#[post("/orders")]
pub async fn create_order(
    state: web::Data<HttpState>,
    payload: web::Json<CreateOrderRequest>,
) -> ApiResult<HttpResponse> {
    let draft = OrderDraft::from(payload.into_inner());
    let order = state.orders.create_order(draft).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// Fetch one order with its lines.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<OrderResponse>> {
    let order = state
        .orders_query
        .get_order(OrderId::new(path.into_inner()))
        .await?;
    Ok(web::Json(order.into()))
}

/// List a user's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/orders",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Orders", body = [OrderResponse]),
        (status = 404, description = "User not found", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "listOrdersByUser"
)]
#[get("/users/{id}/orders")]
pub async fn list_orders_for_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<OrderResponse>>> {
    let orders = state
        .orders_query
        .list_orders_for_user(UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Move an order to a new status.
///
/// Accepted values are `pending`, `confirmed`, `shipped`, and `cancelled`.
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}/status",
    params(("id" = i64, Path, description = "Order id")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Unknown status", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "changeOrderStatus"
)]
#[patch("/orders/{id}/status")]
pub async fn change_order_status(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<ChangeStatusRequest>,
) -> ApiResult<web::Json<OrderResponse>> {
    let status = parse_status(&payload.status)?;
    let order = state
        .orders
        .change_status(OrderId::new(path.into_inner()), status)
        .await?;
    Ok(web::Json(order.into()))
}
