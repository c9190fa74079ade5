//! Product catalogue handlers.
//!
//! ```text
//! POST   /api/v1/products
//! GET    /api/v1/products
//! GET    /api/v1/products/{id}
//! PUT    /api/v1/products/{id}
//! DELETE /api/v1/products/{id}
//! POST   /api/v1/products/{id}/stock-adjustments {"delta":-2}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Product, ProductDraft, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const fn default_active() -> bool {
    true
}

/// Request body for creating or replacing a product.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[schema(example = "Widget")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl From<ProductRequest> for ProductDraft {
    fn from(value: ProductRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            price: value.price,
            quantity: value.quantity,
            code: value.code,
            active: value.active,
        }
    }
}

/// Product as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub quantity: i32,
    pub code: Option<String>,
    pub active: bool,
}

impl From<Product> for ProductResponse {
    fn from(value: Product) -> Self {
        Self {
            id: value.id.get(),
            name: value.name,
            description: value.description,
            price: value.price,
            quantity: value.quantity,
            code: value.code,
            active: value.active,
        }
    }
}

/// Request body for `POST /api/v1/products/{id}/stock-adjustments`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StockAdjustmentRequest {
    /// Signed change applied to the stock on hand.
    pub delta: i32,
}

/// Stock on hand after an adjustment.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelResponse {
    pub product_id: i64,
    pub quantity: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 409, description = "Duplicate code", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    payload: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let product = state
        .products
        .create_product(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Products", body = [ProductResponse]),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ProductResponse>>> {
    let products = state.products.list_products().await?;
    Ok(web::Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "getProduct"
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ProductResponse>> {
    let product = state
        .products
        .get_product(ProductId::new(path.into_inner()))
        .await?;
    Ok(web::Json(product.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid product", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 409, description = "Duplicate code", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<ProductRequest>,
) -> ApiResult<web::Json<ProductResponse>> {
    let product = state
        .products
        .update_product(ProductId::new(path.into_inner()), payload.into_inner().into())
        .await?;
    Ok(web::Json(product.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 409, description = "Product is referenced by orders", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .products
        .delete_product(ProductId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Apply a manual relative stock correction.
///
/// Adjustments that would take stock below zero fail with `409`.
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/stock-adjustments",
    params(("id" = i64, Path, description = "Product id")),
    request_body = StockAdjustmentRequest,
    responses(
        (status = 200, description = "New stock level", body = StockLevelResponse),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 409, description = "Stock would become negative", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "adjustStock"
)]
#[post("/products/{id}/stock-adjustments")]
pub async fn adjust_stock(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<StockAdjustmentRequest>,
) -> ApiResult<web::Json<StockLevelResponse>> {
    let product_id = ProductId::new(path.into_inner());
    let quantity = state
        .products
        .adjust_stock(product_id, payload.delta)
        .await?;
    Ok(web::Json(StockLevelResponse {
        product_id: product_id.get(),
        quantity,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::inbound::http::test_utils::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    fn widget() -> Product {
        Product {
            id: ProductId::new(3),
            name: "Widget".to_owned(),
            description: None,
            price: Decimal::new(1999, 2),
            quantity: 7,
            code: Some("W-1".to_owned()),
            active: true,
        }
    }

    #[actix_web::test]
    async fn create_product_defaults_active_and_returns_201() {
        let mut ports = MockPorts::default();
        ports
            .products
            .expect_create_product()
            .withf(|draft| draft.active && draft.name == "Widget" && draft.quantity == 7)
            .times(1)
            .return_once(|_| Ok(widget()));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/products")
            .set_json(json!({"name": "Widget", "price": "19.99", "quantity": 7, "code": "W-1"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["id"], 3);
        assert_eq!(body["price"], "19.99");
    }

    #[actix_web::test]
    async fn duplicate_code_is_conflict() {
        let mut ports = MockPorts::default();
        ports
            .products
            .expect_create_product()
            .return_once(|_| Err(Error::conflict("product code W-1 already exists")));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/products")
            .set_json(json!({"name": "Widget", "price": "1.00", "code": "W-1"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn update_product_passes_id_and_draft() {
        let mut ports = MockPorts::default();
        ports
            .products
            .expect_update_product()
            .withf(|id, draft| *id == ProductId::new(3) && !draft.active)
            .return_once(|_, _| {
                let mut product = widget();
                product.active = false;
                Ok(product)
            });
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/products/3")
            .set_json(json!({"name": "Widget", "price": "19.99", "active": false}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["active"], false);
    }

    #[actix_web::test]
    async fn list_and_get_products() {
        let mut ports = MockPorts::default();
        ports
            .products
            .expect_list_products()
            .return_once(|| Ok(vec![widget()]));
        ports
            .products
            .expect_get_product()
            .withf(|id| *id == ProductId::new(3))
            .return_once(|_| Ok(widget()));
        let app = actix_test::init_service(ports.into_app()).await;

        let list = actix_test::TestRequest::get()
            .uri("/api/v1/products")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, list).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let one = actix_test::TestRequest::get()
            .uri("/api/v1/products/3")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, one).await;
        assert_eq!(body["code"], "W-1");
    }

    #[actix_web::test]
    async fn delete_product_returns_204() {
        let mut ports = MockPorts::default();
        ports
            .products
            .expect_delete_product()
            .withf(|id| *id == ProductId::new(3))
            .return_once(|_| Ok(()));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::delete()
            .uri("/api/v1/products/3")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn stock_adjustment_returns_new_quantity() {
        let mut ports = MockPorts::default();
        ports
            .products
            .expect_adjust_stock()
            .withf(|id, delta| *id == ProductId::new(3) && *delta == -2)
            .return_once(|_, _| Ok(5));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/products/3/stock-adjustments")
            .set_json(json!({"delta": -2}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body, json!({"productId": 3, "quantity": 5}));
    }

    #[actix_web::test]
    async fn stock_adjustment_below_zero_is_conflict() {
        let mut ports = MockPorts::default();
        ports
            .products
            .expect_adjust_stock()
            .return_once(|_, _| Err(Error::conflict("stock for product 3 would become negative")));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/products/3/stock-adjustments")
            .set_json(json!({"delta": -20}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
