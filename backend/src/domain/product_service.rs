//! Product catalogue service.
//!
//! Validates drafts before they reach the repository and translates
//! repository failures into domain errors.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{ProductCatalogue, ProductRepository, ProductRepositoryError};
use crate::domain::{Error, Product, ProductDraft, ProductId, ProductValidationError};

/// Product service implementing [`ProductCatalogue`].
#[derive(Clone)]
pub struct ProductService<R> {
    repo: Arc<R>,
}

impl<R> ProductService<R> {
    /// Create a new service over the product repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

pub(crate) fn map_product_error(error: ProductRepositoryError) -> Error {
    match error {
        ProductRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("product repository unavailable: {message}"))
        }
        ProductRepositoryError::Query { message } => {
            Error::internal(format!("product repository error: {message}"))
        }
        ProductRepositoryError::NotFound { product_id } => {
            Error::not_found(format!("product {product_id} not found"))
                .with_details(json!({ "productId": product_id, "code": "product_not_found" }))
        }
        ProductRepositoryError::DuplicateCode { code } => {
            Error::conflict(format!("product code `{code}` is already in use"))
                .with_details(json!({ "field": "code", "code": "duplicate_code" }))
        }
        ProductRepositoryError::NegativeStock { product_id } => {
            Error::conflict(format!("stock for product {product_id} would become negative"))
                .with_details(json!({ "productId": product_id, "code": "negative_stock" }))
        }
        ProductRepositoryError::StockOutOfRange { product_id } => Error::invalid_request(
            format!("stock for product {product_id} would exceed the storable quantity"),
        )
        .with_details(json!({ "productId": product_id, "code": "stock_out_of_range" })),
        ProductRepositoryError::InUse { product_id } => {
            Error::conflict(format!("product {product_id} is referenced by orders"))
                .with_details(json!({ "productId": product_id, "code": "product_in_use" }))
        }
    }
}

fn invalid_draft(error: ProductValidationError) -> Error {
    let field = match error {
        ProductValidationError::EmptyName => "name",
        ProductValidationError::NegativePrice | ProductValidationError::PriceOutOfRange => {
            "price"
        }
        ProductValidationError::NegativeQuantity => "quantity",
        ProductValidationError::BlankCode => "code",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

#[async_trait]
impl<R> ProductCatalogue for ProductService<R>
where
    R: ProductRepository,
{
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, Error> {
        draft.validate().map_err(invalid_draft)?;
        let product = self.repo.create(&draft).await.map_err(map_product_error)?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    async fn update_product(
        &self,
        product_id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, Error> {
        draft.validate().map_err(invalid_draft)?;
        self.repo
            .update(product_id, &draft)
            .await
            .map_err(map_product_error)
    }

    async fn delete_product(&self, product_id: ProductId) -> Result<(), Error> {
        self.repo
            .delete(product_id)
            .await
            .map_err(map_product_error)?;
        info!(product_id = %product_id, "product deleted");
        Ok(())
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Product, Error> {
        self.repo
            .find_by_id(product_id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| map_product_error(ProductRepositoryError::not_found(product_id)))
    }

    async fn list_products(&self) -> Result<Vec<Product>, Error> {
        self.repo.list().await.map_err(map_product_error)
    }

    async fn adjust_stock(&self, product_id: ProductId, delta: i32) -> Result<i32, Error> {
        let quantity = self
            .repo
            .adjust_stock(product_id, delta)
            .await
            .map_err(map_product_error)?;
        info!(product_id = %product_id, delta, quantity, "stock adjusted");
        Ok(quantity)
    }
}
