//! Driving port for catalogue maintenance and manual stock corrections.

use async_trait::async_trait;

use crate::domain::{Error, Product, ProductDraft, ProductId};

/// Driving port for product use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalogue: Send + Sync {
    /// Validate and store a new product.
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, Error>;

    /// Validate and overwrite an existing product.
    async fn update_product(
        &self,
        product_id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, Error>;

    /// Remove a product.
    async fn delete_product(&self, product_id: ProductId) -> Result<(), Error>;

    /// Fetch one product.
    async fn get_product(&self, product_id: ProductId) -> Result<Product, Error>;

    /// Fetch every product.
    async fn list_products(&self) -> Result<Vec<Product>, Error>;

    /// Apply a relative stock change and return the new quantity.
    async fn adjust_stock(&self, product_id: ProductId, delta: i32) -> Result<i32, Error>;
}
