//! Port for product persistence and the atomic stock primitives.
//!
//! `adjust_stock` and `replace_stock` each run as one statement against the
//! product row. Neither reads the quantity first, so concurrent writers
//! cannot lose each other's updates.

use async_trait::async_trait;

use crate::domain::{Product, ProductDraft, ProductId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by product repository adapters.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "product repository query failed: {message}",
        /// No product row matched the id.
        NotFound { product_id: ProductId } =>
            "product {product_id} not found",
        /// Another product already uses the code.
        DuplicateCode { code: String } =>
            "product code `{code}` is already in use",
        /// The mutation would leave stock below zero.
        NegativeStock { product_id: ProductId } =>
            "stock for product {product_id} would become negative",
        /// The resulting stock figure does not fit the quantity column.
        StockOutOfRange { product_id: ProductId } =>
            "stock for product {product_id} would exceed the storable quantity",
        /// Order lines still reference the product.
        InUse { product_id: ProductId } =>
            "product {product_id} is referenced by existing orders",
    }
}

/// Port owning product rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and return it with its assigned id.
    async fn create(&self, draft: &ProductDraft) -> Result<Product, ProductRepositoryError>;

    /// Overwrite every field of an existing product.
    async fn update(
        &self,
        product_id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ProductRepositoryError>;

    /// Remove a product.
    async fn delete(&self, product_id: ProductId) -> Result<(), ProductRepositoryError>;

    /// Find a product by id.
    async fn find_by_id(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// List every product ordered by id.
    async fn list(&self) -> Result<Vec<Product>, ProductRepositoryError>;

    /// Apply `quantity = quantity + delta` and return the new quantity.
    async fn adjust_stock(
        &self,
        product_id: ProductId,
        delta: i32,
    ) -> Result<i32, ProductRepositoryError>;

    /// Set `quantity = new_quantity` and return it.
    async fn replace_stock(
        &self,
        product_id: ProductId,
        new_quantity: i32,
    ) -> Result<i32, ProductRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_names_the_product() {
        let err = ProductRepositoryError::not_found(ProductId::new(12));
        assert_eq!(err.to_string(), "product 12 not found");
    }

    #[rstest]
    fn duplicate_code_names_the_code() {
        let err = ProductRepositoryError::duplicate_code("SKU-1");
        assert!(err.to_string().contains("SKU-1"));
    }
}
