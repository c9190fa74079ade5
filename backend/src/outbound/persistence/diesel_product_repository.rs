//! PostgreSQL-backed `ProductRepository`.
//!
//! Stock changes are single `UPDATE ... RETURNING` statements, so they take
//! the row lock for their own duration and queue behind any order
//! transaction holding it. The `CHECK (quantity >= 0)` constraint rejects
//! writes that would drive stock negative.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProductRepository, ProductRepositoryError};
use crate::domain::{Product, ProductDraft, ProductId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{ProductRow, ProductWrite};
use super::pool::{DbPool, PoolError};
use super::schema::products;

/// Diesel-backed implementation of the `ProductRepository` port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductRepositoryError {
    ProductRepositoryError::connection(error.into_message())
}

/// Map a Diesel failure for an operation on `product_id`.
fn map_diesel_error(
    error: diesel::result::Error,
    product_id: Option<ProductId>,
    code: Option<&str>,
) -> ProductRepositoryError {
    match (classify_diesel_error(error), product_id) {
        (DieselFailure::NotFound, Some(id)) => ProductRepositoryError::not_found(id),
        (DieselFailure::Connection(message), _) => ProductRepositoryError::connection(message),
        (DieselFailure::CheckViolation { .. }, Some(id)) => {
            ProductRepositoryError::negative_stock(id)
        }
        (DieselFailure::UniqueViolation { .. }, _) => {
            ProductRepositoryError::duplicate_code(code.unwrap_or_default())
        }
        (DieselFailure::ForeignKeyViolation { .. }, Some(id)) => ProductRepositoryError::in_use(id),
        (DieselFailure::OutOfRange(_), Some(id)) => ProductRepositoryError::stock_out_of_range(id),
        (DieselFailure::LockTimeout(message), _) | (DieselFailure::Query(message), _) => {
            ProductRepositoryError::query(message)
        }
        (_, None) => ProductRepositoryError::query("database error"),
    }
}

fn row_to_product(row: ProductRow) -> Product {
    Product {
        id: ProductId::new(row.id),
        name: row.name,
        description: row.description,
        price: row.price,
        quantity: row.quantity,
        code: row.code,
        active: row.active,
    }
}

fn write_from(draft: &ProductDraft) -> ProductWrite<'_> {
    ProductWrite {
        name: draft.name.trim(),
        description: draft.description.as_deref(),
        price: draft.price,
        quantity: draft.quantity,
        code: draft.code.as_deref().map(str::trim),
        active: draft.active,
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn create(&self, draft: &ProductDraft) -> Result<Product, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::insert_into(products::table)
            .values(&write_from(draft))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None, draft.code.as_deref()))?;

        Ok(row_to_product(row))
    }

    async fn update(
        &self,
        product_id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(products::table.find(product_id.get()))
            .set(&write_from(draft))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(product_id), draft.code.as_deref()))?;

        Ok(row_to_product(row))
    }

    async fn delete(&self, product_id: ProductId) -> Result<(), ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(products::table.find(product_id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(product_id), None))?;

        if deleted == 0 {
            return Err(ProductRepositoryError::not_found(product_id));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProductRow> = products::table
            .find(product_id.get())
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, Some(product_id), None))?;

        Ok(row.map(row_to_product))
    }

    async fn list(&self) -> Result<Vec<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProductRow> = products::table
            .order(products::id.asc())
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None, None))?;

        Ok(rows.into_iter().map(row_to_product).collect())
    }

    async fn adjust_stock(
        &self,
        product_id: ProductId,
        delta: i32,
    ) -> Result<i32, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(products::table.find(product_id.get()))
            .set(products::quantity.eq(products::quantity + delta))
            .returning(products::quantity)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(product_id), None))
    }

    async fn replace_stock(
        &self,
        product_id: ProductId,
        new_quantity: i32,
    ) -> Result<i32, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(products::table.find(product_id.get()))
            .set(products::quantity.eq(new_quantity))
            .returning(products::quantity)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(product_id), None))
    }
}
