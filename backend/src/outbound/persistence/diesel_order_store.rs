//! PostgreSQL-backed `OrderStore`.
//!
//! A placement transaction owns one pooled connection for its whole life.
//! `begin` opens the transaction and sets `lock_timeout` for it, so a
//! `SELECT ... FOR UPDATE` that waits too long fails instead of queueing
//! forever. A transaction dropped without commit leaves the connection
//! mid-transaction; the pool then treats it as broken and closes it, which
//! rolls the work back server-side.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::{debug, warn};

use crate::domain::ports::{OrderStore, OrderStoreError, OrderTransaction};
use crate::domain::{
    Order, OrderId, OrderLine, OrderLineId, OrderStatus, PricedOrder, ProductId, StockSnapshot,
    UserId,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow, StockRow};
use super::pool::{DbPool, PoolError};
use super::schema::{order_lines, orders, products, users};

/// Default wait for a product row lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Diesel-backed implementation of the `OrderStore` port.
#[derive(Clone)]
pub struct DieselOrderStore {
    pool: DbPool,
    lock_timeout: Duration,
}

impl DieselOrderStore {
    /// Create a store that waits at most [`DEFAULT_LOCK_TIMEOUT`] for locks.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Override the row lock wait.
    #[must_use]
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

fn map_pool_error(error: PoolError) -> OrderStoreError {
    OrderStoreError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> OrderStoreError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => OrderStoreError::connection(message),
        DieselFailure::LockTimeout(message) => OrderStoreError::lock_timeout(message),
        DieselFailure::NotFound => OrderStoreError::query("record not found"),
        DieselFailure::Query(message) => OrderStoreError::query(message),
        DieselFailure::OutOfRange(message) => OrderStoreError::out_of_range(message),
        DieselFailure::CheckViolation { constraint }
        | DieselFailure::UniqueViolation { constraint }
        | DieselFailure::ForeignKeyViolation { constraint } => OrderStoreError::query(format!(
            "constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus, OrderStoreError> {
    raw.parse()
        .map_err(|err| OrderStoreError::query(format!("stored order status invalid: {err}")))
}

fn line_from_row(row: OrderLineRow) -> OrderLine {
    OrderLine {
        id: OrderLineId::new(row.id),
        order_id: OrderId::new(row.order_id),
        product_id: ProductId::new(row.product_id),
        quantity: row.quantity,
        unit_price: row.unit_price,
        subtotal: row.subtotal,
    }
}

fn order_from_rows(row: OrderRow, lines: Vec<OrderLineRow>) -> Result<Order, OrderStoreError> {
    Ok(Order {
        id: OrderId::new(row.id),
        user_id: UserId::new(row.user_id),
        status: parse_status(&row.status)?,
        total: row.total,
        lines: lines.into_iter().map(line_from_row).collect(),
    })
}

/// Load the lines of each order and attach them.
async fn with_lines(
    conn: &mut AsyncPgConnection,
    headers: Vec<OrderRow>,
) -> Result<Vec<Order>, OrderStoreError> {
    let ids: Vec<i64> = headers.iter().map(|row| row.id).collect();
    let rows: Vec<OrderLineRow> = order_lines::table
        .filter(order_lines::order_id.eq_any(&ids))
        .order(order_lines::id.asc())
        .select(OrderLineRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut grouped: HashMap<i64, Vec<OrderLineRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row);
    }

    headers
        .into_iter()
        .map(|header| {
            let lines = grouped.remove(&header.id).unwrap_or_default();
            order_from_rows(header, lines)
        })
        .collect()
}

/// One open placement transaction.
struct DieselOrderTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

#[async_trait]
impl OrderTransaction for DieselOrderTransaction {
    async fn lock_products(
        &mut self,
        product_ids: &[ProductId],
    ) -> Result<Vec<StockSnapshot>, OrderStoreError> {
        let ids: Vec<i64> = product_ids.iter().map(|id| id.get()).collect();
        let rows: Vec<StockRow> = products::table
            .filter(products::id.eq_any(&ids))
            .order(products::id.asc())
            .select(StockRow::as_select())
            .for_update()
            .load(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;

        debug!(requested = ids.len(), locked = rows.len(), "product rows locked");
        Ok(rows
            .into_iter()
            .map(|row| StockSnapshot {
                product_id: ProductId::new(row.id),
                price: row.price,
                quantity: row.quantity,
            })
            .collect())
    }

    async fn user_exists(&mut self, user_id: UserId) -> Result<bool, OrderStoreError> {
        diesel::select(diesel::dsl::exists(users::table.find(user_id.get())))
            .get_result(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn insert_order(&mut self, order: &PricedOrder) -> Result<Order, OrderStoreError> {
        let header: OrderRow = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                user_id: order.user_id.get(),
                status: OrderStatus::Pending.as_str(),
                total: order.total,
            })
            .returning(OrderRow::as_returning())
            .get_result(&mut *self.conn)
            .await
            .map_err(|err| match classify_diesel_error(err) {
                DieselFailure::ForeignKeyViolation { .. } => {
                    OrderStoreError::user_not_found(order.user_id)
                }
                DieselFailure::OutOfRange(message) => OrderStoreError::out_of_range(message),
                DieselFailure::Connection(message) => OrderStoreError::connection(message),
                DieselFailure::LockTimeout(message) => OrderStoreError::lock_timeout(message),
                other => OrderStoreError::query(format!("order insert failed: {other:?}")),
            })?;

        let new_lines: Vec<NewOrderLineRow> = order
            .lines
            .iter()
            .map(|line| NewOrderLineRow {
                order_id: header.id,
                product_id: line.product_id.get(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.subtotal,
            })
            .collect();
        let lines: Vec<OrderLineRow> = diesel::insert_into(order_lines::table)
            .values(&new_lines)
            .returning(OrderLineRow::as_returning())
            .get_results(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;

        order_from_rows(header, lines)
    }

    async fn decrement_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<i32, OrderStoreError> {
        diesel::update(products::table.find(product_id.get()))
            .set(products::quantity.eq(products::quantity - quantity))
            .returning(products::quantity)
            .get_result(&mut *self.conn)
            .await
            .map_err(|err| match classify_diesel_error(err) {
                DieselFailure::CheckViolation { .. } => {
                    OrderStoreError::stock_conflict(product_id)
                }
                DieselFailure::NotFound => OrderStoreError::product_not_found(product_id),
                DieselFailure::LockTimeout(message) => OrderStoreError::lock_timeout(message),
                DieselFailure::Connection(message) => OrderStoreError::connection(message),
                other => OrderStoreError::query(format!("stock decrement failed: {other:?}")),
            })
    }

    async fn commit(self: Box<Self>) -> Result<(), OrderStoreError> {
        let mut tx = self;
        AnsiTransactionManager::commit_transaction(&mut *tx.conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), OrderStoreError> {
        let mut tx = self;
        AnsiTransactionManager::rollback_transaction(&mut *tx.conn)
            .await
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl OrderStore for DieselOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, OrderStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;

        let statement = format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout.as_millis()
        );
        if let Err(error) = diesel::sql_query(statement).execute(&mut *conn).await {
            if let Err(rollback_error) = AnsiTransactionManager::rollback_transaction(&mut *conn).await
            {
                warn!(error = %rollback_error, "rollback after failed lock_timeout setup failed");
            }
            return Err(map_diesel_error(error));
        }

        Ok(Box::new(DieselOrderTransaction { conn }))
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let header: Option<OrderRow> = orders::table
            .find(order_id.get())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(header) = header else {
            return Ok(None);
        };
        Ok(with_lines(&mut conn, vec![header]).await?.pop())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Vec<Order>>, OrderStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let known: bool = diesel::select(diesel::dsl::exists(users::table.find(user_id.get())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if !known {
            return Ok(None);
        }

        let headers: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(user_id.get()))
            .order(orders::id.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        with_lines(&mut conn, headers).await.map(Some)
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let header: Option<OrderRow> = diesel::update(orders::table.find(order_id.get()))
            .set(orders::status.eq(status.as_str()))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(header) = header else {
            return Ok(None);
        };
        Ok(with_lines(&mut conn, vec![header]).await?.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn header(status: &str) -> OrderRow {
        OrderRow {
            id: 4,
            user_id: 2,
            status: status.to_owned(),
            total: Decimal::new(1500, 2),
        }
    }

    #[rstest]
    fn order_rows_assemble_into_domain_order() {
        let lines = vec![OrderLineRow {
            id: 9,
            order_id: 4,
            product_id: 1,
            quantity: 3,
            unit_price: Decimal::new(500, 2),
            subtotal: Decimal::new(1500, 2),
        }];

        let order = order_from_rows(header("confirmed"), lines).expect("valid rows");

        assert_eq!(order.id, OrderId::new(4));
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].product_id, ProductId::new(1));
    }

    #[rstest]
    fn unknown_stored_status_is_query_error() {
        let error = order_from_rows(header("lost"), Vec::new()).expect_err("invalid status");
        assert!(matches!(error, OrderStoreError::Query { .. }));
    }

    #[rstest]
    fn lock_failures_become_lock_timeouts() {
        let error = map_diesel_error(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::SerializationFailure,
            Box::new("could not serialize access".to_owned()),
        ));
        assert!(matches!(error, OrderStoreError::LockTimeout { .. }));
    }
}
