//! Tests for the order placement workflow.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use super::*;
use crate::domain::ports::MockOrderStore;
use crate::domain::{
    ErrorCode, OrderLine, OrderLineDraft, OrderLineId, PricedOrder, ProductId, StockSnapshot,
};

/// What the scripted transaction saw and did.
#[derive(Debug, Default)]
struct TxLog {
    locked: Vec<ProductId>,
    inserted: Option<PricedOrder>,
    decrements: Vec<(ProductId, i32)>,
    committed: bool,
    rolled_back: bool,
}

/// Transaction double that serves fixed stock and records every call.
struct ScriptedTransaction {
    stock: Vec<StockSnapshot>,
    user_exists: bool,
    lock_error: Option<OrderStoreError>,
    commit_error: Option<OrderStoreError>,
    decrement_override: Option<i32>,
    log: Arc<Mutex<TxLog>>,
}

impl ScriptedTransaction {
    fn new(stock: Vec<StockSnapshot>, log: Arc<Mutex<TxLog>>) -> Self {
        Self {
            stock,
            user_exists: true,
            lock_error: None,
            commit_error: None,
            decrement_override: None,
            log,
        }
    }
}

#[async_trait]
impl OrderTransaction for ScriptedTransaction {
    async fn lock_products(
        &mut self,
        product_ids: &[ProductId],
    ) -> Result<Vec<StockSnapshot>, OrderStoreError> {
        if let Some(error) = self.lock_error.take() {
            return Err(error);
        }
        self.log.lock().expect("log lock").locked = product_ids.to_vec();
        Ok(self
            .stock
            .iter()
            .filter(|s| product_ids.contains(&s.product_id))
            .copied()
            .collect())
    }

    async fn user_exists(&mut self, _user_id: UserId) -> Result<bool, OrderStoreError> {
        Ok(self.user_exists)
    }

    async fn insert_order(&mut self, order: &PricedOrder) -> Result<Order, OrderStoreError> {
        self.log.lock().expect("log lock").inserted = Some(order.clone());
        let order_id = OrderId::new(100);
        Ok(Order {
            id: order_id,
            user_id: order.user_id,
            status: OrderStatus::Pending,
            total: order.total,
            lines: order
                .lines
                .iter()
                .zip(1_i64..)
                .map(|(line, id)| OrderLine {
                    id: OrderLineId::new(id),
                    order_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    subtotal: line.subtotal,
                })
                .collect(),
        })
    }

    async fn decrement_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<i32, OrderStoreError> {
        self.log
            .lock()
            .expect("log lock")
            .decrements
            .push((product_id, quantity));
        if let Some(value) = self.decrement_override {
            return Ok(value);
        }
        let current = self
            .stock
            .iter()
            .find(|s| s.product_id == product_id)
            .map_or(0, |s| s.quantity);
        Ok(current - quantity)
    }

    async fn commit(self: Box<Self>) -> Result<(), OrderStoreError> {
        if let Some(error) = self.commit_error {
            return Err(error);
        }
        self.log.lock().expect("log lock").committed = true;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), OrderStoreError> {
        self.log.lock().expect("log lock").rolled_back = true;
        Ok(())
    }
}

fn service_with(tx: ScriptedTransaction) -> OrderService<MockOrderStore> {
    let tx: Box<dyn OrderTransaction> = Box::new(tx);
    let mut store = MockOrderStore::new();
    store.expect_begin().times(1).return_once(move || Ok(tx));
    OrderService::new(Arc::new(store))
}

#[fixture]
fn stock() -> Vec<StockSnapshot> {
    vec![
        StockSnapshot {
            product_id: ProductId::new(1),
            price: Decimal::new(1000, 2),
            quantity: 5,
        },
        StockSnapshot {
            product_id: ProductId::new(2),
            price: Decimal::new(350, 2),
            quantity: 8,
        },
    ]
}

#[fixture]
fn log() -> Arc<Mutex<TxLog>> {
    Arc::new(Mutex::new(TxLog::default()))
}

fn draft(lines: &[(i64, i32)]) -> OrderDraft {
    OrderDraft {
        user_id: UserId::new(1),
        lines: lines
            .iter()
            .map(|&(product, quantity)| OrderLineDraft {
                product_id: ProductId::new(product),
                quantity,
                unit_price: None,
            })
            .collect(),
    }
}

#[rstest]
#[tokio::test]
async fn create_order_commits_priced_order(stock: Vec<StockSnapshot>, log: Arc<Mutex<TxLog>>) {
    let service = service_with(ScriptedTransaction::new(stock, log.clone()));

    let order = service
        .create_order(draft(&[(1, 3)]))
        .await
        .expect("order placed");

    assert_eq!(order.total, Decimal::new(3000, 2));
    assert_eq!(order.status, OrderStatus::Pending);
    let log = log.lock().expect("log lock");
    assert!(log.committed);
    assert!(!log.rolled_back);
    assert_eq!(log.decrements, vec![(ProductId::new(1), 3)]);
}

#[rstest]
#[tokio::test]
async fn create_order_locks_distinct_products_ascending(
    stock: Vec<StockSnapshot>,
    log: Arc<Mutex<TxLog>>,
) {
    let service = service_with(ScriptedTransaction::new(stock, log.clone()));

    service
        .create_order(draft(&[(2, 1), (1, 1), (2, 2)]))
        .await
        .expect("order placed");

    assert_eq!(
        log.lock().expect("log lock").locked,
        vec![ProductId::new(1), ProductId::new(2)]
    );
}

#[rstest]
#[tokio::test]
async fn create_order_total_matches_lines(stock: Vec<StockSnapshot>, log: Arc<Mutex<TxLog>>) {
    let service = service_with(ScriptedTransaction::new(stock, log));

    let order = service
        .create_order(draft(&[(1, 2), (2, 3)]))
        .await
        .expect("order placed");

    let sum: Decimal = order
        .lines
        .iter()
        .map(|line| line.unit_price * Decimal::from(line.quantity))
        .sum();
    assert_eq!(order.total, sum);
    assert_eq!(order.total, Decimal::new(3050, 2));
}

#[rstest]
#[tokio::test]
async fn empty_order_rolls_back_without_insert(
    stock: Vec<StockSnapshot>,
    log: Arc<Mutex<TxLog>>,
) {
    let service = service_with(ScriptedTransaction::new(stock, log.clone()));

    let error = service
        .create_order(draft(&[]))
        .await
        .expect_err("empty order");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let log = log.lock().expect("log lock");
    assert!(log.inserted.is_none());
    assert!(log.rolled_back);
    assert!(!log.committed);
}

#[rstest]
#[tokio::test]
async fn unknown_product_is_not_found_and_persists_nothing(
    stock: Vec<StockSnapshot>,
    log: Arc<Mutex<TxLog>>,
) {
    let service = service_with(ScriptedTransaction::new(stock, log.clone()));

    let error = service
        .create_order(draft(&[(1, 1), (404, 1)]))
        .await
        .expect_err("unknown product");

    assert_eq!(error.code(), ErrorCode::NotFound);
    let log = log.lock().expect("log lock");
    assert!(log.inserted.is_none());
    assert!(log.decrements.is_empty());
    assert!(log.rolled_back);
}

#[rstest]
#[tokio::test]
async fn insufficient_stock_is_conflict(stock: Vec<StockSnapshot>, log: Arc<Mutex<TxLog>>) {
    let service = service_with(ScriptedTransaction::new(stock, log.clone()));

    let error = service
        .create_order(draft(&[(1, 6)]))
        .await
        .expect_err("insufficient stock");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("insufficient_stock")
    );
    assert!(log.lock().expect("log lock").rolled_back);
}

#[rstest]
#[tokio::test]
async fn unknown_user_is_not_found(stock: Vec<StockSnapshot>, log: Arc<Mutex<TxLog>>) {
    let mut tx = ScriptedTransaction::new(stock, log.clone());
    tx.user_exists = false;
    let service = service_with(tx);

    let error = service
        .create_order(draft(&[(1, 1)]))
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert!(log.lock().expect("log lock").rolled_back);
}

#[rstest]
#[tokio::test]
async fn negative_stock_after_decrement_aborts(
    stock: Vec<StockSnapshot>,
    log: Arc<Mutex<TxLog>>,
) {
    let mut tx = ScriptedTransaction::new(stock, log.clone());
    tx.decrement_override = Some(-1);
    let service = service_with(tx);

    let error = service
        .create_order(draft(&[(1, 1)]))
        .await
        .expect_err("stock conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("stock_conflict")
    );
    let log = log.lock().expect("log lock");
    assert!(log.rolled_back);
    assert!(!log.committed);
}

#[rstest]
#[case(OrderStoreError::lock_timeout("canceling statement due to lock timeout"), ErrorCode::Conflict)]
#[case(OrderStoreError::connection("pool exhausted"), ErrorCode::ServiceUnavailable)]
#[case(OrderStoreError::query("syntax error"), ErrorCode::InternalError)]
#[case(OrderStoreError::out_of_range("numeric field overflow"), ErrorCode::InvalidRequest)]
#[tokio::test]
async fn store_failures_map_to_taxonomy(
    stock: Vec<StockSnapshot>,
    log: Arc<Mutex<TxLog>>,
    #[case] failure: OrderStoreError,
    #[case] expected: ErrorCode,
) {
    let mut tx = ScriptedTransaction::new(stock, log.clone());
    tx.lock_error = Some(failure);
    let service = service_with(tx);

    let error = service
        .create_order(draft(&[(1, 1)]))
        .await
        .expect_err("lock failure");

    assert_eq!(error.code(), expected);
    assert!(log.lock().expect("log lock").rolled_back);
}

#[rstest]
#[tokio::test]
async fn user_removed_before_commit_is_not_found(
    stock: Vec<StockSnapshot>,
    log: Arc<Mutex<TxLog>>,
) {
    let mut tx = ScriptedTransaction::new(stock, log.clone());
    tx.commit_error = Some(OrderStoreError::user_not_found(UserId::new(1)));
    let service = service_with(tx);

    let error = service
        .create_order(draft(&[(1, 1)]))
        .await
        .expect_err("user vanished");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(
        error.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("user_not_found")
    );
    assert!(!log.lock().expect("log lock").committed);
}

#[rstest]
#[tokio::test]
async fn oversized_caller_price_is_invalid_and_persists_nothing(
    stock: Vec<StockSnapshot>,
    log: Arc<Mutex<TxLog>>,
) {
    let service = service_with(ScriptedTransaction::new(stock, log.clone()));
    let mut order = draft(&[(1, 2)]);
    order.lines[0].unit_price = Some(Decimal::MAX);

    let error = service.create_order(order).await.expect_err("bad price");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let log = log.lock().expect("log lock");
    assert!(log.inserted.is_none());
    assert!(log.rolled_back);
}

#[rstest]
#[tokio::test]
async fn listing_orders_of_unknown_user_is_not_found() {
    let mut store = MockOrderStore::new();
    store
        .expect_list_for_user()
        .withf(|id| *id == UserId::new(42))
        .times(1)
        .return_once(|_| Ok(None));
    let service = OrderService::new(Arc::new(store));

    let error = service
        .list_orders_for_user(UserId::new(42))
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(
        error.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("user_not_found")
    );
}

#[rstest]
#[tokio::test]
async fn listing_orders_of_user_without_orders_is_empty() {
    let mut store = MockOrderStore::new();
    store
        .expect_list_for_user()
        .times(1)
        .return_once(|_| Ok(Some(Vec::new())));
    let service = OrderService::new(Arc::new(store));

    let orders = service
        .list_orders_for_user(UserId::new(1))
        .await
        .expect("known user");

    assert!(orders.is_empty());
}

#[rstest]
#[tokio::test]
async fn begin_failure_is_service_unavailable() {
    let mut store = MockOrderStore::new();
    store
        .expect_begin()
        .times(1)
        .return_once(|| Err(OrderStoreError::connection("refused")));
    let service = OrderService::new(Arc::new(store));

    let error = service
        .create_order(draft(&[(1, 1)]))
        .await
        .expect_err("store down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn change_status_reports_missing_orders() {
    let mut store = MockOrderStore::new();
    store
        .expect_update_status()
        .times(1)
        .return_once(|_, _| Ok(None));
    let service = OrderService::new(Arc::new(store));

    let error = service
        .change_status(OrderId::new(9), OrderStatus::Shipped)
        .await
        .expect_err("missing order");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn change_status_returns_updated_order() {
    let mut store = MockOrderStore::new();
    store
        .expect_update_status()
        .withf(|id, status| *id == OrderId::new(9) && *status == OrderStatus::Confirmed)
        .times(1)
        .return_once(|id, status| {
            Ok(Some(Order {
                id,
                user_id: UserId::new(1),
                status,
                total: Decimal::ZERO,
                lines: Vec::new(),
            }))
        });
    let service = OrderService::new(Arc::new(store));

    let order = service
        .change_status(OrderId::new(9), OrderStatus::Confirmed)
        .await
        .expect("status changed");

    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[rstest]
#[tokio::test]
async fn get_order_reports_missing_orders() {
    let mut store = MockOrderStore::new();
    store.expect_find_by_id().times(1).return_once(|_| Ok(None));
    let service = OrderService::new(Arc::new(store));

    let error = service
        .get_order(OrderId::new(1))
        .await
        .expect_err("missing order");

    assert_eq!(error.code(), ErrorCode::NotFound);
}
