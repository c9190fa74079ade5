//! In-process store implementing every driven port.
//!
//! Used when the server starts without a database and by tests that need
//! real locking behaviour. Each product has its own async mutex standing in
//! for a row lock. A placement transaction holds the mutexes of the products
//! it touches until it commits or is dropped, and buffers its writes so that
//! nothing is visible before commit.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::domain::ports::{
    NotificationRepository, NotificationRepositoryError, OrderStore, OrderStoreError,
    OrderTransaction, ProductRepository, ProductRepositoryError, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    NewNotification, Notification, NotificationId, Order, OrderId, OrderLine, OrderLineId,
    OrderStatus, PricedOrder, Product, ProductDraft, ProductId, StockSnapshot, User, UserDraft,
    UserId, UserRole,
};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    users: BTreeMap<UserId, User>,
    notifications: BTreeMap<NotificationId, Notification>,
    next_product: i64,
    next_order: i64,
    next_line: i64,
    next_user: i64,
    next_notification: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn code_taken(&self, code: Option<&str>, except: Option<ProductId>) -> bool {
        let Some(code) = code else {
            return false;
        };
        self.products
            .values()
            .any(|p| p.code.as_deref() == Some(code) && Some(p.id) != except)
    }

    fn product_ordered(&self, product_id: ProductId) -> bool {
        self.orders
            .values()
            .flat_map(|order| order.lines.iter())
            .any(|line| line.product_id == product_id)
    }
}

#[derive(Debug)]
struct Inner {
    tables: Mutex<Tables>,
    row_locks: Mutex<HashMap<ProductId, Arc<Mutex<()>>>>,
    lock_timeout: Duration,
}

impl Inner {
    /// Lock handle of an existing product, or `None` when it has no row.
    ///
    /// The map lock is taken before the table lock; nothing acquires them in
    /// the opposite order.
    async fn row_lock(&self, product_id: ProductId) -> Option<Arc<Mutex<()>>> {
        let mut locks = self.row_locks.lock().await;
        if let Some(lock) = locks.get(&product_id) {
            return Some(Arc::clone(lock));
        }
        if !self.tables.lock().await.products.contains_key(&product_id) {
            return None;
        }
        Some(Arc::clone(locks.entry(product_id).or_default()))
    }

    async fn forget_row_lock(&self, product_id: ProductId) {
        self.row_locks.lock().await.remove(&product_id);
    }
}

/// Shared in-memory store; clones share state.
#[derive(Debug, Clone)]
pub struct InMemoryInventory {
    inner: Arc<Inner>,
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl InMemoryInventory {
    /// Create an empty store whose placement transactions wait at most
    /// `lock_timeout` for each product lock.
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: Mutex::new(Tables::default()),
                row_locks: Mutex::new(HashMap::new()),
                lock_timeout,
            }),
        }
    }
}

fn product_from_draft(id: ProductId, draft: &ProductDraft) -> Product {
    Product {
        id,
        name: draft.name.trim().to_owned(),
        description: draft.description.clone(),
        price: draft.price,
        quantity: draft.quantity,
        code: draft.code.as_deref().map(|code| code.trim().to_owned()),
        active: draft.active,
    }
}

#[async_trait]
impl ProductRepository for InMemoryInventory {
    async fn create(&self, draft: &ProductDraft) -> Result<Product, ProductRepositoryError> {
        let mut tables = self.inner.tables.lock().await;
        let code = draft.code.as_deref().map(str::trim);
        if tables.code_taken(code, None) {
            return Err(ProductRepositoryError::duplicate_code(code.unwrap_or_default()));
        }
        let id = ProductId::new(next_id(&mut tables.next_product));
        let product = product_from_draft(id, draft);
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        product_id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ProductRepositoryError> {
        let lock = self
            .inner
            .row_lock(product_id)
            .await
            .ok_or(ProductRepositoryError::NotFound { product_id })?;
        let _row = lock.lock().await;
        let mut tables = self.inner.tables.lock().await;
        if !tables.products.contains_key(&product_id) {
            return Err(ProductRepositoryError::not_found(product_id));
        }
        let code = draft.code.as_deref().map(str::trim);
        if tables.code_taken(code, Some(product_id)) {
            return Err(ProductRepositoryError::duplicate_code(code.unwrap_or_default()));
        }
        let product = product_from_draft(product_id, draft);
        tables.products.insert(product_id, product.clone());
        Ok(product)
    }

    async fn delete(&self, product_id: ProductId) -> Result<(), ProductRepositoryError> {
        let lock = self
            .inner
            .row_lock(product_id)
            .await
            .ok_or(ProductRepositoryError::NotFound { product_id })?;
        let _row = lock.lock().await;
        {
            let mut tables = self.inner.tables.lock().await;
            if !tables.products.contains_key(&product_id) {
                return Err(ProductRepositoryError::not_found(product_id));
            }
            if tables.product_ordered(product_id) {
                return Err(ProductRepositoryError::in_use(product_id));
            }
            tables.products.remove(&product_id);
            for notification in tables.notifications.values_mut() {
                if notification.product_id == Some(product_id) {
                    notification.product_id = None;
                }
            }
        }
        self.inner.forget_row_lock(product_id).await;
        Ok(())
    }

    async fn find_by_id(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let tables = self.inner.tables.lock().await;
        Ok(tables.products.get(&product_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, ProductRepositoryError> {
        let tables = self.inner.tables.lock().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn adjust_stock(
        &self,
        product_id: ProductId,
        delta: i32,
    ) -> Result<i32, ProductRepositoryError> {
        let lock = self
            .inner
            .row_lock(product_id)
            .await
            .ok_or(ProductRepositoryError::NotFound { product_id })?;
        let _row = lock.lock().await;
        let mut tables = self.inner.tables.lock().await;
        let product = tables
            .products
            .get_mut(&product_id)
            .ok_or(ProductRepositoryError::NotFound { product_id })?;
        let quantity = product
            .quantity
            .checked_add(delta)
            .ok_or(ProductRepositoryError::StockOutOfRange { product_id })?;
        if quantity < 0 {
            return Err(ProductRepositoryError::negative_stock(product_id));
        }
        product.quantity = quantity;
        Ok(quantity)
    }

    async fn replace_stock(
        &self,
        product_id: ProductId,
        new_quantity: i32,
    ) -> Result<i32, ProductRepositoryError> {
        if new_quantity < 0 {
            return Err(ProductRepositoryError::negative_stock(product_id));
        }
        let lock = self
            .inner
            .row_lock(product_id)
            .await
            .ok_or(ProductRepositoryError::NotFound { product_id })?;
        let _row = lock.lock().await;
        let mut tables = self.inner.tables.lock().await;
        let product = tables
            .products
            .get_mut(&product_id)
            .ok_or(ProductRepositoryError::NotFound { product_id })?;
        product.quantity = new_quantity;
        Ok(new_quantity)
    }
}

/// Placement transaction over [`InMemoryInventory`].
struct MemoryTransaction {
    inner: Arc<Inner>,
    guards: Vec<(ProductId, OwnedMutexGuard<()>)>,
    decrements: HashMap<ProductId, i32>,
    orders: Vec<Order>,
}

impl MemoryTransaction {
    fn holds(&self, product_id: ProductId) -> bool {
        self.guards.iter().any(|(id, _)| *id == product_id)
    }
}

#[async_trait]
impl OrderTransaction for MemoryTransaction {
    async fn lock_products(
        &mut self,
        product_ids: &[ProductId],
    ) -> Result<Vec<StockSnapshot>, OrderStoreError> {
        for &product_id in product_ids {
            if self.holds(product_id) {
                continue;
            }
            let Some(lock) = self.inner.row_lock(product_id).await else {
                continue;
            };
            let guard = tokio::time::timeout(self.inner.lock_timeout, lock.lock_owned())
                .await
                .map_err(|_| {
                    OrderStoreError::lock_timeout(format!(
                        "product {product_id} still locked after {:?}",
                        self.inner.lock_timeout
                    ))
                })?;
            self.guards.push((product_id, guard));
        }

        let tables = self.inner.tables.lock().await;
        Ok(product_ids
            .iter()
            .filter_map(|id| tables.products.get(id))
            .map(|product| {
                let pending = self.decrements.get(&product.id).copied().unwrap_or(0);
                StockSnapshot {
                    product_id: product.id,
                    price: product.price,
                    quantity: product.quantity - pending,
                }
            })
            .collect())
    }

    async fn user_exists(&mut self, user_id: UserId) -> Result<bool, OrderStoreError> {
        let tables = self.inner.tables.lock().await;
        Ok(tables.users.contains_key(&user_id))
    }

    async fn insert_order(&mut self, order: &PricedOrder) -> Result<Order, OrderStoreError> {
        let mut tables = self.inner.tables.lock().await;
        let order_id = OrderId::new(next_id(&mut tables.next_order));
        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            lines.push(OrderLine {
                id: OrderLineId::new(next_id(&mut tables.next_line)),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.subtotal,
            });
        }
        let stored = Order {
            id: order_id,
            user_id: order.user_id,
            status: OrderStatus::Pending,
            total: order.total,
            lines,
        };
        self.orders.push(stored.clone());
        Ok(stored)
    }

    async fn decrement_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<i32, OrderStoreError> {
        if !self.holds(product_id) {
            return Err(OrderStoreError::query(format!(
                "product {product_id} was not locked by this transaction"
            )));
        }
        let tables = self.inner.tables.lock().await;
        let current = tables
            .products
            .get(&product_id)
            .map(|product| product.quantity)
            .ok_or(OrderStoreError::ProductNotFound { product_id })?;
        let pending = self.decrements.entry(product_id).or_insert(0);
        let remaining = current - *pending - quantity;
        if remaining < 0 {
            return Err(OrderStoreError::stock_conflict(product_id));
        }
        *pending += quantity;
        Ok(remaining)
    }

    async fn commit(self: Box<Self>) -> Result<(), OrderStoreError> {
        let mut tables = self.inner.tables.lock().await;
        if let Some(order) = self
            .orders
            .iter()
            .find(|order| !tables.users.contains_key(&order.user_id))
        {
            return Err(OrderStoreError::user_not_found(order.user_id));
        }
        if let Some(product_id) = self
            .decrements
            .keys()
            .find(|id| !tables.products.contains_key(*id))
        {
            return Err(OrderStoreError::product_not_found(*product_id));
        }
        for (product_id, quantity) in &self.decrements {
            if let Some(product) = tables.products.get_mut(product_id) {
                product.quantity -= quantity;
            }
        }
        for order in &self.orders {
            tables.orders.insert(order.id, order.clone());
        }
        debug!(locks = self.guards.len(), "in-memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), OrderStoreError> {
        debug!(locks = self.guards.len(), "in-memory transaction rolled back");
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryInventory {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, OrderStoreError> {
        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            guards: Vec::new(),
            decrements: HashMap::new(),
            orders: Vec::new(),
        }))
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, OrderStoreError> {
        let tables = self.inner.tables.lock().await;
        Ok(tables.orders.get(&order_id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Vec<Order>>, OrderStoreError> {
        let tables = self.inner.tables.lock().await;
        if !tables.users.contains_key(&user_id) {
            return Ok(None);
        }
        Ok(Some(
            tables
                .orders
                .values()
                .rev()
                .filter(|order| order.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderStoreError> {
        let mut tables = self.inner.tables.lock().await;
        Ok(tables.orders.get_mut(&order_id).map(|order| {
            order.status = status;
            order.clone()
        }))
    }
}

#[async_trait]
impl UserRepository for InMemoryInventory {
    async fn create(&self, draft: &UserDraft) -> Result<User, UserRepositoryError> {
        let mut tables = self.inner.tables.lock().await;
        if tables.users.values().any(|user| user.email == draft.email) {
            return Err(UserRepositoryError::duplicate_email(draft.email.clone()));
        }
        let id = UserId::new(next_id(&mut tables.next_user));
        let user = User {
            id,
            name: draft.name.trim().to_owned(),
            email: draft.email.clone(),
            role: draft.role,
            active: draft.active,
            password_hash: draft.password_hash.clone(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(
        &self,
        user_id: UserId,
        draft: &UserDraft,
    ) -> Result<User, UserRepositoryError> {
        let mut tables = self.inner.tables.lock().await;
        if tables
            .users
            .values()
            .any(|user| user.email == draft.email && user.id != user_id)
        {
            return Err(UserRepositoryError::duplicate_email(draft.email.clone()));
        }
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(UserRepositoryError::NotFound { user_id })?;
        user.name = draft.name.trim().to_owned();
        user.email.clone_from(&draft.email);
        user.role = draft.role;
        user.active = draft.active;
        if let Some(hash) = &draft.password_hash {
            user.password_hash = Some(hash.clone());
        }
        Ok(user.clone())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.inner.tables.lock().await;
        Ok(tables.users.get(&user_id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let tables = self.inner.tables.lock().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, UserRepositoryError> {
        let tables = self.inner.tables.lock().await;
        Ok(tables
            .users
            .values()
            .filter(|user| user.role == role)
            .cloned()
            .collect())
    }

    async fn delete(&self, user_id: UserId) -> Result<(), UserRepositoryError> {
        let mut tables = self.inner.tables.lock().await;
        if !tables.users.contains_key(&user_id) {
            return Err(UserRepositoryError::not_found(user_id));
        }
        if tables.orders.values().any(|order| order.user_id == user_id) {
            return Err(UserRepositoryError::in_use(user_id));
        }
        tables.users.remove(&user_id);
        tables
            .notifications
            .retain(|_, notification| notification.recipient_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryInventory {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError> {
        let mut tables = self.inner.tables.lock().await;
        if !tables.users.contains_key(&notification.recipient_id) {
            return Err(NotificationRepositoryError::recipient_not_found(
                notification.recipient_id,
            ));
        }
        if let Some(product_id) = notification
            .product_id
            .filter(|id| !tables.products.contains_key(id))
        {
            return Err(NotificationRepositoryError::product_not_found(product_id));
        }
        let id = NotificationId::new(next_id(&mut tables.next_notification));
        let stored = Notification {
            id,
            kind: notification.kind.clone(),
            message: notification.message.clone(),
            product_id: notification.product_id,
            recipient_id: notification.recipient_id,
            read: false,
            level: notification.level,
        };
        tables.notifications.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let tables = self.inner.tables.lock().await;
        Ok(tables
            .notifications
            .values()
            .rev()
            .filter(|n| n.recipient_id == recipient_id && (!unread_only || !n.read))
            .cloned()
            .collect())
    }

    async fn mark_read(
        &self,
        notification_id: NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut tables = self.inner.tables.lock().await;
        Ok(tables
            .notifications
            .get_mut(&notification_id)
            .map(|n| n.read = true)
            .is_some())
    }

    async fn mark_all_read(
        &self,
        recipient_id: UserId,
    ) -> Result<usize, NotificationRepositoryError> {
        let mut tables = self.inner.tables.lock().await;
        let mut changed = 0;
        for n in tables.notifications.values_mut() {
            if n.recipient_id == recipient_id && !n.read {
                n.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete(
        &self,
        notification_id: NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut tables = self.inner.tables.lock().await;
        Ok(tables.notifications.remove(&notification_id).is_some())
    }

    async fn delete_for_recipient(
        &self,
        recipient_id: UserId,
    ) -> Result<usize, NotificationRepositoryError> {
        let mut tables = self.inner.tables.lock().await;
        let before = tables.notifications.len();
        tables
            .notifications
            .retain(|_, n| n.recipient_id != recipient_id);
        Ok(before - tables.notifications.len())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
