//! Pure validation and pricing of candidate orders.
//!
//! The validator never touches a store. The workflow hands it stock
//! snapshots read under row locks inside the same transaction that later
//! commits the decrements, so the check and the write cannot be separated by
//! another order.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::{
    OrderDraft, OrderError, PricedLine, PricedOrder, ProductId, StockSnapshot,
    is_storable_price, max_amount,
};

/// Validate `draft` against locked stock and price every line.
///
/// Lines naming the same product draw on one shared stock figure. A line
/// without a unit price takes the snapshot price, which fixes the price the
/// order was accepted at.
///
/// # Errors
///
/// Per line, in order: [`OrderError::InvalidQuantity`],
/// [`OrderError::InvalidUnitPrice`], [`OrderError::ProductNotFound`],
/// [`OrderError::InsufficientStock`], [`OrderError::AmountOutOfRange`].
/// After the lines: [`OrderError::EmptyOrder`],
/// [`OrderError::UserNotFound`] and then [`OrderError::AmountOutOfRange`]
/// for the total.
///
/// # Examples
/// ```
/// use inventory::domain::{
///     validate_order, OrderDraft, OrderLineDraft, ProductId, StockSnapshot, UserId,
/// };
/// use rust_decimal::Decimal;
///
/// let draft = OrderDraft {
///     user_id: UserId::new(1),
///     lines: vec![OrderLineDraft {
///         product_id: ProductId::new(7),
///         quantity: 3,
///         unit_price: None,
///     }],
/// };
/// let stock = [StockSnapshot {
///     product_id: ProductId::new(7),
///     price: Decimal::new(1000, 2),
///     quantity: 5,
/// }];
///
/// let priced = validate_order(&draft, &stock, true).expect("valid order");
/// assert_eq!(priced.total, Decimal::new(3000, 2));
/// ```
pub fn validate_order(
    draft: &OrderDraft,
    stock: &[StockSnapshot],
    user_exists: bool,
) -> Result<PricedOrder, OrderError> {
    let snapshots: HashMap<ProductId, &StockSnapshot> = stock
        .iter()
        .map(|snapshot| (snapshot.product_id, snapshot))
        .collect();
    let mut reserved: HashMap<ProductId, i32> = HashMap::new();
    let mut lines = Vec::with_capacity(draft.lines.len());

    for line in &draft.lines {
        let product_id = line.product_id;
        if line.quantity <= 0 {
            return Err(OrderError::InvalidQuantity {
                product_id,
                quantity: line.quantity,
            });
        }
        if line.unit_price.is_some_and(|price| !is_storable_price(price)) {
            return Err(OrderError::InvalidUnitPrice { product_id });
        }
        let snapshot = snapshots
            .get(&product_id)
            .ok_or(OrderError::ProductNotFound { product_id })?;

        let already = reserved.get(&product_id).copied().unwrap_or(0);
        let requested = already.saturating_add(line.quantity);
        if snapshot.quantity < requested {
            return Err(OrderError::InsufficientStock {
                product_id,
                available: snapshot.quantity,
                requested,
            });
        }
        reserved.insert(product_id, requested);

        let unit_price = line.unit_price.unwrap_or(snapshot.price);
        let subtotal = bounded(unit_price.checked_mul(Decimal::from(line.quantity)))?;
        lines.push(PricedLine {
            product_id,
            quantity: line.quantity,
            unit_price,
            subtotal,
        });
    }

    if lines.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    if !user_exists {
        return Err(OrderError::UserNotFound {
            user_id: draft.user_id,
        });
    }

    let total = lines
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| bounded(sum.checked_add(line.subtotal)))?;
    Ok(PricedOrder {
        user_id: draft.user_id,
        lines,
        total,
    })
}

fn bounded(amount: Option<Decimal>) -> Result<Decimal, OrderError> {
    amount
        .filter(|value| *value <= max_amount())
        .ok_or(OrderError::AmountOutOfRange)
}
