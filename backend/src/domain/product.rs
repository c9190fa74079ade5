//! Catalogue products and the stock figures the order workflow reads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ProductId;

/// Validation failures for product drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    /// Names must carry text.
    #[error("product name must not be empty")]
    EmptyName,
    /// Prices are never negative.
    #[error("product price must not be negative")]
    NegativePrice,
    /// Prices are whole cents no larger than [`max_price`].
    #[error("product price must have at most two decimal places and not exceed 9999999999.99")]
    PriceOutOfRange,
    /// Stock on hand is never negative.
    #[error("product quantity must not be negative")]
    NegativeQuantity,
    /// Codes, when supplied, must carry text.
    #[error("product code must not be blank")]
    BlankCode,
}

/// Decimal places kept for prices, subtotals and totals.
pub const MONEY_SCALE: u32 = 2;

/// Largest unit price a product or order line can store.
#[must_use]
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Largest subtotal or order total that can be stored.
#[must_use]
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, MONEY_SCALE)
}

/// Whether `price` is whole cents within `0..=max_price()`.
///
/// Trailing zeros are ignored, so `10.500` counts as two places.
///
/// # Examples
/// ```
/// use inventory::domain::product::is_storable_price;
/// use rust_decimal::Decimal;
///
/// assert!(is_storable_price(Decimal::new(10500, 3)));
/// assert!(!is_storable_price(Decimal::new(5, 3)));
/// assert!(!is_storable_price(Decimal::MAX));
/// ```
#[must_use]
pub fn is_storable_price(price: Decimal) -> bool {
    price >= Decimal::ZERO && price <= max_price() && price.normalize().scale() <= MONEY_SCALE
}

/// A persisted catalogue product.
///
/// `quantity` is the stock on hand and never drops below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub code: Option<String>,
    pub active: bool,
}

/// Field values for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub code: Option<String>,
    pub active: bool,
}

impl ProductDraft {
    /// Check the draft against the catalogue rules.
    ///
    /// # Examples
    /// ```
    /// use inventory::domain::{ProductDraft, ProductValidationError};
    /// use rust_decimal::Decimal;
    ///
    /// let draft = ProductDraft {
    ///     name: "  ".to_owned(),
    ///     description: None,
    ///     price: Decimal::ONE,
    ///     quantity: 1,
    ///     code: None,
    ///     active: true,
    /// };
    /// assert_eq!(draft.validate(), Err(ProductValidationError::EmptyName));
    /// ```
    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if self.price < Decimal::ZERO {
            return Err(ProductValidationError::NegativePrice);
        }
        if !is_storable_price(self.price) {
            return Err(ProductValidationError::PriceOutOfRange);
        }
        if self.quantity < 0 {
            return Err(ProductValidationError::NegativeQuantity);
        }
        if self.code.as_deref().is_some_and(|code| code.trim().is_empty()) {
            return Err(ProductValidationError::BlankCode);
        }
        Ok(())
    }
}

/// Price and stock of one product as read under its row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSnapshot {
    pub product_id: ProductId,
    pub price: Decimal,
    pub quantity: i32,
}

impl From<&Product> for StockSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            price: product.price,
            quantity: product.quantity,
        }
    }
}
