//! Value objects for the order domain.

use serde::{Deserialize, Serialize};

use super::OrderError;

/// Identifier of the customer who owns an order.
///
/// Zero is representable so that callers can hand raw input straight to
/// [`Order::new`](super::Order::new), which rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(u32);

impl CustomerId {
    /// Creates a customer ID from its raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns true if this is the zero (unset) identifier.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CustomerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of a catalogue product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u32);

impl ProductId {
    /// Creates a product ID from its raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns true if this is the zero (unset) identifier.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// An amount in integer cents.
///
/// Arithmetic is checked: combining amounts returns `None` instead of
/// wrapping past `i64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Price of `quantity` units, or `None` on overflow.
    pub fn checked_mul(self, quantity: i32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Adds up `amounts`, or `None` if any partial sum overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), Money::checked_add)
    }
}

/// A line of an order.
///
/// Fields are private: the SKU and name are stored trimmed, and
/// `total_price` is always `quantity × unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    product_id: ProductId,
    product_sku: String,
    product_name: String,
    quantity: i32,
    unit_price: Money,
    total_price: Money,
}

impl OrderItem {
    /// Creates a validated order item.
    pub fn new(
        product_id: ProductId,
        product_sku: &str,
        product_name: &str,
        quantity: i32,
        unit_price: Money,
    ) -> Result<Self, OrderError> {
        validate_item(product_id, product_sku, product_name, quantity, unit_price)?;
        let total_price = line_total(unit_price, quantity)?;

        Ok(Self {
            product_id,
            product_sku: product_sku.trim().to_string(),
            product_name: product_name.trim().to_string(),
            quantity,
            unit_price,
            total_price,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_sku(&self) -> &str {
        &self.product_sku
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Returns the line total (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Returns a copy with `quantity` and the matching line total.
    ///
    /// Callers are responsible for having validated `quantity`.
    pub(crate) fn with_quantity(&self, quantity: i32) -> Result<OrderItem, OrderError> {
        Ok(Self {
            quantity,
            total_price: line_total(self.unit_price, quantity)?,
            ..self.clone()
        })
    }
}

fn line_total(unit_price: Money, quantity: i32) -> Result<Money, OrderError> {
    unit_price
        .checked_mul(quantity)
        .ok_or(OrderError::AmountOverflow)
}

/// Validates the fields of an order item.
///
/// The single rule set applied both by [`OrderItem::new`] and by
/// [`Order::add_item`](super::Order::add_item). Fails on the first violation.
pub fn validate_item(
    product_id: ProductId,
    product_sku: &str,
    product_name: &str,
    quantity: i32,
    unit_price: Money,
) -> Result<(), OrderError> {
    if product_id.is_zero() {
        return Err(OrderError::InvalidProductId);
    }

    if product_sku.trim().is_empty() {
        return Err(OrderError::InvalidProductSku);
    }

    if product_name.trim().is_empty() {
        return Err(OrderError::InvalidProductName);
    }

    if quantity <= 0 {
        return Err(OrderError::InvalidQuantity { quantity });
    }

    if !unit_price.is_positive() {
        return Err(OrderError::InvalidUnitPrice {
            price: unit_price.cents(),
        });
    }

    line_total(unit_price, quantity)?;

    Ok(())
}
