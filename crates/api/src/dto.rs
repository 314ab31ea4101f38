//! Request and response bodies.

use std::collections::BTreeMap;

use application::{NewItem, OrderPage};
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Money, Order, OrderItem, OrderStatus};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

// -- Request types --

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(range(min = 1, message = "This field is required"))]
    pub customer_id: u32,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrderItemRequest {
    #[validate(range(min = 1, message = "This field is required"))]
    pub product_id: u32,

    #[validate(length(min = 1, max = 100, message = "Must be between 1 and 100 characters"))]
    pub product_sku: String,

    #[validate(length(min = 1, max = 255, message = "Must be between 1 and 255 characters"))]
    pub product_name: String,

    #[validate(range(min = 1, message = "Minimum value is 1"))]
    pub quantity: i32,

    /// Price per unit in cents.
    #[validate(range(min = 1, message = "Value must be greater than 0"))]
    pub unit_price: i64,
}

impl From<OrderItemRequest> for NewItem {
    fn from(req: OrderItemRequest) -> Self {
        NewItem::new(
            req.product_id,
            req.product_sku,
            req.product_name,
            req.quantity,
            Money::from_cents(req.unit_price),
        )
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1, message = "Minimum value is 1"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, message = "This field is required"))]
    pub status: String,
}

/// Raw pagination parameters.
///
/// Kept as strings so that garbage values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Flattens validation errors into `field -> message`, with nested paths
/// such as `items[0].product_sku`.
pub fn validation_details(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut details = BTreeMap::new();
    collect_details("", errors, &mut details);
    details
}

fn collect_details(prefix: &str, errors: &ValidationErrors, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                if let Some(error) = field_errors.first() {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| "Invalid value".to_string(), |m| m.to_string());
                    out.insert(path, message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_details(&path, inner, out),
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    collect_details(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: u32,
    pub product_sku: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id().as_u32(),
            product_sku: item.product_sku().to_string(),
            product_name: item.product_name().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price().cents(),
            total_price: item.total_price().cents(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Option<OrderId>,
    pub customer_id: u32,
    pub items: Vec<OrderItemResponse>,
    pub item_count: usize,
    pub total_items: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            customer_id: order.customer_id().as_u32(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            item_count: order.item_count(),
            total_items: order.total_quantity(),
            total_amount: order.total_amount().cents(),
            status: order.status(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: i64,
    pub page_size: i64,
}

impl From<OrderPage> for OrderListResponse {
    fn from(page: OrderPage) -> Self {
        Self {
            orders: page.orders.iter().map(OrderResponse::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}
