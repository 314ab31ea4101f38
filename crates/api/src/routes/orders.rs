//! Order endpoints.

use std::sync::Arc;

use application::{
    AddItem, CreateOrder, OrderService, RemoveItem, TransitionStatus, UpdateItemQuantity,
};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{OrderId, PageRequest, pagination::DEFAULT_PAGE_SIZE};
use domain::{CustomerId, ProductId};
use order_store::OrderStore;
use validator::Validate;

use crate::dto::{
    CreateOrderRequest, OrderItemRequest, OrderListResponse, OrderResponse, PageParams,
    UpdateQuantityRequest, UpdateStatusRequest, validation_details,
};
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub order_service: OrderService<S>,
}

type ApiResult<T> = Result<T, ApiError>;

// -- Extraction helpers --

/// Unwraps a JSON body and runs its field checks.
fn checked_body<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "failed to parse request body");
        ApiError::InvalidRequest(rejection.body_text())
    })?;

    body.validate().map_err(|errors| {
        tracing::warn!(%errors, "request validation failed");
        ApiError::Validation(validation_details(&errors))
    })?;

    Ok(body)
}

fn parse_id(param: &'static str, value: &str) -> ApiResult<u32> {
    value.parse().map_err(|_| ApiError::InvalidId {
        param,
        value: value.to_string(),
    })
}

fn parse_order_id(value: &str) -> ApiResult<OrderId> {
    parse_id("order id", value).map(|id| OrderId::new(i64::from(id)))
}

fn parse_page(params: &PageParams) -> PageRequest {
    let page = params
        .page
        .as_deref()
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);
    let page_size = params
        .page_size
        .as_deref()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE);
    PageRequest::new(page, page_size)
}

// -- Handlers --

/// POST /api/v1/orders — create an order with optional initial items.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let req = checked_body(payload)?;

    let cmd = CreateOrder {
        customer_id: CustomerId::new(req.customer_id),
        items: req.items.into_iter().map(Into::into).collect(),
    };
    let order = state.order_service.create_order(cmd).await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /api/v1/orders — list all orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<OrderListResponse>> {
    let page = state.order_service.list_orders(parse_page(&params)).await?;
    Ok(Json(page.into()))
}

/// GET /api/v1/orders/{id} — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderResponse>> {
    let order = state.order_service.get_order(parse_order_id(&id)?).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// DELETE /api/v1/orders/{id} — soft-delete an order.
#[tracing::instrument(skip(state))]
pub async fn delete<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .order_service
        .delete_order(parse_order_id(&id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/orders/{id}/items — add an item, merging quantities for a known product.
#[tracing::instrument(skip(state, payload))]
pub async fn add_item<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<OrderItemRequest>, JsonRejection>,
) -> ApiResult<Json<OrderResponse>> {
    let order_id = parse_order_id(&id)?;
    let req = checked_body(payload)?;

    let order = state
        .order_service
        .add_item(AddItem::new(order_id, req.into()))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /api/v1/orders/{id}/items/{product_id} — set an item's quantity.
#[tracing::instrument(skip(state, payload))]
pub async fn update_item_quantity<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, product_id)): Path<(String, String)>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> ApiResult<Json<OrderResponse>> {
    let order_id = parse_order_id(&id)?;
    let product_id = ProductId::new(parse_id("product id", &product_id)?);
    let req = checked_body(payload)?;

    let order = state
        .order_service
        .update_item_quantity(UpdateItemQuantity::new(order_id, product_id, req.quantity))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// DELETE /api/v1/orders/{id}/items/{product_id} — remove an item.
#[tracing::instrument(skip(state))]
pub async fn remove_item<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, product_id)): Path<(String, String)>,
) -> ApiResult<Json<OrderResponse>> {
    let order_id = parse_order_id(&id)?;
    let product_id = ProductId::new(parse_id("product id", &product_id)?);

    let order = state
        .order_service
        .remove_item(RemoveItem::new(order_id, product_id))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /api/v1/orders/{id}/confirm — confirm a pending order.
#[tracing::instrument(skip(state))]
pub async fn confirm<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderResponse>> {
    let order = state
        .order_service
        .confirm_order(parse_order_id(&id)?)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /api/v1/orders/{id}/cancel — cancel an order that has not shipped.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderResponse>> {
    let order = state
        .order_service
        .cancel_order(parse_order_id(&id)?)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /api/v1/orders/{id}/status — move an order to a named status.
#[tracing::instrument(skip(state, payload))]
pub async fn update_status<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<OrderResponse>> {
    let order_id = parse_order_id(&id)?;
    let req = checked_body(payload)?;

    let order = state
        .order_service
        .transition_status(TransitionStatus::new(order_id, req.status))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// GET /api/v1/orders/status/{status} — list orders in a status.
#[tracing::instrument(skip(state))]
pub async fn by_status<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(status): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<OrderListResponse>> {
    let page = state
        .order_service
        .orders_by_status(&status, parse_page(&params))
        .await?;
    Ok(Json(page.into()))
}

/// GET /api/v1/customers/{customer_id}/orders — list one customer's orders.
#[tracing::instrument(skip(state))]
pub async fn by_customer<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(customer_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<OrderListResponse>> {
    let customer_id = CustomerId::new(parse_id("customer id", &customer_id)?);
    let page = state
        .order_service
        .customer_orders(customer_id, parse_page(&params))
        .await?;
    Ok(Json(page.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(str::to_string),
            page_size: page_size.map(str::to_string),
        }
    }

    #[test]
    fn page_defaults_when_missing() {
        let page = parse_page(&PageParams::default());
        assert_eq!(page.page(), 0);
        assert_eq!(page.page_size(), 10);
    }

    #[test]
    fn page_falls_back_on_garbage() {
        let page = parse_page(&params(Some("abc"), Some("-4")));
        assert_eq!(page.page(), 0);
        assert_eq!(page.page_size(), 10);

        let page = parse_page(&params(Some("-2"), Some("500")));
        assert_eq!(page.page(), 0);
        assert_eq!(page.page_size(), 10);
    }

    #[test]
    fn page_accepts_valid_values() {
        let page = parse_page(&params(Some("3"), Some("25")));
        assert_eq!(page.page(), 3);
        assert_eq!(page.page_size(), 25);
        assert_eq!(page.offset(), 75);
    }

    #[test]
    fn ids_must_be_unsigned_integers() {
        assert_eq!(parse_order_id("42").unwrap(), OrderId::new(42));
        assert!(matches!(
            parse_order_id("abc"),
            Err(ApiError::InvalidId { param: "order id", .. })
        ));
        assert!(parse_id("product id", "-1").is_err());
        assert!(parse_id("product id", "4294967296").is_err());
    }
}
