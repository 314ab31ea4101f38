//! HTTP API server for the purchase order service.
//!
//! Provides REST endpoints for order management under `/api/v1`, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;

use std::sync::Arc;

use application::OrderService;
use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::{self, AppState};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route("/orders", post(orders::create::<S>).get(orders::list::<S>))
        .route("/orders/status/{status}", get(orders::by_status::<S>))
        .route(
            "/orders/{id}",
            get(orders::get::<S>).delete(orders::delete::<S>),
        )
        .route("/orders/{id}/items", post(orders::add_item::<S>))
        .route(
            "/orders/{id}/items/{product_id}",
            put(orders::update_item_quantity::<S>).delete(orders::remove_item::<S>),
        )
        .route("/orders/{id}/confirm", post(orders::confirm::<S>))
        .route("/orders/{id}/cancel", post(orders::cancel::<S>))
        .route("/orders/{id}/status", put(orders::update_status::<S>))
        .route(
            "/customers/{customer_id}/orders",
            get(orders::by_customer::<S>),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api/v1", api)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over an order store.
pub fn create_default_state<S: OrderStore + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        order_service: OrderService::new(store),
    })
}
