use std::collections::HashMap;

use async_trait::async_trait;
use domain::{CustomerId, Money, Order, OrderItem, OrderRecord, OrderStatus, ProductId};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use crate::{OrderId, OrderQuery, Result, StoreError, store::OrderStore};

const ORDER_COLUMNS: &str = "id, customer_id, status, version, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "order_id, product_id, product_sku, product_name, quantity, unit_price";

/// PostgreSQL-backed order store implementation.
///
/// Orders live in `orders`, their items in `order_items` keyed by position.
/// Deletion sets `deleted_at` and every read filters on it.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        tracing::info!("running database migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        let product_id: i64 = row.try_get("product_id")?;
        let product_id = u32::try_from(product_id)
            .map_err(|_| StoreError::Corrupted(format!("product id {product_id} out of range")))?;
        let sku: String = row.try_get("product_sku")?;
        let name: String = row.try_get("product_name")?;

        OrderItem::new(
            ProductId::new(product_id),
            &sku,
            &name,
            row.try_get("quantity")?,
            Money::from_cents(row.try_get("unit_price")?),
        )
        .map_err(|e| StoreError::Corrupted(format!("invalid item for product {product_id}: {e}")))
    }

    fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
        let id = OrderId::new(row.try_get("id")?);

        let customer_id: i64 = row.try_get("customer_id")?;
        let customer_id = u32::try_from(customer_id).map_err(|_| {
            StoreError::Corrupted(format!("order {id}: customer id {customer_id} out of range"))
        })?;

        let status: String = row.try_get("status")?;
        let status: OrderStatus = status
            .parse()
            .map_err(|e| StoreError::Corrupted(format!("order {id}: {e}")))?;

        let version: i64 = row.try_get("version")?;
        let version = u64::try_from(version)
            .map_err(|_| StoreError::Corrupted(format!("order {id}: negative version")))?;

        Order::restore(OrderRecord {
            id,
            version,
            customer_id: CustomerId::new(customer_id),
            items,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
        .map_err(|e| StoreError::Corrupted(format!("order {id}: {e}")))
    }

    async fn fetch_order(conn: &mut PgConnection, id: OrderId) -> Result<Option<Order>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY position ASC"
        ))
        .bind(id.as_i64())
        .fetch_all(&mut *conn)
        .await?;

        let items = item_rows
            .iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>>>()?;

        Self::row_to_order(&row, items).map(Some)
    }

    async fn insert_items(conn: &mut PgConnection, id: OrderId, items: &[OrderItem]) -> Result<()> {
        for (position, item) in items.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::Corrupted(format!("order {id}: too many items")))?;

            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, product_sku, product_name, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(id.as_i64())
            .bind(position)
            .bind(i64::from(item.product_id().as_u32()))
            .bind(item.product_sku())
            .bind(item.product_name())
            .bind(item.quantity())
            .bind(item.unit_price().cents())
            .bind(item.total_price().cents())
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    fn version_param(order: &Order) -> Result<i64> {
        i64::try_from(order.version())
            .map_err(|_| StoreError::Corrupted(format!("version {} out of range", order.version())))
    }

    fn push_filters(sql: &mut String, query: &OrderQuery, param_count: &mut usize) {
        if query.customer_id.is_some() {
            *param_count += 1;
            sql.push_str(&format!(" AND customer_id = ${param_count}"));
        }
        if query.status.is_some() {
            *param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create(&self, order: Order) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (customer_id, status, total_amount, version, created_at, updated_at)
            VALUES ($1, $2, $3, 1, $4, $5)
            RETURNING id
            "#,
        )
        .bind(i64::from(order.customer_id().as_u32()))
        .bind(order.status().as_str())
        .bind(order.total_amount().cents())
        .bind(order.created_at())
        .bind(order.updated_at())
        .fetch_one(&mut *tx)
        .await?;
        let id = OrderId::new(id);

        Self::insert_items(&mut tx, id, order.items()).await?;

        let created = Self::fetch_order(&mut tx, id)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_order(&mut conn, id).await
    }

    async fn update(&self, order: &Order) -> Result<Order> {
        let id = order.id().ok_or(StoreError::MissingId)?;
        let expected = Self::version_param(order)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, total_amount = $2, updated_at = $3, version = version + 1
            WHERE id = $4 AND version = $5 AND deleted_at IS NULL
            "#,
        )
        .bind(order.status().as_str())
        .bind(order.total_amount().cents())
        .bind(order.updated_at())
        .bind(id.as_i64())
        .bind(expected)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let actual: Option<i64> = sqlx::query_scalar(
                "SELECT version FROM orders WHERE id = $1 AND deleted_at IS NULL",
            )
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await?;

            return match actual {
                Some(actual) => Err(StoreError::ConcurrencyConflict {
                    order_id: id,
                    expected: order.version(),
                    actual: u64::try_from(actual).unwrap_or_default(),
                }),
                None => Err(StoreError::NotFound(id)),
            };
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        Self::insert_items(&mut tx, id, order.items()).await?;

        let updated = Self::fetch_order(&mut tx, id)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let result = sqlx::query(
            "UPDATE orders SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn list(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE deleted_at IS NULL");
        let mut param_count = 0;

        Self::push_filters(&mut sql, &query, &mut param_count);

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(customer_id) = query.customer_id {
            sqlx_query = sqlx_query.bind(i64::from(customer_id.as_u32()));
        }
        if let Some(status) = query.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit.max(0));
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset.max(0));
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let item_rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position ASC"
        ))
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for row in &item_rows {
            let order_id: i64 = row.try_get("order_id")?;
            items_by_order
                .entry(order_id)
                .or_default()
                .push(Self::row_to_item(row)?);
        }

        rows.iter()
            .zip(ids)
            .map(|(row, id)| {
                Self::row_to_order(row, items_by_order.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn count(&self, query: &OrderQuery) -> Result<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM orders WHERE deleted_at IS NULL");
        let mut param_count = 0;

        Self::push_filters(&mut sql, query, &mut param_count);

        let mut sqlx_query = sqlx::query_scalar::<_, i64>(&sql);

        if let Some(customer_id) = query.customer_id {
            sqlx_query = sqlx_query.bind(i64::from(customer_id.as_u32()));
        }
        if let Some(status) = query.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }

        let count = sqlx_query.fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
