use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres};
use time::OffsetDateTime;

/// Finalized sale header. Immutable once written; `total_amount` is derived
/// from the line items at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: i32,
    pub cashier_id: i32,
    pub total_amount: f64,
    pub created_at: OffsetDateTime,
}

/// Line item of a sale. `price_at_sale` is the unit price captured when the
/// sale happened; later catalog price changes never touch it. `product_id`
/// goes NULL when the product is deleted from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionItem {
    pub id: i32,
    pub transaction_id: i32,
    pub product_id: Option<i32>,
    pub quantity: i32,
    pub price_at_sale: f64,
}

/// Line item with its product resolved by a left join (the product may be
/// gone from the catalog).
#[derive(Debug, Clone, FromRow)]
pub struct ItemDetailRow {
    pub id: i32,
    pub transaction_id: i32,
    pub product_id: Option<i32>,
    pub quantity: i32,
    pub price_at_sale: f64,
    pub product_name: Option<String>,
    pub product_barcode: Option<String>,
    pub product_price: Option<f64>,
    pub product_stock: Option<i32>,
    pub product_category_id: Option<i32>,
}

pub async fn insert_header(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    cashier_id: i32,
    total_amount: f64,
) -> sqlx::Result<Transaction> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (cashier_id, total_amount)
        VALUES ($1, $2)
        RETURNING id, cashier_id, total_amount, created_at
        "#,
    )
    .bind(cashier_id)
    .bind(total_amount)
    .fetch_one(&mut **tx)
    .await
}

pub async fn insert_item(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    transaction_id: i32,
    product_id: i32,
    quantity: i32,
    price_at_sale: f64,
) -> sqlx::Result<TransactionItem> {
    sqlx::query_as::<_, TransactionItem>(
        r#"
        INSERT INTO transaction_items (transaction_id, product_id, quantity, price_at_sale)
        VALUES ($1, $2, $3, $4)
        RETURNING id, transaction_id, product_id, quantity, price_at_sale
        "#,
    )
    .bind(transaction_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price_at_sale)
    .fetch_one(&mut **tx)
    .await
}

pub async fn list(db: &PgPool, skip: i64, limit: i64) -> sqlx::Result<Vec<Transaction>> {
    sqlx::query_as::<_, Transaction>(
        r#"
        SELECT id, cashier_id, total_amount, created_at
        FROM transactions
        ORDER BY created_at DESC, id DESC
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn items_for_transactions(
    db: &PgPool,
    transaction_ids: &[i32],
) -> sqlx::Result<Vec<ItemDetailRow>> {
    sqlx::query_as::<_, ItemDetailRow>(
        r#"
        SELECT i.id, i.transaction_id, i.product_id, i.quantity, i.price_at_sale,
               p.name AS product_name, p.barcode AS product_barcode,
               p.price AS product_price, p.stock AS product_stock,
               p.category_id AS product_category_id
        FROM transaction_items i
        LEFT JOIN products p ON p.id = i.product_id
        WHERE i.transaction_id = ANY($1)
        ORDER BY i.id
        "#,
    )
    .bind(transaction_ids)
    .fetch_all(db)
    .await
}

/// Delete a transaction; line items go with it (ON DELETE CASCADE). The
/// deducted stock is intentionally not restored.
pub async fn delete(db: &PgPool, id: i32) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
