use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

/// Named grouping of products; names are unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub barcode: String,
    pub price: f64,
    pub stock: i32,
    pub category_id: i32,
}

/// Product row with its category resolved by an explicit join.
#[derive(Debug, Clone, FromRow)]
pub struct ProductDetailRow {
    pub id: i32,
    pub name: String,
    pub barcode: String,
    pub price: f64,
    pub stock: i32,
    pub category_id: i32,
    pub category_name: String,
}

impl Category {
    pub async fn list(db: &PgPool, skip: i64, limit: i64) -> sqlx::Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name
            FROM categories
            ORDER BY id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(db)
        .await
    }

    pub async fn create(db: &PgPool, name: &str) -> sqlx::Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i32) -> sqlx::Result<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Delete a category; returns the number of rows removed (0 = not found).
    pub async fn delete(db: &PgPool, id: i32) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// How many products still reference the category. The caller refuses to
    /// delete a non-empty category.
    pub async fn count_products(db: &PgPool, id: i32) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(db)
            .await
    }
}

impl Product {
    pub async fn list(db: &PgPool, skip: i64, limit: i64) -> sqlx::Result<Vec<ProductDetailRow>> {
        sqlx::query_as::<_, ProductDetailRow>(
            r#"
            SELECT p.id, p.name, p.barcode, p.price, p.stock, p.category_id,
                   c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            ORDER BY p.id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        barcode: &str,
        price: f64,
        stock: i32,
        category_id: i32,
    ) -> sqlx::Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, barcode, price, stock, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, barcode, price, stock, category_id
            "#,
        )
        .bind(name)
        .bind(barcode)
        .bind(price)
        .bind(stock)
        .bind(category_id)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_barcode(
        db: &PgPool,
        barcode: &str,
    ) -> sqlx::Result<Option<ProductDetailRow>> {
        sqlx::query_as::<_, ProductDetailRow>(
            r#"
            SELECT p.id, p.name, p.barcode, p.price, p.stock, p.category_id,
                   c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.barcode = $1
            "#,
        )
        .bind(barcode)
        .fetch_optional(db)
        .await
    }

    /// Fetch a product inside an open transaction (used by the recorder's
    /// validation pass).
    pub async fn find_by_id_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> sqlx::Result<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, barcode, price, stock, category_id
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn delete(db: &PgPool, id: i32) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Atomic conditional decrement: only succeeds while the remaining stock
    /// covers the requested quantity, so stock can never go negative even
    /// under concurrent sales of the same product.
    pub async fn decrement_stock(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        quantity: i32,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2
            WHERE id = $1 AND stock >= $2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
