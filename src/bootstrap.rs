//! Startup bootstrap: default admin user and optional demo data. Everything
//! here is idempotent; rows are keyed by their unique fields (username,
//! category name, barcode) and re-running changes nothing.

use std::collections::HashMap;

use anyhow::Context;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::{
    auth::{
        password::hash_password,
        repo::{Role, User},
    },
    state::AppState,
};

pub async fn run(state: &AppState) -> anyhow::Result<()> {
    ensure_admin(&state.db, &state.config.admin_password).await?;
    if state.config.seed_demo_data {
        seed_demo(&state.db).await?;
    }
    Ok(())
}

async fn ensure_admin(db: &PgPool, password: &str) -> anyhow::Result<()> {
    if User::find_by_username(db, "admin")
        .await
        .context("look up admin user")?
        .is_some()
    {
        return Ok(());
    }
    let hash = hash_password(password)?;
    let admin = User::create(db, "admin", &hash, Role::Admin)
        .await
        .context("create admin user")?;
    info!(user_id = admin.id, "default admin user created");
    Ok(())
}

const DEMO_CATEGORIES: [&str; 5] = [
    "Makanan Ringan",
    "Minuman Dingin",
    "Kopi",
    "Alat Tulis",
    "Sembako",
];

// (name, barcode, price, stock, category)
const DEMO_PRODUCTS: [(&str, &str, f64, i32, &str); 20] = [
    ("Chitato Sapi Panggang", "899123456", 12000.0, 50, "Makanan Ringan"),
    ("Oreo Vanilla", "899123457", 8500.0, 40, "Makanan Ringan"),
    ("Teh Pucuk Harum", "899123458", 4000.0, 100, "Minuman Dingin"),
    ("Aqua 600ml", "899123459", 3500.0, 120, "Minuman Dingin"),
    ("Kopi Kapal Api", "899123460", 2500.0, 200, "Kopi"),
    ("Indomie Goreng", "899123461", 3500.0, 150, "Sembako"),
    ("Buku Sidu 38 Lembar", "899123462", 5000.0, 80, "Alat Tulis"),
    ("Pulpen Pilot", "899123463", 3000.0, 60, "Alat Tulis"),
    ("Minyak Goreng 2L", "899123464", 35000.0, 20, "Sembako"),
    ("Susu UHT Full Cream", "899123465", 18000.0, 30, "Minuman Dingin"),
    ("Lays Rumput Laut", "899123466", 13000.0, 45, "Makanan Ringan"),
    ("Pocari Sweat 500ml", "899123467", 7000.0, 90, "Minuman Dingin"),
    ("Good Day Cappuccino", "899123468", 2000.0, 180, "Kopi"),
    ("Beras 5kg", "899123469", 65000.0, 15, "Sembako"),
    ("Pensil 2B Faber Castell", "899123470", 2500.0, 100, "Alat Tulis"),
    ("Tango Wafer Coklat", "899123471", 6000.0, 55, "Makanan Ringan"),
    ("Coca Cola 330ml", "899123472", 5500.0, 110, "Minuman Dingin"),
    ("Nescafe Classic", "899123473", 1500.0, 220, "Kopi"),
    ("Gula Pasir 1kg", "899123474", 15000.0, 35, "Sembako"),
    ("Penghapus Karet Joyko", "899123475", 1500.0, 75, "Alat Tulis"),
];

async fn seed_demo(db: &PgPool) -> anyhow::Result<()> {
    for name in DEMO_CATEGORIES {
        sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(db)
            .await
            .context("seed category")?;
    }

    let categories: HashMap<String, i32> =
        sqlx::query_as::<_, (i32, String)>("SELECT id, name FROM categories")
            .fetch_all(db)
            .await
            .context("load categories")?
            .into_iter()
            .map(|(id, name)| (name, id))
            .collect();

    for (name, barcode, price, stock, category) in DEMO_PRODUCTS {
        let Some(&category_id) = categories.get(category) else {
            continue;
        };
        sqlx::query(
            r#"
            INSERT INTO products (name, barcode, price, stock, category_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (barcode) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(barcode)
        .bind(price)
        .bind(stock)
        .bind(category_id)
        .execute(db)
        .await
        .context("seed product")?;
    }

    seed_demo_transactions(db).await?;

    info!("demo data seeding complete");
    Ok(())
}

/// Seed a week of demonstration sales, only into an empty history so the
/// bootstrap stays idempotent.
async fn seed_demo_transactions(db: &PgPool) -> anyhow::Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
        .fetch_one(db)
        .await
        .context("count transactions")?;
    if existing > 0 {
        return Ok(());
    }

    let admin = User::find_by_username(db, "admin")
        .await?
        .context("admin user must exist before demo transactions")?;

    let products = sqlx::query_as::<_, (i32, f64)>("SELECT id, price FROM products ORDER BY id")
        .fetch_all(db)
        .await
        .context("load products")?;
    if products.is_empty() {
        return Ok(());
    }

    for i in 0..20 {
        let created_at = OffsetDateTime::now_utc()
            - Duration::days(i64::from(i % 7))
            - Duration::hours(i64::from(i % 12));

        // One to three line items per demo sale, rotating over the catalog.
        let lines = 1 + (i as usize % 3);
        let mut total = 0.0;
        let mut picked = Vec::with_capacity(lines);
        for j in 0..lines {
            let (product_id, price) = products[(i as usize * 3 + j) % products.len()];
            let quantity = 1 + ((i + j as i32) % 3);
            total += price * f64::from(quantity);
            picked.push((product_id, quantity, price));
        }

        let (transaction_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO transactions (cashier_id, total_amount, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(admin.id)
        .bind(total)
        .bind(created_at)
        .fetch_one(db)
        .await
        .context("seed transaction")?;

        for (product_id, quantity, price) in picked {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (transaction_id, product_id, quantity, price_at_sale)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(transaction_id)
            .bind(product_id)
            .bind(quantity)
            .bind(price)
            .execute(db)
            .await
            .context("seed transaction item")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn demo_barcodes_are_unique() {
        let barcodes: HashSet<&str> = DEMO_PRODUCTS.iter().map(|p| p.1).collect();
        assert_eq!(barcodes.len(), DEMO_PRODUCTS.len());
    }

    #[test]
    fn demo_products_reference_seeded_categories() {
        let categories: HashSet<&str> = DEMO_CATEGORIES.into_iter().collect();
        for (name, _, price, stock, category) in DEMO_PRODUCTS {
            assert!(categories.contains(category), "{name} has unknown category");
            assert!(price >= 0.0);
            assert!(stock >= 0);
        }
    }
}
