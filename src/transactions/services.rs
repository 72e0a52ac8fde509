use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;

use crate::{
    auth::{dto::PublicUser, repo::User},
    catalog::repo::Product,
    error::{ApiError, ApiResult},
    transactions::{
        dto::{ItemRequest, TransactionItemResponse, TransactionResponse},
        repo,
    },
};

/// One validated line of a sale, price captured at validation time.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLine {
    pub product_id: i32,
    pub quantity: i32,
    pub price_at_sale: f64,
}

/// Validate every requested line against the fetched products and compute
/// the total. Any invalid line rejects the whole submission; nothing is
/// written until the returned plan is applied.
///
/// Quantities are accumulated per product so that two lines for the same
/// product cannot jointly exceed its stock.
pub fn plan_lines(
    items: &[ItemRequest],
    products: &HashMap<i32, Product>,
) -> Result<(Vec<PlannedLine>, f64), ApiError> {
    let mut lines = Vec::with_capacity(items.len());
    let mut requested_so_far: HashMap<i32, i32> = HashMap::new();
    let mut total = 0.0;

    for item in items {
        if item.quantity <= 0 {
            return Err(ApiError::Validation("Quantity must be positive".into()));
        }
        let product = products
            .get(&item.product_id)
            .ok_or(ApiError::ProductNotFound(item.product_id))?;

        let requested = requested_so_far.entry(item.product_id).or_insert(0);
        *requested += item.quantity;
        if *requested > product.stock {
            return Err(ApiError::InsufficientStock {
                product_id: item.product_id,
                requested: *requested,
                available: product.stock,
            });
        }

        total += product.price * f64::from(item.quantity);
        lines.push(PlannedLine {
            product_id: item.product_id,
            quantity: item.quantity,
            price_at_sale: product.price,
        });
    }

    Ok((lines, total))
}

/// Mirror the applied decrements onto the cached products so the response
/// embeds post-sale stock levels, not the pre-sale snapshot.
fn deduct_cached_stock(products: &mut HashMap<i32, Product>, per_product: &HashMap<i32, i32>) {
    for (&product_id, &quantity) in per_product {
        if let Some(product) = products.get_mut(&product_id) {
            product.stock -= quantity;
        }
    }
}

/// Record a sale: validate all lines, deduct stock and persist the header
/// with its items inside one database transaction. Any failure rolls the
/// whole submission back; partially recorded sales cannot exist.
pub async fn create_transaction(
    db: &PgPool,
    cashier: &User,
    items: &[ItemRequest],
) -> ApiResult<TransactionResponse> {
    if items.is_empty() {
        return Err(ApiError::Validation("items must not be empty".into()));
    }

    let mut tx = db.begin().await?;

    // Validation pass: fetch every referenced product once.
    let mut products: HashMap<i32, Product> = HashMap::new();
    for item in items {
        if !products.contains_key(&item.product_id) {
            let product = Product::find_by_id_tx(&mut tx, item.product_id)
                .await?
                .ok_or(ApiError::ProductNotFound(item.product_id))?;
            products.insert(item.product_id, product);
        }
    }

    let (lines, total) = plan_lines(items, &products)?;

    // Apply pass: one conditional decrement per product. A concurrent sale
    // that depleted the stock since the fetch makes the decrement miss, and
    // the rollback leaves no trace of this submission.
    let mut per_product: HashMap<i32, i32> = HashMap::new();
    for line in &lines {
        *per_product.entry(line.product_id).or_insert(0) += line.quantity;
    }
    for (&product_id, &quantity) in &per_product {
        if !Product::decrement_stock(&mut tx, product_id, quantity).await? {
            let available = products.get(&product_id).map(|p| p.stock).unwrap_or(0);
            return Err(ApiError::InsufficientStock {
                product_id,
                requested: quantity,
                available,
            });
        }
    }
    deduct_cached_stock(&mut products, &per_product);

    let header = repo::insert_header(&mut tx, cashier.id, total).await?;
    let mut item_responses = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = repo::insert_item(
            &mut tx,
            header.id,
            line.product_id,
            line.quantity,
            line.price_at_sale,
        )
        .await?;
        item_responses.push(TransactionItemResponse {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price_at_sale: item.price_at_sale,
            product: item.product_id.and_then(|id| products.get(&id).cloned()),
        });
    }

    tx.commit().await?;

    info!(
        transaction_id = header.id,
        cashier_id = cashier.id,
        total_amount = total,
        lines = item_responses.len(),
        "transaction recorded"
    );

    Ok(TransactionResponse::new(
        header,
        item_responses,
        Some(PublicUser {
            id: cashier.id,
            username: cashier.username.clone(),
            role: cashier.role,
            is_active: cashier.is_active,
        }),
    ))
}

/// Resolve items and cashiers for a page of transaction headers.
pub async fn load_details(
    db: &PgPool,
    headers: Vec<repo::Transaction>,
) -> ApiResult<Vec<TransactionResponse>> {
    let ids: Vec<i32> = headers.iter().map(|t| t.id).collect();
    let mut items_by_transaction: HashMap<i32, Vec<TransactionItemResponse>> = HashMap::new();
    if !ids.is_empty() {
        for row in repo::items_for_transactions(db, &ids).await? {
            items_by_transaction
                .entry(row.transaction_id)
                .or_default()
                .push(row.into());
        }
    }

    let cashier_ids: Vec<i32> = {
        let mut ids: Vec<i32> = headers.iter().map(|t| t.cashier_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    let cashiers: HashMap<i32, User> = User::find_by_ids(db, &cashier_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(headers
        .into_iter()
        .map(|header| {
            let items = items_by_transaction.remove(&header.id).unwrap_or_default();
            let cashier = cashiers.get(&header.cashier_id).map(|u| PublicUser {
                id: u.id,
                username: u.username.clone(),
                role: u.role,
                is_active: u.is_active,
            });
            TransactionResponse::new(header, items, cashier)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, price: f64, stock: i32) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            barcode: format!("89912345{id}"),
            price,
            stock,
            category_id: 1,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<i32, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn multi_item_total_and_prices() {
        // P costs 1000 with stock 10, Q costs 500 with stock 10.
        let products = catalog(vec![product(1, 1000.0, 10), product(2, 500.0, 10)]);
        let items = vec![
            ItemRequest { product_id: 1, quantity: 2 },
            ItemRequest { product_id: 2, quantity: 1 },
        ];

        let (lines, total) = plan_lines(&items, &products).expect("plan");
        assert_eq!(total, 2500.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].price_at_sale, 1000.0);
        assert_eq!(lines[1].price_at_sale, 500.0);
    }

    #[test]
    fn insufficient_stock_rejects_whole_submission() {
        // Requesting 5 of a product with stock 3 fails outright.
        let products = catalog(vec![product(1, 1000.0, 3), product(2, 500.0, 10)]);
        let items = vec![
            ItemRequest { product_id: 2, quantity: 1 },
            ItemRequest { product_id: 1, quantity: 5 },
        ];

        match plan_lines(&items, &products) {
            Err(ApiError::InsufficientStock {
                product_id,
                requested,
                available,
            }) => {
                assert_eq!(product_id, 1);
                assert_eq!(requested, 5);
                assert_eq!(available, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn unknown_product_rejects_whole_submission() {
        let products = catalog(vec![product(1, 1000.0, 10)]);
        let items = vec![
            ItemRequest { product_id: 1, quantity: 1 },
            ItemRequest { product_id: 99, quantity: 1 },
        ];

        assert!(matches!(
            plan_lines(&items, &products),
            Err(ApiError::ProductNotFound(99))
        ));
    }

    #[test]
    fn duplicate_lines_cannot_jointly_exceed_stock() {
        let products = catalog(vec![product(1, 1000.0, 3)]);
        let items = vec![
            ItemRequest { product_id: 1, quantity: 2 },
            ItemRequest { product_id: 1, quantity: 2 },
        ];

        match plan_lines(&items, &products) {
            Err(ApiError::InsufficientStock { requested, available, .. }) => {
                assert_eq!(requested, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let products = catalog(vec![product(1, 1000.0, 10)]);
        for quantity in [0, -1] {
            let items = vec![ItemRequest { product_id: 1, quantity }];
            assert!(matches!(
                plan_lines(&items, &products),
                Err(ApiError::Validation(_))
            ));
        }
    }

    #[test]
    fn embedded_products_carry_post_sale_stock() {
        let mut products = catalog(vec![product(1, 1000.0, 10), product(2, 500.0, 4)]);
        let per_product = HashMap::from([(1, 3), (2, 1)]);

        deduct_cached_stock(&mut products, &per_product);

        assert_eq!(products[&1].stock, 7);
        assert_eq!(products[&2].stock, 3);
    }

    #[test]
    fn total_matches_sum_of_line_contributions() {
        let products = catalog(vec![
            product(1, 12000.0, 50),
            product(2, 8500.0, 40),
            product(3, 4000.0, 100),
        ]);
        let items = vec![
            ItemRequest { product_id: 1, quantity: 3 },
            ItemRequest { product_id: 2, quantity: 2 },
            ItemRequest { product_id: 3, quantity: 5 },
        ];

        let (lines, total) = plan_lines(&items, &products).expect("plan");
        let expected: f64 = lines
            .iter()
            .map(|l| l.price_at_sale * f64::from(l.quantity))
            .sum();
        assert_eq!(total, expected);
        assert_eq!(total, 3.0 * 12000.0 + 2.0 * 8500.0 + 5.0 * 4000.0);
    }
}
