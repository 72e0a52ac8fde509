use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    auth::dto::PublicUser,
    catalog::repo::Product,
    transactions::repo::{ItemDetailRow, Transaction},
};

/// One requested line of a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

/// Request body for `POST /transactions/`.
#[derive(Debug, Deserialize)]
pub struct CreateTransaction {
    pub items: Vec<ItemRequest>,
}

#[derive(Debug, Serialize)]
pub struct TransactionItemResponse {
    pub id: i32,
    pub product_id: Option<i32>,
    pub quantity: i32,
    pub price_at_sale: f64,
    pub product: Option<Product>,
}

impl From<ItemDetailRow> for TransactionItemResponse {
    fn from(row: ItemDetailRow) -> Self {
        let product = match (row.product_id, row.product_name) {
            (Some(id), Some(name)) => Some(Product {
                id,
                name,
                barcode: row.product_barcode.unwrap_or_default(),
                price: row.product_price.unwrap_or_default(),
                stock: row.product_stock.unwrap_or_default(),
                category_id: row.product_category_id.unwrap_or_default(),
            }),
            _ => None,
        };
        Self {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            price_at_sale: row.price_at_sale,
            product,
        }
    }
}

/// Full transaction as returned to clients: header, resolved line items and
/// the cashier who recorded it.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: i32,
    pub cashier_id: i32,
    pub total_amount: f64,
    pub created_at: OffsetDateTime,
    pub items: Vec<TransactionItemResponse>,
    pub cashier: Option<PublicUser>,
}

impl TransactionResponse {
    pub fn new(
        header: Transaction,
        items: Vec<TransactionItemResponse>,
        cashier: Option<PublicUser>,
    ) -> Self {
        Self {
            id: header.id,
            cashier_id: header.cashier_id,
            total_amount: header.total_amount,
            created_at: header.created_at,
            items,
            cashier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_product_leaves_item_intact() {
        let row = ItemDetailRow {
            id: 1,
            transaction_id: 10,
            product_id: None,
            quantity: 2,
            price_at_sale: 12000.0,
            product_name: None,
            product_barcode: None,
            product_price: None,
            product_stock: None,
            product_category_id: None,
        };
        let item: TransactionItemResponse = row.into();
        assert!(item.product.is_none());
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price_at_sale, 12000.0);
    }

    #[test]
    fn resolved_product_is_embedded() {
        let row = ItemDetailRow {
            id: 1,
            transaction_id: 10,
            product_id: Some(3),
            quantity: 1,
            price_at_sale: 3500.0,
            product_name: Some("Aqua 600ml".into()),
            product_barcode: Some("899123459".into()),
            product_price: Some(3500.0),
            product_stock: Some(120),
            product_category_id: Some(2),
        };
        let item: TransactionItemResponse = row.into();
        let product = item.product.expect("product resolved");
        assert_eq!(product.id, 3);
        assert_eq!(product.name, "Aqua 600ml");
    }
}
