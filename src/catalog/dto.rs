use serde::{Deserialize, Serialize};

use crate::catalog::repo::{Category, ProductDetailRow};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Pagination {
    // Negative values would reach OFFSET/LIMIT unchanged and error out in
    // Postgres; clamp them to zero instead.
    pub fn skip(&self) -> i64 {
        self.skip.max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.max(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub barcode: String,
    pub price: f64,
    pub stock: i32,
    pub category_id: i32,
}

/// Product as returned to clients, category embedded.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub barcode: String,
    pub price: f64,
    pub stock: i32,
    pub category_id: i32,
    pub category: Option<Category>,
}

impl From<ProductDetailRow> for ProductResponse {
    fn from(row: ProductDetailRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            barcode: row.barcode,
            price: row.price,
            stock: row.stock,
            category_id: row.category_id,
            category: Some(Category {
                id: row.category_id,
                name: row.category_name,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, 100);

        let p: Pagination = serde_json::from_str(r#"{"skip":10,"limit":5}"#).unwrap();
        assert_eq!(p.skip, 10);
        assert_eq!(p.limit, 5);
    }

    #[test]
    fn negative_pagination_clamps_to_zero() {
        let p: Pagination = serde_json::from_str(r#"{"skip":-3,"limit":-20}"#).unwrap();
        assert_eq!(p.skip(), 0);
        assert_eq!(p.limit(), 0);

        let p: Pagination = serde_json::from_str(r#"{"skip":5,"limit":50}"#).unwrap();
        assert_eq!(p.skip(), 5);
        assert_eq!(p.limit(), 50);
    }

    #[test]
    fn product_response_embeds_category() {
        let row = ProductDetailRow {
            id: 1,
            name: "Teh Pucuk Harum".into(),
            barcode: "899123458".into(),
            price: 4000.0,
            stock: 100,
            category_id: 2,
            category_name: "Minuman Dingin".into(),
        };
        let resp: ProductResponse = row.into();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"category\":{\"id\":2,\"name\":\"Minuman Dingin\"}"));
    }
}
