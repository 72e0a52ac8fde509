use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AdminUser,
    catalog::{
        dto::{CreateCategory, CreateProduct, Pagination, ProductResponse},
        repo::{Category, Product},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products/", get(list_products).post(create_product))
        .route("/products/categories/", get(list_categories).post(create_category))
        .route("/products/categories/:id", delete(delete_category))
        .route("/products/barcode/:barcode", get(get_product_by_barcode))
        .route("/products/:id", delete(delete_product))
}

fn is_valid_barcode(barcode: &str) -> bool {
    lazy_static! {
        static ref BARCODE_RE: Regex = Regex::new(r"^[A-Za-z0-9-]{4,32}$").unwrap();
    }
    BARCODE_RE.is_match(barcode)
}

// --- categories ---

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = Category::list(&state.db, p.skip(), p.limit()).await?;
    Ok(Json(categories))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(mut payload): Json<CreateCategory>,
) -> ApiResult<Json<Category>> {
    payload.name = payload.name.trim().to_owned();
    if payload.name.is_empty() {
        return Err(ApiError::Validation("Category name must not be empty".into()));
    }

    let category = Category::create(&state.db, &payload.name).await?;
    info!(category_id = category.id, name = %category.name, admin = %admin.username, "category created");
    Ok(Json(category))
}

#[instrument(skip(state, admin))]
pub async fn delete_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    let attached = Category::count_products(&state.db, id).await?;
    if attached > 0 {
        warn!(category_id = id, products = attached, "refusing to delete non-empty category");
        return Err(ApiError::Conflict(format!(
            "Category still has {attached} products"
        )));
    }

    if Category::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("Category"));
    }
    info!(category_id = id, admin = %admin.username, "category deleted");
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

// --- products ---

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = Product::list(&state.db, p.skip(), p.limit()).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(mut payload): Json<CreateProduct>,
) -> ApiResult<Json<ProductResponse>> {
    payload.name = payload.name.trim().to_owned();
    if payload.name.is_empty() {
        return Err(ApiError::Validation("Product name must not be empty".into()));
    }
    if !is_valid_barcode(&payload.barcode) {
        warn!(barcode = %payload.barcode, "invalid barcode");
        return Err(ApiError::Validation("Invalid barcode".into()));
    }
    if !payload.price.is_finite() || payload.price < 0.0 {
        return Err(ApiError::Validation("Price must be non-negative".into()));
    }
    if payload.stock < 0 {
        return Err(ApiError::Validation("Stock must be non-negative".into()));
    }

    let category = Category::find_by_id(&state.db, payload.category_id)
        .await?
        .ok_or(ApiError::Validation("Unknown category".into()))?;

    let product = Product::create(
        &state.db,
        &payload.name,
        &payload.barcode,
        payload.price,
        payload.stock,
        payload.category_id,
    )
    .await?;

    info!(product_id = product.id, barcode = %product.barcode, admin = %admin.username, "product created");
    Ok(Json(ProductResponse {
        id: product.id,
        name: product.name,
        barcode: product.barcode,
        price: product.price,
        stock: product.stock,
        category_id: product.category_id,
        category: Some(category),
    }))
}

#[instrument(skip(state))]
pub async fn get_product_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<ProductResponse>> {
    let product = Product::find_by_barcode(&state.db, &barcode)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;
    Ok(Json(product.into()))
}

#[instrument(skip(state, admin))]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    if Product::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("Product"));
    }
    info!(product_id = id, admin = %admin.username, "product deleted");
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barcode_validation() {
        assert!(is_valid_barcode("899123456"));
        assert!(is_valid_barcode("ABC-123-XYZ"));
        assert!(!is_valid_barcode(""));
        assert!(!is_valid_barcode("abc"));
        assert!(!is_valid_barcode("has spaces 123"));
        assert!(!is_valid_barcode(&"9".repeat(33)));
    }
}
