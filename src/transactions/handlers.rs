use axum::{
    extract::{Path, Query, State},
    routing::{delete, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::jwt::CurrentUser,
    catalog::dto::Pagination,
    error::{ApiError, ApiResult},
    state::AppState,
    transactions::{
        dto::{CreateTransaction, TransactionResponse},
        repo, services,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions/", post(create_transaction).get(list_transactions))
        .route("/transactions/:id", delete(delete_transaction))
}

#[instrument(skip(state, user, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateTransaction>,
) -> ApiResult<Json<TransactionResponse>> {
    let transaction = services::create_transaction(&state.db, &user, &payload.items).await?;
    Ok(Json(transaction))
}

#[instrument(skip(state, _user))]
pub async fn list_transactions(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let headers = repo::list(&state.db, p.skip(), p.limit()).await?;
    let transactions = services::load_details(&state.db, headers).await?;
    Ok(Json(transactions))
}

#[instrument(skip(state, user))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    if repo::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("Transaction"));
    }
    info!(transaction_id = id, user_id = user.id, "transaction deleted");
    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
