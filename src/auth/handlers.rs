use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{PublicUser, TokenForm, TokenResponse},
        jwt::{CurrentUser, JwtKeys},
        password::verify_password,
        repo::User,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(token))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, form))]
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_username(&state.db, &form.username)
        .await?
        .ok_or_else(|| {
            warn!(username = %form.username, "login unknown username");
            ApiError::InvalidCredentials
        })?;

    if !verify_password(&form.password, &user.hashed_password)? {
        warn!(username = %user.username, user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(&user.username)?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser {
        id: user.id,
        username: user.username,
        role: user.role,
        is_active: user.is_active,
    })
}
