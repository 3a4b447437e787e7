//! Login and current-user endpoints.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{LoginRequest, TokenResponse, UserProfile};
use crate::state::AppState;

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let token = state.auth.login(&body.email, &body.password).await?;
    tracing::info!(email = %body.email.trim().to_lowercase(), "User logged in");
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
        expires_in: state.auth.token_ttl_secs(),
    }))
}

/// `GET /auth/me`
pub async fn me(RequireAuth(claims): RequireAuth) -> Json<UserProfile> {
    Json(claims.profile())
}
