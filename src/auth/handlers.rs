use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{DummyLoginRequest, LoginRequest, RegisterRequest, TokenResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{AppError, Result},
    extract::AppJson,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/dummyLogin", post(dummy_login))
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Issues a token for any role without checking credentials.
#[instrument(skip(state))]
pub async fn dummy_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DummyLoginRequest>,
) -> Result<Json<TokenResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(Uuid::new_v4(), payload.role)?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::validation("invalid email"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("password must not be empty"));
    }

    let hash = hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(&payload.email, &hash, payload.role)
        .await
        .map_err(|e| {
            warn!(email = %payload.email, error = %e, "registration failed");
            e
        })?;

    let token = JwtKeys::from_ref(&state).sign(user.id, user.role)?;
    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match state.repo.find_user_by_email(&payload.email).await {
        Ok(u) => u,
        Err(AppError::NotFound(_)) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AppError::unauthenticated("invalid credentials"));
        }
        Err(e) => return Err(e),
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AppError::unauthenticated("invalid credentials"));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, user.role)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}
