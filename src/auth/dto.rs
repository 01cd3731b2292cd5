use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Request body for the development login.
#[derive(Debug, Deserialize)]
pub struct DummyLoginRequest {
    pub role: Role,
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned by every token-issuing route.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
