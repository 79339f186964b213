//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout and the session probe.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use bible_nav_core::domain::{NewUser, User};
use bible_nav_core::ports::PortError;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::web::middleware::{session_id, SESSION_COOKIE};
use crate::web::resource::{json_body, required_text, MessageResponse};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("Authentication error".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Opens a new auth session for `user_id` and returns the `Set-Cookie` value for it.
async fn start_session(state: &AppState, user_id: Uuid) -> Result<String, ApiError> {
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);

    state
        .db
        .create_auth_session(&auth_session_id, user_id, Utc::now() + ttl)
        .await?;

    Ok(format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        auth_session_id,
        ttl.num_seconds()
    ))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /signup - Create a new credentials account and log it in
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Missing fields or duplicate email", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(body)?;
    let (Some(email), Some(password)) = (required_text(req.email), required_text(req.password))
    else {
        return Err(ApiError::BadRequest("Email & password required".to_string()));
    };
    let email = email.trim().to_string();

    match state.db.get_user_by_email(&email).await {
        Ok(_) => return Err(ApiError::BadRequest("User already exists".to_string())),
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let user = state
        .db
        .create_user(NewUser {
            username: required_text(req.username),
            email,
            hashed_password: hash_password(&password)?,
        })
        .await?;
    info!("Registered user {}", user.id);

    let cookie = start_session(&state, user.id).await?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse { user: user.into() }),
    ))
}

/// POST /login - Login with an existing credentials account
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(body)?;
    let (Some(email), Some(password)) = (required_text(req.email), required_text(req.password))
    else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    let credentials = match state.db.get_user_by_email(email.trim()).await {
        Ok(credentials) => credentials,
        Err(PortError::NotFound(_)) => {
            return Err(ApiError::InvalidCredentials(
                "Invalid email or password".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    let Some(stored_hash) = credentials.hashed_password.as_deref() else {
        return Err(ApiError::InvalidCredentials(
            "This account does not support password login".to_string(),
        ));
    };

    if !verify_password(&password, stored_hash)? {
        return Err(ApiError::InvalidCredentials(
            "Invalid email or password".to_string(),
        ));
    }

    let cookie = start_session(&state, credentials.user.id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: credentials.user.into(),
        }),
    ))
}

/// POST /logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let auth_session_id = session_id(&headers).ok_or(ApiError::Unauthorized)?;

    state.db.delete_auth_session(auth_session_id).await?;

    let cookie = format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    );
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        MessageResponse::new("Logged out"),
    ))
}

/// GET /session - The user behind the current session cookie
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state.db.get_user_by_id(user_id).await?;
    Ok(Json(AuthResponse { user: user.into() }))
}
