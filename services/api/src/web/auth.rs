//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for signup, login and logout, the current-user
//! lookup, and the auth event stream the dashboard subscribes to.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use chrono::{Duration, Utc};
use futures::Stream;
use postcraft_core::domain::{AuthEvent, User};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{port_failure, HandlerError};
use crate::web::middleware::{session_id, SESSION_COOKIE};
use crate::web::state::AppState;

const SESSION_DAYS: i64 = 30;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
}

impl From<User> for AuthResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
        }
    }
}

//=========================================================================================
// Session Helpers
//=========================================================================================

fn session_cookie(auth_session_id: &str) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        auth_session_id,
        Duration::days(SESSION_DAYS).num_seconds()
    )
}

/// Creates a 30-day auth session and returns its `Set-Cookie` value.
async fn start_session(state: &AppState, user_id: Uuid) -> Result<String, HandlerError> {
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);

    state
        .db
        .create_auth_session(&auth_session_id, user_id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
        })?;

    Ok(session_cookie(&auth_session_id))
}

fn validate_credentials(email: &str, password: &str) -> Result<(), HandlerError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err((StatusCode::BAD_REQUEST, "Please enter a valid email".to_string()));
    }
    if password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Please enter a password".to_string()));
    }
    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request or email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_credentials(&req.email, &req.password)?;
    let email = req.email.trim().to_lowercase();

    if state.db.get_user_by_email(&email).await.is_ok() {
        return Err((StatusCode::BAD_REQUEST, "Email already registered".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
        })?
        .to_string();

    let user = state
        .db
        .create_user_with_email(&email, &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to create user: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user".to_string())
        })?;

    let cookie = start_session(&state, user.user_id).await?;
    info!(user_id = %user.user_id, "User signed up");
    state.publish(AuthEvent::SignedIn { user: user.clone() });

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(user)),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let invalid = || (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string());

    let user_creds = state
        .db
        .get_user_by_email(&req.email.trim().to_lowercase())
        .await
        .map_err(|e| {
            warn!("Login for unknown user: {:?}", e);
            invalid()
        })?;

    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid())?;

    let cookie = start_session(&state, user_creds.user_id).await?;
    let user = User {
        user_id: user_creds.user_id,
        email: user_creds.email,
    };
    info!(user_id = %user.user_id, "User logged in");
    state.publish(AuthEvent::SignedIn { user: user.clone() });

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(user)),
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    let auth_session_id = session_id(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    let user_id = state
        .db
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| port_failure("session", e))?;

    info!(%user_id, "User logged out");
    state.publish(AuthEvent::SignedOut {
        user_id,
        session_id: auth_session_id.to_string(),
    });

    let cookie = format!("{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE);
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

/// GET /auth/me - The signed-in user
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<AuthResponse>, HandlerError> {
    let user = state
        .db
        .get_user_by_id(user_id)
        .await
        .map_err(|e| port_failure("User", e))?;
    Ok(Json(AuthResponse::from(user)))
}

/// GET /auth/events - Sign-in and sign-out events for the current user
#[utoipa::path(
    get,
    path = "/auth/events",
    responses(
        (status = 200, description = "Server-sent event stream of auth changes (text/event-stream)"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn auth_events_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.auth_events.subscribe();
    let own_session = session_id(&headers).unwrap_or_default().to_string();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let Some(step) = route_event(&event, user_id, &own_session) else {
                        continue;
                    };
                    match Event::default().event(event_name(&event)).json_data(&event) {
                        Ok(sse) => yield Ok(sse),
                        Err(e) => error!("Failed to encode auth event: {:?}", e),
                    }
                    if step == StreamStep::Close {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Auth event subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn event_name(event: &AuthEvent) -> &'static str {
    match event {
        AuthEvent::SignedIn { .. } => "signed_in",
        AuthEvent::SignedOut { .. } => "signed_out",
    }
}

#[derive(Debug, PartialEq, Eq)]
enum StreamStep {
    Forward,
    Close,
}

/// What the event stream of `own_session` does with `event`.
///
/// Sign-ins reach every stream of the user. A sign-out reaches only the
/// stream of the session that ended, which then closes.
fn route_event(event: &AuthEvent, user_id: Uuid, own_session: &str) -> Option<StreamStep> {
    if event.user_id() != user_id {
        return None;
    }
    match event {
        AuthEvent::SignedIn { .. } => Some(StreamStep::Forward),
        AuthEvent::SignedOut { session_id, .. } if session_id == own_session => {
            Some(StreamStep::Close)
        }
        AuthEvent::SignedOut { .. } => None,
    }
}
