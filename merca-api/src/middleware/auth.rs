use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use merca_core::identity::{Actor, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

// ============================================================================
// Session Claims
// ============================================================================

/// Claims minted by the session-verification service. The engine trusts
/// them wholesale; it never re-authenticates.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub company_id: Option<Uuid>,
    pub exp: usize,
}

/// The authenticated caller attached to every request.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub actor: Actor,
    pub company_id: Option<Uuid>,
}

// ============================================================================
// Session Middleware
// ============================================================================

pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract token from Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Decode and validate the session token
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // 3. Resolve the role; the system role is internal-only
    let role: Role = token_data
        .claims
        .role
        .parse()
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    if role == Role::System {
        return Err(StatusCode::FORBIDDEN);
    }

    // 4. Inject the session into request extensions
    req.extensions_mut().insert(AuthSession {
        actor: Actor::new(token_data.claims.sub.clone(), role),
        company_id: token_data.claims.company_id,
    });

    Ok(next.run(req).await)
}

/// Mint a session token the middleware will accept. Used by the demo
/// seeding output and the integration tests.
pub fn issue_session_token(
    secret: &str,
    user_id: &str,
    role: Role,
    company_id: Option<Uuid>,
    ttl_seconds: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        role: role.to_string(),
        company_id,
        exp: (chrono::Utc::now().timestamp() as usize) + ttl_seconds as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
