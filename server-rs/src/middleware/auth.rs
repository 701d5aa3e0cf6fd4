use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Organization;
use crate::AppState;

/// Claims of an owner access token minted by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // owner user id
    pub org: String, // organization id
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct AuthOwner {
    pub user_id: Uuid,
    pub organization_id: Uuid,
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

fn extract_bearer(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

/// Middleware: requires a valid owner token. Sets AuthOwner in extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(&req)
        .ok_or_else(|| AppError::Unauthorized("No token provided".into()))?;

    let claims = verify_token(&token, &state.config.jwt.secret)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token subject".into()))?;
    let organization_id = Uuid::parse_str(&claims.org)
        .map_err(|_| AppError::Unauthorized("Invalid token organization".into()))?;

    req.extensions_mut().insert(AuthOwner {
        user_id,
        organization_id,
    });

    Ok(next.run(req).await)
}

/// Loads the owner's organization and checks they actually own it.
pub async fn owned_organization(state: &AppState, owner: &AuthOwner) -> AppResult<Organization> {
    let organization = state
        .scheduler
        .store
        .organization(owner.organization_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;

    if organization.owner_id != owner.user_id {
        return Err(AppError::Forbidden(
            "Not the owner of this organization".into(),
        ));
    }
    Ok(organization)
}
