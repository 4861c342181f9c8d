//! Shop-scoped JWT authentication for the business API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::AppError;

use crate::state::AppState;

/// JWT claims carried by every business request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub shopid: String,
    pub username: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub shop_id: String,
    pub username: String,
}

const JWT_EXPIRY_HOURS: i64 = 24;

pub fn create_token(
    shop_id: &str,
    username: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        shopid: shop_id.to_string(),
        username: username.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })
}

/// Verifies `Authorization: Bearer <jwt>` and inserts an [`AuthIdentity`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            AppError::invalid_token("Invalid Authorization format").into_response()
        })?;

    let claims = verify_token(token, &state.jwt_secret).map_err(IntoResponse::into_response)?;
    if claims.shopid.is_empty() {
        return Err(AppError::new(shared::ErrorCode::ShopNotSelected).into_response());
    }

    request.extensions_mut().insert(AuthIdentity {
        shop_id: claims.shopid,
        username: claims.username,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_token_round_trip() {
        let token = create_token("s1", "E01", "secret").unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.shopid, "s1");
        assert_eq!(claims.username, "E01");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret() {
        let token = create_token("s1", "E01", "secret").unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_expired_token() {
        let past = chrono::Utc::now() - chrono::Duration::hours(2);
        let claims = Claims {
            shopid: "s1".into(),
            username: "E01".into(),
            exp: past.timestamp() as usize,
            iat: past.timestamp() as usize,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let err = verify_token(&token, "secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }
}
