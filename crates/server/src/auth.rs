//! Bearer token issuing and verification.

use api_types::auth::{Login, Token};
use axum::{
    Json, RequestExt,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

/// Secret and lifetime of issued tokens.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_minutes: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    email: String,
    role: String,
    iat: u64,
    exp: u64,
}

fn issue_token(settings: &AuthSettings, user: &engine::User) -> Result<String, ServerError> {
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        iat: now,
        exp: now + settings.token_ttl_minutes * 60,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|err| {
        tracing::error!("failed to sign token: {err}");
        ServerError::Generic("failed to issue token".to_string())
    })
}

fn verify_token(settings: &AuthSettings, token: &str) -> Option<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Some(data.claims),
        Err(err) => {
            tracing::debug!("rejected token: {err}");
            None
        }
    }
}

/// Exchange email and password for a bearer token.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<Token>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = issue_token(&state.auth, &user)?;
    tracing::info!("user {} logged in", user.email);

    Ok(Json(Token {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.token_ttl_minutes * 60,
        user: views::user(user),
    }))
}

/// Resolve the bearer token into the current [`engine::User`].
///
/// The user is reloaded on every request, so deleted accounts and role
/// changes take effect before the token expires.
pub(crate) async fn require_user(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let TypedHeader(Authorization(bearer)) = request
        .extract_parts::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let claims = verify_token(&state.auth, bearer.token()).ok_or(StatusCode::UNAUTHORIZED)?;

    let user = match state.engine.user(claims.sub).await {
        Ok(user) => user,
        Err(engine::EngineError::KeyNotFound(_)) => {
            tracing::warn!("token for unknown user {}", claims.sub);
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(err) => {
            tracing::error!("failed to load user {}: {err}", claims.sub);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(secret: &str) -> AuthSettings {
        AuthSettings {
            jwt_secret: secret.to_string(),
            token_ttl_minutes: 5,
        }
    }

    fn user() -> engine::User {
        engine::User {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: engine::UserRole::Lawyer,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let user = user();
        let token = issue_token(&settings("s3cret"), &user).unwrap();
        let claims = verify_token(&settings("s3cret"), &token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, "lawyer");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&settings("s3cret"), &user()).unwrap();
        assert!(verify_token(&settings("other"), &token).is_none());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token(&settings("s3cret"), "not-a-token").is_none());
    }
}
