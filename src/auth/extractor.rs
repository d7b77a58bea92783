use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::warn;
use uuid::Uuid;

use super::claims::{Claims, TokenKind};
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts and validates the bearer JWT, returning the caller's user ID.
///
/// Tokens are minted by the external identity service; this service only
/// verifies them against the shared secret.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthenticated("missing Authorization header"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthenticated("invalid auth scheme"))?;

        let claims = verify(token, &state.config.jwt).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthenticated("invalid or expired token")
        })?;

        if claims.kind != TokenKind::Access {
            return Err(ApiError::Unauthenticated("access token required"));
        }

        Ok(AuthUser(claims.sub))
    }
}

pub(crate) fn verify(token: &str, cfg: &JwtConfig) -> jsonwebtoken::errors::Result<Claims> {
    let mut validation = Validation::default();
    validation.set_audience(std::slice::from_ref(&cfg.audience));
    validation.set_issuer(std::slice::from_ref(&cfg.issuer));
    let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());
    Ok(decode::<Claims>(token, &decoding, &validation)?.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::OffsetDateTime;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
        }
    }

    fn make_claims(cfg: &JwtConfig, kind: TokenKind, ttl_secs: i64) -> Claims {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Claims {
            sub: Uuid::new_v4(),
            iat: now as usize,
            exp: (now + ttl_secs) as usize,
            iss: cfg.issuer.clone(),
            aud: cfg.audience.clone(),
            kind,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("sign token")
    }

    #[test]
    fn verify_accepts_well_formed_access_token() {
        let cfg = test_config();
        let claims = make_claims(&cfg, TokenKind::Access, 300);
        let token = sign(&claims, &cfg.secret);
        let verified = verify(&token, &cfg).expect("verify token");
        assert_eq!(verified.sub, claims.sub);
        assert_eq!(verified.kind, TokenKind::Access);
    }

    #[test]
    fn verify_rejects_wrong_issuer() {
        let cfg = test_config();
        let mut claims = make_claims(&cfg, TokenKind::Access, 300);
        claims.iss = "someone-else".into();
        let token = sign(&claims, &cfg.secret);
        assert!(verify(&token, &cfg).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let cfg = test_config();
        // past the default leeway
        let claims = make_claims(&cfg, TokenKind::Access, -300);
        let token = sign(&claims, &cfg.secret);
        assert!(verify(&token, &cfg).is_err());
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let cfg = test_config();
        let claims = make_claims(&cfg, TokenKind::Access, 300);
        let token = sign(&claims, "other-secret");
        assert!(verify(&token, &cfg).is_err());
    }

    #[tokio::test]
    async fn extractor_rejects_missing_header() {
        let state = AppState::fake();
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn extractor_rejects_refresh_token() {
        let state = AppState::fake();
        let claims = make_claims(&state.config.jwt, TokenKind::Refresh, 300);
        let token = sign(&claims, &state.config.jwt.secret);
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/")
            .header(
                axum::http::header::AUTHORIZATION,
                format!("Bearer {token}"),
            )
            .body(())
            .unwrap()
            .into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn extractor_returns_subject_for_access_token() {
        let state = AppState::fake();
        let claims = make_claims(&state.config.jwt, TokenKind::Access, 300);
        let token = sign(&claims, &state.config.jwt.secret);
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/")
            .header(
                axum::http::header::AUTHORIZATION,
                format!("Bearer {token}"),
            )
            .body(())
            .unwrap()
            .into_parts();
        let AuthUser(user_id) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract user");
        assert_eq!(user_id, claims.sub);
    }
}
