use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, Extensions, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::envelope::message;
use crate::auth::{Principal, PrincipalLoader, TokenService};
use crate::error::ApiError;

pub const VALID_TOKEN_MISSING: &str = "Valid token is missing";
pub const TOKEN_EXPIRED: &str = "Token has been expired";

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves bearer tokens into a [`Principal`] stored in the request extensions.
///
/// Requests without a bearer token pass through unauthenticated; handlers that need a
/// principal ask for [`Authenticated`] and reject there.
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<dyn TokenService>,
    principals: Arc<dyn PrincipalLoader>,
}

impl AuthGate {
    pub fn new(tokens: Arc<dyn TokenService>, principals: Arc<dyn PrincipalLoader>) -> Self {
        Self { tokens, principals }
    }

    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        extensions: &mut Extensions,
    ) -> Result<(), ApiError> {
        let Some(token) = extract_bearer_token(headers) else {
            return Ok(());
        };

        let identity = self.tokens.resolve_identity(token).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            ApiError::unauthorized(VALID_TOKEN_MISSING)
        })?;

        if extensions.get::<Principal>().is_some() {
            return Ok(());
        }

        let principal = self.principals.load_principal(&identity).await?;

        if self.tokens.is_expired(token) {
            tracing::warn!("Expired token presented for '{}'", identity);
            return Err(ApiError::unauthorized(TOKEN_EXPIRED));
        }

        tracing::debug!("Authenticated '{}' with {:?}", principal.subject, principal.authorities);
        extensions.insert(principal);
        Ok(())
    }
}

/// Middleware entry point, for `axum::middleware::from_fn_with_state(gate, authentication_gate)`
pub async fn authentication_gate(
    State(gate): State<AuthGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    gate.authenticate(&parts.headers, &mut parts.extensions).await?;
    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Token after `Bearer `, if the header carries at least one character of it
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Extractor for handlers that require an authenticated caller
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| ApiError::unauthorized(message::UNAUTHORIZED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtError;
    use axum::http::HeaderValue;

    struct FixedTokens;

    impl TokenService for FixedTokens {
        fn resolve_identity(&self, token: &str) -> Result<String, JwtError> {
            match token {
                "abc123" => Ok("alice".to_string()),
                "expiredtok" => Ok("bob".to_string()),
                other => Err(JwtError::InvalidToken(other.to_string())),
            }
        }

        fn is_expired(&self, token: &str) -> bool {
            token == "expiredtok"
        }
    }

    struct Directory;

    #[async_trait]
    impl PrincipalLoader for Directory {
        async fn load_principal(&self, identity: &str) -> Result<Principal, ApiError> {
            Ok(Principal::new(identity, vec!["ROLE_USER".to_string()]))
        }
    }

    fn gate() -> AuthGate {
        AuthGate::new(Arc::new(FixedTokens), Arc::new(Directory))
    }

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_valid_token_binds_principal() {
        let mut extensions = Extensions::new();
        gate().authenticate(&headers("Bearer abc123"), &mut extensions).await.unwrap();
        assert_eq!(extensions.get::<Principal>().unwrap().subject, "alice");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let mut extensions = Extensions::new();
        let err = gate()
            .authenticate(&headers("Bearer expiredtok"), &mut extensions)
            .await
            .unwrap_err();
        assert!(matches!(&err, ApiError::Authorization(m) if m == "Token has been expired"));
        assert!(extensions.get::<Principal>().is_none());
    }

    #[tokio::test]
    async fn test_no_header_stays_unauthenticated() {
        let mut extensions = Extensions::new();
        gate().authenticate(&HeaderMap::new(), &mut extensions).await.unwrap();
        assert!(extensions.get::<Principal>().is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_token() {
        let mut extensions = Extensions::new();
        let err = gate()
            .authenticate(&headers("Bearer garbage"), &mut extensions)
            .await
            .unwrap_err();
        assert!(matches!(&err, ApiError::Authorization(m) if m == "Valid token is missing"));
    }

    #[tokio::test]
    async fn test_non_bearer_and_empty_token_pass_through() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "bearer abc123"] {
            let mut extensions = Extensions::new();
            gate().authenticate(&headers(value), &mut extensions).await.unwrap();
            assert!(extensions.get::<Principal>().is_none(), "{value}");
        }
    }

    #[tokio::test]
    async fn test_existing_principal_is_kept() {
        let mut extensions = Extensions::new();
        extensions.insert(Principal::new("carol", vec![]));
        gate().authenticate(&headers("Bearer abc123"), &mut extensions).await.unwrap();
        assert_eq!(extensions.get::<Principal>().unwrap().subject, "carol");
    }
}
