use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// The authenticated identity bound to a request
#[derive(Clone)]
pub struct Principal {
    pub subject: String,
    pub credentials: Option<String>,
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn new(subject: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            credentials: None,
            authorities,
        }
    }

    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("subject", &self.subject)
            .field("credentials", &self.credentials.as_ref().map(|_| "[redacted]"))
            .field("authorities", &self.authorities)
            .finish()
    }
}

/// Reads identities out of bearer tokens
pub trait TokenService: Send + Sync {
    /// Identity named by the token, without judging its expiry
    fn resolve_identity(&self, token: &str) -> Result<String, JwtError>;

    fn is_expired(&self, token: &str) -> bool;
}

/// Looks up the full principal for a resolved identity
#[async_trait]
pub trait PrincipalLoader: Send + Sync {
    async fn load_principal(&self, identity: &str) -> Result<Principal, ApiError>;
}

/// HS256 tokens whose `sub` claim is the identity
#[derive(Clone)]
pub struct JwtService {
    secret: String,
    expiry_hours: u64,
}

impl JwtService {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.security.jwt_secret.clone(), config.security.jwt_expiry_hours)
    }

    pub fn generate_access_token(&self, subject: &str) -> Result<String, JwtError> {
        self.encode_claims(&Claims::new(subject, self.expiry_hours))
    }

    pub fn encode_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verify the signature and decode the claims. Expiry is left to the caller.
    pub fn claims(&self, token: &str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}

impl TokenService for JwtService {
    fn resolve_identity(&self, token: &str) -> Result<String, JwtError> {
        self.claims(token).map(|claims| claims.sub)
    }

    fn is_expired(&self, token: &str) -> bool {
        self.claims(token).map(|claims| claims.is_expired()).unwrap_or(true)
    }
}
