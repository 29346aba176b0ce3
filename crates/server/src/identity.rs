//! Caller identity.
//!
//! Requests carry an `Authorization: Bearer <jwt>` header. The token is
//! resolved once by the auth middleware and the resulting [`Identity`] is made
//! available to handlers through request extensions.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::ServerError;

/// The authenticated caller, as known by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Turn a bearer credential into an identity, or fail with
    /// [`ServerError::Unauthorized`].
    async fn resolve(&self, bearer: &str) -> Result<Identity, ServerError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// External user id.
    pub sub: String,
    /// Expiry (unix timestamp seconds).
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// HS256 tokens signed with a shared secret.
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, bearer: &str) -> Result<Identity, ServerError> {
        let decoded = decode::<Claims>(bearer, &self.key, &self.validation).map_err(|err| {
            tracing::debug!("rejected bearer token: {err}");
            ServerError::Unauthorized
        })?;

        let claims = decoded.claims;
        // Stored external ids are trimmed, so the lookup key must be too.
        let external_id = claims.sub.trim();
        if external_id.is_empty() {
            return Err(ServerError::Unauthorized);
        }

        Ok(Identity {
            external_id: external_id.to_string(),
            email: claims.email,
            name: claims.name,
        })
    }
}
