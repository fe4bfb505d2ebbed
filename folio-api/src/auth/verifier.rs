use super::{AuthError, AuthUser, Claims};
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Turns a raw bearer token into the user it was issued to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}

/// RS256 verification against the identity provider's published JWKS.
///
/// Keys are cached by `kid`; an unknown `kid` triggers one refetch so key
/// rotation is picked up without a restart.
pub struct JwksVerifier {
    http: reqwest::Client,
    jwks_url: String,
    issuer: String,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl JwksVerifier {
    pub fn new(http: reqwest::Client, jwks_url: String, issuer: String) -> Self {
        Self {
            http,
            jwks_url,
            issuer,
            keys: RwLock::new(HashMap::new()),
        }
    }

    async fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        self.keys.read().await.get(kid).cloned()
    }

    async fn refresh_keys(&self) -> Result<(), AuthError> {
        debug!("Fetching JWKS from {}", self.jwks_url);
        let set: JwkSet = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            keys.insert(kid, DecodingKey::from_jwk(jwk)?);
        }
        info!("Loaded {} signing keys", keys.len());
        *self.keys.write().await = keys;
        Ok(())
    }

    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }
        self.refresh_keys().await?;
        self.cached_key(kid)
            .await
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown signing key '{kid}'")))
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let header = decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing kid".to_string()))?;
        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        // Access tokens carry `client_id` rather than `aud`.
        validation.validate_aud = false;

        let data = decode::<Claims>(token, &key, &validation)?;
        Ok(data.claims.into())
    }
}

/// HS256 verification with a shared secret, for local development.
pub struct SharedSecretVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SharedSecretVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for SharedSecretVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token(secret: &str, exp_offset: i64) -> String {
        let exp = chrono::Utc::now().timestamp() + exp_offset;
        encode(
            &Header::new(Algorithm::HS256),
            &json!({ "sub": "user-1", "email": "admin@example.com", "exp": exp }),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_shared_secret_accepts_valid_token() {
        let verifier = SharedSecretVerifier::new("dev-secret");
        let user = verifier.verify(&token("dev-secret", 600)).await.unwrap();
        assert_eq!(user.sub, "user-1");
        assert_eq!(user.email.as_deref(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn test_shared_secret_rejects_bad_tokens() {
        let verifier = SharedSecretVerifier::new("dev-secret");
        assert!(verifier.verify(&token("other-secret", 600)).await.is_err());
        assert!(verifier.verify(&token("dev-secret", -600)).await.is_err());
        assert!(verifier.verify("not-a-jwt").await.is_err());
    }

    #[tokio::test]
    async fn test_jwks_rejects_token_without_kid() {
        let verifier = JwksVerifier::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/jwks.json".to_string(),
            "issuer".to_string(),
        );
        let err = verifier.verify(&token("dev-secret", 600)).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
