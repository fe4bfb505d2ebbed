use super::AuthError;
use crate::config::AuthConfig;
use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

/// Tokens returned by the hosted UI's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub id_token: String,
    /// Only present on the authorization-code grant.
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Authorization-code flow against the identity provider's hosted UI.
#[derive(Clone)]
pub struct CognitoClient {
    http: reqwest::Client,
    domain: String,
    client_id: String,
    client_secret: Option<String>,
}

impl CognitoClient {
    pub fn new(http: reqwest::Client, config: &AuthConfig) -> Self {
        Self {
            http,
            domain: config.domain.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        if self.domain.starts_with("http://") || self.domain.starts_with("https://") {
            format!("{}{}", self.domain, path)
        } else {
            format!("https://{}{}", self.domain, path)
        }
    }

    pub fn authorize_url(&self, redirect_uri: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &self.endpoint("/login"),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("redirect_uri", redirect_uri),
            ],
        )
        .map_err(|e| AuthError::TokenEndpoint(e.to_string()))
    }

    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenSet, AuthError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet, AuthError> {
        let mut request = self.http.post(self.endpoint("/oauth2/token")).form(form);
        if let Some(secret) = &self.client_secret {
            request = request.basic_auth(&self.client_id, Some(secret));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::TokenEndpoint(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Token endpoint returned {}: {}", status, body);
            return Err(AuthError::TokenEndpoint(format!("status {status}")));
        }

        response
            .json::<TokenSet>()
            .await
            .map_err(|e| AuthError::TokenEndpoint(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url() {
        let config = AuthConfig {
            client_id: "client123".into(),
            domain: "auth.example.com".into(),
            ..AuthConfig::default()
        };
        let client = CognitoClient::new(reqwest::Client::new(), &config);
        let url = client
            .authorize_url("https://site.example.com/api/auth/callback")
            .unwrap();

        assert_eq!(url.host_str(), Some("auth.example.com"));
        assert_eq!(url.path(), "/login");
        let query = url.query().unwrap();
        assert!(query.contains("client_id=client123"));
        assert!(query.contains("response_type=code"));
        assert!(query.contains("scope=openid+email+profile"));
        assert!(query.contains("redirect_uri=https%3A%2F%2Fsite.example.com%2Fapi%2Fauth%2Fcallback"));
    }
}
