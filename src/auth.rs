use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{Config, CLIENT_ID, SCOPE};
use crate::error::{Error, Result};
use crate::session::Session;

/// Username and password of a Hilo account.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Form body of the password grant.
#[derive(Serialize)]
pub struct PasswordGrantRequest<'a> {
    pub grant_type: &'a str,
    pub scope: &'a str,
    pub client_id: &'a str,
    pub response_type: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Token payload returned by the identity provider.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Sent as a string by the provider; plain integers are accepted too.
    #[serde(default, deserialize_with = "string_or_number")]
    pub expires_in: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub id_token: String,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Null(()) => String::new(),
    })
}

/// Source of fresh sessions.
///
/// The HTTP password grant is the production implementation; the seam lets
/// the session manager be exercised without a network.
#[async_trait]
pub trait TokenAcquirer: Send + Sync {
    async fn acquire(&self, credentials: &Credentials) -> Result<Session>;
}

/// OAuth2 resource-owner password grant against the Hilo B2C directory.
pub struct PasswordGrant {
    client: reqwest::Client,
    token_url: String,
}

impl PasswordGrant {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            token_url: config.token_url.clone(),
        }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl TokenAcquirer for PasswordGrant {
    async fn acquire(&self, credentials: &Credentials) -> Result<Session> {
        debug!("Requesting token for user: {}", credentials.username);

        let form = PasswordGrantRequest {
            grant_type: "password",
            scope: SCOPE,
            client_id: CLIENT_ID,
            response_type: "token id_token",
            username: &credentials.username,
            password: &credentials.password,
        };

        let response = self.client.post(&self.token_url).form(&form).send().await?;
        let issued_at = Utc::now();

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            // Drain the body so the connection goes back to the pool; its
            // content is never interpreted.
            if let Err(e) = response.bytes().await {
                debug!("Failed to drain token error body: {}", e);
            }
            error!("Authentication failed with status: {}", status);
            return Err(Error::AuthenticationFailed {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<TokenResponse>(&body) {
            Ok(token) => {
                let session = Session::from_token_response(token, issued_at);
                debug!("Authentication successful for user: {}", credentials.username);
                Ok(session)
            }
            Err(e) => {
                error!("Failed to parse token response: {}", e);
                Err(Error::Decode(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{
            "access_token": "eyJhbGciOiJSUzI1NiJ9.access",
            "token_type": "Bearer",
            "expires_in": "3600",
            "refresh_token": "refresh456",
            "id_token": "id789"
        }"#;

        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "eyJhbGciOiJSUzI1NiJ9.access");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, "3600");
        assert_eq!(token.refresh_token, "refresh456");
        assert_eq!(token.id_token, "id789");
    }

    #[test]
    fn test_token_response_numeric_expiry() {
        let json = r#"{"access_token":"access123","expires_in":1800}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.expires_in, "1800");
        assert_eq!(token.refresh_token, "");
    }

    #[test]
    fn test_token_response_null_expiry() {
        let json = r#"{"access_token":"access123","expires_in":null}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.expires_in, "");
    }

    #[test]
    fn test_token_response_requires_access_token() {
        let json = r#"{"token_type":"Bearer","expires_in":"3600"}"#;
        assert!(serde_json::from_str::<TokenResponse>(json).is_err());
    }

    #[test]
    fn test_password_grant_form_encoding() {
        let form = PasswordGrantRequest {
            grant_type: "password",
            scope: SCOPE,
            client_id: CLIENT_ID,
            response_type: "token id_token",
            username: "test@example.com",
            password: "p&ss word",
        };

        let encoded = encode_form(&form);
        assert!(encoded.contains("grant_type=password"));
        assert!(encoded.contains("username=test%40example.com"));
        assert!(encoded.contains("password=p%26ss+word"));
        assert!(encoded.contains("response_type=token+id_token"));
        assert!(encoded.contains("client_id=9870f087-25f8-43b6-9cad-d4b74ce512e1"));
    }

    // Goes through reqwest so the test sees exactly what is put on the wire.
    fn encode_form(form: &PasswordGrantRequest<'_>) -> String {
        let request = reqwest::Client::new()
            .post("http://localhost/token")
            .form(form)
            .build()
            .unwrap();
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("test@example.com", "password123");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("test@example.com"));
        assert!(!debug.contains("password123"));
    }

    #[test]
    fn test_password_grant_uses_configured_endpoint() {
        let config = Config {
            token_url: "https://test.example.com/token".to_string(),
            ..Config::default()
        };
        let grant = PasswordGrant::new(reqwest::Client::new(), &config);
        assert_eq!(grant.token_url(), "https://test.example.com/token");
    }
}
