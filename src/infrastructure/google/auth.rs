use crate::domain::tts::TtsServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKEN_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
/// Refresh cached tokens this many seconds before they expire
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 300;

/// Service account JSON key, as downloaded from the Google Cloud console
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccount {
    pub fn from_json(json: &str) -> Result<Self, TtsServiceError> {
        serde_json::from_str(json).map_err(|e| {
            TtsServiceError::InvalidCredentials(format!("failed to parse service account: {}", e))
        })
    }
}

/// Source of OAuth bearer tokens for Google Cloud APIs
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, TtsServiceError>;
}

/// JWT claims for Google OAuth
#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: u64,
    iat: u64,
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Cached token info
struct TokenInfo {
    access_token: String,
    expires_at: u64,
}

/// Exchanges a self-signed service account JWT for an access token (JWT bearer grant)
pub struct ServiceAccountTokenSource {
    client: reqwest::Client,
    service_account: ServiceAccount,
    encoding_key: jsonwebtoken::EncodingKey,
    cached: Mutex<Option<TokenInfo>>,
}

impl ServiceAccountTokenSource {
    /// Fails with `InvalidCredentials` when the private key is not a valid RSA PEM
    pub fn new(client: reqwest::Client, service_account: ServiceAccount) -> Result<Self, TtsServiceError> {
        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(service_account.private_key.as_bytes())
            .map_err(|e| TtsServiceError::InvalidCredentials(format!("invalid private key: {}", e)))?;

        Ok(Self {
            client,
            service_account,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    fn token_url(&self) -> &str {
        self.service_account
            .token_uri
            .as_deref()
            .unwrap_or(GOOGLE_TOKEN_URL)
    }

    fn create_jwt(&self, now: u64) -> Result<String, TtsServiceError> {
        use jsonwebtoken::{Algorithm, Header};

        let claims = JwtClaims {
            iss: &self.service_account.client_email,
            scope: TOKEN_SCOPE,
            aud: self.token_url(),
            exp: now + 3600,
            iat: now,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| TtsServiceError::Conversion(format!("JWT encoding failed: {}", e)))
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, TtsServiceError> {
        let now = unix_now();

        let mut cached = self.cached.lock().await;
        if let Some(token_info) = cached.as_ref() {
            if token_info.expires_at > now + TOKEN_EXPIRY_MARGIN_SECS {
                return Ok(token_info.access_token.clone());
            }
        }

        tracing::debug!(
            client_email = %self.service_account.client_email,
            "Requesting Google access token"
        );

        let jwt = self.create_jwt(now)?;
        let response = self
            .client
            .post(self.token_url())
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TtsServiceError::Conversion(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Google token request rejected");
            return Err(TtsServiceError::Conversion(format!(
                "token request failed: {} - {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| TtsServiceError::Conversion(format!("token parse error: {}", e)))?;

        *cached = Some(TokenInfo {
            access_token: token_response.access_token.clone(),
            expires_at: now + token_response.expires_in,
        });

        Ok(token_response.access_token)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
