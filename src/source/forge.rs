use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use parking_lot::RwLock;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::{ByteStream, DerivativeSource};
use crate::manifest::Manifest;

const DEFAULT_BASE_URL: &str = "https://developer.api.autodesk.com";
const TOKEN_SCOPE: &str = "viewables:read data:read";

/// Refresh the cached token this long before it actually expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Model Derivative service client with two-legged OAuth.
pub struct ForgeSource {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<CachedToken>>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl ForgeSource {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_base_url(client_id, client_secret, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(client_id: String, client_secret: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            token: RwLock::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Return a valid access token, requesting a fresh one if the cached
    /// token is missing or about to expire.
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(token) = self.token.read().as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .client
            .post(format!("{}/authentication/v2/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", TOKEN_SCOPE)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("token request failed: HTTP {}", status.as_u16()));
        }

        let token: TokenResponse = response.json().await?;
        debug!("access token acquired, expires in {}s", token.expires_in);

        let lifetime = Duration::from_secs(token.expires_in);
        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        };
        *self.token.write() = Some(cached);

        Ok(token.access_token)
    }

    fn invalidate_token(&self) {
        *self.token.write() = None;
    }

    /// GET `path` with a bearer token, refreshing the token and retrying
    /// once if the service rejects the credentials.
    async fn authorized_get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);

        for attempt in 0..2 {
            let token = self.access_token().await?;
            let response = self.client.get(&url).bearer_auth(&token).send().await?;

            let status = response.status();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                warn!(
                    "request rejected status={} path={} (attempt {})",
                    status.as_u16(),
                    path,
                    attempt
                );
                self.invalidate_token();
                continue;
            }
            if !status.is_success() {
                return Err(anyhow!("GET {} failed: HTTP {}", path, status.as_u16()));
            }
            return Ok(response);
        }

        Err(anyhow!("GET {} failed: credentials rejected", path))
    }
}

#[async_trait]
impl DerivativeSource for ForgeSource {
    async fn manifest(&self, urn: &str) -> Result<Manifest> {
        let response = self
            .authorized_get(&format!("/modelderivative/v2/designdata/{}/manifest", urn))
            .await?;
        let manifest = response.json::<Manifest>().await?;
        Ok(manifest)
    }

    async fn derivative_stream(&self, _urn: &str, derivative_urn: &str) -> Result<ByteStream> {
        let response = self
            .authorized_get(&format!(
                "/derivativeservice/v2/derivatives/{}",
                urlencoding::encode(derivative_urn)
            ))
            .await?;
        let stream = response
            .bytes_stream()
            .map_err(anyhow::Error::from)
            .boxed();
        Ok(stream)
    }
}
