//! Spotify Web API catalog
//!
//! Uses the client-credentials flow, so only public catalog endpoints are
//! available. The access token is cached in memory until shortly before it
//! expires.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::AppConfig;
use crate::core::{CatalogError, MusicCatalog};
use crate::models::{CatalogTrack, RecommendationsResponse, SearchResponse};

/// Refresh tokens this long before Spotify says they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Spotify catalog client
pub struct SpotifyCatalog {
    client: Client,
    client_id: String,
    client_secret: String,
    api_url: String,
    auth_url: String,
    market: Option<String>,
    token: RwLock<Option<CachedToken>>,
}

impl SpotifyCatalog {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            api_url: config.spotify_api_url.trim_end_matches('/').to_string(),
            auth_url: config.spotify_auth_url.clone(),
            market: config.market.clone(),
            token: RwLock::new(None),
        })
    }

    fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Get a cached token or request a new one
    async fn access_token(&self) -> Result<String, CatalogError> {
        if !self.has_credentials() {
            return Err(CatalogError::MissingCredentials);
        }

        {
            let token = self.token.read().await;
            if let Some(cached) = token.as_ref().filter(|t| t.is_fresh()) {
                return Ok(cached.token.clone());
            }
        }

        debug!("Requesting new Spotify access token");
        let request = self
            .client
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")]);
        let response: TokenResponse = send_json(request).await?;

        let cached = CachedToken {
            token: response.access_token,
            expires_at: Instant::now() + Duration::from_secs(response.expires_in),
        };
        let token = cached.token.clone();
        *self.token.write().await = Some(cached);

        Ok(token)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let token = self.access_token().await?;

        let mut params: Vec<(&str, String)> = query.to_vec();
        if let Some(market) = &self.market {
            params.push(("market", market.clone()));
        }

        let request = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(token)
            .query(&params);

        send_json(request).await
    }
}

#[async_trait]
impl MusicCatalog for SpotifyCatalog {
    async fn recommendations(
        &self,
        genre: &str,
        limit: usize,
    ) -> Result<Vec<CatalogTrack>, CatalogError> {
        let response: RecommendationsResponse = self
            .get(
                "/recommendations",
                &[
                    ("seed_genres", genre.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(response.tracks)
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogTrack>, CatalogError> {
        let response: SearchResponse = self
            .get(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", "track".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(response.tracks.map(|page| page.items).unwrap_or_default())
    }
}

/// Send a request and decode a JSON body, mapping non-2xx to `Status`
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, CatalogError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(CatalogError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Pull a readable message out of a Spotify error body
fn error_message(body: &str) -> String {
    let json: serde_json::Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) => return body.chars().take(200).collect(),
    };

    // api errors nest the message, auth errors use a flat description
    json.get("error")
        .and_then(|e| e.get("message"))
        .or_else(|| json.get("error_description"))
        .or_else(|| json.get("error"))
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error")
        .to_string()
}
