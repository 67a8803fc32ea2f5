use super::filter::{filter_leagues, filter_livescores};
use crate::config::FootballConfig;
use crate::error::{BridgeError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

const MISSING_TOKEN: &str =
    "Error: AUTH_KEY is not set. Please set the AUTH_KEY environment variable.";

/// Stateless client for the football statistics API.
///
/// Every capability returns text: the raw body on success, or a formatted
/// error message. Failures never escape as `Err`.
#[derive(Clone)]
pub struct FootballClient {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl FootballClient {
    pub fn new(config: &FootballConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::Config(format!("failed to build HTTP client: {}", e)))?;

        let base_url = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };

        Ok(Self {
            http,
            base_url,
            auth_token: config
                .auth_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Raw body on success; the formatted failure text otherwise.
    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<String, String> {
        let Some(token) = &self.auth_token else {
            return Err(MISSING_TOKEN.to_string());
        };

        let url = format!("{}{}", self.base_url, endpoint);
        info!("Making request to {} with params {:?}", url, params);

        let response = self
            .http
            .get(&url)
            .query(&[("auth_token", token.as_str())])
            .query(params)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Request to {} failed: {}", url, e);
                format!("Request Error: {}", e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Request Error: {}", e))?;

        if !status.is_success() {
            error!("{} returned HTTP {}", url, status.as_u16());
            return Err(format!("API Error: {} - {}", status.as_u16(), body));
        }

        debug!("{} returned {} bytes", url, body.len());
        Ok(body)
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        self.fetch(endpoint, params)
            .await
            .unwrap_or_else(|failure| failure)
    }

    /// Live scores, optionally narrowed to leagues whose name contains `search_term`.
    pub async fn livescores(&self, search_term: Option<&str>) -> String {
        let body = match self.fetch("livescores/", &[]).await {
            Ok(body) => body,
            Err(failure) => return failure,
        };
        match search_term.filter(|s| !s.is_empty()) {
            Some(term) => filter_livescores(&body, term),
            None => body,
        }
    }

    pub async fn match_preview(&self, match_id: i64) -> String {
        self.get("match-preview/", &[("match_id", match_id.to_string())])
            .await
    }

    pub async fn match_details(&self, match_id: i64) -> String {
        self.get("match/", &[("match_id", match_id.to_string())])
            .await
    }

    pub async fn countries(&self) -> String {
        self.get("country/", &[]).await
    }

    /// All leagues, optionally narrowed to names containing `search_query`.
    pub async fn leagues(&self, search_query: Option<&str>) -> String {
        let body = match self.fetch("league/", &[]).await {
            Ok(body) => body,
            Err(failure) => return failure,
        };
        match search_query.filter(|s| !s.is_empty()) {
            Some(query) => filter_leagues(&body, query),
            None => body,
        }
    }

    pub async fn standings(&self, league_id: i64) -> String {
        self.get("standing/", &[("league_id", league_id.to_string())])
            .await
    }
}
