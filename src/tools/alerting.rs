use crate::config::AlertingConfig;
use crate::error::{BridgeError, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

/// Tool name exposed by the alerting service's MCP endpoint.
pub const ALERT_TOOL: &str = "HeyOnCall__set_alerting";

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: CallParams,
}

#[derive(Debug, Serialize)]
struct CallParams {
    name: &'static str,
    arguments: Value,
}

impl JsonRpcRequest {
    fn set_alerting(message: &str) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method: "tools/call",
            params: CallParams {
                name: ALERT_TOOL,
                arguments: json!({ "payload": { "message": message } }),
            },
        }
    }
}

/// Stateless client posting alerts to an on-call trigger.
///
/// Like the statistics client, every outcome is reported as text.
#[derive(Clone)]
pub struct AlertClient {
    http: Client,
    url: String,
    auth_key: String,
}

impl AlertClient {
    pub fn new(config: &AlertingConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: config.trigger_url(),
            auth_key: config.auth_key.clone().unwrap_or_default(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn send_alert(&self, message: &str) -> String {
        info!("Sending alert: {}", message);

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.auth_key)
            .json(&JsonRpcRequest::set_alerting(message))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                error!("Error sending alert: {}", e);
                return format!("Error sending alert: {}", e);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("HTTP error sending alert: {}", body);
            return format!("Failed to send alert: {} - {}", status.as_u16(), body);
        }

        match response.json::<Value>().await {
            Ok(data) => match data.get("error") {
                Some(rpc_error) => {
                    error!("JSON-RPC error: {}", rpc_error);
                    format!("Error sending alert: {}", rpc_error)
                }
                None => format!("Alert sent successfully. Response: {}", data),
            },
            Err(e) => {
                error!("Error sending alert: {}", e);
                format!("Error sending alert: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(JsonRpcRequest::set_alerting("Real Madrid 2-1")).unwrap();
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {
                    "name": "HeyOnCall__set_alerting",
                    "arguments": {"payload": {"message": "Real Madrid 2-1"}}
                }
            })
        );
    }

    #[test]
    fn test_url_from_config() {
        let config = AlertingConfig {
            base_url: "http://localhost:7777".to_string(),
            trigger_id: Some("abc".to_string()),
            auth_key: Some("k".to_string()),
            timeout_secs: 2,
        };
        let client = AlertClient::new(&config).unwrap();
        assert_eq!(client.url(), "http://localhost:7777/triggers/abc/mcp");
    }
}
