use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::{ActivityClient, ActivityPayload, DeliveryError, ACTIVITY_LOG_PATH};

pub struct ClientConfig {
    pub api_base_url: String,
    /// Sent as a bearer token when present.
    pub token: Option<String>,
    pub timeout: Duration,
}

/// Delivers activity records over HTTP with reqwest.
pub struct HttpActivityClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpActivityClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: activity_endpoint(&config.api_base_url),
            token: config.token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn activity_endpoint(api_base_url: &str) -> String {
    format!("{}{ACTIVITY_LOG_PATH}", api_base_url.trim_end_matches('/'))
}

#[async_trait]
impl ActivityClient for HttpActivityClient {
    async fn post_activity(&self, payload: ActivityPayload) -> Result<(), DeliveryError> {
        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("Activity log responded with {status}");
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(
            activity_endpoint("https://tasks.example.com/api"),
            "https://tasks.example.com/api/activity/log"
        );
        assert_eq!(
            activity_endpoint("https://tasks.example.com/api/"),
            "https://tasks.example.com/api/activity/log"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() -> Result<()> {
        // Nothing listens on the discard port.
        let client = HttpActivityClient::new(ClientConfig {
            api_base_url: "http://127.0.0.1:9".into(),
            token: Some("secret".into()),
            timeout: Duration::from_secs(2),
        })?;
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/activity/log");

        let result = client
            .post_activity(ActivityPayload::for_page("/tasks", 5.))
            .await;
        assert!(matches!(result, Err(DeliveryError::Network(_))));
        Ok(())
    }
}
