//! HTTP client configuration and building logic
//!
//! Attachments are fetched with plain GET requests. No timeouts are applied
//! unless configured: a stalled request stalls the run, which the operator can
//! interrupt.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::http;

/// Configuration for the attachment HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// User agent sent with every request
    pub user_agent: String,
    /// Overall request timeout (none by default)
    pub request_timeout: Option<Duration>,
    /// Connect timeout (none by default)
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: http::USER_AGENT.to_string(),
            request_timeout: None,
            connect_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> reqwest::Result<Client> {
        let mut client_builder = Client::builder().user_agent(self.user_agent.as_str());

        if let Some(timeout) = self.request_timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(timeout) = self.connect_timeout {
            client_builder = client_builder.connect_timeout(timeout);
        }

        client_builder.build()
    }
}
