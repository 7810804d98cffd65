use std::time::Duration;

use log::*;
use sps_common::Secret;

pub const DEFAULT_INSTAMOJO_BASE_URL: &str = "https://www.instamojo.com/api/1.1/";
/// A hanging gateway must not stall a checkout request indefinitely.
const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct InstamojoConfig {
    pub base_url: String,
    pub api_key: Secret<String>,
    pub auth_token: Secret<String>,
    pub timeout: Duration,
}

impl Default for InstamojoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INSTAMOJO_BASE_URL.to_string(),
            api_key: Secret::default(),
            auth_token: Secret::default(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

impl InstamojoConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("INSTAMOJO_BASE_URL").unwrap_or_else(|_| {
            info!("INSTAMOJO_BASE_URL not set, using {DEFAULT_INSTAMOJO_BASE_URL}");
            DEFAULT_INSTAMOJO_BASE_URL.to_string()
        });
        let api_key = Secret::new(std::env::var("INSTAMOJO_API_KEY").unwrap_or_else(|_| {
            error!("INSTAMOJO_API_KEY is not set. Payment requests will be rejected by the gateway.");
            String::default()
        }));
        let auth_token = Secret::new(std::env::var("INSTAMOJO_AUTH_TOKEN").unwrap_or_else(|_| {
            error!("INSTAMOJO_AUTH_TOKEN is not set. Payment requests and webhook MAC checks will fail.");
            String::default()
        }));
        let timeout = std::env::var("INSTAMOJO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GATEWAY_TIMEOUT);
        Self { base_url, api_key, auth_token, timeout }
    }

    pub fn is_configured(&self) -> bool {
        !(self.api_key.is_empty() || self.auth_token.is_empty())
    }
}
