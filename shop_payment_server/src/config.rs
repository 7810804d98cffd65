use std::env;

use instamojo_tools::InstamojoConfig;
use log::*;
use sps_common::Secret;

const DEFAULT_SPS_HOST: &str = "127.0.0.1";
const DEFAULT_SPS_PORT: u16 = 8480;
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The bearer token required on every `/admin` route.
    pub admin_api_key: Secret<String>,
    /// The urls exposed to the payment gateway (redirect and webhook targets) and to buyers' browsers.
    pub urls: PublicUrls,
    /// Origins allowed by the CORS policy. Empty means same-origin only.
    pub cors_origins: Vec<String>,
    pub instamojo: InstamojoConfig,
    pub smtp: SmtpConfig,
}

/// Where the outside world reaches this deployment. The gateway calls back on `backend_url`; buyers land on
/// `frontend_url` after checkout.
#[derive(Clone, Debug)]
pub struct PublicUrls {
    pub backend_url: String,
    pub frontend_url: String,
}

impl Default for PublicUrls {
    fn default() -> Self {
        Self {
            backend_url: format!("http://{DEFAULT_SPS_HOST}:{DEFAULT_SPS_PORT}"),
            frontend_url: format!("http://{DEFAULT_SPS_HOST}:3000"),
        }
    }
}

impl PublicUrls {
    pub fn payment_redirect_url(&self, order_id: i64) -> String {
        format!("{}/payment/callback?order_id={order_id}", self.backend_url)
    }

    pub fn payment_webhook_url(&self) -> String {
        format!("{}/payment/webhook", self.backend_url)
    }

    pub fn frontend_failure_url(&self, reason: Option<&str>) -> String {
        match reason {
            Some(reason) => format!("{}/?payment=failed&reason={reason}", self.frontend_url),
            None => format!("{}/?payment=failed", self.frontend_url),
        }
    }

    pub fn frontend_success_url(&self) -> String {
        format!("{}/account?payment=success", self.frontend_url)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    /// The From address on outgoing mail, e.g. `"Chai Shop <orders@example.com>"`.
    pub from_address: String,
}

impl SmtpConfig {
    /// Mail is optional in development. When the relay is not configured the dispatcher fails fast at send
    /// time instead of at startup.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.username.is_empty() && !self.password.reveal().is_empty()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPS_HOST.to_string(),
            port: DEFAULT_SPS_PORT,
            database_url: String::default(),
            admin_api_key: Secret::default(),
            urls: PublicUrls::default(),
            cors_origins: Vec::new(),
            instamojo: InstamojoConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let defaults = ServerConfig::default();
        let host = env::var("SPS_HOST").ok().unwrap_or_else(|| DEFAULT_SPS_HOST.into());
        let port = env::var("SPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPS_PORT. {e} Using the default, {DEFAULT_SPS_PORT}, instead."
                    );
                    DEFAULT_SPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPS_PORT);
        let database_url = env::var("SPS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SPS_DATABASE_URL is not set. Using the backend's default.");
            String::default()
        });
        let admin_api_key = env::var("SPS_ADMIN_API_KEY").map(Secret::new).unwrap_or_else(|_| {
            warn!("🪛️ SPS_ADMIN_API_KEY is not set. Admin routes will refuse all requests.");
            Secret::default()
        });
        let backend_url = env::var("SPS_BACKEND_URL").ok().unwrap_or_else(|| {
            info!("🪛️ SPS_BACKEND_URL is not set. Using the default, {}.", defaults.urls.backend_url);
            defaults.urls.backend_url.clone()
        });
        let frontend_url = env::var("SPS_FRONTEND_URL").ok().unwrap_or_else(|| {
            info!("🪛️ SPS_FRONTEND_URL is not set. Using the default, {}.", defaults.urls.frontend_url);
            defaults.urls.frontend_url.clone()
        });
        let urls = PublicUrls {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        };
        let cors_origins = env::var("SPS_CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).filter(|o| !o.is_empty()).collect())
            .unwrap_or_else(|_| Vec::new());
        let instamojo = InstamojoConfig::new_from_env_or_default();
        let smtp = smtp_config_from_env();
        Self { host, port, database_url, admin_api_key, urls, cors_origins, instamojo, smtp }
    }
}

fn smtp_config_from_env() -> SmtpConfig {
    let host = env::var("SPS_SMTP_HOST").ok().unwrap_or_default();
    let port = env::var("SPS_SMTP_PORT")
        .map(|s| {
            s.parse::<u16>().unwrap_or_else(|e| {
                error!("🪛️ {s} is not a valid port for SPS_SMTP_PORT. {e} Using {DEFAULT_SMTP_PORT} instead.");
                DEFAULT_SMTP_PORT
            })
        })
        .ok()
        .unwrap_or(DEFAULT_SMTP_PORT);
    let username = env::var("SPS_SMTP_USERNAME").ok().unwrap_or_default();
    let password = env::var("SPS_SMTP_PASSWORD").map(Secret::new).unwrap_or_default();
    let from_address = env::var("SPS_SMTP_FROM").ok().unwrap_or_else(|| username.clone());
    let config = SmtpConfig { host, port, username, password, from_address };
    if !config.is_configured() {
        warn!("🪛️ SMTP relay is not fully configured. Order confirmation mail will not be sent.");
    }
    config
}
