use serde::Deserialize;

/// Configuration options for the job feed service.
///
/// Loaded from `config/default.yaml`, an optional `config/local.yaml` and
/// `APP__`-prefixed environment variables, in that order.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Shared secret expected in the `Authorization: Bearer` header of cron triggers.
    pub cron_secret: String,
    /// Bearer token guarding the administrative read interface.
    pub admin_token: String,
    /// Offset from UTC, in hours, of the local time notifications are scheduled in.
    #[serde(default)]
    pub timezone_offset_hours: i32,
    /// Public base URL used for links in digest emails.
    pub site_url: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    pub mail: MailConfig,
}

/// Knobs of the ingestion coordinator and source adapters.
#[derive(Clone, Debug, Deserialize)]
pub struct IngestionConfig {
    pub request_timeout_secs: u64,
    pub inter_source_delay_ms: u64,
    pub recency_days: i64,
    pub max_pages: u32,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            inter_source_delay_ms: 1000,
            recency_days: 30,
            max_pages: 3,
        }
    }
}

/// Knobs of the notification delivery worker.
#[derive(Clone, Debug, Deserialize)]
pub struct DeliveryConfig {
    pub batch_limit: i64,
    pub group_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            batch_limit: 500,
            group_delay_ms: 500,
        }
    }
}

/// Which mail transport the delivery worker hands digests to.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    Smtp,
    Log,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub from: String,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default)]
    pub smtp_user: String,
    #[serde(default)]
    pub smtp_password: String,
}

fn default_retention_days() -> u64 {
    90
}
