//! Configuration for the outpost workflow.
//!
//! There is no ambient cloud session anywhere in outpost: a [`CloudConfig`]
//! is loaded once and handed to every component constructor explicitly.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::types::Arn;

/// Top-level configuration for the provisioning workflow.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CloudConfig {
    /// Cloud region all resources are created in.
    #[serde(default = "default_region")]
    pub region: String,

    /// Account ID owning the created resources.
    #[serde(default)]
    pub account_id: String,

    /// Object-storage bucket for model artifacts.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Credentials handle for service clients.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Service endpoint overrides.
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Deployment polling behaviour.
    #[serde(default)]
    pub poll: PollConfig,
}

fn default_region() -> String {
    "us-west-2".to_owned()
}

fn default_bucket() -> String {
    "outpost-artifacts".to_owned()
}

impl CloudConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources
    /// override earlier):
    /// 1. Default values
    /// 2. `outpost.toml` in the current directory (if present)
    /// 3. Environment variables with `OUTPOST_` prefix
    pub fn load() -> CoreResult<Self> {
        Figment::new()
            .merge(Toml::file("outpost.toml"))
            .merge(Env::prefixed("OUTPOST_").split("__"))
            .extract()
            .map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CoreResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("OUTPOST_").split("__"))
            .extract()
            .map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Compose an ARN for a resource in the configured region and account.
    ///
    /// Only used for well-known connector type ARNs; everything else is
    /// externally assigned and round-tripped.
    #[must_use]
    pub fn arn(&self, service: &str, resource: &str) -> Arn {
        Arn::new(format!(
            "arn:aws:{}:{}:{}:{}",
            service, self.region, self.account_id, resource
        ))
    }
}

/// Credentials handle for service clients.
///
/// Empty fields fall back to the standard environment variables at the
/// point of client construction, never through process-global state read
/// deep inside a request.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    /// Access key ID.
    pub access_key_id: Option<String>,

    /// Secret access key.
    pub secret_access_key: Option<String>,
}

impl CredentialsConfig {
    /// Resolve the access key ID, falling back to `AWS_ACCESS_KEY_ID`.
    #[must_use]
    pub fn access_key_id(&self) -> Option<String> {
        self.access_key_id
            .clone()
            .or_else(|| std::env::var("AWS_ACCESS_KEY_ID").ok())
    }

    /// Resolve the secret access key, falling back to `AWS_SECRET_ACCESS_KEY`.
    #[must_use]
    pub fn secret_access_key(&self) -> Option<String> {
        self.secret_access_key
            .clone()
            .or_else(|| std::env::var("AWS_SECRET_ACCESS_KEY").ok())
    }
}

/// Service endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Fleet provisioning service base URL.
    #[serde(default = "default_fleet_url")]
    pub fleet_url: String,

    /// Model compilation service base URL.
    #[serde(default = "default_compile_url")]
    pub compile_url: String,

    /// Object-storage endpoint override (S3-compatible stores).
    pub storage_endpoint: Option<String>,

    /// Device-facing MQTT endpoint written into the bootstrap config.
    #[serde(default = "default_device_endpoint")]
    pub device_endpoint: String,

    /// Request timeout in seconds for HTTP clients.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_fleet_url() -> String {
    "https://greengrass.us-west-2.amazonaws.com".to_owned()
}

fn default_compile_url() -> String {
    "https://api.sagemaker.us-west-2.amazonaws.com".to_owned()
}

fn default_device_endpoint() -> String {
    "data.iot.us-west-2.amazonaws.com".to_owned()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            fleet_url: default_fleet_url(),
            compile_url: default_compile_url(),
            storage_endpoint: None,
            device_endpoint: default_device_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Polling behaviour for deployment and compile-job monitoring.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Fixed interval between status checks, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,

    /// Upper bound on total polling time, in seconds.
    ///
    /// A deployment still in progress at the deadline surfaces as a
    /// timeout error instead of polling forever.
    #[serde(default = "default_poll_deadline_secs")]
    pub deadline_secs: u64,
}

const fn default_poll_interval_secs() -> u64 {
    30
}

const fn default_poll_deadline_secs() -> u64 {
    1800
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            deadline_secs: default_poll_deadline_secs(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CloudConfig::default();
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.bucket, "outpost-artifacts");
        assert_eq!(config.poll.interval_secs, 30);
        assert_eq!(config.poll.deadline_secs, 1800);
    }

    #[test]
    fn config_from_toml() {
        let toml = r#"
            region = "eu-west-1"
            account_id = "123456789012"
            bucket = "my-bucket"

            [endpoints]
            fleet_url = "http://localhost:8090"

            [poll]
            interval_secs = 5
        "#;

        let config: CloudConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.bucket, "my-bucket");
        assert_eq!(config.endpoints.fleet_url, "http://localhost:8090");
        assert_eq!(config.poll.interval_secs, 5);
        assert_eq!(config.poll.deadline_secs, 1800);
    }

    #[test]
    fn arn_composition() {
        let config = CloudConfig {
            region: "us-west-2".to_owned(),
            account_id: "123456789012".to_owned(),
            ..CloudConfig::default()
        };

        let arn = config.arn("greengrass", "connectors/ObjectDetection/1");
        assert_eq!(
            arn.as_str(),
            "arn:aws:greengrass:us-west-2:123456789012:connectors/ObjectDetection/1"
        );
    }
}
