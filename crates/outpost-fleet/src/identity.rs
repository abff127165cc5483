//! Persistence of the core identity to local files.
//!
//! Writes the certificate, key pair, and device bootstrap configuration
//! the edge daemon reads at startup. The private key is written with
//! owner-only permissions and never overwritten: a lost key has no
//! regeneration path in this workflow.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use outpost_core::{Arn, CloudConfig};

use crate::error::{FleetError, FleetResult};
use crate::types::CertificateBundle;

/// Paths of the persisted identity files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityPaths {
    /// Certificate PEM file.
    pub certificate: PathBuf,
    /// Public key file.
    pub public_key: PathBuf,
    /// Private key file (mode 0600).
    pub private_key: PathBuf,
    /// Device bootstrap configuration JSON.
    pub bootstrap_config: PathBuf,
}

/// Bootstrap configuration consumed by the edge daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapConfig {
    /// The core thing's ARN.
    pub thing_arn: Arn,
    /// Path to the certificate PEM, relative to the daemon's config dir.
    pub cert_path: String,
    /// Path to the private key.
    pub key_path: String,
    /// Device-facing MQTT endpoint.
    pub iot_host: String,
    /// Cloud region.
    pub region: String,
    /// MQTT keep-alive interval in seconds.
    pub keep_alive: u32,
}

const DEFAULT_KEEP_ALIVE_SECS: u32 = 600;

/// Persist a certificate bundle and bootstrap config under `dir`.
///
/// Files are named `<prefix>.cert.pem`, `<prefix>.public.key`,
/// `<prefix>.private.key`, and `config.json`.
pub async fn persist_identity(
    dir: &Path,
    prefix: &str,
    bundle: &CertificateBundle,
    thing_arn: &Arn,
    config: &CloudConfig,
) -> FleetResult<IdentityPaths> {
    tokio::fs::create_dir_all(dir).await?;

    let paths = IdentityPaths {
        certificate: dir.join(format!("{prefix}.cert.pem")),
        public_key: dir.join(format!("{prefix}.public.key")),
        private_key: dir.join(format!("{prefix}.private.key")),
        bootstrap_config: dir.join("config.json"),
    };

    if paths.private_key.exists() {
        return Err(FleetError::PrivateKeyExists(paths.private_key));
    }

    tokio::fs::write(&paths.certificate, &bundle.certificate_pem).await?;
    tokio::fs::write(&paths.public_key, &bundle.key_pair.public_key).await?;
    tokio::fs::write(&paths.private_key, &bundle.key_pair.private_key).await?;
    restrict_permissions(&paths.private_key).await?;

    let bootstrap = BootstrapConfig {
        thing_arn: thing_arn.clone(),
        cert_path: format!("{prefix}.cert.pem"),
        key_path: format!("{prefix}.private.key"),
        iot_host: config.endpoints.device_endpoint.clone(),
        region: config.region.clone(),
        keep_alive: DEFAULT_KEEP_ALIVE_SECS,
    };
    let body = serde_json::to_vec_pretty(&bootstrap)?;
    tokio::fs::write(&paths.bootstrap_config, body).await?;

    info!(
        dir = %dir.display(),
        certificate_id = %bundle.certificate_id,
        "identity persisted"
    );

    Ok(paths)
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> FleetResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let perms = std::fs::Permissions::from_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> FleetResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeyPair;
    use tempfile::TempDir;

    fn bundle() -> CertificateBundle {
        CertificateBundle {
            certificate_id: "cert-0001".to_owned(),
            certificate_arn: Arn::new("arn:aws:iot:mock:cert/cert-0001"),
            certificate_pem: "CERT".to_owned(),
            key_pair: KeyPair {
                public_key: "PUBLIC".to_owned(),
                private_key: "PRIVATE".to_owned(),
            },
        }
    }

    #[tokio::test]
    async fn writes_identity_files_and_bootstrap_config() {
        let dir = TempDir::new().unwrap();
        let config = CloudConfig::default();
        let thing_arn = Arn::new("arn:aws:iot:mock:thing/camera-core");

        let paths = persist_identity(dir.path(), "camera-core", &bundle(), &thing_arn, &config)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&paths.certificate).unwrap(),
            "CERT"
        );
        assert_eq!(
            std::fs::read_to_string(&paths.private_key).unwrap(),
            "PRIVATE"
        );

        let bootstrap: BootstrapConfig =
            serde_json::from_slice(&std::fs::read(&paths.bootstrap_config).unwrap()).unwrap();
        assert_eq!(bootstrap.thing_arn, thing_arn);
        assert_eq!(bootstrap.cert_path, "camera-core.cert.pem");
        assert_eq!(bootstrap.keep_alive, 600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let config = CloudConfig::default();
        let thing_arn = Arn::new("arn:aws:iot:mock:thing/camera-core");

        let paths = persist_identity(dir.path(), "camera-core", &bundle(), &thing_arn, &config)
            .await
            .unwrap();

        let mode = std::fs::metadata(&paths.private_key)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn refuses_to_overwrite_existing_private_key() {
        let dir = TempDir::new().unwrap();
        let config = CloudConfig::default();
        let thing_arn = Arn::new("arn:aws:iot:mock:thing/camera-core");

        persist_identity(dir.path(), "camera-core", &bundle(), &thing_arn, &config)
            .await
            .unwrap();

        let err = persist_identity(dir.path(), "camera-core", &bundle(), &thing_arn, &config)
            .await
            .unwrap_err();

        assert!(matches!(err, FleetError::PrivateKeyExists(_)));
        // Original key untouched.
        assert_eq!(
            std::fs::read_to_string(dir.path().join("camera-core.private.key")).unwrap(),
            "PRIVATE"
        );
    }
}
