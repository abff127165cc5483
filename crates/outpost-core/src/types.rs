//! Core identifier types for outpost.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An Amazon-style resource name assigned by an external service.
///
/// ARNs are opaque to outpost: they are returned by create calls and
/// round-tripped verbatim into later requests. Outpost never parses or
/// constructs the account/region segments beyond [`crate::CloudConfig::arn`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arn(String);

impl Arn {
    /// Create an ARN from an externally assigned value.
    #[must_use]
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    /// Get the ARN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Arn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Arn {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Arn {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Unique identifier for a device group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Create a group ID from an externally assigned value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentId(String);

impl DeploymentId {
    /// Create a deployment ID from an externally assigned value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique deployment ID using ULID.
    ///
    /// Used by test doubles; the real service assigns its own IDs.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string().to_lowercase())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DeploymentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name of the device "thing" representing the core identity of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThingName(String);

impl ThingName {
    /// Create a thing name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ThingName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Device family a compiled model targets.
///
/// The compile request also carries a separate build-image target
/// ([`TargetDevice`] again, under a different field) because the machine
/// the compiler runs on is not the machine the model runs on. The two
/// must never be conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetDevice {
    /// NVIDIA Jetson TX1.
    JetsonTx1,
    /// NVIDIA Jetson TX2.
    JetsonTx2,
    /// NVIDIA Jetson Nano.
    JetsonNano,
    /// Raspberry Pi 3 (ARMv7).
    RaspberryPi3,
    /// Generic x86_64 Linux host, used for compiler build images.
    MlC5,
}

impl TargetDevice {
    /// Service-side identifier for this device family.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JetsonTx1 => "jetson_tx1",
            Self::JetsonTx2 => "jetson_tx2",
            Self::JetsonNano => "jetson_nano",
            Self::RaspberryPi3 => "rasp3b",
            Self::MlC5 => "ml_c5",
        }
    }
}

impl fmt::Display for TargetDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TargetDevice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jetson_tx1" => Ok(Self::JetsonTx1),
            "jetson_tx2" => Ok(Self::JetsonTx2),
            "jetson_nano" => Ok(Self::JetsonNano),
            "rasp3b" => Ok(Self::RaspberryPi3),
            "ml_c5" => Ok(Self::MlC5),
            _ => Err(format!("unknown target device: {s}")),
        }
    }
}

/// Hardware acceleration mode for on-device inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accelerator {
    /// CPU-only inference.
    #[default]
    Cpu,
    /// GPU-accelerated inference.
    Gpu,
}

impl Accelerator {
    /// Connector parameter value for this accelerator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
        }
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arn_round_trips_verbatim() {
        let raw = "arn:aws:iot:us-west-2:123456789012:thing/camera-core";
        let arn = Arn::new(raw);
        assert_eq!(arn.as_str(), raw);
        assert_eq!(arn.to_string(), raw);
    }

    #[test]
    fn deployment_id_generation_is_unique() {
        let a = DeploymentId::generate();
        let b = DeploymentId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn target_device_service_names() {
        assert_eq!(TargetDevice::JetsonTx2.as_str(), "jetson_tx2");
        assert_eq!(TargetDevice::MlC5.as_str(), "ml_c5");
    }

    #[test]
    fn accelerator_connector_values() {
        assert_eq!(Accelerator::Gpu.as_str(), "GPU");
        assert_eq!(Accelerator::default(), Accelerator::Cpu);
    }
}
