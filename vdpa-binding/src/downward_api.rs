//! Network info published through the downward API.
//!
//! The device plugin allocates vDPA devices after the VMI spec is written,
//! so the device path and MAC of each secondary network only become known
//! at runtime. They are rendered into the pod as a JSON file, which may still
//! be empty when the binding first looks at it.
//!
//! ## Read policy
//!
//! The file is polled every [`POLL_INTERVAL`] until it is non-empty or
//! [`POLL_TIMEOUT`] elapses:
//!
//! - non-empty content is parsed; malformed JSON is an error
//! - content still empty at the deadline is [`BindingError::DiscoveryTimeout`]
//! - any other read error ends polling and yields `Ok(None)`
//!
//! The last case is lenient on purpose: the platform treats such faults as
//! recoverable by a retry of the whole domain definition, whereas an empty
//! file at the deadline means the info was never published.

use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{BindingError, Result};

/// Directory the downward API volume is mounted at.
pub const DOWNWARD_API_MOUNT_PATH: &str = "/etc/podinfo";

/// File inside the mount that carries the network info.
pub const NETWORK_INFO_VOLUME_PATH: &str = "network-info";

/// Delay between two reads of an empty file.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Overall deadline for the file to become non-empty.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(1);

// =============================================================================
// DOCUMENT
// =============================================================================

/// Network devices allocated to the pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkInfo {
    pub interfaces: Vec<NetworkInfoInterface>,
}

impl NetworkInfo {
    /// Entry for the given logical network name.
    pub fn lookup(&self, network: &str) -> Option<&NetworkInfoInterface> {
        self.interfaces.iter().find(|iface| iface.network == network)
    }
}

/// One allocated network device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkInfoInterface {
    /// Logical network name from the VMI spec
    pub network: String,
    /// Device details reported by the CNI/device plugin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    /// MAC address assigned to the device
    #[serde(rename = "mac", skip_serializing_if = "String::is_empty")]
    pub mac_address: String,
}

impl NetworkInfoInterface {
    /// vDPA character device path, if the entry describes a vDPA device.
    pub fn vdpa_path(&self) -> Option<&str> {
        self.device_info
            .as_ref()
            .and_then(|info| info.vdpa.as_ref())
            .map(|vdpa| vdpa.path.as_str())
    }
}

/// Device info block (network-attachment-definition device-info format).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub device_type: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pci: Option<PciDeviceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vdpa: Option<VdpaDeviceInfo>,
}

/// PCI device details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PciDeviceInfo {
    pub pci_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vhost_net: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rdma_device: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pf_pci_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub representor_device: String,
}

/// vDPA device details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct VdpaDeviceInfo {
    pub parent_device: String,
    pub driver: String,
    /// Host character device, e.g. `/dev/vhost-vdpa-0`
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pci_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pf_pci_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub representor_device: String,
}

// =============================================================================
// SOURCES
// =============================================================================

/// Where the configurator obtains network info from.
pub trait NetworkInfoSource {
    /// Read the current network info.
    ///
    /// `Ok(None)` means no info is available (yet) and is not an error.
    fn read(&self) -> Result<Option<NetworkInfo>>;
}

/// Reads network info from the downward API mount.
#[derive(Debug, Clone)]
pub struct DownwardApiReader {
    path: PathBuf,
}

impl Default for DownwardApiReader {
    fn default() -> Self {
        Self::with_path(Path::new(DOWNWARD_API_MOUNT_PATH).join(NETWORK_INFO_VOLUME_PATH))
    }
}

enum PollError {
    Timeout,
    Io(io::Error),
}

impl DownwardApiReader {
    /// Reader for the standard mount path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader for a network info file at another location.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file until it has content, the deadline passes, or a read fails.
    fn read_until_not_empty(&self) -> std::result::Result<Vec<u8>, PollError> {
        let deadline = Instant::now() + POLL_TIMEOUT;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let content = std::fs::read(&self.path).map_err(PollError::Io)?;
            if !content.is_empty() {
                debug!(attempts, bytes = content.len(), "Network info available");
                return Ok(content);
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(attempts, "Network info still empty at deadline");
                return Err(PollError::Timeout);
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

impl NetworkInfoSource for DownwardApiReader {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn read(&self) -> Result<Option<NetworkInfo>> {
        let content = match self.read_until_not_empty() {
            Ok(content) => content,
            Err(PollError::Timeout) => {
                return Err(BindingError::DiscoveryTimeout {
                    path: self.path.clone(),
                    timeout: POLL_TIMEOUT,
                });
            }
            Err(PollError::Io(e)) => {
                warn!(error = %e, "Failed to read network info, treating it as absent");
                return Ok(None);
            }
        };

        let info: NetworkInfo = serde_json::from_slice(&content)?;
        debug!(interfaces = info.interfaces.len(), "Parsed network info");
        Ok(Some(info))
    }
}

/// Network info that is already known, e.g. obtained by the caller.
#[derive(Debug, Clone, Default)]
pub struct StaticNetworkInfo(pub Option<NetworkInfo>);

impl NetworkInfoSource for StaticNetworkInfo {
    fn read(&self) -> Result<Option<NetworkInfo>> {
        Ok(self.0.clone())
    }
}
