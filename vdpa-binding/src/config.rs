//! Options for the network configurator.
//!
//! The option set is accepted from the hook caller or from a YAML file:
//!
//! ```yaml
//! istioProxyInjectionEnabled: false
//! useVirtioTransitional: true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Options in effect for a configurator.
///
/// Neither flag changes the generated vDPA interface today; the model is
/// always `virtio`. They are carried so callers can pass the same option set
/// to every network configurator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfiguratorOptions {
    /// Istio sidecar injection is enabled for the pod
    pub istio_proxy_injection_enabled: bool,
    /// Prefer the virtio-transitional device model
    pub use_virtio_transitional: bool,
}

impl NetworkConfiguratorOptions {
    /// Load options from a YAML file. A missing file yields the defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "Options file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let options = serde_yaml::from_str(&contents)?;
        info!(path = %path.display(), "Loaded configurator options");
        Ok(options)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse options: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
