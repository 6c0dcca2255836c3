//! Error types for the vDPA network binding.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while resolving or applying a vDPA binding.
#[derive(Error, Debug)]
pub enum BindingError {
    /// None of the VMI networks is attached through multus.
    #[error("multus network not found")]
    MultusNetworkNotFound,

    /// No VMI interface is named after the selected multus network.
    #[error("no interface found")]
    InterfaceNotFound,

    /// The resolved interface is bound to another plugin, or to none.
    #[error("interface {0:?} is not set with Vdpa network binding plugin")]
    BindingMismatch(String),

    /// The downward API did not publish an entry for the network.
    #[error("interface {0} not found in NetworkInfo")]
    NotInNetworkInfo(String),

    /// The network info entry carries no vDPA device block.
    #[error("interface {0} has no vdpa device info in NetworkInfo")]
    MissingVdpaDevice(String),

    /// The network info file stayed empty until the poll deadline.
    #[error("timed out after {timeout:?} waiting for {} to be populated", .path.display())]
    DiscoveryTimeout {
        path: PathBuf,
        timeout: Duration,
    },

    /// The network info file is not valid JSON.
    #[error("failed to parse network info: {0}")]
    NetworkInfoParse(#[from] serde_json::Error),

    /// A PCI address string did not match `DDDD:BB:SS.F`.
    #[error("invalid PCI address {0:?}")]
    InvalidPciAddress(String),

    /// Building the domain interface failed; the domain spec is untouched.
    #[error("failed to generate domain interface spec: {0}")]
    GenerateInterface(#[source] Box<BindingError>),

    /// XML generation error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl BindingError {
    /// Whether this is the "platform never published device info" condition.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BindingError::DiscoveryTimeout { .. })
    }
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindingError>;
