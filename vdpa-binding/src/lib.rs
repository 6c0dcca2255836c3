//! # vdpa-binding
//!
//! Network binding for VMI interfaces backed by vDPA devices.
//!
//! The vDPA device behind a secondary network is allocated by a device plugin
//! and published to the pod through the downward API. This crate reads that
//! publication, resolves the VMI interface bound to the `vdpa` plugin, and
//! writes the corresponding `<interface type='vdpa'>` device into a libvirt
//! domain spec.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐     ┌─────────────────────────┐
//! │   DownwardApiReader      │     │  VMI interfaces/networks │
//! │ (/etc/podinfo/network-   │     │  + configurator options  │
//! │  info, 100ms poll, 1s)   │     └────────────┬────────────┘
//! └────────────┬─────────────┘                  │
//!              └───────────────┬────────────────┘
//!                              ▼
//!                 ┌──────────────────────────┐
//!                 │ VdpaNetworkConfigurator  │
//!                 │   mutate(&DomainSpec)    │
//!                 └──────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vdpa_binding::{
//!     DomainSpec, Interface, Network, NetworkConfiguratorOptions, VdpaNetworkConfigurator,
//! };
//!
//! let interfaces = vec![Interface::new("net1").with_binding("vdpa")];
//! let networks = vec![Network::multus("net1", "vdpa-net")];
//!
//! let configurator = VdpaNetworkConfigurator::new(
//!     &interfaces,
//!     &networks,
//!     NetworkConfiguratorOptions::default(),
//! )?;
//! let domain = configurator.mutate(&DomainSpec::default())?;
//! assert_eq!(domain.devices.interfaces.len(), 1);
//! # Ok::<(), vdpa_binding::BindingError>(())
//! ```

pub mod config;
pub mod configurator;
pub mod downward_api;
pub mod error;
pub mod pci;
pub mod types;
pub mod vmi;
mod xml;

pub use config::{ConfigError, NetworkConfiguratorOptions};
pub use configurator::{
    select_multus_network,
    MutationLogger,
    TracingLogger,
    VdpaNetworkConfigurator,
    VDPA_PLUGIN_NAME,
};
pub use downward_api::{
    DownwardApiReader,
    NetworkInfo,
    NetworkInfoInterface,
    NetworkInfoSource,
    StaticNetworkInfo,
    DOWNWARD_API_MOUNT_PATH,
    NETWORK_INFO_VOLUME_PATH,
};
pub use error::{BindingError, Result};
pub use pci::PciAddress;
pub use types::*;
pub use vmi::{Interface, Network};
