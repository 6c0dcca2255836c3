//! vDPA network configurator.
//!
//! Resolves the VMI interface bound to the vDPA plugin against the network
//! info published through the downward API, and writes the matching
//! `<interface type='vdpa'>` device into a domain spec.
//!
//! ```text
//!  VMI interfaces/networks ──┐
//!                            ├──► VdpaNetworkConfigurator ──► mutate(domain) ──► domain'
//!  NetworkInfoSource ────────┘        (resolved once)          (replace by alias or append)
//! ```

use tracing::{debug, info, instrument, warn};

use crate::config::NetworkConfiguratorOptions;
use crate::downward_api::{DownwardApiReader, NetworkInfoSource};
use crate::error::{BindingError, Result};
use crate::pci::PciAddress;
use crate::types::*;
use crate::vmi::{lookup_interface_by_name, Interface, Network};

/// Name the vDPA binding plugin is registered under in the KubeVirt CR.
pub const VDPA_PLUGIN_NAME: &str = "vdpa";

/// Select the network carrying the delegated binding.
///
/// The first multus network in declaration order wins. Later multus
/// networks are not considered, even if the first one turns out not to be
/// bound to the vDPA plugin.
pub fn select_multus_network(networks: &[Network]) -> Option<&Network> {
    networks.iter().find(|net| net.is_multus())
}

/// Receives the device a mutation wrote into the domain spec.
///
/// Purely observational; it cannot fail the mutation.
pub trait MutationLogger {
    /// Called once per successful mutation.
    fn interface_applied(&self, iface: &DomainInterface, replaced: bool);
}

/// Logs applied interfaces through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl MutationLogger for TracingLogger {
    fn interface_applied(&self, iface: &DomainInterface, replaced: bool) {
        let alias = iface.alias.as_ref().map(Alias::full_name).unwrap_or_default();
        match iface.to_xml() {
            Ok(xml) => info!(
                alias = %alias,
                replaced,
                interface = %xml,
                "vdpa interface is added to domain spec successfully"
            ),
            Err(e) => info!(
                alias = %alias,
                replaced,
                interface = ?iface,
                render_error = %e,
                "vdpa interface is added to domain spec successfully"
            ),
        }
    }
}

/// A VMI interface resolved to its vDPA device.
#[derive(Debug, Clone)]
pub struct VdpaNetworkConfigurator {
    vmi_iface: Interface,
    options: NetworkConfiguratorOptions,
    vdpa_path: String,
    mac_address: String,
}

impl VdpaNetworkConfigurator {
    /// Resolve the vDPA interface using the standard downward API mount.
    pub fn new(
        interfaces: &[Interface],
        networks: &[Network],
        options: NetworkConfiguratorOptions,
    ) -> Result<Self> {
        Self::with_source(interfaces, networks, options, &DownwardApiReader::default())
    }

    /// Resolve the vDPA interface using the given network info source.
    ///
    /// The source is read exactly once, after the VMI declarations passed
    /// validation.
    #[instrument(skip_all)]
    pub fn with_source<S: NetworkInfoSource + ?Sized>(
        interfaces: &[Interface],
        networks: &[Network],
        options: NetworkConfiguratorOptions,
        source: &S,
    ) -> Result<Self> {
        let network = select_multus_network(networks).ok_or(BindingError::MultusNetworkNotFound)?;

        let iface = lookup_interface_by_name(interfaces, &network.name)
            .ok_or(BindingError::InterfaceNotFound)?;

        if iface.binding_name() != Some(VDPA_PLUGIN_NAME) {
            return Err(BindingError::BindingMismatch(network.name.clone()));
        }

        debug!(network = %network.name, "Resolving vdpa interface from network info");

        // Absent info cannot contain the interface.
        let network_info = source.read()?.unwrap_or_default();

        let entry = network_info
            .lookup(&iface.name)
            .ok_or_else(|| BindingError::NotInNetworkInfo(iface.name.clone()))?;

        let vdpa_path = entry
            .vdpa_path()
            .ok_or_else(|| BindingError::MissingVdpaDevice(iface.name.clone()))?;

        if entry.mac_address.is_empty() && iface.mac_address.is_none() {
            warn!(network = %iface.name, "No MAC address published or declared for vdpa interface");
        }

        Ok(Self {
            vmi_iface: iface.clone(),
            options,
            vdpa_path: vdpa_path.to_string(),
            mac_address: entry.mac_address.clone(),
        })
    }

    /// The resolved VMI interface.
    pub fn interface(&self) -> &Interface {
        &self.vmi_iface
    }

    pub fn options(&self) -> &NetworkConfiguratorOptions {
        &self.options
    }

    /// Host vDPA device backing the interface.
    pub fn vdpa_path(&self) -> &str {
        &self.vdpa_path
    }

    /// MAC address published in the network info (may be empty).
    pub fn discovered_mac(&self) -> &str {
        &self.mac_address
    }

    /// Build the domain interface for the resolved device.
    pub fn generate_interface(&self) -> Result<DomainInterface> {
        let address = self
            .vmi_iface
            .pci_address
            .as_deref()
            .filter(|addr| !addr.is_empty())
            .map(str::parse::<PciAddress>)
            .transpose()?;

        // A declared MAC always beats the one handed out with the device.
        let mac = self
            .vmi_iface
            .mac_address
            .as_deref()
            .filter(|mac| !mac.is_empty())
            .or_else(|| Some(self.mac_address.as_str()).filter(|mac| !mac.is_empty()))
            .map(str::to_string);

        let acpi = (self.vmi_iface.acpi_index > 0).then(|| Acpi {
            index: self.vmi_iface.acpi_index,
        });

        Ok(DomainInterface {
            iface_type: InterfaceType::Vdpa,
            source: InterfaceSource::device(self.vdpa_path.clone()),
            model: Some(NicModel::Virtio),
            mac,
            address,
            acpi,
            alias: Some(Alias::user_defined(self.vmi_iface.name.clone())),
        })
    }

    /// Apply the interface to a copy of `domain_spec`, logging via `tracing`.
    pub fn mutate(&self, domain_spec: &DomainSpec) -> Result<DomainSpec> {
        self.mutate_with_logger(domain_spec, &TracingLogger)
    }

    /// Apply the interface to a copy of `domain_spec`.
    ///
    /// An interface already carrying this interface's alias is replaced in
    /// place; otherwise the interface is appended. The input is never
    /// modified, and nothing is applied if the interface cannot be built.
    pub fn mutate_with_logger(
        &self,
        domain_spec: &DomainSpec,
        logger: &dyn MutationLogger,
    ) -> Result<DomainSpec> {
        let generated = self
            .generate_interface()
            .map_err(|e| BindingError::GenerateInterface(Box::new(e)))?;

        let mut spec = domain_spec.clone();
        let replaced = match spec.devices.interface_by_alias_mut(&self.vmi_iface.name) {
            Some(existing) => {
                *existing = generated.clone();
                true
            }
            None => {
                spec.devices.interfaces.push(generated.clone());
                false
            }
        };

        logger.interface_applied(&generated, replaced);

        Ok(spec)
    }
}
