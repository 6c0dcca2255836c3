//! VirtualMachineInstance network declarations.
//!
//! These mirror the `spec.domain.devices.interfaces` and `spec.networks`
//! lists of a VMI, as far as a network binding plugin needs them. They are
//! read-only input.

use serde::{Deserialize, Serialize};

/// A VMI interface declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Interface {
    /// Logical name, shared with the backing network
    pub name: String,
    /// Static guest MAC address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// Guest PCI address (`DDDD:BB:SS.F`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pci_address: Option<String>,
    /// ACPI index (0 = unset)
    #[serde(skip_serializing_if = "is_zero")]
    pub acpi_index: u32,
    /// Network binding plugin selector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<PluginBinding>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Interface {
    /// Create an interface declaration with no optional fields set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Bind the interface to the named plugin.
    pub fn with_binding(mut self, plugin: impl Into<String>) -> Self {
        self.binding = Some(PluginBinding { name: plugin.into() });
        self
    }

    /// Set a static MAC address.
    pub fn with_mac_address(mut self, mac: impl Into<String>) -> Self {
        self.mac_address = Some(mac.into());
        self
    }

    /// Pin the guest PCI address.
    pub fn with_pci_address(mut self, address: impl Into<String>) -> Self {
        self.pci_address = Some(address.into());
        self
    }

    /// Set the ACPI index.
    pub fn with_acpi_index(mut self, index: u32) -> Self {
        self.acpi_index = index;
        self
    }

    /// Name of the binding plugin, if any.
    pub fn binding_name(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.name.as_str())
    }
}

/// Selects the network binding plugin handling an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginBinding {
    pub name: String,
}

/// A VMI network declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    /// Logical name, shared with the interface
    pub name: String,
    /// Pod network source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod: Option<PodNetwork>,
    /// Secondary network attached through multus
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multus: Option<MultusNetwork>,
}

impl Network {
    /// Network backed by the pod network.
    pub fn pod(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pod: Some(PodNetwork::default()),
            multus: None,
        }
    }

    /// Network attached through the given NetworkAttachmentDefinition.
    pub fn multus(name: impl Into<String>, network_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pod: None,
            multus: Some(MultusNetwork {
                network_name: network_name.into(),
                default: false,
            }),
        }
    }

    pub fn is_multus(&self) -> bool {
        self.multus.is_some()
    }
}

/// Pod network source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PodNetwork {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_network_cidr: Option<String>,
}

/// Multus network source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MultusNetwork {
    /// NetworkAttachmentDefinition reference (`[namespace/]name`)
    pub network_name: String,
    /// Whether this replaces the pod network
    pub default: bool,
}

/// Look up an interface by its logical name.
pub fn lookup_interface_by_name<'a>(interfaces: &'a [Interface], name: &str) -> Option<&'a Interface> {
    interfaces.iter().find(|iface| iface.name == name)
}
