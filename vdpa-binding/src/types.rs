//! Type definitions for the libvirt domain specification.
//!
//! Only the parts of the domain a network binding touches are modelled: the
//! interface devices. Everything else in the domain belongs to the
//! surrounding domain-assembly pipeline.

use serde::{Deserialize, Serialize};

use crate::pci::PciAddress;

// =============================================================================
// DOMAIN SPEC
// =============================================================================

/// A libvirt domain specification.
///
/// Cloning is a deep copy; mutators work on clones so callers holding the
/// original are never affected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainSpec {
    /// Domain name
    pub name: String,
    /// Device collection
    pub devices: Devices,
}

/// Domain devices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Devices {
    /// Network interfaces, in guest order
    pub interfaces: Vec<DomainInterface>,
}

impl Devices {
    /// Find the first interface whose alias resolves to `name`.
    ///
    /// The `ua-` prefix is ignored, so `net1` and `ua-net1` both match `net1`.
    pub fn interface_by_alias_mut(&mut self, name: &str) -> Option<&mut DomainInterface> {
        self.interfaces
            .iter_mut()
            .find(|iface| iface.alias.as_ref().is_some_and(|alias| alias.name() == name))
    }
}

// =============================================================================
// INTERFACE DEVICE
// =============================================================================

/// A domain `<interface>` device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInterface {
    /// Interface type (`<interface type=...>`)
    #[serde(rename = "type")]
    pub iface_type: InterfaceType,
    /// Backend source
    #[serde(default)]
    pub source: InterfaceSource,
    /// Guest NIC model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<NicModel>,
    /// Guest MAC address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    /// Guest PCI address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<PciAddress>,
    /// ACPI index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acpi: Option<Acpi>,
    /// Device alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Alias>,
}

impl DomainInterface {
    /// Create an interface of the given type with an empty source.
    pub fn new(iface_type: InterfaceType) -> Self {
        Self {
            iface_type,
            source: InterfaceSource::default(),
            model: None,
            mac: None,
            address: None,
            acpi: None,
            alias: None,
        }
    }

    /// Set the alias.
    pub fn with_alias(mut self, alias: Alias) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Set the MAC address.
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    /// Set the NIC model.
    pub fn with_model(mut self, model: NicModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the source.
    pub fn with_source(mut self, source: InterfaceSource) -> Self {
        self.source = source;
        self
    }
}

/// Interface type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    Bridge,
    Network,
    Ethernet,
    Vdpa,
}

impl InterfaceType {
    /// Get the libvirt type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceType::Bridge => "bridge",
            InterfaceType::Network => "network",
            InterfaceType::Ethernet => "ethernet",
            InterfaceType::Vdpa => "vdpa",
        }
    }
}

/// Interface backend source. Which field is used depends on the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceSource {
    /// Host device path (vdpa)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Host bridge (bridge)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge: Option<String>,
    /// Libvirt network (network)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

impl InterfaceSource {
    /// Source backed by a host character device.
    pub fn device(path: impl Into<String>) -> Self {
        Self {
            device: Some(path.into()),
            ..Default::default()
        }
    }

    /// Source attached to a host bridge.
    pub fn bridge(name: impl Into<String>) -> Self {
        Self {
            bridge: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Network interface model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NicModel {
    Virtio,
    E1000,
    E1000e,
    Rtl8139,
}

impl NicModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NicModel::Virtio => "virtio",
            NicModel::E1000 => "e1000",
            NicModel::E1000e => "e1000e",
            NicModel::Rtl8139 => "rtl8139",
        }
    }
}

/// ACPI block of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acpi {
    pub index: u32,
}

// =============================================================================
// ALIAS
// =============================================================================

/// Prefix libvirt requires for aliases chosen by the user rather than itself.
pub const USER_ALIAS_PREFIX: &str = "ua-";

/// A device alias.
///
/// User-defined aliases are stored with the `ua-` prefix. [`Alias::name`]
/// strips it again, so an alias built from a logical name always resolves
/// back to that same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawAlias", into = "RawAlias")]
pub struct Alias {
    name: String,
    user_defined: bool,
}

#[derive(Serialize, Deserialize)]
struct RawAlias {
    name: String,
}

impl From<RawAlias> for Alias {
    fn from(raw: RawAlias) -> Self {
        match raw.name.strip_prefix(USER_ALIAS_PREFIX) {
            Some(name) => Alias::user_defined(name),
            None => Alias {
                name: raw.name,
                user_defined: false,
            },
        }
    }
}

impl From<Alias> for RawAlias {
    fn from(alias: Alias) -> Self {
        RawAlias { name: alias.full_name() }
    }
}

impl Alias {
    /// Alias derived from a VMI interface or network name.
    pub fn user_defined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_defined: true,
        }
    }

    /// Logical name, without the user-defined prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical name, only if the alias is user defined.
    pub fn user_defined_name(&self) -> Option<&str> {
        self.user_defined.then_some(self.name.as_str())
    }

    pub fn is_user_defined(&self) -> bool {
        self.user_defined
    }

    /// Name as written into the domain (`ua-net1`).
    pub fn full_name(&self) -> String {
        if self.user_defined {
            format!("{}{}", USER_ALIAS_PREFIX, self.name)
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_alias_round_trip() {
        let alias = Alias::user_defined("net1");
        assert_eq!(alias.full_name(), "ua-net1");
        assert_eq!(alias.name(), "net1");

        let json = serde_json::to_string(&alias).unwrap();
        assert_eq!(json, r#"{"name":"ua-net1"}"#);

        let parsed: Alias = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, alias);
        assert_eq!(parsed.user_defined_name(), Some("net1"));
    }

    #[test]
    fn test_system_alias_is_not_user_defined() {
        let parsed: Alias = serde_json::from_str(r#"{"name":"net0"}"#).unwrap();
        assert!(!parsed.is_user_defined());
        assert_eq!(parsed.user_defined_name(), None);
        assert_eq!(parsed.full_name(), "net0");
    }

    #[test]
    fn test_lookup_ignores_user_alias_prefix() {
        let mut devices = Devices {
            interfaces: vec![
                DomainInterface::new(InterfaceType::Bridge),
                DomainInterface::new(InterfaceType::Ethernet)
                    .with_alias(serde_json::from_str(r#"{"name":"net1"}"#).unwrap()),
                DomainInterface::new(InterfaceType::Vdpa).with_alias(Alias::user_defined("net2")),
            ],
        };

        // System alias
        let found = devices.interface_by_alias_mut("net1").unwrap();
        assert_eq!(found.iface_type, InterfaceType::Ethernet);

        // User-defined alias
        let found = devices.interface_by_alias_mut("net2").unwrap();
        assert_eq!(found.iface_type, InterfaceType::Vdpa);

        assert!(devices.interface_by_alias_mut("ua-net2").is_none());
        assert!(devices.interface_by_alias_mut("net3").is_none());
    }

    #[test]
    fn test_domain_spec_json() {
        let json = r#"{
            "name": "vmi-vdpa",
            "devices": {
                "interfaces": [
                    {
                        "type": "bridge",
                        "source": {"bridge": "k6t-eth0"},
                        "model": "virtio",
                        "mac": "52:54:00:12:34:56",
                        "alias": {"name": "ua-default"}
                    }
                ]
            }
        }"#;

        let spec: DomainSpec = serde_json::from_str(json).unwrap();
        let iface = &spec.devices.interfaces[0];
        assert_eq!(iface.iface_type, InterfaceType::Bridge);
        assert_eq!(iface.source, InterfaceSource::bridge("k6t-eth0"));
        assert_eq!(iface.model, Some(NicModel::Virtio));
        assert_eq!(iface.alias.as_ref().unwrap().name(), "default");
        assert!(iface.acpi.is_none());

        let reparsed: DomainSpec =
            serde_json::from_str(&serde_json::to_string(&spec).unwrap()).unwrap();
        assert_eq!(reparsed, spec);
    }
}
