//! Integration tests for the vDPA configurator.
//!
//! These tests drive the configurator through a real network info file.

use std::path::PathBuf;

use tempfile::TempDir;
use vdpa_binding::{
    Alias, BindingError, DomainSpec, DownwardApiReader, Interface, InterfaceSource, InterfaceType,
    Network, NetworkConfiguratorOptions, NicModel, VdpaNetworkConfigurator,
    NETWORK_INFO_VOLUME_PATH,
};

const NET1_NETWORK_INFO: &str = r#"{
    "interfaces": [
        {
            "network": "net1",
            "mac": "02:00:00:00:00:01",
            "deviceInfo": {
                "type": "vdpa",
                "version": "1.1.0",
                "vdpa": {"driver": "vhost", "path": "/dev/vdpa/vdpa0"}
            }
        }
    ]
}"#;

/// A downward API mount holding `network-info` with the given content.
fn podinfo(content: &str) -> (TempDir, PathBuf) {
    let _ = vdpa_binding_common::init_logging("debug");

    let dir = tempfile::tempdir().expect("Failed to create podinfo dir");
    let path = dir.path().join(NETWORK_INFO_VOLUME_PATH);
    std::fs::write(&path, content).expect("Failed to write network info");
    (dir, path)
}

fn vdpa_vmi() -> (Vec<Interface>, Vec<Network>) {
    (
        vec![Interface::new("net1").with_binding("vdpa")],
        vec![Network::multus("net1", "vdpa-net")],
    )
}

/// Test the end-to-end scenario on an empty domain.
#[test]
fn test_vdpa_interface_added_to_empty_domain() {
    let (_dir, path) = podinfo(NET1_NETWORK_INFO);
    let (interfaces, networks) = vdpa_vmi();

    let configurator = VdpaNetworkConfigurator::with_source(
        &interfaces,
        &networks,
        NetworkConfiguratorOptions::default(),
        &DownwardApiReader::with_path(&path),
    )
    .expect("Failed to resolve vdpa interface");

    let domain = configurator.mutate(&DomainSpec::default()).unwrap();

    assert_eq!(domain.devices.interfaces.len(), 1);
    let iface = &domain.devices.interfaces[0];
    assert_eq!(iface.alias, Some(Alias::user_defined("net1")));
    assert_eq!(iface.iface_type, InterfaceType::Vdpa);
    assert_eq!(iface.source, InterfaceSource::device("/dev/vdpa/vdpa0"));
    assert_eq!(iface.mac.as_deref(), Some("02:00:00:00:00:01"));
    assert_eq!(iface.model, Some(NicModel::Virtio));
    assert!(iface.address.is_none());
    assert!(iface.acpi.is_none());
}

/// Test that the configurator can be reused across domain specs.
#[test]
fn test_configurator_is_reusable() {
    let (dir, path) = podinfo(NET1_NETWORK_INFO);
    let (interfaces, networks) = vdpa_vmi();

    let configurator = VdpaNetworkConfigurator::with_source(
        &interfaces,
        &networks,
        NetworkConfiguratorOptions::default(),
        &DownwardApiReader::with_path(&path),
    )
    .unwrap();

    // The file is only read during construction.
    drop(dir);

    let first = configurator.mutate(&DomainSpec::default()).unwrap();
    let second = configurator.mutate(&first).unwrap();
    assert_eq!(first, second);
}

/// Test that an empty network info file surfaces the timeout unchanged.
#[test]
fn test_unpublished_network_info_times_out() {
    let (_dir, path) = podinfo("");
    let (interfaces, networks) = vdpa_vmi();

    let err = VdpaNetworkConfigurator::with_source(
        &interfaces,
        &networks,
        NetworkConfiguratorOptions::default(),
        &DownwardApiReader::with_path(&path),
    )
    .unwrap_err();

    assert!(err.is_timeout());
    match err {
        BindingError::DiscoveryTimeout { path: timed_out, .. } => assert_eq!(timed_out, path),
        other => panic!("unexpected error: {other}"),
    }
}

/// Test that a missing network info file is lenient at the reader but
/// still fails resolution.
#[test]
fn test_missing_network_info_file() {
    let (dir, _path) = podinfo(NET1_NETWORK_INFO);
    let (interfaces, networks) = vdpa_vmi();

    let err = VdpaNetworkConfigurator::with_source(
        &interfaces,
        &networks,
        NetworkConfiguratorOptions::default(),
        &DownwardApiReader::with_path(dir.path().join("missing")),
    )
    .unwrap_err();

    assert!(matches!(err, BindingError::NotInNetworkInfo(ref name) if name == "net1"));
}

/// Test that malformed network info is reported as a parse error.
#[test]
fn test_malformed_network_info() {
    let (_dir, path) = podinfo("interfaces: []");
    let (interfaces, networks) = vdpa_vmi();

    let err = VdpaNetworkConfigurator::with_source(
        &interfaces,
        &networks,
        NetworkConfiguratorOptions::default(),
        &DownwardApiReader::with_path(&path),
    )
    .unwrap_err();

    assert!(matches!(err, BindingError::NetworkInfoParse(_)));
}

/// Test the mutated domain renders as libvirt XML.
#[test]
fn test_mutated_interface_renders_xml() {
    let (_dir, path) = podinfo(NET1_NETWORK_INFO);
    let interfaces = vec![Interface::new("net1")
        .with_binding("vdpa")
        .with_pci_address("0000:81:00.1")
        .with_acpi_index(3)];
    let networks = vec![Network::pod("default"), Network::multus("net1", "vdpa-net")];

    let configurator = VdpaNetworkConfigurator::with_source(
        &interfaces,
        &networks,
        NetworkConfiguratorOptions::default(),
        &DownwardApiReader::with_path(&path),
    )
    .unwrap();
    let domain = configurator.mutate(&DomainSpec::default()).unwrap();

    let xml = domain.devices.interfaces[0].to_xml().unwrap();
    assert!(xml.contains(r#"<interface type="vdpa">"#));
    assert!(xml.contains(r#"<source dev="/dev/vdpa/vdpa0"/>"#));
    assert!(xml.contains(r#"bus="0x81""#));
    assert!(xml.contains(r#"<acpi index="3"/>"#));
    assert!(xml.contains(r#"<alias name="ua-net1"/>"#));
}
