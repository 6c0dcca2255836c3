//! PCI address parsing.
//!
//! VMI interfaces may pin their guest PCI slot with a `DDDD:BB:SS.F` string
//! (domain, bus, slot in hex, function 0-7). Libvirt wants the parts as
//! separate `0x`-prefixed attributes of a `type='pci'` address element.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BindingError;

/// A guest PCI address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PciAddress {
    pub domain: u16,
    pub bus: u8,
    pub slot: u8,
    pub function: u8,
}

impl PciAddress {
    /// Libvirt `<address>` attributes, in document order.
    pub fn libvirt_attributes(&self) -> [(&'static str, String); 5] {
        [
            ("type", "pci".to_string()),
            ("domain", format!("{:#06x}", self.domain)),
            ("bus", format!("{:#04x}", self.bus)),
            ("slot", format!("{:#04x}", self.slot)),
            ("function", format!("{:#x}", self.function)),
        ]
    }
}

fn hex_field(field: &str, width: usize) -> Option<u16> {
    if field.len() != width || !field.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(field, 16).ok()
}

impl FromStr for PciAddress {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BindingError::InvalidPciAddress(s.to_string());

        let mut parts = s.split(':');
        let (domain, bus, slot_function) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(d), Some(b), Some(sf), None) => (d, b, sf),
            _ => return Err(invalid()),
        };
        let (slot, function) = slot_function.split_once('.').ok_or_else(invalid)?;

        let domain = hex_field(domain, 4).ok_or_else(invalid)?;
        let bus = hex_field(bus, 2).ok_or_else(invalid)? as u8;
        let slot = hex_field(slot, 2).ok_or_else(invalid)? as u8;
        let function = match function.as_bytes() {
            [digit @ b'0'..=b'7'] => digit - b'0',
            _ => return Err(invalid()),
        };

        Ok(Self { domain, bus, slot, function })
    }
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:02x}:{:02x}.{:x}", self.domain, self.bus, self.slot, self.function)
    }
}
