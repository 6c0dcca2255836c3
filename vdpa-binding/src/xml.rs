//! XML generation for libvirt interface devices.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::{BindingError, Result};
use crate::types::*;

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| BindingError::Xml(e.to_string()))
}

fn write_empty<'a, I>(writer: &mut Writer<Vec<u8>>, name: &str, attributes: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    write_event(writer, Event::Empty(BytesStart::new(name).with_attributes(attributes)))
}

impl DomainInterface {
    /// Render the `<interface>` element as libvirt domain XML.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        write_event(
            &mut writer,
            Event::Start(BytesStart::new("interface").with_attributes([("type", self.iface_type.as_str())])),
        )?;

        if let Some(mac) = &self.mac {
            write_empty(&mut writer, "mac", [("address", mac.as_str())])?;
        }

        let source = [
            ("dev", self.source.device.as_deref()),
            ("bridge", self.source.bridge.as_deref()),
            ("network", self.source.network.as_deref()),
        ];
        let source: Vec<(&str, &str)> = source
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();
        if !source.is_empty() {
            write_empty(&mut writer, "source", source)?;
        }

        if let Some(model) = &self.model {
            write_empty(&mut writer, "model", [("type", model.as_str())])?;
        }

        if let Some(address) = &self.address {
            let attributes = address.libvirt_attributes();
            write_empty(
                &mut writer,
                "address",
                attributes.iter().map(|(key, value)| (*key, value.as_str())),
            )?;
        }

        if let Some(acpi) = &self.acpi {
            let index = acpi.index.to_string();
            write_empty(&mut writer, "acpi", [("index", index.as_str())])?;
        }

        if let Some(alias) = &self.alias {
            let name = alias.full_name();
            write_empty(&mut writer, "alias", [("name", name.as_str())])?;
        }

        write_event(&mut writer, Event::End(BytesEnd::new("interface")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| BindingError::Xml(e.to_string()))
    }
}
