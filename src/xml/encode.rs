//! Document model to markup.
//!
//! Output is compact (no indentation). Empty values are omitted, list
//! wrappers are omitted for empty lists, and the hostname is always written:
//! an empty hostname becomes `<Random/>`.

use super::ROOT;
use crate::model::*;
use crate::resolver::{self, Lookup};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{self, Write};
use std::sync::Arc;

/// Turns a writer failure back into the `io::Error` the sink raised, so it
/// keeps its kind on the way out.
fn to_io(err: quick_xml::Error) -> io::Error {
    match err {
        quick_xml::Error::Io(shared) => Arc::try_unwrap(shared)
            .unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string())),
        other => io::Error::other(other),
    }
}

pub(crate) struct Encoder<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> Encoder<W> {
    pub fn new(inner: W) -> Self {
        Encoder {
            writer: Writer::new(inner),
        }
    }

    pub fn spec(&mut self, spec: &VirtualMachineSpec) -> io::Result<()> {
        self.start(ROOT)?;
        if let Some(zone) = &spec.zone {
            self.lookup("Zone", zone)?;
        }
        if let Some(data_center) = &spec.data_center {
            self.lookup("DataCenter", data_center)?;
        }
        if let Some(resources) = &spec.resources {
            self.resources(resources)?;
        }
        if let Some(template) = &spec.disk_template {
            self.disk_template(template)?;
        }
        self.list("SystemDisks", &spec.system_disks, |e, disk| e.system_disk(disk))?;
        self.list("SharedDisks", &spec.shared_disks, |e, disk| e.lookup("Disk", disk))?;
        self.list("NetworkInterfaces", &spec.network_interfaces, |e, interface| {
            e.network_interface(interface)
        })?;
        self.hostname(&spec.hostname)?;
        self.text("Name", &spec.name)?;
        self.text("Description", &spec.description)?;
        if let Some(group) = &spec.group {
            self.lookup("Group", group)?;
        }
        if let Some(keys) = &spec.authorized_keys {
            self.authorized_keys(keys)?;
        }
        self.list("BackupPolicies", &spec.backup_policies, |e, policy| {
            e.backup_policy(policy)
        })?;
        self.list("Tags", &spec.tags, |e, tag| e.text("Tag", tag))?;
        if let Some(iso) = &spec.iso {
            self.lookup("ISO", iso)?;
        }
        self.end(ROOT)
    }

    // === Primitives ===

    fn start(&mut self, tag: &str) -> io::Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(to_io)
    }

    fn start_with(&mut self, tag: &str, attributes: &[(&str, &str)]) -> io::Result<()> {
        let mut start = BytesStart::new(tag);
        for &attribute in attributes {
            start.push_attribute(attribute);
        }
        self.writer
            .write_event(Event::Start(start))
            .map_err(to_io)
    }

    fn empty(&mut self, tag: &str, attributes: &[(&str, &str)]) -> io::Result<()> {
        let mut start = BytesStart::new(tag);
        for &attribute in attributes {
            start.push_attribute(attribute);
        }
        self.writer
            .write_event(Event::Empty(start))
            .map_err(to_io)
    }

    fn end(&mut self, tag: &str) -> io::Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(to_io)
    }

    fn content(&mut self, value: &str) -> io::Result<()> {
        self.writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(to_io)
    }

    fn text(&mut self, tag: &str, value: &str) -> io::Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        self.start(tag)?;
        self.content(value)?;
        self.end(tag)
    }

    fn number(&mut self, tag: &str, value: u32) -> io::Result<()> {
        if value == 0 {
            return Ok(());
        }
        self.text(tag, &value.to_string())
    }

    fn lookup<L: Lookup>(&mut self, tag: &str, entity: &L) -> io::Result<()> {
        match resolver::select(entity) {
            None => self.empty(tag, &[]),
            Some(selection) => {
                match selection.marker() {
                    Some(marker) => self.start_with(tag, &[("by", marker)])?,
                    None => self.start(tag)?,
                }
                self.content(selection.value)?;
                self.end(tag)
            }
        }
    }

    /// Writes `items` inside a `wrapper` element; nothing at all when empty.
    fn list<T>(
        &mut self,
        wrapper: &str,
        items: &[T],
        mut write: impl FnMut(&mut Self, &T) -> io::Result<()>,
    ) -> io::Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.start(wrapper)?;
        for item in items {
            write(self, item)?;
        }
        self.end(wrapper)
    }

    // === Format quirks ===

    fn hostname(&mut self, hostname: &str) -> io::Result<()> {
        self.start("Hostname")?;
        if hostname.is_empty() {
            self.empty("Random", &[])?;
        } else {
            self.text("Hostname", hostname)?;
        }
        self.end("Hostname")
    }

    fn disk_template(&mut self, template: &DiskTemplate) -> io::Result<()> {
        self.start("DiskTemplate")?;
        if resolver::select(template).is_some() {
            self.lookup("DiskTemplate", template)?;
        }
        self.number("Version", template.version)?;
        for option in &template.options {
            self.start_with("Option", &[("key", option.key.as_str())])?;
            self.content(&option.value)?;
            self.end("Option")?;
        }
        self.end("DiskTemplate")
    }

    fn grant<T: Lookup>(&mut self, wrapper: &str, item: &str, grant: Grant<'_, T>) -> io::Result<()> {
        match grant {
            Grant::All => self.empty(wrapper, &[("all", "yes")]),
            Grant::Only(items) => self.list(wrapper, items, |e, entity| e.lookup(item, entity)),
            Grant::Nothing => Ok(()),
        }
    }

    fn authorized_keys(&mut self, keys: &AuthorizedKeys) -> io::Result<()> {
        self.start("AuthorizedKeys")?;
        self.grant("Users", "User", keys.user_grant())?;
        self.grant("SSHKeys", "SSHKey", keys.ssh_key_grant())?;
        self.end("AuthorizedKeys")
    }

    // === Plain structures ===

    fn resources(&mut self, resources: &Resources) -> io::Result<()> {
        self.start("Resources")?;
        if let Some(package) = &resources.package {
            self.lookup("Package", package)?;
        }
        self.number("Memory", resources.memory)?;
        self.number("CPUCores", resources.cpu_cores)?;
        self.end("Resources")
    }

    fn system_disk(&mut self, disk: &SystemDisk) -> io::Result<()> {
        self.start("Disk")?;
        self.text("Name", &disk.name)?;
        self.number("Size", disk.size)?;
        self.text("Speed", &disk.speed)?;
        if let Some(profile) = &disk.io_profile {
            self.lookup("IOProfile", profile)?;
        }
        self.text("FileSystemType", &disk.file_system_type)?;
        self.list("BackupPolicies", &disk.backup_policies, |e, policy| {
            e.backup_policy(policy)
        })?;
        self.end("Disk")
    }

    fn network_interface(&mut self, interface: &NetworkInterface) -> io::Result<()> {
        self.start("NetworkInterface")?;
        if let Some(network) = &interface.network {
            self.lookup("Network", network)?;
        }
        if let Some(network) = &interface.virtual_network {
            self.lookup("VirtualNetwork", network)?;
        }
        if let Some(profile) = &interface.speed_profile {
            self.lookup("SpeedProfile", profile)?;
        }
        for allocation in &interface.ip_address_allocations {
            self.ip_address_allocation(allocation)?;
        }
        self.end("NetworkInterface")
    }

    fn ip_address_allocation(&mut self, allocation: &IpAddressAllocation) -> io::Result<()> {
        match allocation.kind {
            Some(kind) => self.start_with("IPAddressAllocation", &[("type", kind.as_str())])?,
            None => self.start("IPAddressAllocation")?,
        }
        if let Some(address) = &allocation.ip_address {
            self.lookup("IPAddress", address)?;
        }
        if let Some(subnet) = &allocation.subnet {
            self.lookup("Subnet", subnet)?;
        }
        if let Some(version) = allocation.version {
            self.text("Version", version.as_str())?;
        }
        self.end("IPAddressAllocation")
    }

    fn backup_policy(&mut self, policy: &BackupPolicy) -> io::Result<()> {
        self.start("BackupPolicy")?;
        self.number("Retention", policy.retention)?;
        if let Some(schedule) = &policy.schedule {
            self.start("Schedule")?;
            if let Some(interval) = schedule.interval {
                self.text("Interval", interval.as_str())?;
            }
            self.number("Frequency", schedule.frequency)?;
            self.number("Time", schedule.time)?;
            self.end("Schedule")?;
        }
        self.end("BackupPolicy")
    }
}
