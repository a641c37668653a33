//! Element tree to document model.
//!
//! Every decoder rejects child elements and attributes it does not know. The
//! tree is already well formed, so the failures raised here are content
//! failures: unknown elements or attributes, bad values, and selectors an
//! entity does not support.

use super::reader::Element;
use super::ROOT;
use crate::error::XmlParseError;
use crate::model::*;
use crate::resolver::{self, Lookup};
use std::str::FromStr;

type Result<T> = std::result::Result<T, XmlParseError>;

pub(crate) fn spec(root: &Element) -> Result<VirtualMachineSpec> {
    if root.name != ROOT {
        return Err(XmlParseError::UnknownElement {
            parent: "document".to_string(),
            element: root.name.clone(),
        });
    }
    root.deny_unknown_attributes(&[])?;
    root.deny_text()?;

    let mut spec = VirtualMachineSpec::default();
    for child in &root.children {
        match child.name.as_str() {
            "Zone" => spec.zone = Some(lookup(child)?),
            "DataCenter" => spec.data_center = Some(lookup(child)?),
            "Resources" => spec.resources = Some(resources(child)?),
            "DiskTemplate" => spec.disk_template = Some(disk_template(child)?),
            "SystemDisks" => spec.system_disks.extend(list(child, "Disk", system_disk)?),
            "SharedDisks" => spec.shared_disks.extend(list(child, "Disk", lookup::<SharedDisk>)?),
            "NetworkInterfaces" => spec
                .network_interfaces
                .extend(list(child, "NetworkInterface", network_interface)?),
            "Hostname" => spec.hostname = hostname(child)?,
            "Name" => spec.name = name(child)?,
            "Description" => spec.description = text(child)?,
            "Group" => spec.group = Some(lookup(child)?),
            "AuthorizedKeys" => spec.authorized_keys = Some(authorized_keys(child)?),
            "BackupPolicies" => spec
                .backup_policies
                .extend(list(child, "BackupPolicy", backup_policy)?),
            "Tags" => spec.tags.extend(list(child, "Tag", text)?),
            "ISO" => spec.iso = Some(lookup(child)?),
            _ => return Err(root.unknown_child(child)),
        }
    }
    Ok(spec)
}

// === Shared shapes ===

/// `<Tag by="selector">value</Tag>`, where a missing `by` means the primary
/// selector.
fn lookup<L: Lookup>(element: &Element) -> Result<L> {
    element.deny_unknown_attributes(&["by"])?;
    element.deny_children()?;
    let entity = resolver::resolve(element.attribute("by"), element.text.clone())?;
    Ok(entity)
}

fn text(element: &Element) -> Result<String> {
    element.deny_unknown_attributes(&[])?;
    element.deny_children()?;
    Ok(element.text.clone())
}

fn number(element: &Element) -> Result<u32> {
    let value = text(element)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| XmlParseError::InvalidValue {
        element: element.name.clone(),
        value: trimmed.to_string(),
        expected: "a non-negative integer".to_string(),
    })
}

fn keyword<T: FromStr>(element: &Element, value: &str, variants: &[&str]) -> Result<T> {
    value.trim().parse().map_err(|_| XmlParseError::InvalidValue {
        element: element.name.clone(),
        value: value.to_string(),
        expected: format!("one of {}", variants.join(", ")),
    })
}

/// A markup-only wrapper around repeated `item` elements.
fn list<T>(
    element: &Element,
    item: &str,
    decode: impl Fn(&Element) -> Result<T>,
) -> Result<Vec<T>> {
    element.deny_unknown_attributes(&[])?;
    items(element, item, decode)
}

fn items<T>(
    element: &Element,
    item: &str,
    decode: impl Fn(&Element) -> Result<T>,
) -> Result<Vec<T>> {
    element.deny_text()?;
    element
        .children
        .iter()
        .map(|child| {
            if child.name == item {
                decode(child)
            } else {
                Err(element.unknown_child(child))
            }
        })
        .collect()
}

/// Visits each child of a container element, which may carry no attributes
/// and no text of its own.
fn fields(
    element: &Element,
    mut visit: impl FnMut(&Element) -> Result<bool>,
) -> Result<()> {
    element.deny_unknown_attributes(&[])?;
    element.deny_text()?;
    for child in &element.children {
        if !visit(child)? {
            return Err(element.unknown_child(child));
        }
    }
    Ok(())
}

// === Format quirks ===

/// `<Hostname><Hostname>name</Hostname></Hostname>`, or
/// `<Hostname><Random/></Hostname>` for a generated hostname.
fn hostname(element: &Element) -> Result<String> {
    let mut hostname = String::new();
    fields(element, |child| {
        match child.name.as_str() {
            "Hostname" => hostname = text(child)?,
            "Random" => {
                child.deny_unknown_attributes(&[])?;
                child.deny_children()?;
                child.deny_text()?;
                hostname.clear();
            }
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(hostname)
}

/// Accepts both `<Name>text</Name>` and `<Name><Name>text</Name></Name>`.
fn name(element: &Element) -> Result<String> {
    if element.children.is_empty() {
        return text(element);
    }
    let mut name = String::new();
    fields(element, |child| {
        if child.name != "Name" {
            return Ok(false);
        }
        name = text(child)?;
        Ok(true)
    })?;
    Ok(name)
}

fn disk_template(element: &Element) -> Result<DiskTemplate> {
    let mut template = DiskTemplate::default();
    fields(element, |child| {
        match child.name.as_str() {
            "DiskTemplate" => {
                child.deny_unknown_attributes(&["by"])?;
                child.deny_children()?;
                resolver::assign(&mut template, child.attribute("by"), child.text.clone())?;
            }
            "Version" => template.version = number(child)?,
            "Option" => template.options.push(disk_template_option(child)?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(template)
}

fn disk_template_option(element: &Element) -> Result<DiskTemplateOption> {
    element.deny_unknown_attributes(&["key"])?;
    element.deny_children()?;
    Ok(DiskTemplateOption {
        key: element.attribute("key").unwrap_or_default().to_string(),
        value: element.text.clone(),
    })
}

/// `<Users all="yes"/>` or `<Users><User>..</User></Users>`.
fn grant<T: Lookup>(element: &Element, item: &str) -> Result<(bool, Vec<T>)> {
    element.deny_unknown_attributes(&["all"])?;
    let all = match element.attribute("all") {
        None => false,
        Some(value) => match value.trim() {
            "yes" | "true" | "1" => true,
            "no" | "false" | "0" => false,
            _ => {
                return Err(XmlParseError::InvalidValue {
                    element: element.name.clone(),
                    value: value.to_string(),
                    expected: "yes or no".to_string(),
                })
            }
        },
    };
    let entries = items(element, item, lookup::<T>)?;
    Ok((all, entries))
}

fn authorized_keys(element: &Element) -> Result<AuthorizedKeys> {
    let mut keys = AuthorizedKeys::default();
    fields(element, |child| {
        match child.name.as_str() {
            "Users" => (keys.all_users, keys.users) = grant(child, "User")?,
            "SSHKeys" => (keys.all_ssh_keys, keys.ssh_keys) = grant(child, "SSHKey")?,
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(keys)
}

// === Plain structures ===

fn resources(element: &Element) -> Result<Resources> {
    let mut resources = Resources::default();
    fields(element, |child| {
        match child.name.as_str() {
            "Package" => resources.package = Some(lookup(child)?),
            "Memory" => resources.memory = number(child)?,
            "CPUCores" => resources.cpu_cores = number(child)?,
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(resources)
}

fn system_disk(element: &Element) -> Result<SystemDisk> {
    let mut disk = SystemDisk::default();
    fields(element, |child| {
        match child.name.as_str() {
            "Name" => disk.name = text(child)?,
            "Size" => disk.size = number(child)?,
            "Speed" => disk.speed = text(child)?,
            "IOProfile" => disk.io_profile = Some(lookup(child)?),
            "FileSystemType" => disk.file_system_type = text(child)?,
            "BackupPolicies" => disk
                .backup_policies
                .extend(list(child, "BackupPolicy", backup_policy)?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(disk)
}

fn network_interface(element: &Element) -> Result<NetworkInterface> {
    let mut interface = NetworkInterface::default();
    fields(element, |child| {
        match child.name.as_str() {
            "Network" => interface.network = Some(lookup(child)?),
            "VirtualNetwork" => interface.virtual_network = Some(lookup(child)?),
            "SpeedProfile" => interface.speed_profile = Some(lookup(child)?),
            "IPAddressAllocation" => interface
                .ip_address_allocations
                .push(ip_address_allocation(child)?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(interface)
}

fn ip_address_allocation(element: &Element) -> Result<IpAddressAllocation> {
    element.deny_unknown_attributes(&["type"])?;
    element.deny_text()?;

    let mut allocation = IpAddressAllocation {
        kind: element
            .attribute("type")
            .map(|value| keyword(element, value, AllocationType::VARIANTS))
            .transpose()?,
        ..Default::default()
    };
    for child in &element.children {
        match child.name.as_str() {
            "IPAddress" => allocation.ip_address = Some(lookup(child)?),
            "Subnet" => allocation.subnet = Some(lookup(child)?),
            "Version" => {
                let value = text(child)?;
                allocation.version = Some(keyword(child, &value, IpVersion::VARIANTS)?);
            }
            _ => return Err(element.unknown_child(child)),
        }
    }
    Ok(allocation)
}

fn backup_policy(element: &Element) -> Result<BackupPolicy> {
    let mut policy = BackupPolicy::default();
    fields(element, |child| {
        match child.name.as_str() {
            "Retention" => policy.retention = number(child)?,
            "Schedule" => policy.schedule = Some(schedule(child)?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(policy)
}

fn schedule(element: &Element) -> Result<Schedule> {
    let mut schedule = Schedule::default();
    fields(element, |child| {
        match child.name.as_str() {
            "Interval" => {
                let value = text(child)?;
                schedule.interval = Some(keyword(child, &value, Interval::VARIANTS)?);
            }
            "Frequency" => schedule.frequency = number(child)?,
            "Time" => schedule.time = number(child)?,
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(schedule)
}
