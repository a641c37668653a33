//! The format-agnostic document model for virtual machine build specifications.
//!
//! Every type here is a plain value: it carries no knowledge of which wire
//! format it came from or will be written to. The serde derives here serve the
//! keyed and indented formats; types whose output depends on selector choice
//! or flag precedence serialize through [`crate::serialization`].

use crate::resolver::Lookup;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Declares a lookup-capable entity. Selector fields are listed highest
/// priority first; the first one is the primary selector.
macro_rules! lookup_entity {
    (
        $(#[$meta:meta])*
        pub struct $name:ident as $kind:literal {
            $($field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct $name {
            $(
                #[serde(deserialize_with = "null_as_default")]
                pub $field: String,
            )+
        }

        impl Lookup for $name {
            const KIND: &'static str = $kind;
            const SELECTORS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn selector(&self, name: &str) -> Option<&str> {
                match name {
                    $(stringify!($field) => Some(self.$field.as_str()),)+
                    _ => None,
                }
            }

            fn selector_mut(&mut self, name: &str) -> Option<&mut String> {
                match name {
                    $(stringify!($field) => Some(&mut self.$field),)+
                    _ => None,
                }
            }
        }
    };
}

// === Lookup-capable entities ===

lookup_entity! {
    pub struct Zone as "Zone" { id, name, permalink }
}

lookup_entity! {
    pub struct DataCenter as "DataCenter" { id, name, permalink }
}

lookup_entity! {
    /// A resource package (a fixed CPU/memory/disk bundle).
    pub struct Package as "Package" { id, permalink }
}

lookup_entity! {
    pub struct DiskIoProfile as "DiskIOProfile" { id, permalink }
}

lookup_entity! {
    /// An existing disk shared between virtual machines.
    pub struct SharedDisk as "SharedDisk" { id, name }
}

lookup_entity! {
    pub struct Network as "Network" { id, permalink }
}

lookup_entity! {
    pub struct VirtualNetwork as "VirtualNetwork" { id, name }
}

lookup_entity! {
    pub struct NetworkSpeedProfile as "NetworkSpeedProfile" { id, permalink }
}

lookup_entity! {
    pub struct IpAddress as "IPAddress" { id, address }
}

lookup_entity! {
    pub struct Subnet as "Subnet" { id, address }
}

lookup_entity! {
    pub struct Group as "Group" { id, name }
}

lookup_entity! {
    /// A user whose keys should be authorized on the machine.
    pub struct User as "User" { id, email_address }
}

lookup_entity! {
    pub struct SshKey as "SSHKey" { id }
}

lookup_entity! {
    /// Removable media to attach at boot.
    pub struct Iso as "ISO" { id, name, permalink }
}

// === Root ===

/// A declarative description of how to provision a virtual machine.
///
/// All fields are optional. Empty strings, zero numbers, `None` and empty
/// lists are all "absent" and are omitted when encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VirtualMachineSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_center: Option<DataCenter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_template: Option<DiskTemplate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub system_disks: Vec<SystemDisk>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub shared_disks: Vec<SharedDisk>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub hostname: String,
    /// Display name.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_keys: Option<AuthorizedKeys>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub backup_policies: Vec<BackupPolicy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<Iso>,
}

// === Resources and disks ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Resources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<Package>,
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(deserialize_with = "null_as_default")]
    pub memory: u32,
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_cores: u32,
}

/// The template the machine's primary disk is built from.
///
/// Lookup-capable like the plain entities above, but it also carries a
/// template version and template-specific options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiskTemplate {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub permalink: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub options: Vec<DiskTemplateOption>,
}

impl Lookup for DiskTemplate {
    const KIND: &'static str = "DiskTemplate";
    const SELECTORS: &'static [&'static str] = &["id", "permalink"];

    fn selector(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(&self.id),
            "permalink" => Some(&self.permalink),
            _ => None,
        }
    }

    fn selector_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "id" => Some(&mut self.id),
            "permalink" => Some(&mut self.permalink),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiskTemplateOption {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemDisk {
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Size in gigabytes.
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(deserialize_with = "null_as_default")]
    pub size: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub speed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_profile: Option<DiskIoProfile>,
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub file_system_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub backup_policies: Vec<BackupPolicy>,
}

// === Networking ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkInterface {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_network: Option<VirtualNetwork>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_profile: Option<NetworkSpeedProfile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(deserialize_with = "null_as_default")]
    pub ip_address_allocations: Vec<IpAddressAllocation>,
}

/// Either a request for a new address from a subnet, or an existing address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IpAddressAllocation {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AllocationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<IpAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<Subnet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<IpVersion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationType {
    New,
    Existing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    Ipv4,
    Ipv6,
}

// === Access ===

/// Which users' and which SSH keys should be authorized on the machine.
///
/// The `all_*` flags take precedence over the explicit lists. When a flag is
/// set, encoders emit only the flag and drop the list, so decoding the output
/// yields the flag with an empty list. Callers that set both lose the list;
/// see [`AuthorizedKeys::user_grant`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizedKeys {
    #[serde(deserialize_with = "null_as_default")]
    pub all_users: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(deserialize_with = "null_as_default")]
    pub all_ssh_keys: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub ssh_keys: Vec<SshKey>,
}

/// What an (all-flag, list) pair actually grants once precedence is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant<'a, T> {
    All,
    Only(&'a [T]),
    Nothing,
}

impl<'a, T> Grant<'a, T> {
    fn from_parts(all: bool, items: &'a [T]) -> Self {
        if all {
            Grant::All
        } else if items.is_empty() {
            Grant::Nothing
        } else {
            Grant::Only(items)
        }
    }
}

impl AuthorizedKeys {
    pub fn user_grant(&self) -> Grant<'_, User> {
        Grant::from_parts(self.all_users, &self.users)
    }

    pub fn ssh_key_grant(&self) -> Grant<'_, SshKey> {
        Grant::from_parts(self.all_ssh_keys, &self.ssh_keys)
    }
}

// === Backups ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupPolicy {
    /// Hours to keep each backup.
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(deserialize_with = "null_as_default")]
    pub retention: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Schedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<Interval>,
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(deserialize_with = "null_as_default")]
    pub frequency: u32,
    /// Hour of the day the backup runs at.
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(deserialize_with = "null_as_default")]
    pub time: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

// === Enum text forms ===

/// Implements `as_str`, `Display` and `FromStr` for a keyword enum. The text
/// forms must match the serde `rename_all = "lowercase"` names above.
macro_rules! keyword_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const VARIANTS: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

keyword_enum!(AllocationType { New => "new", Existing => "existing" });
keyword_enum!(IpVersion { Ipv4 => "ipv4", Ipv6 => "ipv6" });
keyword_enum!(Interval {
    Hourly => "hourly",
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

/// Reads an explicit `null` as the zero value, the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn is_zero(value: &u32) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_tables() {
        assert_eq!(Zone::SELECTORS, &["id", "name", "permalink"]);
        assert_eq!(DataCenter::SELECTORS, &["id", "name", "permalink"]);
        assert_eq!(Iso::SELECTORS, &["id", "name", "permalink"]);
        assert_eq!(Package::SELECTORS, &["id", "permalink"]);
        assert_eq!(DiskTemplate::SELECTORS, &["id", "permalink"]);
        assert_eq!(DiskIoProfile::SELECTORS, &["id", "permalink"]);
        assert_eq!(Network::SELECTORS, &["id", "permalink"]);
        assert_eq!(NetworkSpeedProfile::SELECTORS, &["id", "permalink"]);
        assert_eq!(VirtualNetwork::SELECTORS, &["id", "name"]);
        assert_eq!(SharedDisk::SELECTORS, &["id", "name"]);
        assert_eq!(Group::SELECTORS, &["id", "name"]);
        assert_eq!(User::SELECTORS, &["id", "email_address"]);
        assert_eq!(IpAddress::SELECTORS, &["id", "address"]);
        assert_eq!(Subnet::SELECTORS, &["id", "address"]);
    }

    #[test]
    fn test_disk_template_selectors_exclude_version() {
        let mut template = DiskTemplate::default();
        assert!(template.selector_mut("version").is_none());
        assert!(template.selector("options").is_none());
    }

    #[test]
    fn test_grant_precedence() {
        let keys = AuthorizedKeys {
            all_users: true,
            users: vec![User {
                id: "user_1".into(),
                ..Default::default()
            }],
            all_ssh_keys: false,
            ssh_keys: vec![],
        };
        assert_eq!(keys.user_grant(), Grant::All);
        assert_eq!(keys.ssh_key_grant(), Grant::Nothing);
    }

    #[test]
    fn test_keyword_round_trip() {
        for text in Interval::VARIANTS {
            let interval: Interval = text.parse().unwrap();
            assert_eq!(interval.as_str(), *text);
        }
        assert!("fortnightly".parse::<Interval>().is_err());
        assert_eq!(IpVersion::Ipv6.to_string(), "ipv6");
    }
}
