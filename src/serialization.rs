//! Serialization shared by the keyed (JSON) and indented (YAML) formats.
//!
//! Both formats map the model structurally through serde. The impls here
//! cover the types whose output is not a plain field-by-field mapping: lookup
//! entities emit only their winning selector, and authorized keys apply
//! flag-over-list precedence.

use crate::model::{
    AuthorizedKeys, DataCenter, DiskIoProfile, DiskTemplate, Grant, Group, IpAddress, Iso,
    Network, NetworkSpeedProfile, Package, SharedDisk, SshKey, Subnet, User, VirtualNetwork, Zone,
};
use crate::resolver::{self, Lookup};
use serde::ser::{Serialize, SerializeMap, Serializer};

fn serialize_selection<L: Lookup, M: SerializeMap>(entity: &L, map: &mut M) -> Result<(), M::Error> {
    if let Some(selection) = resolver::select(entity) {
        map.serialize_entry(selection.selector, selection.value)?;
    }
    Ok(())
}

pub(crate) fn serialize_lookup<L: Lookup, S: Serializer>(
    entity: &L,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    serialize_selection(entity, &mut map)?;
    map.end()
}

macro_rules! serialize_via_lookup {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serialize_lookup(self, serializer)
                }
            }
        )+
    };
}

serialize_via_lookup!(
    Zone,
    DataCenter,
    Package,
    DiskIoProfile,
    SharedDisk,
    Network,
    VirtualNetwork,
    NetworkSpeedProfile,
    IpAddress,
    Subnet,
    Group,
    User,
    SshKey,
    Iso,
);

impl Serialize for DiskTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        serialize_selection(self, &mut map)?;
        if self.version != 0 {
            map.serialize_entry("version", &self.version)?;
        }
        if !self.options.is_empty() {
            map.serialize_entry("options", &self.options)?;
        }
        map.end()
    }
}

fn serialize_grant<T: Serialize, M: SerializeMap>(
    map: &mut M,
    all_key: &'static str,
    list_key: &'static str,
    grant: Grant<'_, T>,
) -> Result<(), M::Error> {
    match grant {
        Grant::All => map.serialize_entry(all_key, &true),
        Grant::Only(items) => map.serialize_entry(list_key, items),
        Grant::Nothing => Ok(()),
    }
}

impl Serialize for AuthorizedKeys {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        serialize_grant(&mut map, "all_users", "users", self.user_grant())?;
        serialize_grant(&mut map, "all_ssh_keys", "ssh_keys", self.ssh_key_grant())?;
        map.end()
    }
}
