use crate::error::Error;
use crate::model::VirtualMachineSpec;
use crate::{json, xml, yaml};
use std::fmt::Display;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

/// The wire formats a [`VirtualMachineSpec`] can be read from and written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Keyed format (JSON).
    Json,
    /// Indented-block format (YAML).
    Yaml,
    /// Markup format (XML).
    Xml,
}

impl Format {
    /// Picks a format from a file extension, e.g. `spec.yml`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref().extension()?.to_str()?.parse().ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Xml => "xml",
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown format {0:?}, expected json, yaml or xml")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "xml" => Ok(Format::Xml),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Decodes a specification from `bytes` in the given format.
///
/// # Errors
///
/// Returns an [`Error::Parse`] if the input is malformed, contains a field the
/// format does not define, or names a selector an entity does not support.
pub fn decode(bytes: &[u8], format: Format) -> Result<VirtualMachineSpec, Error> {
    match format {
        Format::Json => json::from_slice(bytes),
        Format::Yaml => yaml::from_slice(bytes),
        Format::Xml => xml::from_slice(bytes),
    }
}

/// Decodes a specification from a stream in the given format.
pub fn decode_reader<R: Read>(reader: R, format: Format) -> Result<VirtualMachineSpec, Error> {
    match format {
        Format::Json => json::from_reader(reader),
        Format::Yaml => yaml::from_reader(reader),
        Format::Xml => xml::from_reader(reader),
    }
}

impl VirtualMachineSpec {
    /// Encodes the specification in the given format.
    pub fn encode(&self, format: Format) -> Result<Vec<u8>, Error> {
        match format {
            Format::Json => json::to_vec(self),
            Format::Yaml => yaml::to_vec(self),
            Format::Xml => xml::to_vec(self),
        }
    }

    /// Encodes the specification in the given format into `writer`.
    pub fn write<W: Write>(&self, format: Format, writer: W) -> Result<(), Error> {
        match format {
            Format::Json => json::to_writer(self, writer),
            Format::Yaml => yaml::to_writer(self, writer),
            Format::Xml => xml::to_writer(self, writer),
        }
    }

    // === Per-format boundary ===

    pub fn from_json<R: Read>(reader: R) -> Result<Self, Error> {
        json::from_reader(reader)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        json::to_vec(self)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), Error> {
        json::to_writer(self, writer)
    }

    pub fn from_yaml<R: Read>(reader: R) -> Result<Self, Error> {
        yaml::from_reader(reader)
    }

    pub fn to_yaml(&self) -> Result<Vec<u8>, Error> {
        yaml::to_vec(self)
    }

    pub fn write_yaml<W: Write>(&self, writer: W) -> Result<(), Error> {
        yaml::to_writer(self, writer)
    }

    pub fn from_xml<R: Read>(reader: R) -> Result<Self, Error> {
        xml::from_reader(reader)
    }

    /// Encodes as markup, declaration header included.
    pub fn to_xml(&self) -> Result<Vec<u8>, Error> {
        xml::to_vec(self)
    }

    pub fn write_xml<W: Write>(&self, writer: W) -> Result<(), Error> {
        xml::to_writer(self, writer)
    }
}
