//! Indented-block adapter.
//!
//! Same key names and nesting as the keyed format, written as block YAML with
//! two-space indentation for nested mappings. Block sequence items (`- `) are
//! written at the indentation of their key, as serde_yaml emits them; input
//! with indented items decodes the same. Decoding is strict for the same reason as in
//! [`crate::json`]: the model types deny unknown fields.

use crate::error::{Error, ParseError};
use crate::model::VirtualMachineSpec;
use std::io::{self, Read, Write};

/// Decodes a specification from YAML bytes.
///
/// # Errors
///
/// Returns [`ParseError::Yaml`] (under [`Error::Parse`]) for malformed input,
/// an unknown key, or a value of the wrong type.
pub fn from_slice(bytes: &[u8]) -> Result<VirtualMachineSpec, Error> {
    log::debug!("decoding yaml spec ({} bytes)", bytes.len());
    serde_yaml::from_slice(bytes).map_err(|err| ParseError::Yaml(err).into())
}

/// Decodes a specification from a YAML stream.
///
/// # Errors
///
/// Same as [`from_slice`]; read failures are reported as parse errors too.
pub fn from_reader<R: Read>(reader: R) -> Result<VirtualMachineSpec, Error> {
    log::debug!("decoding yaml spec from stream");
    serde_yaml::from_reader(reader).map_err(|err| ParseError::Yaml(err).into())
}

/// Encodes `spec` as block YAML.
///
/// # Errors
///
/// Returns [`Error::Write`] if serialization fails.
pub fn to_vec(spec: &VirtualMachineSpec) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    to_writer(spec, &mut buffer)?;
    Ok(buffer)
}

/// Encodes `spec` as block YAML into `writer`.
///
/// The document is rendered in memory first, so a failing `writer` surfaces
/// its own `io::Error` unchanged.
///
/// # Errors
///
/// Returns [`Error::Write`] if rendering fails or `writer` rejects the bytes.
pub fn to_writer<W: Write>(spec: &VirtualMachineSpec, mut writer: W) -> Result<(), Error> {
    log::debug!("encoding yaml spec");
    let rendered = serde_yaml::to_string(spec).map_err(|err| Error::Write(io::Error::other(err)))?;
    writer.write_all(rendered.as_bytes())?;
    Ok(())
}
