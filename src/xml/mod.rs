//! Markup-format adapter.
//!
//! Unlike the keyed and indented formats, the markup shape differs from the
//! model in several places (selector markers, list wrappers, nested hostname
//! and disk template, the random-hostname marker), so it is mapped by hand:
//! [`reader`] builds an element tree, [`decode`] maps the tree onto the
//! model, and [`encode`] writes the model back out.

mod decode;
mod encode;
mod reader;

use crate::error::{Error, ParseError};
use crate::model::VirtualMachineSpec;
use std::io::{Read, Write};

/// Declaration header written before the root element. Decoding neither
/// requires nor validates it.
pub const HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

pub(crate) const ROOT: &str = "VirtualMachineSpec";

/// Decodes a specification from markup text.
///
/// # Errors
///
/// Returns [`ParseError::Xml`] (under [`Error::Parse`]) for malformed markup,
/// an unknown element or attribute, an invalid value, or a `by` marker the
/// entity does not support.
pub fn from_str(source: &str) -> Result<VirtualMachineSpec, Error> {
    log::debug!("decoding xml spec ({} bytes)", source.len());
    let root = reader::parse_root(source).map_err(ParseError::Xml)?;
    let spec = decode::spec(&root).map_err(ParseError::Xml)?;
    Ok(spec)
}

/// Decodes a specification from markup bytes, which must be UTF-8.
///
/// # Errors
///
/// Same as [`from_str`], plus an encoding error for invalid UTF-8.
pub fn from_slice(bytes: &[u8]) -> Result<VirtualMachineSpec, Error> {
    let source = std::str::from_utf8(bytes).map_err(|err| ParseError::Xml(err.into()))?;
    from_str(source)
}

/// Reads `reader` to the end and decodes the markup it held.
///
/// # Errors
///
/// Same as [`from_slice`]; a read failure becomes [`ParseError::Read`].
pub fn from_reader<R: Read>(mut reader: R) -> Result<VirtualMachineSpec, Error> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(ParseError::Read)?;
    from_slice(&bytes)
}

/// Encodes `spec` as compact markup, [`HEADER`] included.
///
/// # Errors
///
/// Returns [`Error::Write`] if encoding fails.
pub fn to_vec(spec: &VirtualMachineSpec) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    to_writer(spec, &mut buffer)?;
    Ok(buffer)
}

/// Encodes `spec` as compact markup into `writer`, [`HEADER`] included.
///
/// # Errors
///
/// Returns [`Error::Write`] carrying the writer's own `io::Error`.
pub fn to_writer<W: Write>(spec: &VirtualMachineSpec, mut writer: W) -> Result<(), Error> {
    log::debug!("encoding xml spec");
    writer.write_all(HEADER.as_bytes())?;
    encode::Encoder::new(writer).spec(spec)?;
    Ok(())
}
