//! Keyed-format adapter.
//!
//! Decoding is strict: every model type is declared with
//! `#[serde(deny_unknown_fields)]`, so the first unrecognized key aborts the
//! decode instead of being dropped. Encoding is compact (no whitespace).

use crate::error::{Error, ParseError};
use crate::model::VirtualMachineSpec;
use std::io::{Read, Write};

/// Decodes a specification from JSON bytes.
///
/// # Errors
///
/// Returns [`ParseError::Json`] (under [`Error::Parse`]) for malformed input,
/// an unknown key, or a value of the wrong type.
pub fn from_slice(bytes: &[u8]) -> Result<VirtualMachineSpec, Error> {
    log::debug!("decoding json spec ({} bytes)", bytes.len());
    serde_json::from_slice(bytes).map_err(|err| ParseError::Json(err).into())
}

/// Decodes a specification from a JSON stream.
///
/// # Errors
///
/// Same as [`from_slice`]; read failures are reported as parse errors too.
pub fn from_reader<R: Read>(reader: R) -> Result<VirtualMachineSpec, Error> {
    log::debug!("decoding json spec from stream");
    serde_json::from_reader(reader).map_err(|err| ParseError::Json(err).into())
}

/// Encodes `spec` as compact JSON.
///
/// # Errors
///
/// Returns [`Error::Write`] if serialization fails.
pub fn to_vec(spec: &VirtualMachineSpec) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    to_writer(spec, &mut buffer)?;
    Ok(buffer)
}

/// Encodes `spec` as compact JSON into `writer`.
///
/// # Errors
///
/// Returns [`Error::Write`] carrying the writer's own `io::Error`.
pub fn to_writer<W: Write>(spec: &VirtualMachineSpec, writer: W) -> Result<(), Error> {
    log::debug!("encoding json spec");
    serde_json::to_writer(writer, spec).map_err(|err| Error::Write(err.into()))
}
