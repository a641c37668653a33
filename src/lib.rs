//! Document model and codec for virtual machine build specifications.
//!
//! A [`VirtualMachineSpec`] can be read from and written to three formats
//! that share the one model: keyed ([`json`]), indented-block ([`yaml`]) and
//! markup ([`xml`]).

pub mod api;
pub mod error;
pub mod json;
pub mod model;
pub mod resolver;
mod serialization;
pub mod utils;
pub mod xml;
pub mod yaml;

pub use api::{decode, decode_reader, Format};
pub use error::Error;
pub use model::VirtualMachineSpec;
