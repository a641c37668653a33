//! Selector resolution for lookup-capable entities.
//!
//! Most references in a build specification can be identified in more than one
//! way: an opaque id, a human name, a permalink, an e-mail address or a network
//! address. Each entity type declares its selectors once, as a table ordered by
//! priority, and every format adapter goes through [`select`] when encoding and
//! [`resolve`]/[`assign`] when decoding.

use crate::error::UnsupportedSelector;

/// An entity that is identified by exactly one of several selector fields.
pub trait Lookup: Default {
    /// Entity name used in error messages.
    const KIND: &'static str;

    /// Selector names, highest priority first. The first entry is the primary
    /// selector and never needs a marker.
    const SELECTORS: &'static [&'static str];

    /// Returns the value of the named selector, or `None` if the entity has no
    /// such selector.
    fn selector(&self, name: &str) -> Option<&str>;

    /// Mutable access to the named selector's value.
    fn selector_mut(&mut self, name: &str) -> Option<&mut String>;
}

/// The selector chosen for encoding an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub selector: &'static str,
    pub value: &'a str,
    pub primary: bool,
}

impl<'a> Selection<'a> {
    /// The marker to emit next to the value; `None` for the primary selector.
    pub fn marker(&self) -> Option<&'static str> {
        if self.primary {
            None
        } else {
            Some(self.selector)
        }
    }
}

/// Picks the highest-priority selector with a non-empty value.
pub fn select<L: Lookup>(entity: &L) -> Option<Selection<'_>> {
    L::SELECTORS.iter().enumerate().find_map(|(index, &name)| {
        let value = entity.selector(name).filter(|value| !value.is_empty())?;
        if index > 0 {
            log::trace!("{} selected by {}", L::KIND, name);
        }
        Some(Selection {
            selector: name,
            value,
            primary: index == 0,
        })
    })
}

/// Stores `value` under the selector named by `marker` (the primary selector
/// when no marker is given).
pub fn assign<L: Lookup>(
    entity: &mut L,
    marker: Option<&str>,
    value: String,
) -> Result<(), UnsupportedSelector> {
    let name = marker.unwrap_or(L::SELECTORS[0]);
    match entity.selector_mut(name) {
        Some(slot) => {
            if marker.is_some() {
                log::trace!("{} resolved by {}", L::KIND, name);
            }
            *slot = value;
            Ok(())
        }
        None => Err(UnsupportedSelector {
            kind: L::KIND,
            by: name.to_string(),
        }),
    }
}

/// Builds an entity from a marker and its value.
pub fn resolve<L: Lookup>(marker: Option<&str>, value: String) -> Result<L, UnsupportedSelector> {
    let mut entity = L::default();
    assign(&mut entity, marker, value)?;
    Ok(entity)
}
