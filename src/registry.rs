//! Format Registry (spec §4.2): resolves a type byte to a record [`Layout`].

use std::collections::HashMap;

use crate::consts::FMT_TYPE_CODE;
use crate::layout::Layout;

/// An immutable, shareable snapshot of the discovered record layouts.
///
/// Built once by the [`crate::fmt_prepass`] and thereafter read-only: every
/// block decoder worker holds the same `Arc<FormatRegistry>` and never
/// mutates it (spec §3 Lifecycle/Ownership).
#[derive(Debug, Default)]
pub struct FormatRegistry {
    by_type: HashMap<u8, Layout>,
    name_to_type: HashMap<String, u8>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry::default()
    }

    /// Register a layout, overwriting any previous definition for the same
    /// type code — "duplicate type codes overwrite (last definition wins)"
    /// (spec §4.2).
    pub fn register(&mut self, layout: Layout) {
        self.name_to_type
            .insert(layout.name.as_str().to_owned(), layout.type_code);
        self.by_type.insert(layout.type_code, layout);
    }

    /// Ensure a self-entry for the FMT record exists; inserted only if the
    /// stream itself never defined one (spec §4.2).
    pub fn ensure_fmt_self_entry(&mut self) {
        if !self.by_type.contains_key(&FMT_TYPE_CODE) {
            self.register(Layout::fmt_self());
        }
    }

    pub fn get(&self, type_code: u8) -> Option<&Layout> {
        self.by_type.get(&type_code)
    }

    pub fn resolve_name(&self, name: &str) -> Option<u8> {
        self.name_to_type.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
