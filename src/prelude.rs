//! Shared collection aliases.
//!
//! Every hash-based collection in the crate uses FxHasher; property maps keep
//! insertion order through IndexMap.

use core::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

pub use rustc_hash::{FxHashMap, FxHashSet};

// ═══════════════════════════════════════════════════════════════════════════════
// IndexMap - insertion ordered, FxHasher
// ═══════════════════════════════════════════════════════════════════════════════

pub type IndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Create an empty IndexMap
#[inline]
pub fn index_map_new<K, V>() -> IndexMap<K, V> {
    indexmap::IndexMap::with_hasher(Default::default())
}
