//! Generalization tree resolution
//!
//! Every klass belongs to the tree rooted at its topmost ancestor below the
//! ecosystem base. Exporters cluster classes by root and rank them by depth.

use std::collections::HashSet;

use tracing::trace;

use super::klass::{Klass, KlassId, KlassIndex};
use super::KlassModel;
use crate::core::{ModelError, ModelResult};

impl KlassIndex {
    /// Root and depth of `klass`, computed on first use and cached on the klass
    pub fn root_and_depth(&self, klass: &Klass) -> ModelResult<(&Klass, usize)> {
        let (root, depth) = resolve_root_and_depth(self, klass)?;
        Ok((self.klass(root), depth))
    }
}

/// Walk the superclass chain of `klass` up to the ecosystem base
///
/// Depth counts hops from the root, so a direct child of the base is its own
/// root at depth 0. Virtual klasses have no superclass and resolve the same
/// way. An unknown superclass or a cyclic chain is a binding error.
pub fn resolve_root_and_depth(index: &KlassIndex, klass: &Klass) -> ModelResult<(KlassId, usize)> {
    if let Some(cached) = klass.hierarchy.get() {
        return Ok(*cached);
    }

    let mut seen = HashSet::from([klass.id()]);
    let mut current = klass;
    let mut hops = 0;
    while let Some(superclass) = current.superclass() {
        let parent = index.resolve(superclass, || format!("superclass of {}", current.name()))?;
        if !seen.insert(parent.id()) {
            return Err(ModelError::HierarchyCycle {
                class: klass.name().to_string(),
            });
        }
        current = parent;
        hops += 1;
    }

    trace!(class = klass.name(), root = current.name(), depth = hops, "Resolved hierarchy");
    let resolved = (current.id(), hops);
    let _ = klass.hierarchy.set(resolved);
    Ok(resolved)
}
