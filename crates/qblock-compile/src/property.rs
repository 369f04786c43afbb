//! `PropertySet` and related types for pass communication.
//!
//! Passes share data through a [`PropertySet`]. The block list handed to
//! block consolidation and the target basis have dedicated fields; anything
//! else is stored as a type-keyed custom property.
//!
//! # Examples
//!
//! ```
//! use qblock_compile::{BasisGates, PropertySet};
//!
//! let props = PropertySet::new().with_basis_gates(BasisGates::ibm());
//! assert!(props.basis_gates.as_ref().unwrap().contains("cx"));
//! assert!(props.block_list.is_none());
//! ```
//!
//! ## Custom properties
//!
//! ```
//! use qblock_compile::PropertySet;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct CollectorStats {
//!     blocks_found: usize,
//! }
//!
//! let mut props = PropertySet::new();
//! props.insert(CollectorStats { blocks_found: 3 });
//!
//! let stats = props.get::<CollectorStats>().unwrap();
//! assert_eq!(stats.blocks_found, 3);
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};

use qblock_ir::NodeIndex;

/// An ordered list of operation nodes to be collapsed into one unitary.
///
/// The order must be a valid topological order of the nodes.
pub type Block = Vec<NodeIndex>;

/// Basis gates for the target device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasisGates {
    gates: FxHashSet<String>,
}

impl BasisGates {
    /// Create a new basis gates set.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a gate is in the basis.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.contains(gate)
    }

    /// Gate names in the basis, sorted.
    pub fn gates(&self) -> Vec<&str> {
        let mut gates: Vec<&str> = self.gates.iter().map(String::as_str).collect();
        gates.sort_unstable();
        gates
    }

    /// IBM basis gates (RZ + SX + X + CX).
    pub fn ibm() -> Self {
        Self::new(["rz", "sx", "x", "cx", "measure", "barrier", "id"])
    }

    /// IBM Heron basis gates (RZ + SX + X + CZ).
    pub fn heron() -> Self {
        Self::new([
            "rz", "sx", "x", "cz", "id", "rx", "rzz", "measure", "barrier",
        ])
    }
}

/// Properties shared between compilation passes.
///
/// # Standard Properties
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `block_list` | `Vec<`[`Block`]`>` | Blocks found by a collector, consumed by consolidation |
/// | `basis_gates` | [`BasisGates`] | Native gate set for the target |
///
/// Each type can have at most one custom value stored.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Blocks to consolidate.
    ///
    /// Node indices refer to the DAG as it was when the blocks were
    /// collected; consolidation takes the list and leaves `None` behind.
    pub block_list: Option<Vec<Block>>,

    /// Target basis gates.
    ///
    /// Single gates in the basis are not worth consolidating on their own.
    pub basis_gates: Option<BasisGates>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the basis gates.
    #[must_use]
    pub fn with_basis_gates(mut self, basis_gates: BasisGates) -> Self {
        self.basis_gates = Some(basis_gates);
        self
    }

    /// Set the block list.
    #[must_use]
    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.block_list = Some(blocks);
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
