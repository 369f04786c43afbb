//! Qubit and classical bit types.
//!
//! Every bit carries a global ordinal (the inner `u32` of its id). Ordinals
//! are handed out in creation order across all registers, so they give a
//! total significance order that does not depend on register names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit within a circuit.
///
/// Ordering follows the global ordinal, which is what consolidated
/// operations use as their canonical wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The global ordinal of this qubit.
    #[inline]
    pub fn ordinal(self) -> u32 {
        self.0
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Unique identifier for a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// Register membership of a bit: `(register name, index in register)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterSlot {
    /// Name of the register.
    pub register: String,
    /// Position of the bit inside the register.
    pub index: u32,
}

/// A quantum bit with optional register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The unique identifier.
    pub id: QubitId,
    /// Register membership, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<RegisterSlot>,
}

impl Qubit {
    /// Create a qubit that belongs to no register.
    pub fn new(id: QubitId) -> Self {
        Self { id, slot: None }
    }

    /// Create a qubit at `index` of `register`.
    pub fn with_register(id: QubitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            slot: Some(RegisterSlot {
                register: register.into(),
                index,
            }),
        }
    }

    /// Name of the register this qubit belongs to.
    pub fn register(&self) -> Option<&str> {
        self.slot.as_ref().map(|s| s.register.as_str())
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => write!(f, "{}[{}]", slot.register, slot.index),
            None => write!(f, "{}", self.id),
        }
    }
}

/// A classical bit with optional register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clbit {
    /// The unique identifier.
    pub id: ClbitId,
    /// Register membership, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<RegisterSlot>,
}

impl Clbit {
    /// Create a classical bit that belongs to no register.
    pub fn new(id: ClbitId) -> Self {
        Self { id, slot: None }
    }

    /// Create a classical bit at `index` of `register`.
    pub fn with_register(id: ClbitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            slot: Some(RegisterSlot {
                register: register.into(),
                index,
            }),
        }
    }
}

impl fmt::Display for Clbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => write!(f, "{}[{}]", slot.register, slot.index),
            None => write!(f, "{}", self.id),
        }
    }
}
