//! Error types for the IR crate.

use crate::dag::{NodeIndex, WireId};
use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit:?} not found in circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit not found in circuit.
    #[error("Classical bit {clbit:?} not found in circuit{}", format_gate_context(.gate_name))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Invalid DAG structure.
    #[error("Invalid DAG structure: {0}")]
    InvalidDag(String),

    /// Invalid node index.
    #[error("Invalid node index {0:?}: not an operation node of this DAG")]
    InvalidNode(NodeIndex),

    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit:?} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Matrix does not have the shape required by the gate.
    #[error("Matrix for {num_qubits}-qubit gate '{gate_name}' must be {expected}x{expected}, got {rows}x{cols}")]
    MatrixShape {
        /// Name of the gate.
        gate_name: String,
        /// Number of qubits the gate acts on.
        num_qubits: u32,
        /// Required dimension (`2^num_qubits`).
        expected: usize,
        /// Rows of the supplied matrix.
        rows: usize,
        /// Columns of the supplied matrix.
        cols: usize,
    },

    /// A block handed to `replace_block` was empty.
    #[error("Cannot replace an empty block")]
    EmptyBlock,

    /// Replacing the block would break the wire ordering of the DAG.
    #[error("Block is not contiguous: node {outside:?} depends on an intermediate result of the block")]
    NonContiguousBlock {
        /// A node outside the block lying between two block members.
        outside: NodeIndex,
    },

    /// The replacement instruction does not act on exactly the block's wires.
    #[error("Replacement acts on {got:?} but the block spans {expected:?}")]
    WireMismatch {
        /// Wires spanned by the block.
        expected: Vec<WireId>,
        /// Wires of the replacement instruction.
        got: Vec<WireId>,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
