//! Error types for the compilation crate.

use qblock_ir::NodeIndex;
use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qblock_ir::IrError),

    /// A node appears in more than one block.
    #[error("Node {node:?} belongs to more than one block")]
    OverlappingBlocks {
        /// The shared node.
        node: NodeIndex,
    },

    /// A gate matrix does not match the gate's qubit count.
    #[error(
        "Matrix of '{gate}' at node {node:?} must be {expected}x{expected}, got {}x{}",
        got.0,
        got.1
    )]
    MatrixDimension {
        /// The offending node.
        node: NodeIndex,
        /// Gate name.
        gate: String,
        /// Required dimension.
        expected: usize,
        /// Actual `(rows, cols)`.
        got: (usize, usize),
    },

    /// A gate matrix has the right size but is not unitary.
    #[error("Matrix of '{gate}' at node {node:?} is not unitary")]
    NonUnitaryMatrix {
        /// The offending node.
        node: NodeIndex,
        /// Gate name.
        gate: String,
    },

    /// An operation in a block has no matrix.
    #[error("Operation '{name}' at node {node:?} has no unitary matrix")]
    MissingMatrix {
        /// The offending node.
        node: NodeIndex,
        /// Operation name.
        name: String,
    },

    /// A block is malformed.
    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    /// Pass execution failed.
    #[error("Pass '{name}' failed: {reason}")]
    PassFailed {
        /// Name of the pass.
        name: String,
        /// Why it failed.
        reason: String,
    },

    /// Invalid pass configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
