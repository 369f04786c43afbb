//! qblock circuit intermediate representation
//!
//! Core data structures for representing quantum circuits as a DAG of
//! operations over qubit and classical wires. The compile crate rewrites
//! this DAG; the high-level [`Circuit`] API builds it.
//!
//! # Core Components
//!
//! - **Wires**: [`QubitId`], [`ClbitId`] carry the global ordinal that fixes
//!   qubit significance in composed matrices
//! - **Gates**: [`StandardGate`] for built-in gates, [`CustomGate`] for
//!   user-defined operations and [`UnitaryGate`] for explicit matrices
//! - **Matrices**: [`matrix`] holds the catalog of standard gate matrices,
//!   all little-endian over the gate's own qubit arguments
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **DAG**: [`CircuitDag`] with stable node indices and block replacement
//!
//! # Example: Replacing a Block
//!
//! ```rust
//! use qblock_ir::{Circuit, Instruction, QubitId, StandardGate, UnitaryGate, matrix};
//!
//! let mut circuit = Circuit::with_size("demo", 2, 0);
//! let a = circuit
//!     .apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
//!     .unwrap();
//! let b = circuit
//!     .apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)))
//!     .unwrap();
//!
//! let mut dag = circuit.into_dag();
//! let gate = UnitaryGate::new(matrix::identity(2)).unwrap();
//! dag.replace_block(&[a, b], Instruction::unitary(gate, [QubitId(0), QubitId(1)]))
//!     .unwrap();
//!
//! assert_eq!(dag.num_ops(), 1);
//! dag.verify_integrity().unwrap();
//! ```

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod matrix;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, CustomGate, Gate, GateKind, StandardGate, UnitaryGate};
pub use instruction::{Instruction, InstructionKind};
pub use matrix::GateMatrix;
pub use parameter::ParameterExpression;
pub use qubit::{Clbit, ClbitId, Qubit, QubitId, RegisterSlot};
