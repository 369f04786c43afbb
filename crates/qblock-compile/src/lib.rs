//! qblock compilation framework
//!
//! Pass-based rewriting of [`qblock_ir::CircuitDag`]s. The centrepiece is
//! [`ConsolidateBlocks`](passes::ConsolidateBlocks), which collapses blocks
//! of operations found by an external collector into single `unitary`
//! operations while keeping every ordering constraint of the DAG.
//!
//! # Architecture
//!
//! ```text
//! CircuitDag + PropertySet { block_list, basis_gates }
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │
//! └─────────────┘
//!       │
//!       ├── ConsolidateBlocks   (block list → unitary nodes)
//!       └── DagIntegrityCheck   (wires intact, graph acyclic)
//!       │
//!       ▼
//! CircuitDag (same wires, fewer operations)
//! ```
//!
//! # Example
//!
//! ```rust
//! use qblock_compile::PassManagerBuilder;
//! use qblock_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("demo", 2, 0);
//! circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
//! let mut dag = circuit.into_dag();
//!
//! // A block collector would normally produce this list.
//! let block: Vec<_> = dag.topological_op_nodes().map(|(node, _)| node).collect();
//!
//! let (pm, mut props) = PassManagerBuilder::new().with_blocks(vec![block]).build();
//! pm.run(&mut dag, &mut props).unwrap();
//!
//! assert_eq!(dag.num_ops(), 1);
//! ```
//!
//! # Custom Passes
//!
//! ```rust
//! use qblock_compile::{CompileResult, Pass, PassKind, PropertySet};
//! use qblock_ir::CircuitDag;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         Ok(())
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod pass;
pub mod property;
pub mod unitary;

// Built-in passes
pub mod passes;

pub use config::{ConsolidateConfig, Tolerance, TrivialBlockPolicy};
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{ConsolidateBlocks, ConsolidationSummary, consolidate};
pub use property::{BasisGates, Block, PropertySet};
