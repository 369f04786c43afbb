//! Target-agnostic compilation passes.
//!
//! These passes operate on the DAG structure. Block consolidation may
//! consult the target basis to decide whether a lone gate is worth
//! rewriting, but never requires one.

pub mod consolidate;
pub mod verification;

pub use consolidate::{
    BlockOutcome, ConsolidateBlocks, ConsolidationSummary, block_wires, consolidate,
};
pub use verification::{DagIntegrityCheck, IntegrityReport};
