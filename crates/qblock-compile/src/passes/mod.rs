//! Built-in compilation passes.

pub mod agnostic;

pub use agnostic::{
    BlockOutcome, ConsolidateBlocks, ConsolidationSummary, DagIntegrityCheck, IntegrityReport,
    block_wires, consolidate,
};
