//! Verification passes for ensuring compilation correctness.

use tracing::debug;

use qblock_ir::CircuitDag;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Shape of the DAG after it passed the integrity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Number of operations.
    pub num_ops: usize,
    /// Circuit depth.
    pub depth: usize,
}

/// Analysis pass that checks the DAG is still well formed.
///
/// Meant to run after rewriting passes: every wire must run unbroken from
/// its input to its output, every operation must have exactly one edge in
/// and out per wire it touches, and the graph must be acyclic. On success
/// an [`IntegrityReport`] is stored in the property set.
pub struct DagIntegrityCheck;

impl Pass for DagIntegrityCheck {
    fn name(&self) -> &'static str {
        "dag_integrity_check"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        dag.verify_integrity()
            .map_err(|e| CompileError::PassFailed {
                name: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let report = IntegrityReport {
            num_ops: dag.num_ops(),
            depth: dag.depth(),
        };
        debug!("DAG integrity verified: {:?}", report);
        properties.insert(report);
        Ok(())
    }
}
