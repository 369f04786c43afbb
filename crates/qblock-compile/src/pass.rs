//! Pass trait and types for compilation passes.

use qblock_ir::CircuitDag;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the DAG.
    Analysis,
    /// Transformation pass that modifies the DAG.
    Transformation,
}

/// A compilation pass that operates on a circuit DAG.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given DAG.
    ///
    /// Analysis passes must leave the DAG untouched and report through the
    /// `PropertySet`. Transformation passes may also consume properties
    /// that their rewrite invalidates.
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _dag: &CircuitDag, _properties: &PropertySet) -> bool {
        true
    }
}
