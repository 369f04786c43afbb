//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use qblock_ir::CircuitDag;

use crate::config::ConsolidateConfig;
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{ConsolidateBlocks, DagIntegrityCheck};
use crate::property::{BasisGates, Block, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            dag.depth(),
            dag.num_ops()
        );

        Ok(())
    }

    /// Names of the passes, in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a consolidation pipeline.
///
/// The pipeline is [`ConsolidateBlocks`] followed by a
/// [`DagIntegrityCheck`].
pub struct PassManagerBuilder {
    config: ConsolidateConfig,
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ConsolidateConfig::default(),
            properties: PropertySet::new(),
        }
    }

    /// Set the consolidation settings.
    #[must_use]
    pub fn with_consolidate_config(mut self, config: ConsolidateConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the target basis gates.
    #[must_use]
    pub fn with_basis_gates(mut self, basis_gates: BasisGates) -> Self {
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Set the blocks to consolidate.
    #[must_use]
    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.properties.block_list = Some(blocks);
        self
    }

    /// Set the initial properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        pm.add_pass(ConsolidateBlocks::with_config(self.config));
        pm.add_pass(DagIntegrityCheck);
        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
