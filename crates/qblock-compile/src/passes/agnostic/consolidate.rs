//! Block consolidation pass.
//!
//! Collapses each externally collected block of operations into a single
//! `unitary` operation over the block's wires, sorted by global ordinal.

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, instrument};

use qblock_ir::{
    CircuitDag, GateKind, GateMatrix, Instruction, InstructionKind, NodeIndex, QubitId,
    UnitaryGate,
};

use crate::config::{ConsolidateConfig, TrivialBlockPolicy};
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{BasisGates, Block, PropertySet};
use crate::unitary::{compose_block, identity_phase};

/// What happened to one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Single-operation block left as it was.
    KeptTrivial,
    /// Block replaced by the unitary at this node.
    Consolidated(NodeIndex),
    /// Block multiplied out to the identity and was dropped.
    RemovedIdentity,
}

/// Result of a consolidation run, one outcome per input block in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationSummary {
    /// Per-block outcomes.
    pub outcomes: Vec<BlockOutcome>,
}

impl ConsolidationSummary {
    /// Nodes created for consolidated blocks, in block order.
    pub fn consolidated_nodes(&self) -> Vec<NodeIndex> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                BlockOutcome::Consolidated(node) => Some(*node),
                _ => None,
            })
            .collect()
    }

    /// Number of consolidated blocks.
    pub fn num_consolidated(&self) -> usize {
        self.count(|o| matches!(o, BlockOutcome::Consolidated(_)))
    }

    /// Number of blocks left untouched.
    pub fn num_kept(&self) -> usize {
        self.count(|o| matches!(o, BlockOutcome::KeptTrivial))
    }

    /// Number of identity blocks removed.
    pub fn num_removed(&self) -> usize {
        self.count(|o| matches!(o, BlockOutcome::RemovedIdentity))
    }

    fn count(&self, pred: impl Fn(&BlockOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Planned rewrite of one block, computed before the DAG is touched.
enum BlockPlan {
    Keep,
    Replace {
        wires: Vec<QubitId>,
        unitary: GateMatrix,
    },
    Remove {
        wires: Vec<QubitId>,
        unitary: GateMatrix,
        phase: f64,
    },
}

/// Block consolidation pass.
///
/// Reads `block_list` from the [`PropertySet`], replaces every block with a
/// `unitary` operation whose matrix is the product of the block's gate
/// matrices, and clears the list afterwards since its node indices no
/// longer describe the DAG. A [`ConsolidationSummary`] is stored in the
/// property set.
///
/// The rewrite is all-or-nothing: every block is checked and its matrix
/// computed before anything is modified, and the substitutions are applied
/// to a copy that only replaces the caller's DAG once all of them succeed.
#[derive(Debug, Clone, Default)]
pub struct ConsolidateBlocks {
    config: ConsolidateConfig,
    basis_gates: Option<BasisGates>,
}

impl ConsolidateBlocks {
    /// Create a pass with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pass that consolidates every block, single gates included.
    pub fn force() -> Self {
        Self::with_config(ConsolidateConfig {
            force_consolidate: true,
            ..ConsolidateConfig::default()
        })
    }

    /// Create a pass with the given configuration.
    pub fn with_config(config: ConsolidateConfig) -> Self {
        Self {
            config,
            basis_gates: None,
        }
    }

    /// Judge single-gate blocks against this basis instead of the one in
    /// the property set.
    #[must_use]
    pub fn with_basis_gates(mut self, basis_gates: BasisGates) -> Self {
        self.basis_gates = Some(basis_gates);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ConsolidateConfig {
        &self.config
    }

    /// Consolidate `blocks` in `dag`.
    pub fn consolidate(
        &self,
        dag: &mut CircuitDag,
        blocks: &[Block],
    ) -> CompileResult<ConsolidationSummary> {
        self.consolidate_with_basis(dag, blocks, self.basis_gates.as_ref())
    }

    #[instrument(skip_all, fields(blocks = blocks.len()))]
    fn consolidate_with_basis(
        &self,
        dag: &mut CircuitDag,
        blocks: &[Block],
        basis: Option<&BasisGates>,
    ) -> CompileResult<ConsolidationSummary> {
        Self::validate_blocks(dag, blocks)?;

        let shared: &CircuitDag = dag;
        let plans: Vec<CompileResult<BlockPlan>> = blocks
            .par_iter()
            .map(|block| self.plan_block(shared, block, basis))
            .collect();
        // first failing block in input order
        let plans = plans.into_iter().collect::<CompileResult<Vec<_>>>()?;

        if plans.iter().all(|p| matches!(p, BlockPlan::Keep)) {
            debug!("No block needs rewriting");
            return Ok(ConsolidationSummary {
                outcomes: vec![BlockOutcome::KeptTrivial; blocks.len()],
            });
        }

        let mut working = dag.clone();
        let mut outcomes = Vec::with_capacity(blocks.len());
        for (block, plan) in blocks.iter().zip(plans) {
            let outcome = match plan {
                BlockPlan::Keep => BlockOutcome::KeptTrivial,
                BlockPlan::Replace { wires, unitary } => {
                    let width = wires.len();
                    let node = working.replace_block(block, Self::unitary_op(wires, unitary)?)?;
                    debug!(
                        "Consolidated {} operations on {} wires into {:?}",
                        block.len(),
                        width,
                        node
                    );
                    BlockOutcome::Consolidated(node)
                }
                BlockPlan::Remove {
                    wires,
                    unitary,
                    phase,
                } => {
                    // substitute first so the block is checked like any other
                    let node = working.replace_block(block, Self::unitary_op(wires, unitary)?)?;
                    working.remove_op(node)?;
                    working.set_global_phase(working.global_phase() + phase);
                    debug!(
                        "Removed identity block of {} operations, global phase {:+.6}",
                        block.len(),
                        phase
                    );
                    BlockOutcome::RemovedIdentity
                }
            };
            outcomes.push(outcome);
        }

        *dag = working;
        Ok(ConsolidationSummary { outcomes })
    }

    fn unitary_op(wires: Vec<QubitId>, unitary: GateMatrix) -> CompileResult<Instruction> {
        Ok(Instruction::unitary(UnitaryGate::new(unitary)?, wires))
    }

    /// Reject empty blocks, non-operation nodes and blocks sharing a node.
    fn validate_blocks(dag: &CircuitDag, blocks: &[Block]) -> CompileResult<()> {
        let mut seen: FxHashSet<NodeIndex> = FxHashSet::default();
        for (i, block) in blocks.iter().enumerate() {
            if block.is_empty() {
                return Err(CompileError::InvalidBlock(format!("block {i} is empty")));
            }
            let mut in_block: FxHashSet<NodeIndex> = FxHashSet::default();
            for &node in block {
                if dag.get_instruction(node).is_none() {
                    return Err(CompileError::InvalidBlock(format!(
                        "node {node:?} in block {i} is not an operation of the DAG"
                    )));
                }
                if !in_block.insert(node) {
                    return Err(CompileError::InvalidBlock(format!(
                        "node {node:?} appears twice in block {i}"
                    )));
                }
                if !seen.insert(node) {
                    return Err(CompileError::OverlappingBlocks { node });
                }
            }
        }
        Ok(())
    }

    fn plan_block(
        &self,
        dag: &CircuitDag,
        block: &[NodeIndex],
        basis: Option<&BasisGates>,
    ) -> CompileResult<BlockPlan> {
        if self.is_trivial(dag, block, basis) {
            debug!("Keeping single-operation block {:?}", block);
            return Ok(BlockPlan::Keep);
        }

        let wires = block_wires(dag, block);
        let tolerance = &self.config.tolerance;
        let unitary = compose_block(dag, block, &wires, tolerance)?;

        if self.config.remove_identity_blocks {
            if let Some(phase) = identity_phase(&unitary, tolerance) {
                return Ok(BlockPlan::Remove {
                    wires,
                    unitary,
                    phase,
                });
            }
        }
        Ok(BlockPlan::Replace { wires, unitary })
    }

    fn is_trivial(
        &self,
        dag: &CircuitDag,
        block: &[NodeIndex],
        basis: Option<&BasisGates>,
    ) -> bool {
        let policy = self.config.effective_policy();
        if policy == TrivialBlockPolicy::ConsolidateAll || block.len() != 1 {
            return false;
        }
        match policy {
            TrivialBlockPolicy::KeepAnySingleGate => true,
            _ => dag
                .get_instruction(block[0])
                .is_some_and(|inst| is_basic(inst, basis)),
        }
    }
}

/// Whether a lone instruction is already in a form the target accepts.
///
/// With a basis, membership decides. Without one, standard gates and
/// existing unitaries count as basic; custom gates do not.
fn is_basic(inst: &Instruction, basis: Option<&BasisGates>) -> bool {
    if let Some(basis) = basis {
        return basis.contains(inst.name());
    }
    match &inst.kind {
        InstructionKind::Gate(gate) => {
            matches!(gate.kind, GateKind::Standard(_) | GateKind::Unitary(_))
        }
        _ => false,
    }
}

/// Qubits touched by `block`, ascending by global ordinal.
pub fn block_wires(dag: &CircuitDag, block: &[NodeIndex]) -> Vec<QubitId> {
    let mut wires: Vec<QubitId> = block
        .iter()
        .filter_map(|&node| dag.get_instruction(node))
        .flat_map(|inst| inst.qubits.iter().copied())
        .collect();
    wires.sort_unstable();
    wires.dedup();
    wires
}

/// Consolidate `blocks` with the default policy, or every block when
/// `force_consolidate` is set.
pub fn consolidate(
    dag: &mut CircuitDag,
    blocks: &[Block],
    force_consolidate: bool,
) -> CompileResult<ConsolidationSummary> {
    let pass = if force_consolidate {
        ConsolidateBlocks::force()
    } else {
        ConsolidateBlocks::new()
    };
    pass.consolidate(dag, blocks)
}

impl Pass for ConsolidateBlocks {
    fn name(&self) -> &'static str {
        "ConsolidateBlocks"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let Some(blocks) = properties.block_list.as_ref() else {
            return Ok(());
        };
        let basis = self.basis_gates.as_ref().or(properties.basis_gates.as_ref());
        let summary = self.consolidate_with_basis(dag, blocks, basis)?;

        debug!(
            "ConsolidateBlocks: {} consolidated, {} kept, {} removed",
            summary.num_consolidated(),
            summary.num_kept(),
            summary.num_removed()
        );
        properties.block_list = None;
        properties.insert(summary);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.block_list.is_some()
    }
}
