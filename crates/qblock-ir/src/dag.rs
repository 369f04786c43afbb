//! DAG-based circuit representation.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex as PetNodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
///
/// Indices are stable: removing a node never renumbers the others, so a
/// list of indices taken before a rewrite stays valid for the nodes that
/// survive it.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, DagNode::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
///
/// Qubit wires order before classical wires; within a kind, wires order by
/// global ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// Sentinel pair of a wire.
#[derive(Debug, Clone, Copy)]
struct WireEnds {
    input: NodeIndex,
    output: NodeIndex,
}

/// DAG-based circuit representation.
///
/// The circuit is represented as a directed acyclic graph where:
/// - Nodes are either input nodes, output nodes, or operation nodes
/// - Edges represent wires (quantum or classical)
/// - Each wire has exactly one input and one output node
/// - Every operation node has one incoming and one outgoing edge per wire
///   it touches
///
/// ## Performance
///
/// The DAG maintains a `wire_front` index that maps each wire to the
/// last node before the output node, so `apply()` finds the predecessor
/// of a new operation in O(1) per wire.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    /// The underlying graph.
    graph: StableDiGraph<DagNode, DagEdge, u32>,
    /// Sentinels of every wire.
    wires: FxHashMap<WireId, WireEnds>,
    /// Number of qubit wires.
    num_qubits: usize,
    /// Wire front: maps each wire to the node just before the output node.
    wire_front: FxHashMap<WireId, NodeIndex>,
    /// Global phase of the circuit.
    global_phase: f64,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self::default()
    }

    fn add_wire(&mut self, wire: WireId) -> bool {
        if self.wires.contains_key(&wire) {
            return false;
        }
        let input = self.graph.add_node(DagNode::In(wire));
        let output = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(input, output, DagEdge { wire });
        self.wires.insert(wire, WireEnds { input, output });
        // Initially the input node is the predecessor of the output.
        self.wire_front.insert(wire, input);
        true
    }

    /// Add a qubit to the circuit.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.add_wire(WireId::Qubit(qubit)) {
            self.num_qubits += 1;
        }
    }

    /// Add a classical bit to the circuit.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        self.add_wire(WireId::Clbit(clbit));
    }

    /// Check gate arity and that every operand is a distinct, known wire.
    #[allow(clippy::cast_possible_truncation)]
    fn validate_instruction(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.wires.contains_key(&WireId::Qubit(qubit)) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if !self.wires.contains_key(&WireId::Clbit(clbit)) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Apply an instruction at the end of the circuit.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.validate_instruction(&instruction)?;

        let wires: Vec<WireId> = instruction.wires().collect();
        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for wire in wires {
            let out_node = self.wires[&wire].output;
            let prev_node = self.wire_front[&wire];

            let eid = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Missing edge from predecessor to output for wire {wire:?}"
                    ))
                })?;
            self.graph.remove_edge(eid);
            self.graph.add_edge(prev_node, op_node, DagEdge { wire });
            self.graph.add_edge(op_node, out_node, DagEdge { wire });
            self.wire_front.insert(wire, op_node);
        }

        Ok(op_node)
    }

    /// All nodes (sentinels included) in lexicographic topological order.
    ///
    /// Among nodes that are ready at the same time the lowest index goes
    /// first, which makes the order a pure function of the graph state.
    fn topological_nodes(&self) -> Vec<NodeIndex> {
        let mut in_degree: FxHashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|n| {
                (
                    n,
                    self.graph.edges_directed(n, Direction::Incoming).count(),
                )
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = in_degree
            .iter()
            .filter(|&(_, &d)| d == 0)
            .map(|(&n, _)| Reverse(n))
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                let target = edge.target();
                if let Some(d) = in_degree.get_mut(&target) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push(Reverse(target));
                    }
                }
            }
        }
        order
    }

    /// Iterate over operations in topological order.
    ///
    /// The order is deterministic for a fixed graph state and can be
    /// requested again at any time.
    pub fn topological_op_nodes(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.topological_nodes()
            .into_iter()
            .filter_map(|idx| self.get_instruction(idx).map(|inst| (idx, inst)))
    }

    /// Operation nodes in index order.
    pub fn op_nodes(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.get_instruction(idx).map(|inst| (idx, inst)))
    }

    fn op_neighbors(&self, node: NodeIndex, dir: Direction) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, dir)
            .filter(|&n| self.graph[n].is_op())
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// Operation nodes that feed `node` on any wire.
    pub fn predecessors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.op_neighbors(node, Direction::Incoming)
    }

    /// Operation nodes fed by `node` on any wire.
    pub fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.op_neighbors(node, Direction::Outgoing)
    }

    /// Operation nodes on `wire`, in wire order.
    pub fn wire_ops(&self, wire: WireId) -> IrResult<Vec<NodeIndex>> {
        let ends = self
            .wires
            .get(&wire)
            .ok_or_else(|| IrError::InvalidDag(format!("Unknown wire {wire:?}")))?;

        let mut ops = Vec::new();
        let mut current = ends.input;
        let max_steps = self.graph.node_count();
        while current != ends.output {
            current = self
                .graph
                .edges_directed(current, Direction::Outgoing)
                .find(|e| e.weight().wire == wire)
                .map(|e| e.target())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Wire {wire:?} is broken: no outgoing edge from node {current:?}"
                    ))
                })?;
            if current != ends.output {
                ops.push(current);
            }
            if ops.len() > max_steps {
                return Err(IrError::InvalidDag(format!(
                    "Wire {wire:?} has too many steps (possible cycle)"
                )));
            }
        }
        Ok(ops)
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(|n| n.instruction())
    }

    /// Remove an operation node from the DAG, reconnecting its wires.
    pub fn remove_op(&mut self, node: NodeIndex) -> IrResult<Instruction> {
        if self.get_instruction(node).is_none() {
            return Err(IrError::InvalidNode(node));
        }

        let incoming: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.source(), e.weight().wire))
            .collect();
        let outgoing: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), e.weight().wire))
            .collect();

        for (pred, wire) in &incoming {
            if self.wire_front.get(wire) == Some(&node) {
                self.wire_front.insert(*wire, *pred);
            }
        }

        let Some(DagNode::Op(instruction)) = self.graph.remove_node(node) else {
            return Err(IrError::InvalidNode(node));
        };

        for (pred, wire) in &incoming {
            for (succ, succ_wire) in &outgoing {
                if wire == succ_wire {
                    self.graph.add_edge(*pred, *succ, DagEdge { wire: *wire });
                }
            }
        }

        Ok(instruction)
    }

    /// Fail if some node outside `members` lies on a path between two members.
    ///
    /// Contracting such a set into one node would create a cycle. This also
    /// covers the per-wire case where an outside node consumes an
    /// intermediate result of the set.
    fn check_contiguous(&self, members: &FxHashSet<NodeIndex>) -> IrResult<()> {
        let mut seen: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut stack: Vec<NodeIndex> = Vec::new();
        for &node in members {
            for succ in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if !members.contains(&succ) && seen.insert(succ) {
                    stack.push(succ);
                }
            }
        }

        while let Some(outside) = stack.pop() {
            for succ in self.graph.neighbors_directed(outside, Direction::Outgoing) {
                if members.contains(&succ) {
                    return Err(IrError::NonContiguousBlock { outside });
                }
                if seen.insert(succ) {
                    stack.push(succ);
                }
            }
        }
        Ok(())
    }

    /// Replace a contiguous set of operation nodes by a single instruction.
    ///
    /// For every wire the block touches, the edge entering the block from
    /// outside and the edge leaving it are rewired to the new node, so every
    /// node that preceded (followed) a block member on a shared wire
    /// precedes (follows) the replacement. Nodes sharing no wire with the
    /// block are left alone.
    ///
    /// The replacement must act on exactly the wires of the block; its
    /// qubit order is kept as given. On error the DAG is unchanged.
    pub fn replace_block(
        &mut self,
        block: &[NodeIndex],
        instruction: Instruction,
    ) -> IrResult<NodeIndex> {
        if block.is_empty() {
            return Err(IrError::EmptyBlock);
        }

        let mut members: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut block_wires: Vec<WireId> = Vec::new();
        for &node in block {
            let inst = self.get_instruction(node).ok_or(IrError::InvalidNode(node))?;
            members.insert(node);
            for wire in inst.wires() {
                if !block_wires.contains(&wire) {
                    block_wires.push(wire);
                }
            }
        }

        block_wires.sort_unstable();
        let mut new_wires: Vec<WireId> = instruction.wires().collect();
        new_wires.sort_unstable();
        if new_wires != block_wires {
            return Err(IrError::WireMismatch {
                expected: block_wires,
                got: new_wires,
            });
        }
        self.validate_instruction(&instruction)?;
        self.check_contiguous(&members)?;

        // (wire, node before the block, node after the block)
        let mut boundary = Vec::with_capacity(block_wires.len());
        for &wire in &block_wires {
            let mut before = None;
            let mut after = None;
            for &node in &members {
                for edge in self.graph.edges_directed(node, Direction::Incoming) {
                    if edge.weight().wire == wire && !members.contains(&edge.source()) {
                        before = Some(edge.source());
                    }
                }
                for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                    if edge.weight().wire == wire && !members.contains(&edge.target()) {
                        after = Some(edge.target());
                    }
                }
            }
            match (before, after) {
                (Some(before), Some(after)) => boundary.push((wire, before, after)),
                _ => {
                    return Err(IrError::InvalidDag(format!(
                        "Block has no boundary edge on wire {wire:?}"
                    )));
                }
            }
        }

        let new_node = self.graph.add_node(DagNode::Op(instruction));
        for &node in &members {
            self.graph.remove_node(node);
        }
        for (wire, before, after) in boundary {
            self.graph.add_edge(before, new_node, DagEdge { wire });
            self.graph.add_edge(new_node, after, DagEdge { wire });
            if self
                .wire_front
                .get(&wire)
                .is_some_and(|front| members.contains(front))
            {
                self.wire_front.insert(wire, new_node);
            }
        }

        Ok(new_node)
    }

    /// Wires carried by a node, in instruction order.
    pub fn node_wires(&self, node: NodeIndex) -> Option<Vec<WireId>> {
        self.get_instruction(node).map(|inst| inst.wires().collect())
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.wires.len() - self.num_qubits
    }

    /// Get the number of operations.
    ///
    /// Computed as total nodes minus the two sentinels of every wire.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph
            .node_count()
            .saturating_sub(2 * self.wires.len())
    }

    /// Calculate the circuit depth.
    pub fn depth(&self) -> usize {
        let mut depths: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(self.graph.node_count(), Default::default());
        let mut max_depth = 0usize;

        for node in self.topological_nodes() {
            let max_pred_depth = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|n| depths.get(&n).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);

            let node_depth = if self.graph[node].is_op() {
                max_pred_depth + 1
            } else {
                max_pred_depth
            };
            max_depth = max_depth.max(node_depth);
            depths.insert(node, node_depth);
        }

        max_depth
    }

    /// Qubits in ascending ordinal order.
    pub fn qubits(&self) -> Vec<QubitId> {
        let mut qubits: Vec<QubitId> = self
            .wires
            .keys()
            .filter_map(|w| match w {
                WireId::Qubit(q) => Some(*q),
                WireId::Clbit(_) => None,
            })
            .collect();
        qubits.sort_unstable();
        qubits
    }

    /// Classical bits in ascending ordinal order.
    pub fn clbits(&self) -> Vec<ClbitId> {
        let mut clbits: Vec<ClbitId> = self
            .wires
            .keys()
            .filter_map(|w| match w {
                WireId::Clbit(c) => Some(*c),
                WireId::Qubit(_) => None,
            })
            .collect();
        clbits.sort_unstable();
        clbits
    }

    /// Input sentinel of a wire.
    #[inline]
    pub fn input_node(&self, wire: WireId) -> Option<NodeIndex> {
        self.wires.get(&wire).map(|e| e.input)
    }

    /// Output sentinel of a wire.
    #[inline]
    pub fn output_node(&self, wire: WireId) -> Option<NodeIndex> {
        self.wires.get(&wire).map(|e| e.output)
    }

    /// Get the global phase.
    #[inline]
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// Checks that:
    /// - The graph is acyclic
    /// - Every wire is an unbroken path from its In node to its Out node
    /// - Every operation node has exactly one incoming and one outgoing
    ///   edge per wire it touches, and no edge on any other wire
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("Graph contains a cycle".into()));
        }

        for &wire in self.wires.keys() {
            self.wire_ops(wire)?;
        }

        for (node, inst) in self.op_nodes() {
            let mut expected: Vec<WireId> = inst.wires().collect();
            expected.sort_unstable();
            for dir in [Direction::Incoming, Direction::Outgoing] {
                let mut got: Vec<WireId> = self
                    .graph
                    .edges_directed(node, dir)
                    .map(|e| e.weight().wire)
                    .collect();
                got.sort_unstable();
                if got != expected {
                    return Err(IrError::InvalidDag(format!(
                        "Node {node:?} ({}) has {dir:?} edges on {got:?}, expected {expected:?}",
                        inst.name()
                    )));
                }
            }
        }

        Ok(())
    }
}
