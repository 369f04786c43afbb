//! High-level circuit builder API.

use crate::dag::{CircuitDag, NodeIndex};
use crate::error::IrResult;
use crate::gate::{Gate, StandardGate, UnitaryGate};
use crate::instruction::Instruction;
use crate::parameter::ParameterExpression;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// A quantum circuit.
///
/// Thin builder over a [`CircuitDag`]. Qubit ids are allocated in creation
/// order across all registers, so a qubit's id is its global ordinal.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    dag: CircuitDag,
    next_qubit_id: u32,
    next_clbit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            dag: CircuitDag::new(),
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    fn push_qubit(&mut self, register: Option<(&str, u32)>) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        let qubit = match register {
            Some((name, index)) => Qubit::with_register(id, name, index),
            None => Qubit::new(id),
        };
        self.qubits.push(qubit);
        self.dag.add_qubit(id);
        id
    }

    fn push_clbit(&mut self, register: Option<(&str, u32)>) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        let clbit = match register {
            Some((name, index)) => Clbit::with_register(id, name, index),
            None => Clbit::new(id),
        };
        self.clbits.push(clbit);
        self.dag.add_clbit(id);
        id
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        self.push_qubit(None)
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        (0..size)
            .map(|i| self.push_qubit(Some((&name, i))))
            .collect()
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        self.push_clbit(None)
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        (0..size)
            .map(|i| self.push_clbit(Some((&name, i))))
            .collect()
    }

    /// Append an instruction and return its node.
    ///
    /// Use this instead of the fluent helpers when the node index is needed,
    /// e.g. to assemble a block by hand.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.dag.apply(instruction)
    }

    fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    fn push_1q(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(gate, qubit))
    }

    fn push_2q(&mut self, gate: StandardGate, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(gate, a, b))
    }

    // =========================================================================
    // Gate helpers
    // =========================================================================

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::H, qubit)
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::X, qubit)
    }

    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::Y, qubit)
    }

    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::Z, qubit)
    }

    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::S, qubit)
    }

    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::T, qubit)
    }

    /// Square root of X.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::SX, qubit)
    }

    pub fn rx(&mut self, theta: impl Into<ParameterExpression>, q: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::Rx(theta.into()), q)
    }

    pub fn ry(&mut self, theta: impl Into<ParameterExpression>, q: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::Ry(theta.into()), q)
    }

    pub fn rz(&mut self, theta: impl Into<ParameterExpression>, q: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::Rz(theta.into()), q)
    }

    /// Phase gate, `diag(1, e^{iλ})`.
    pub fn p(&mut self, lambda: impl Into<ParameterExpression>, q: QubitId) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::P(lambda.into()), q)
    }

    /// Generic single-qubit rotation `U(θ, φ, λ)`.
    pub fn u(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        q: QubitId,
    ) -> IrResult<&mut Self> {
        self.push_1q(StandardGate::U(theta.into(), phi.into(), lambda.into()), q)
    }

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push_2q(StandardGate::CX, control, target)
    }

    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push_2q(StandardGate::CZ, control, target)
    }

    pub fn swap(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.push_2q(StandardGate::Swap, a, b)
    }

    /// Toffoli; `target` is flipped when both controls are set.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    /// Fredkin; swaps `a` and `b` when `control` is set.
    pub fn cswap(&mut self, control: QubitId, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(StandardGate::CSwap, [control, a, b]))
    }

    /// Explicit matrix on `qubits`, little-endian in the given order.
    pub fn unitary(
        &mut self,
        gate: UnitaryGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::unitary(gate, qubits))
    }

    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::reset(qubit))
    }

    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Consume the circuit and return the DAG.
    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }

    /// Create a circuit from a DAG.
    ///
    /// Register membership is not recorded in the DAG, so the rebuilt
    /// qubits and clbits are anonymous.
    pub fn from_dag(dag: CircuitDag) -> Self {
        let qubits: Vec<_> = dag.qubits().into_iter().map(Qubit::new).collect();
        let clbits: Vec<_> = dag.clbits().into_iter().map(Clbit::new).collect();
        let next_qubit_id = qubits.last().map_or(0, |q| q.id.0 + 1);
        let next_clbit_id = clbits.last().map_or(0, |c| c.id.0 + 1);

        Self {
            name: "circuit".into(),
            qubits,
            clbits,
            dag,
            next_qubit_id,
            next_clbit_id,
        }
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        let (q0, q1) = (QubitId(0), QubitId(1));

        circuit
            .h(q0)?
            .cx(q0, q1)?
            .measure(q0, ClbitId(0))?
            .measure(q1, ClbitId(1))?;

        Ok(circuit)
    }
}
