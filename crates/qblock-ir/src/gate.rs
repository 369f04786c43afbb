//! Quantum gate types.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::matrix::{self, GateMatrix};
use crate::parameter::ParameterExpression;

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Y axis.
    Ry(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),
    /// Phase gate.
    P(ParameterExpression),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(
        ParameterExpression,
        ParameterExpression,
        ParameterExpression,
    ),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,
    /// Controlled rotation around Z.
    CRz(ParameterExpression),
    /// Controlled phase gate.
    CP(ParameterExpression),
    /// ZZ rotation gate.
    RZZ(ParameterExpression),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U(_, _, _) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Check if this gate has unbound parameters.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p)
            | StandardGate::RZZ(p) => vec![p],

            StandardGate::U(a, b, c) => vec![a, b, c],

            _ => vec![],
        }
    }

    /// Unitary matrix of this gate in the little-endian qargs convention.
    ///
    /// Returns `None` while any parameter is still symbolic.
    pub fn matrix(&self) -> Option<GateMatrix> {
        let m = match self {
            StandardGate::I => matrix::identity(1),
            StandardGate::X => matrix::x(),
            StandardGate::Y => matrix::y(),
            StandardGate::Z => matrix::z(),
            StandardGate::H => matrix::h(),
            StandardGate::S => matrix::p(std::f64::consts::FRAC_PI_2),
            StandardGate::Sdg => matrix::p(-std::f64::consts::FRAC_PI_2),
            StandardGate::T => matrix::p(std::f64::consts::FRAC_PI_4),
            StandardGate::Tdg => matrix::p(-std::f64::consts::FRAC_PI_4),
            StandardGate::SX => matrix::sx(),
            StandardGate::SXdg => matrix::sxdg(),
            StandardGate::Rx(t) => matrix::rx(t.as_f64()?),
            StandardGate::Ry(t) => matrix::ry(t.as_f64()?),
            StandardGate::Rz(t) => matrix::rz(t.as_f64()?),
            StandardGate::P(l) => matrix::p(l.as_f64()?),
            StandardGate::U(theta, phi, lambda) => {
                matrix::u(theta.as_f64()?, phi.as_f64()?, lambda.as_f64()?)
            }
            StandardGate::CX => matrix::cx(),
            StandardGate::CY => matrix::cy(),
            StandardGate::CZ => matrix::cz(),
            StandardGate::CH => matrix::ch(),
            StandardGate::Swap => matrix::swap(),
            StandardGate::ISwap => matrix::iswap(),
            StandardGate::CRz(t) => matrix::crz(t.as_f64()?),
            StandardGate::CP(l) => matrix::cp(l.as_f64()?),
            StandardGate::RZZ(t) => matrix::rzz(t.as_f64()?),
            StandardGate::CCX => matrix::ccx(),
            StandardGate::CSwap => matrix::cswap(),
        };
        Some(m)
    }
}

/// A gate defined directly by its unitary matrix.
///
/// This is the operation a consolidated block becomes. The matrix is
/// expressed in the little-endian convention over the instruction's qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitaryGate {
    num_qubits: u32,
    matrix: GateMatrix,
}

impl UnitaryGate {
    /// Name shared by every unitary gate.
    pub const NAME: &'static str = "unitary";

    /// Wrap a `2^n × 2^n` matrix.
    pub fn new(matrix: GateMatrix) -> IrResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols || rows < 2 || !rows.is_power_of_two() {
            let expected = rows.max(2).next_power_of_two();
            return Err(IrError::MatrixShape {
                gate_name: Self::NAME.into(),
                num_qubits: expected.ilog2(),
                expected,
                rows,
                cols,
            });
        }
        Ok(Self {
            num_qubits: rows.ilog2(),
            matrix,
        })
    }

    /// Number of qubits the matrix acts on.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The wrapped matrix.
    pub fn matrix(&self) -> &GateMatrix {
        &self.matrix
    }
}

/// A quantum gate, either standard, custom, or an explicit unitary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A custom user-defined gate.
    Custom(CustomGate),
    /// A gate given by its matrix.
    Unitary(UnitaryGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
            GateKind::Unitary(_) => UnitaryGate::NAME,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
            GateKind::Unitary(g) => g.num_qubits(),
        }
    }

    /// Matrix of the gate, borrowed where the gate already stores one.
    pub fn matrix(&self) -> Option<Cow<'_, GateMatrix>> {
        match self {
            GateKind::Standard(g) => g.matrix().map(Cow::Owned),
            GateKind::Custom(g) => g.matrix.as_ref().map(Cow::Borrowed),
            GateKind::Unitary(g) => Some(Cow::Borrowed(g.matrix())),
        }
    }
}

/// A user-defined gate.
///
/// The matrix is stored as supplied; its shape is only checked by the
/// passes that consume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on.
    pub num_qubits: u32,
    /// Parameters of the gate.
    pub params: Vec<ParameterExpression>,
    /// Optional unitary matrix (little-endian over the gate's qargs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<GateMatrix>,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
            matrix: None,
        }
    }

    /// Add parameters to the gate.
    #[must_use]
    pub fn with_params(mut self, params: Vec<ParameterExpression>) -> Self {
        self.params = params;
        self
    }

    /// Attach a unitary matrix to the gate.
    #[must_use]
    pub fn with_matrix(mut self, matrix: GateMatrix) -> Self {
        self.matrix = Some(matrix);
        self
    }
}

/// Classical condition for conditional gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// The name of the classical register.
    pub register: String,
    /// The value to compare against.
    pub value: u64,
}

impl ClassicalCondition {
    /// Create a new classical condition.
    pub fn new(register: impl Into<String>, value: u64) -> Self {
        Self {
            register: register.into(),
            value,
        }
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional classical condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self::from_kind(GateKind::Standard(gate))
    }

    /// Create a new gate from a custom gate.
    pub fn custom(gate: CustomGate) -> Self {
        Self::from_kind(GateKind::Custom(gate))
    }

    /// Create a new gate from a unitary.
    pub fn unitary(gate: UnitaryGate) -> Self {
        Self::from_kind(GateKind::Unitary(gate))
    }

    fn from_kind(kind: GateKind) -> Self {
        Self {
            kind,
            label: None,
            condition: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a classical condition to the gate.
    #[must_use]
    pub fn with_condition(mut self, condition: ClassicalCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::custom(gate)
    }
}

impl From<UnitaryGate> for Gate {
    fn from(gate: UnitaryGate) -> Self {
        Gate::unitary(gate)
    }
}
