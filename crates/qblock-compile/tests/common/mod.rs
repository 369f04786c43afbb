//! Shared helpers for consolidation tests.
//!
//! [`Statevector`] is a small reference simulator with its own gate kernels,
//! so circuit unitaries computed here do not depend on the matrix catalog
//! or the embedding code under test.

#![allow(dead_code)]

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use ndarray::Array2;
use num_complex::Complex64;

use qblock_compile::Tolerance;
use qblock_compile::unitary::process_fidelity;
use qblock_ir::{CircuitDag, GateKind, Instruction, InstructionKind, QubitId, StandardGate};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A statevector over a fixed list of wires; `wires[i]` is bit `i`.
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    wires: Vec<QubitId>,
}

impl Statevector {
    /// Basis state `index`.
    pub fn basis(wires: &[QubitId], index: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << wires.len()];
        amplitudes[index] = ONE;
        Self {
            amplitudes,
            wires: wires.to_vec(),
        }
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    fn bit(&self, qubit: QubitId) -> usize {
        self.wires
            .iter()
            .position(|&w| w == qubit)
            .expect("qubit not simulated")
    }

    /// Apply `[[a, b], [c, d]]` to one bit, on the states where every
    /// `control` bit is set.
    fn apply_1q(&mut self, target: usize, controls: &[usize], m: [Complex64; 4]) {
        let t = 1usize << target;
        let cmask: usize = controls.iter().map(|&c| 1usize << c).sum();
        for i in 0..self.amplitudes.len() {
            if i & t == 0 && i & cmask == cmask {
                let j = i | t;
                let (x0, x1) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = m[0] * x0 + m[1] * x1;
                self.amplitudes[j] = m[2] * x0 + m[3] * x1;
            }
        }
    }

    /// Swap two bits on the states where every `control` bit is set.
    fn apply_swap(&mut self, a: usize, b: usize, controls: &[usize]) {
        let cmask: usize = controls.iter().map(|&c| 1usize << c).sum();
        for i in 0..self.amplitudes.len() {
            if i & cmask == cmask && (i >> a) & 1 == 1 && (i >> b) & 1 == 0 {
                let j = i ^ (1 << a) ^ (1 << b);
                self.amplitudes.swap(i, j);
            }
        }
    }

    /// Multiply every amplitude by `phase(i)`.
    fn apply_diagonal(&mut self, phase: impl Fn(usize) -> Complex64) {
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= phase(i);
        }
    }

    /// Apply a dense matrix, little-endian over `bits`.
    fn apply_matrix(&mut self, bits: &[usize], m: &Array2<Complex64>) {
        let local_dim = 1usize << bits.len();
        let mask: usize = bits.iter().map(|&b| 1usize << b).sum();
        let mut out = vec![ZERO; self.amplitudes.len()];
        for (i, &amp) in self.amplitudes.iter().enumerate() {
            if amp == ZERO {
                continue;
            }
            let col = bits
                .iter()
                .enumerate()
                .fold(0, |acc, (j, &b)| acc | (((i >> b) & 1) << j));
            for row in 0..local_dim {
                let target = bits
                    .iter()
                    .enumerate()
                    .fold(i & !mask, |acc, (j, &b)| acc | (((row >> j) & 1) << b));
                out[target] += m[[row, col]] * amp;
            }
        }
        self.amplitudes = out;
    }

    /// Apply one instruction. Non-unitary instructions are rejected.
    pub fn apply(&mut self, inst: &Instruction) {
        let bits: Vec<usize> = inst.qubits.iter().map(|&q| self.bit(q)).collect();
        let gate = match &inst.kind {
            InstructionKind::Gate(gate) => gate,
            InstructionKind::Barrier => return,
            other => panic!("cannot simulate {other:?}"),
        };
        match &gate.kind {
            GateKind::Standard(g) => self.apply_standard(g, &bits),
            GateKind::Unitary(u) => self.apply_matrix(&bits, u.matrix()),
            GateKind::Custom(c) => {
                let m = c.matrix.as_ref().expect("opaque custom gate");
                self.apply_matrix(&bits, m);
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn apply_standard(&mut self, gate: &StandardGate, q: &[usize]) {
        let angle = |p: &qblock_ir::ParameterExpression| p.as_f64().expect("bound parameter");
        let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
        let phase = |theta: f64| Complex64::from_polar(1.0, theta);
        let x = [ZERO, ONE, ONE, ZERO];
        let y = [ZERO, -I, I, ZERO];
        let z = [ONE, ZERO, ZERO, -ONE];
        let h = [s, s, s, -s];
        let rz = |t: f64| [phase(-t / 2.0), ZERO, ZERO, phase(t / 2.0)];

        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_1q(q[0], &[], x),
            StandardGate::Y => self.apply_1q(q[0], &[], y),
            StandardGate::Z => self.apply_1q(q[0], &[], z),
            StandardGate::H => self.apply_1q(q[0], &[], h),
            StandardGate::S => self.apply_1q(q[0], &[], [ONE, ZERO, ZERO, I]),
            StandardGate::Sdg => self.apply_1q(q[0], &[], [ONE, ZERO, ZERO, -I]),
            StandardGate::T => self.apply_1q(q[0], &[], [ONE, ZERO, ZERO, phase(PI / 4.0)]),
            StandardGate::Tdg => self.apply_1q(q[0], &[], [ONE, ZERO, ZERO, phase(-PI / 4.0)]),
            StandardGate::SX | StandardGate::SXdg => {
                let (a, b) = (Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5));
                let m = if matches!(gate, StandardGate::SX) {
                    [a, b, b, a]
                } else {
                    [b, a, a, b]
                };
                self.apply_1q(q[0], &[], m);
            }
            StandardGate::Rx(t) => {
                let t = angle(t);
                let (c, s) = (Complex64::new((t / 2.0).cos(), 0.0), -I * (t / 2.0).sin());
                self.apply_1q(q[0], &[], [c, s, s, c]);
            }
            StandardGate::Ry(t) => {
                let t = angle(t);
                let (c, s) = (
                    Complex64::new((t / 2.0).cos(), 0.0),
                    Complex64::new((t / 2.0).sin(), 0.0),
                );
                self.apply_1q(q[0], &[], [c, -s, s, c]);
            }
            StandardGate::Rz(t) => self.apply_1q(q[0], &[], rz(angle(t))),
            StandardGate::P(l) => self.apply_1q(q[0], &[], [ONE, ZERO, ZERO, phase(angle(l))]),
            StandardGate::U(t, p, l) => {
                let (t, p, l) = (angle(t), angle(p), angle(l));
                let (c, s) = ((t / 2.0).cos(), (t / 2.0).sin());
                self.apply_1q(
                    q[0],
                    &[],
                    [
                        Complex64::new(c, 0.0),
                        -Complex64::from_polar(s, l),
                        Complex64::from_polar(s, p),
                        Complex64::from_polar(c, p + l),
                    ],
                );
            }
            StandardGate::CX => self.apply_1q(q[1], &[q[0]], x),
            StandardGate::CY => self.apply_1q(q[1], &[q[0]], y),
            StandardGate::CZ => self.apply_1q(q[1], &[q[0]], z),
            StandardGate::CH => self.apply_1q(q[1], &[q[0]], h),
            StandardGate::CP(l) => {
                self.apply_1q(q[1], &[q[0]], [ONE, ZERO, ZERO, phase(angle(l))]);
            }
            StandardGate::CRz(t) => self.apply_1q(q[1], &[q[0]], rz(angle(t))),
            StandardGate::Swap => self.apply_swap(q[0], q[1], &[]),
            StandardGate::ISwap => {
                let (a, b) = (q[0], q[1]);
                self.apply_swap(a, b, &[]);
                self.apply_diagonal(|i| if (i >> a) & 1 != (i >> b) & 1 { I } else { ONE });
            }
            StandardGate::RZZ(t) => {
                let (a, b, t) = (q[0], q[1], angle(t));
                self.apply_diagonal(|i| {
                    if (i >> a) & 1 == (i >> b) & 1 {
                        phase(-t / 2.0)
                    } else {
                        phase(t / 2.0)
                    }
                });
            }
            StandardGate::CCX => self.apply_1q(q[2], &[q[0], q[1]], x),
            StandardGate::CSwap => self.apply_swap(q[1], q[2], &[q[0]]),
        }
    }
}

/// Unitary of the whole DAG over `wires`, built column by column from
/// basis-state simulations.
pub fn dag_unitary(dag: &CircuitDag, wires: &[QubitId]) -> Array2<Complex64> {
    let ops: Vec<&Instruction> = dag.topological_op_nodes().map(|(_, inst)| inst).collect();
    let dim = 1usize << wires.len();
    let mut unitary = Array2::zeros((dim, dim));
    for col in 0..dim {
        let mut state = Statevector::basis(wires, col);
        for inst in &ops {
            state.apply(inst);
        }
        for (row, &amp) in state.amplitudes().iter().enumerate() {
            unitary[[row, col]] = amp;
        }
    }
    unitary
}

/// Assert two unitaries agree up to global phase under `tolerance`.
pub fn assert_equivalent(
    tolerance: &Tolerance,
    expected: &Array2<Complex64>,
    actual: &Array2<Complex64>,
) {
    assert_eq!(expected.dim(), actual.dim(), "unitary dimensions differ");
    assert!(
        tolerance.equivalent(expected, actual),
        "process fidelity {} below 1 - {}",
        process_fidelity(expected, actual),
        tolerance.fidelity
    );
}
