//! Dense unitary utilities for block consolidation.
//!
//! Matrices are little-endian throughout: in a gate's own matrix `qargs[j]`
//! is bit `j` of the basis index, and in a block matrix wire `W[i]` is bit
//! `i`. [`embed`] moves a gate matrix from the first space into the second.

use approx::abs_diff_eq;
use ndarray::Array2;
use num_complex::Complex64;

use qblock_ir::{CircuitDag, GateMatrix, NodeIndex, QubitId};

use crate::config::Tolerance;
use crate::error::{CompileError, CompileResult};

/// Gather the bits of `index` at `positions` into a dense local index.
#[inline]
fn gather(index: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (j, &p)| acc | (((index >> p) & 1) << j))
}

/// Scatter the bits of a local index onto `positions`.
#[inline]
fn scatter(local: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (j, &p)| acc | (((local >> j) & 1) << p))
}

/// Embed a gate matrix into a `num_wires`-qubit space.
///
/// `positions[j]` is the block position of the gate's `j`-th qubit. The
/// result acts as `matrix` on those positions and as identity elsewhere:
/// `E[out, in] = matrix[out_local, in_local]` when `out` and `in` agree on
/// every bit outside `positions`, zero otherwise.
pub fn embed(matrix: &GateMatrix, positions: &[usize], num_wires: usize) -> GateMatrix {
    let dim = 1usize << num_wires;
    let local_dim = 1usize << positions.len();

    // Already in block order and covering every wire.
    if positions.len() == num_wires && positions.iter().enumerate().all(|(j, &p)| j == p) {
        return matrix.clone();
    }

    let mask = scatter(local_dim - 1, positions);
    let mut out = Array2::zeros((dim, dim));
    for col in 0..dim {
        let rest = col & !mask;
        let local_col = gather(col, positions);
        for local_row in 0..local_dim {
            let value = matrix[[local_row, local_col]];
            if value != Complex64::new(0.0, 0.0) {
                out[[rest | scatter(local_row, positions), col]] = value;
            }
        }
    }
    out
}

/// Check that `matrix` is `2^num_qubits × 2^num_qubits`.
pub fn is_square_for(matrix: &GateMatrix, num_qubits: usize) -> bool {
    let dim = 1usize << num_qubits;
    matrix.dim() == (dim, dim)
}

/// Check `U U† = I` within `atol`.
pub fn is_unitary(matrix: &GateMatrix, atol: f64) -> bool {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return false;
    }
    let product = matrix.dot(&matrix.t().mapv(|v| v.conj()));
    abs_diff_eq!(product, Array2::<Complex64>::eye(rows), epsilon = atol)
}

/// Phase `φ` with `matrix ≈ e^{iφ} I`, or `None` when `matrix` is not the
/// identity up to global phase under `tolerance`.
pub fn identity_phase(matrix: &GateMatrix, tolerance: &Tolerance) -> Option<f64> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return None;
    }
    let eye = Array2::<Complex64>::eye(rows);
    tolerance
        .equivalent(&eye, matrix)
        .then(|| matrix.diag().sum().arg())
}

/// Process fidelity `|Tr(A† B)|² / d²` between two unitaries of equal size.
///
/// Equal to one exactly when the matrices agree up to a global phase.
#[allow(clippy::cast_precision_loss)]
pub fn process_fidelity(a: &GateMatrix, b: &GateMatrix) -> f64 {
    let d = a.nrows() as f64;
    let trace: Complex64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| x.conj() * y)
        .sum();
    trace.norm_sqr() / (d * d)
}

/// Compose the matrices of `block` over `wires`.
///
/// `wires` must be sorted ascending and contain every qubit the block
/// touches. Each node's matrix is embedded at the positions of its qargs in
/// `wires` and left-multiplied onto the running product, so the result is
/// `U_last · … · U_first`. Every node matrix must be unitary within
/// `tolerance.atol`.
pub fn compose_block(
    dag: &CircuitDag,
    block: &[NodeIndex],
    wires: &[QubitId],
    tolerance: &Tolerance,
) -> CompileResult<GateMatrix> {
    let num_wires = wires.len();
    let mut unitary: GateMatrix = Array2::eye(1usize << num_wires);

    for &node in block {
        let inst = dag.get_instruction(node).ok_or_else(|| {
            CompileError::InvalidBlock(format!("node {node:?} is not an operation"))
        })?;
        let matrix = inst.matrix().ok_or_else(|| CompileError::MissingMatrix {
            node,
            name: inst.name().to_string(),
        })?;
        if !is_square_for(&matrix, inst.qubits.len()) {
            return Err(CompileError::MatrixDimension {
                node,
                gate: inst.name().to_string(),
                expected: 1usize << inst.qubits.len(),
                got: matrix.dim(),
            });
        }
        if !is_unitary(&matrix, tolerance.atol) {
            return Err(CompileError::NonUnitaryMatrix {
                node,
                gate: inst.name().to_string(),
            });
        }

        let positions = inst
            .qubits
            .iter()
            .map(|q| {
                wires.binary_search(q).map_err(|_| {
                    CompileError::InvalidBlock(format!(
                        "qubit {q} of node {node:?} is not a wire of the block"
                    ))
                })
            })
            .collect::<CompileResult<Vec<usize>>>()?;

        unitary = embed(&matrix, &positions, num_wires).dot(&unitary);
    }

    Ok(unitary)
}
