//! Matrix catalog for the standard gates.
//!
//! All matrices use the little-endian convention on the gate's own qargs:
//! `qargs[j]` contributes bit `j` of the basis index. Under this convention
//! `cx` with qargs `[control, target]` maps `|c=1,t=0⟩` (index 1) to
//! `|c=1,t=1⟩` (index 3).

use ndarray::{Array2, arr2};
use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

/// Dense complex matrix type used for gate and block unitaries.
pub type GateMatrix = Array2<Complex64>;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

#[inline]
fn re(v: f64) -> Complex64 {
    Complex64::new(v, 0.0)
}

/// Identity on `num_qubits` qubits.
pub fn identity(num_qubits: usize) -> GateMatrix {
    Array2::eye(1 << num_qubits)
}

/// Build a `dim`-sized permutation matrix sending basis state `i` to `map(i)`.
fn permutation(dim: usize, map: impl Fn(usize) -> usize) -> GateMatrix {
    let mut m = Array2::zeros((dim, dim));
    for col in 0..dim {
        m[[map(col), col]] = ONE;
    }
    m
}

/// Add a control on qarg 0 to a single-qubit matrix; the target is qarg 1.
fn controlled(u: &GateMatrix) -> GateMatrix {
    let mut m = identity(2);
    // control bit set: indices 0b01 (target 0) and 0b11 (target 1)
    m[[1, 1]] = u[[0, 0]];
    m[[1, 3]] = u[[0, 1]];
    m[[3, 1]] = u[[1, 0]];
    m[[3, 3]] = u[[1, 1]];
    m
}

/// Pauli-X.
pub fn x() -> GateMatrix {
    arr2(&[[ZERO, ONE], [ONE, ZERO]])
}

/// Pauli-Y.
pub fn y() -> GateMatrix {
    arr2(&[[ZERO, -I], [I, ZERO]])
}

/// Pauli-Z.
pub fn z() -> GateMatrix {
    arr2(&[[ONE, ZERO], [ZERO, -ONE]])
}

/// Hadamard.
pub fn h() -> GateMatrix {
    let s = re(FRAC_1_SQRT_2);
    arr2(&[[s, s], [s, -s]])
}

/// Phase gate `P(λ) = diag(1, e^{iλ})`.
pub fn p(lambda: f64) -> GateMatrix {
    arr2(&[[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, lambda)]])
}

/// sqrt(X).
pub fn sx() -> GateMatrix {
    let a = Complex64::new(0.5, 0.5);
    let b = Complex64::new(0.5, -0.5);
    arr2(&[[a, b], [b, a]])
}

/// sqrt(X)-dagger.
pub fn sxdg() -> GateMatrix {
    sx().mapv(|v| v.conj())
}

/// X rotation.
pub fn rx(theta: f64) -> GateMatrix {
    let c = re((theta / 2.0).cos());
    let s = Complex64::new(0.0, -(theta / 2.0).sin());
    arr2(&[[c, s], [s, c]])
}

/// Y rotation.
pub fn ry(theta: f64) -> GateMatrix {
    let c = re((theta / 2.0).cos());
    let s = re((theta / 2.0).sin());
    arr2(&[[c, -s], [s, c]])
}

/// Z rotation.
pub fn rz(theta: f64) -> GateMatrix {
    arr2(&[
        [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
        [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
    ])
}

/// Universal single-qubit gate `U(θ, φ, λ)`.
pub fn u(theta: f64, phi: f64, lambda: f64) -> GateMatrix {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    arr2(&[
        [re(c), -Complex64::from_polar(s, lambda)],
        [
            Complex64::from_polar(s, phi),
            Complex64::from_polar(c, phi + lambda),
        ],
    ])
}

/// Controlled-X, qargs `[control, target]`.
pub fn cx() -> GateMatrix {
    controlled(&x())
}

/// Controlled-Y, qargs `[control, target]`.
pub fn cy() -> GateMatrix {
    controlled(&y())
}

/// Controlled-Z.
pub fn cz() -> GateMatrix {
    controlled(&z())
}

/// Controlled-Hadamard, qargs `[control, target]`.
pub fn ch() -> GateMatrix {
    controlled(&h())
}

/// Controlled phase.
pub fn cp(lambda: f64) -> GateMatrix {
    controlled(&p(lambda))
}

/// Controlled Z rotation, qargs `[control, target]`.
pub fn crz(theta: f64) -> GateMatrix {
    controlled(&rz(theta))
}

/// SWAP.
pub fn swap() -> GateMatrix {
    permutation(4, |i| ((i & 1) << 1) | (i >> 1))
}

/// iSWAP.
pub fn iswap() -> GateMatrix {
    let mut m = swap();
    m[[1, 2]] = I;
    m[[2, 1]] = I;
    m
}

/// ZZ rotation `exp(-iθ/2 Z⊗Z)`.
pub fn rzz(theta: f64) -> GateMatrix {
    let even = Complex64::from_polar(1.0, -theta / 2.0);
    let odd = Complex64::from_polar(1.0, theta / 2.0);
    let mut m = Array2::zeros((4, 4));
    for i in 0..4usize {
        m[[i, i]] = if i.count_ones() % 2 == 0 { even } else { odd };
    }
    m
}

/// Toffoli, qargs `[control1, control2, target]`.
pub fn ccx() -> GateMatrix {
    permutation(8, |i| if i & 0b011 == 0b011 { i ^ 0b100 } else { i })
}

/// Fredkin, qargs `[control, target1, target2]`.
pub fn cswap() -> GateMatrix {
    permutation(8, |i| {
        let t1 = (i >> 1) & 1;
        let t2 = (i >> 2) & 1;
        if i & 1 == 1 && t1 != t2 { i ^ 0b110 } else { i }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn dagger(m: &GateMatrix) -> GateMatrix {
        m.t().mapv(|v| v.conj())
    }

    #[test]
    fn test_cx_little_endian_layout() {
        let expected = arr2(&[
            [ONE, ZERO, ZERO, ZERO],
            [ZERO, ZERO, ZERO, ONE],
            [ZERO, ZERO, ONE, ZERO],
            [ZERO, ONE, ZERO, ZERO],
        ]);
        assert_eq!(cx(), expected);
    }

    #[test]
    fn test_catalog_is_unitary() {
        let all = [
            x(),
            y(),
            z(),
            h(),
            sx(),
            u(0.3, -1.1, 2.2),
            cx(),
            ch(),
            crz(0.4),
            iswap(),
            rzz(1.3),
            ccx(),
            cswap(),
        ];
        for m in all {
            let dim = m.nrows();
            assert_abs_diff_eq!(
                m.dot(&dagger(&m)),
                Array2::<Complex64>::eye(dim),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_sx_squared_is_x() {
        assert_abs_diff_eq!(sx().dot(&sx()), x(), epsilon = 1e-12);
        assert_abs_diff_eq!(sx().dot(&sxdg()), identity(1), epsilon = 1e-12);
    }

    #[test]
    fn test_cswap_swaps_only_with_control() {
        let m = cswap();
        // |c=1, t1=1, t2=0⟩ = 0b011 -> 0b101
        assert_eq!(m[[0b101, 0b011]], ONE);
        // control clear: untouched
        assert_eq!(m[[0b010, 0b010]], ONE);
    }
}
