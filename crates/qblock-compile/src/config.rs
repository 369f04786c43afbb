//! Configuration for block consolidation.
//!
//! Every field has a default, so a partial JSON document only needs to name
//! the settings it changes:
//!
//! ```
//! use qblock_compile::{ConsolidateConfig, TrivialBlockPolicy};
//!
//! let config = ConsolidateConfig::from_json(r#"{ "remove_identity_blocks": true }"#).unwrap();
//! assert!(config.remove_identity_blocks);
//! assert_eq!(config.trivial_policy, TrivialBlockPolicy::KeepBasicSingleGate);
//! ```

use qblock_ir::GateMatrix;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CompileError, CompileResult};
use crate::unitary::process_fidelity;

/// What to do with a block that holds a single operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrivialBlockPolicy {
    /// Keep a single basic gate as it is; consolidate anything else.
    #[default]
    KeepBasicSingleGate,
    /// Keep every single-operation block as it is.
    KeepAnySingleGate,
    /// Consolidate every block, however small.
    ConsolidateAll,
}

/// Numerical tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Two unitaries are equivalent when their process fidelity is at least
    /// `1 - fidelity`.
    pub fidelity: f64,
    /// Element-wise absolute tolerance for unitarity checks.
    pub atol: f64,
}

impl Tolerance {
    /// Default fidelity slack.
    pub const DEFAULT_FIDELITY: f64 = 1e-7;
    /// Default element-wise tolerance.
    pub const DEFAULT_ATOL: f64 = 1e-10;

    /// Whether `a` and `b` are the same operation up to global phase.
    pub fn equivalent(&self, a: &GateMatrix, b: &GateMatrix) -> bool {
        a.dim() == b.dim() && process_fidelity(a, b) >= 1.0 - self.fidelity
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            fidelity: Self::DEFAULT_FIDELITY,
            atol: Self::DEFAULT_ATOL,
        }
    }
}

/// Settings of [`ConsolidateBlocks`](crate::passes::ConsolidateBlocks).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidateConfig {
    /// Consolidate every block regardless of `trivial_policy`.
    pub force_consolidate: bool,
    /// Handling of single-operation blocks.
    pub trivial_policy: TrivialBlockPolicy,
    /// Drop blocks whose product is the identity instead of replacing them.
    pub remove_identity_blocks: bool,
    /// Numerical tolerances.
    pub tolerance: Tolerance,
}

impl ConsolidateConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> CompileResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CompileError::InvalidConfiguration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> CompileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the tolerances are usable.
    pub fn validate(&self) -> CompileResult<()> {
        let Tolerance { fidelity, atol } = self.tolerance;
        if !(0.0..1.0).contains(&fidelity) {
            return Err(CompileError::InvalidConfiguration(format!(
                "fidelity tolerance must be in [0, 1), got {fidelity}"
            )));
        }
        if !atol.is_finite() || atol < 0.0 {
            return Err(CompileError::InvalidConfiguration(format!(
                "atol must be a finite non-negative number, got {atol}"
            )));
        }
        Ok(())
    }

    /// The policy actually applied, with `force_consolidate` folded in.
    pub fn effective_policy(&self) -> TrivialBlockPolicy {
        if self.force_consolidate {
            TrivialBlockPolicy::ConsolidateAll
        } else {
            self.trivial_policy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConsolidateConfig::default();
        assert!(!config.force_consolidate);
        assert!(!config.remove_identity_blocks);
        assert_eq!(config.tolerance.fidelity, 1e-7);
        assert_eq!(
            config.effective_policy(),
            TrivialBlockPolicy::KeepBasicSingleGate
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ConsolidateConfig {
            force_consolidate: true,
            trivial_policy: TrivialBlockPolicy::KeepAnySingleGate,
            remove_identity_blocks: true,
            tolerance: Tolerance {
                fidelity: 1e-9,
                atol: 1e-12,
            },
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("keep_any_single_gate"));
        assert_eq!(ConsolidateConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_force_overrides_policy() {
        let json = r#"{ "force_consolidate": true, "trivial_policy": "keep_any_single_gate" }"#;
        let config = ConsolidateConfig::from_json(json).unwrap();
        assert_eq!(config.effective_policy(), TrivialBlockPolicy::ConsolidateAll);
    }

    #[test]
    fn test_equivalence_uses_fidelity_slack() {
        use num_complex::Complex64;
        use qblock_ir::StandardGate;

        let rz = |theta: f64| StandardGate::Rz(theta.into()).matrix().unwrap();
        let phased = rz(0.4).mapv(|v| v * Complex64::from_polar(1.0, -1.1));
        let tight = Tolerance::default();
        assert!(tight.equivalent(&rz(0.4), &phased));
        // 1 - F = sin²(θ/2) for rz(θ) against rz(0)
        assert!(!tight.equivalent(&rz(0.0), &rz(1e-3)));

        let loose = Tolerance {
            fidelity: 1e-5,
            ..Tolerance::default()
        };
        assert!(loose.equivalent(&rz(0.0), &rz(1e-3)));
        assert!(!loose.equivalent(&rz(0.0), &qblock_ir::matrix::identity(2)));
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        let err =
            ConsolidateConfig::from_json(r#"{ "tolerance": { "fidelity": 2.0 } }"#).unwrap_err();
        assert!(matches!(err, CompileError::InvalidConfiguration(_)));

        let err = ConsolidateConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CompileError::ConfigParse(_)));
    }
}
