//! Gate parameters.
//!
//! An angle is either bound to a value or still a named symbol. Only bound
//! gates have a matrix, so a gate with an unbound symbol cannot be folded
//! into a consolidated unitary.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A gate angle: a concrete value or `scale * symbol + offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// Bound value.
    Constant(f64),
    /// Affine function of one unbound symbol.
    Symbol {
        /// Symbol name.
        name: String,
        /// Coefficient of the symbol.
        scale: f64,
        /// Constant term.
        offset: f64,
    },
}

impl ParameterExpression {
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// The bare symbol `name`.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol {
            name: name.into(),
            scale: 1.0,
            offset: 0.0,
        }
    }

    pub fn pi() -> Self {
        Self::Constant(PI)
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbol { .. })
    }

    /// The value, `None` while the symbol is unbound.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Constant(v) => Some(*v),
            Self::Symbol { .. } => None,
        }
    }

    /// Name of the unbound symbol, if any.
    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            Self::Constant(_) => None,
            Self::Symbol { name, .. } => Some(name),
        }
    }

    /// `scale * self + offset`.
    #[must_use]
    pub fn affine(&self, scale: f64, offset: f64) -> Self {
        match self {
            Self::Constant(v) => Self::Constant(scale * v + offset),
            Self::Symbol {
                name,
                scale: s,
                offset: o,
            } => Self::Symbol {
                name: name.clone(),
                scale: scale * s,
                offset: scale * o + offset,
            },
        }
    }

    /// Substitute `value` for `name`; other symbols are left alone.
    #[must_use]
    pub fn bind(&self, name: &str, value: f64) -> Self {
        match self {
            Self::Symbol {
                name: n,
                scale,
                offset,
            } if n == name => Self::Constant(scale * value + offset),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => write!(f, "{v}"),
            Self::Symbol {
                name,
                scale,
                offset,
            } => {
                if *scale != 1.0 {
                    write!(f, "{scale}*")?;
                }
                write!(f, "{name}")?;
                if *offset != 0.0 {
                    write!(f, " + {offset}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}
