//! Symbolic column expressions
//!
//! Expressions are built programmatically from variables and constants:
//!
//! ```
//! use agora_formulation::Expr;
//!
//! let markup = Expr::var("price") - Expr::var("cost");
//! let log_share = Expr::var("shares").ln();
//! assert_eq!(markup.to_string(), "price - cost");
//! assert_eq!(log_share.to_string(), "log(shares)");
//! ```
//!
//! Constants evaluate to row-invariant scalars. Any expression that touches a
//! variable evaluates to a full column.

use agora_data::formula::lookup_variable;
use agora_data::{ColumnValue, DataOverride, FormulaError, VariableSource};
use ndarray::Zip;
use std::collections::BTreeSet;
use std::fmt;
use std::ops;

/// Symbolic expression over named variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant term
    Constant(f64),
    /// Named variable
    Variable(String),
    /// Negation
    Neg(Box<Expr>),
    /// Sum
    Add(Box<Expr>, Box<Expr>),
    /// Difference
    Sub(Box<Expr>, Box<Expr>),
    /// Product
    Mul(Box<Expr>, Box<Expr>),
    /// Quotient
    Div(Box<Expr>, Box<Expr>),
    /// Power with a constant exponent
    Pow(Box<Expr>, f64),
    /// Natural logarithm
    Log(Box<Expr>),
    /// Exponential
    Exp(Box<Expr>),
}

impl Expr {
    /// Reference a variable by name.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Constant term.
    pub const fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// Raise to a constant power.
    pub fn pow(self, exponent: f64) -> Self {
        Self::Pow(Box::new(self), exponent)
    }

    /// Natural logarithm.
    pub fn ln(self) -> Self {
        Self::Log(Box::new(self))
    }

    /// Exponential.
    pub fn exp(self) -> Self {
        Self::Exp(Box::new(self))
    }

    /// Names of every variable referenced by the expression.
    pub fn names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut BTreeSet<String>) {
        match self {
            Self::Constant(_) => {}
            Self::Variable(name) => {
                names.insert(name.clone());
            }
            Self::Neg(inner) | Self::Pow(inner, _) | Self::Log(inner) | Self::Exp(inner) => {
                inner.collect_names(names);
            }
            Self::Add(lhs, rhs) | Self::Sub(lhs, rhs) | Self::Mul(lhs, rhs) | Self::Div(lhs, rhs) => {
                lhs.collect_names(names);
                rhs.collect_names(names);
            }
        }
    }

    /// Evaluate against a data source, with overrides taking precedence.
    pub fn evaluate(
        &self,
        source: &dyn VariableSource,
        overrides: Option<&DataOverride>,
    ) -> Result<ColumnValue, FormulaError> {
        let eval = |expr: &Self| expr.evaluate(source, overrides);
        match self {
            Self::Constant(value) => Ok(ColumnValue::Scalar(*value)),
            Self::Variable(name) => lookup_variable(source, overrides, name).map(ColumnValue::Column),
            Self::Neg(inner) => Ok(unary(eval(inner)?, |v| -v)),
            Self::Pow(inner, exponent) => Ok(unary(eval(inner)?, |v| v.powf(*exponent))),
            Self::Log(inner) => Ok(unary(eval(inner)?, f64::ln)),
            Self::Exp(inner) => Ok(unary(eval(inner)?, f64::exp)),
            Self::Add(lhs, rhs) => binary(eval(lhs)?, eval(rhs)?, |a, b| a + b),
            Self::Sub(lhs, rhs) => binary(eval(lhs)?, eval(rhs)?, |a, b| a - b),
            Self::Mul(lhs, rhs) => binary(eval(lhs)?, eval(rhs)?, |a, b| a * b),
            Self::Div(lhs, rhs) => binary(eval(lhs)?, eval(rhs)?, |a, b| a / b),
        }
    }

    const fn is_compound(&self) -> bool {
        matches!(
            self,
            Self::Add(..) | Self::Sub(..) | Self::Mul(..) | Self::Div(..) | Self::Neg(_) | Self::Pow(..)
        )
    }
}

fn unary(value: ColumnValue, f: impl Fn(f64) -> f64) -> ColumnValue {
    match value {
        ColumnValue::Scalar(v) => ColumnValue::Scalar(f(v)),
        ColumnValue::Column(values) => ColumnValue::Column(values.mapv(f)),
    }
}

fn binary(
    lhs: ColumnValue,
    rhs: ColumnValue,
    f: impl Fn(f64, f64) -> f64,
) -> Result<ColumnValue, FormulaError> {
    Ok(match (lhs, rhs) {
        (ColumnValue::Scalar(a), ColumnValue::Scalar(b)) => ColumnValue::Scalar(f(a, b)),
        (ColumnValue::Scalar(a), ColumnValue::Column(b)) => ColumnValue::Column(b.mapv(|v| f(a, v))),
        (ColumnValue::Column(a), ColumnValue::Scalar(b)) => ColumnValue::Column(a.mapv(|v| f(v, b))),
        (ColumnValue::Column(a), ColumnValue::Column(b)) => {
            if a.len() != b.len() {
                return Err(FormulaError::LengthMismatch {
                    name: "operand".to_string(),
                    expected: a.len(),
                    actual: b.len(),
                });
            }
            ColumnValue::Column(Zip::from(&a).and(&b).map_collect(|&x, &y| f(x, y)))
        }
    })
}

struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_compound() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{value}"),
            Self::Variable(name) => write!(f, "{name}"),
            Self::Neg(inner) => write!(f, "-{}", Operand(inner)),
            Self::Add(lhs, rhs) => write!(f, "{} + {}", Operand(lhs), Operand(rhs)),
            Self::Sub(lhs, rhs) => write!(f, "{} - {}", Operand(lhs), Operand(rhs)),
            Self::Mul(lhs, rhs) => write!(f, "{} * {}", Operand(lhs), Operand(rhs)),
            Self::Div(lhs, rhs) => write!(f, "{} / {}", Operand(lhs), Operand(rhs)),
            Self::Pow(inner, exponent) => write!(f, "{}^{exponent}", Operand(inner)),
            Self::Log(inner) => write!(f, "log({inner})"),
            Self::Exp(inner) => write!(f, "exp({inner})"),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl ops::$trait for Expr {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self::$variant(Box::new(self), Box::new(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, Add);
impl_binary_op!(Sub, sub, Sub);
impl_binary_op!(Mul, mul, Mul);
impl_binary_op!(Div, div, Div);

impl ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        Self::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};
    use rstest::rstest;

    struct Source;

    impl VariableSource for Source {
        fn rows(&self) -> usize {
            3
        }

        fn variable(&self, name: &str) -> Result<Array1<f64>, FormulaError> {
            match name {
                "price" => Ok(array![1.0, 2.0, 4.0]),
                "x" => Ok(array![0.5, 0.5, 1.5]),
                _ => Err(FormulaError::UnknownVariable(name.to_string())),
            }
        }
    }

    fn column(expr: &Expr, overrides: Option<&DataOverride>) -> Array1<f64> {
        expr.evaluate(&Source, overrides)
            .unwrap()
            .into_column(3)
            .unwrap()
    }

    #[test]
    fn test_constant_is_scalar() {
        let value = Expr::constant(1.0).evaluate(&Source, None).unwrap();
        assert_eq!(value, ColumnValue::Scalar(1.0));
    }

    #[test]
    fn test_constant_arithmetic_stays_scalar() {
        let expr = Expr::constant(2.0) * Expr::constant(3.0) + Expr::constant(1.0);
        assert_eq!(expr.evaluate(&Source, None).unwrap(), ColumnValue::Scalar(7.0));
    }

    #[test]
    fn test_interaction() {
        let values = column(&(Expr::var("price") * Expr::var("x")), None);
        assert_eq!(values, array![0.5, 1.0, 6.0]);
    }

    #[test]
    fn test_scalar_with_column() {
        let values = column(&(Expr::constant(10.0) - Expr::var("price")), None);
        assert_eq!(values, array![9.0, 8.0, 6.0]);
    }

    #[test]
    fn test_functions() {
        let values = column(&Expr::var("price").ln(), None);
        assert_relative_eq!(values[2], 4.0_f64.ln(), epsilon = 1e-12);

        let values = column(&Expr::var("price").pow(2.0), None);
        assert_eq!(values, array![1.0, 4.0, 16.0]);

        let values = column(&(-Expr::var("x")).exp(), None);
        assert_relative_eq!(values[0], (-0.5_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_override_replaces_variable() {
        let overrides = DataOverride::new().with("price", array![3.0, 3.0, 3.0]);
        let values = column(&(Expr::var("price") * Expr::var("x")), Some(&overrides));
        assert_eq!(values, array![1.5, 1.5, 4.5]);
    }

    #[test]
    fn test_unreferenced_override_ignored() {
        let overrides = DataOverride::new().with("bogus", array![0.0]);
        let values = column(&Expr::var("x"), Some(&overrides));
        assert_eq!(values, array![0.5, 0.5, 1.5]);
    }

    #[test]
    fn test_names() {
        let expr = Expr::var("price") * Expr::var("x") + Expr::var("price").ln() + Expr::constant(1.0);
        let names: Vec<_> = expr.names().into_iter().collect();
        assert_eq!(names, vec!["price".to_string(), "x".to_string()]);
        assert!(Expr::constant(1.0).names().is_empty());
    }

    #[rstest]
    #[case(Expr::constant(1.0), "1")]
    #[case(Expr::var("price"), "price")]
    #[case(Expr::var("price") * Expr::var("x"), "price * x")]
    #[case((Expr::var("a") + Expr::var("b")) * Expr::var("c"), "(a + b) * c")]
    #[case(Expr::var("price").pow(2.0), "price^2")]
    #[case(-Expr::var("price"), "-price")]
    #[case((Expr::var("price") / Expr::var("x")).ln(), "log(price / x)")]
    fn test_display(#[case] expr: Expr, #[case] expected: &str) {
        assert_eq!(expr.to_string(), expected);
    }
}
