//! Vector fields and their Green integrand.

use planum_calculus::{Calculus, Expanded, Result as CalcResult};
use planum_core::{parse_expression, ExprArena, ExprHandle, SymbolTable};
use tracing::debug;

use crate::error::GreenError;

/// The variables a field may mention.
pub const FIELD_VARIABLES: [&str; 2] = ["x", "y"];

/// A plane vector field `(P, Q)` as parsed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorField {
    /// The `dx` component.
    pub p: ExprHandle,
    /// The `dy` component.
    pub q: ExprHandle,
}

impl VectorField {
    /// Parses both components over `x` and `y`.
    ///
    /// # Errors
    ///
    /// Returns [`GreenError::Parse`] naming the component that failed.
    pub fn parse(arena: &mut ExprArena, p: &str, q: &str) -> Result<Self, GreenError> {
        let symbols = SymbolTable::new(FIELD_VARIABLES);
        let p = parse_expression(arena, p, &symbols)
            .map_err(|source| GreenError::Parse { component: "P", source })?;
        let q = parse_expression(arena, q, &symbols)
            .map_err(|source| GreenError::Parse { component: "Q", source })?;
        Ok(Self { p, q })
    }
}

/// `∂Q/∂x - ∂P/∂y` together with the two partials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integrand {
    /// `∂Q/∂x`.
    pub dq_dx: Expanded,
    /// `∂P/∂y`.
    pub dp_dy: Expanded,
    /// Their difference.
    pub value: Expanded,
}

impl Integrand {
    /// Differentiates the field components.
    ///
    /// # Errors
    ///
    /// Fails if a component cannot be canonicalized, for example `log(0)`.
    pub fn of(calc: &mut Calculus<'_>, field: &VectorField) -> CalcResult<Self> {
        let x = calc.variable("x");
        let y = calc.variable("y");
        let dq_dx = calc.diff_expr(field.q, x)?;
        let dp_dy = calc.diff_expr(field.p, y)?;
        let value = dq_dx.sub(&dp_dy);
        debug!(terms = value.len(), "green integrand");
        Ok(Self { dq_dx, dp_dy, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integrand_text(p: &str, q: &str) -> String {
        let mut arena = ExprArena::new();
        let field = VectorField::parse(&mut arena, p, q).unwrap();
        let mut calc = Calculus::new(&mut arena);
        let integrand = Integrand::of(&mut calc, &field).unwrap();
        calc.text(&integrand.value)
    }

    #[test]
    fn test_integrand() {
        assert_eq!(integrand_text("x**2", "x*y"), "y");
        assert_eq!(integrand_text("-y", "x"), "2");
        assert_eq!(integrand_text("x*y", "x*y"), "y - x");
    }

    #[test]
    fn test_parse_error_names_component() {
        let mut arena = ExprArena::new();
        let err = VectorField::parse(&mut arena, "x +* y", "x").unwrap_err();
        assert!(matches!(err, GreenError::Parse { component: "P", .. }));
        let err = VectorField::parse(&mut arena, "x", "z").unwrap_err();
        assert!(matches!(err, GreenError::Parse { component: "Q", .. }));
    }
}
