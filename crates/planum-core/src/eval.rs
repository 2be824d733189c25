//! Floating-point evaluation of expressions.

use hashbrown::HashMap;

use crate::arena::ExprArena;
use crate::error::EvalError;
use crate::expr::{ExprNode, SymbolId};
use crate::handle::ExprHandle;

/// Values assigned to symbols for numeric evaluation.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<SymbolId, f64>,
}

impl Bindings {
    /// Creates an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `symbol` to `value`, replacing any previous value.
    pub fn set(&mut self, symbol: SymbolId, value: f64) {
        self.values.insert(symbol, value);
    }

    /// Builder form of [`Bindings::set`].
    #[must_use]
    pub fn with(mut self, symbol: SymbolId, value: f64) -> Self {
        self.set(symbol, value);
        self
    }

    /// Binds a symbol by name, interning it in `arena` if needed.
    pub fn set_named(&mut self, arena: &mut ExprArena, name: &str, value: f64) {
        let id = arena.intern_symbol(name);
        self.set(id, value);
    }

    /// The bound value of `symbol`.
    #[must_use]
    pub fn get(&self, symbol: SymbolId) -> Option<f64> {
        self.values.get(&symbol).copied()
    }
}

/// Evaluates `handle` with the given bindings.
///
/// # Errors
///
/// Returns [`EvalError::Unbound`] for a symbol without a value and
/// [`EvalError::NonFinite`] when the result is NaN or infinite (for example
/// `log` of a negative number or a pole of `tan`).
pub fn evaluate(arena: &ExprArena, handle: ExprHandle, bindings: &Bindings) -> Result<f64, EvalError> {
    let value = eval_node(arena, handle, bindings)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}

fn eval_node(arena: &ExprArena, handle: ExprHandle, bindings: &Bindings) -> Result<f64, EvalError> {
    Ok(match arena.get(handle) {
        ExprNode::Number(n) => n.to_f64(),
        ExprNode::Symbol(id) => bindings.get(*id).ok_or_else(|| {
            EvalError::Unbound(arena.symbol_name(*id).unwrap_or("?").to_string())
        })?,
        ExprNode::Constant(c) => c.value(),
        ExprNode::Add(args) => {
            let mut sum = 0.0;
            for &arg in args {
                sum += eval_node(arena, arg, bindings)?;
            }
            sum
        }
        ExprNode::Mul(args) => {
            let mut product = 1.0;
            for &arg in args {
                product *= eval_node(arena, arg, bindings)?;
            }
            product
        }
        ExprNode::Pow { base, exp } => {
            let base = eval_node(arena, *base, bindings)?;
            match arena.get(*exp).as_number().and_then(crate::Rational::to_i64) {
                Some(k) => match i32::try_from(k) {
                    Ok(k) => base.powi(k),
                    #[allow(clippy::cast_precision_loss)]
                    Err(_) => base.powf(k as f64),
                },
                None => base.powf(eval_node(arena, *exp, bindings)?),
            }
        }
        ExprNode::Neg(arg) => -eval_node(arena, *arg, bindings)?,
        ExprNode::Div { num, den } => {
            eval_node(arena, *num, bindings)? / eval_node(arena, *den, bindings)?
        }
        ExprNode::Function { func, arg } => func.apply_f64(eval_node(arena, *arg, bindings)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;
    use crate::symbols::SymbolTable;

    #[test]
    fn test_evaluate_polynomial() {
        let mut arena = ExprArena::new();
        let h = parse_expression(&mut arena, "x**2 + 3*y", &SymbolTable::new(["x", "y"])).unwrap();

        let mut bindings = Bindings::new();
        bindings.set_named(&mut arena, "x", 2.0);
        bindings.set_named(&mut arena, "y", -1.0);

        assert!((evaluate(&arena, h, &bindings).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_base_integer_power() {
        let mut arena = ExprArena::new();
        let h = parse_expression(&mut arena, "x**3", &SymbolTable::new(["x"])).unwrap();
        let bindings = Bindings::new().with(arena.symbol_id("x").unwrap(), -2.0);
        assert_eq!(evaluate(&arena, h, &bindings).unwrap(), -8.0);
    }

    #[test]
    fn test_unbound_symbol() {
        let mut arena = ExprArena::new();
        let h = parse_expression(&mut arena, "x*y", &SymbolTable::new(["x", "y"])).unwrap();
        let bindings = Bindings::new().with(arena.symbol_id("x").unwrap(), 1.0);
        assert_eq!(
            evaluate(&arena, h, &bindings),
            Err(EvalError::Unbound("y".to_string()))
        );
    }

    #[test]
    fn test_non_finite() {
        let mut arena = ExprArena::new();
        let h = parse_expression(&mut arena, "log(-1)", &SymbolTable::constants_only()).unwrap();
        assert_eq!(evaluate(&arena, h, &Bindings::new()), Err(EvalError::NonFinite));
    }

    #[test]
    fn test_pi() {
        let mut arena = ExprArena::new();
        let h = parse_expression(&mut arena, "2*pi", &SymbolTable::constants_only()).unwrap();
        let v = evaluate(&arena, h, &Bindings::new()).unwrap();
        assert!((v - std::f64::consts::TAU).abs() < 1e-12);
    }
}
