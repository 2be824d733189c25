//! Property-based tests for expansion, differentiation and integration.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::numerical::{adaptive_integrate, QuadratureConfig};
    use crate::{Calculus, Expanded};
    use planum_core::{evaluate, parse_expression, Bindings, ExprArena, Rational, SymbolTable};

    fn small_int() -> impl Strategy<Value = i64> {
        -20i64..20i64
    }

    /// A polynomial in `x` and `y` as source text.
    fn polynomial() -> impl Strategy<Value = String> {
        prop::collection::vec((small_int(), 0u32..4, 0u32..3), 1..5).prop_map(|terms| {
            terms
                .iter()
                .map(|(c, i, j)| format!("({c})*x**{i}*y**{j}"))
                .collect::<Vec<_>>()
                .join(" + ")
        })
    }

    /// Small formulas mixing polynomials and elementary functions.
    fn formula() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            Just("x".to_string()),
            Just("y".to_string()),
            (1i64..6).prop_map(|n| n.to_string()),
        ];
        leaf.prop_recursive(3, 16, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a}) + ({b})")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a})*({b})")),
                (inner.clone(), 0u32..3).prop_map(|(a, k)| format!("({a})**{k}")),
                inner.clone().prop_map(|a| format!("sin({a})")),
                inner.prop_map(|a| format!("exp(({a})/10)")),
            ]
        })
    }

    fn expand(calc: &mut Calculus<'_>, source: &str) -> Expanded {
        let symbols = SymbolTable::new(["x", "y"]);
        let h = parse_expression(calc.arena_mut(), source, &symbols).unwrap();
        calc.expand(h).unwrap()
    }

    proptest! {
        #[test]
        fn expansion_preserves_value(source in formula(), x in -2.0f64..2.0, y in -2.0f64..2.0) {
            let mut arena = ExprArena::new();
            let h = parse_expression(&mut arena, &source, &SymbolTable::new(["x", "y"])).unwrap();
            let mut calc = Calculus::new(&mut arena);
            let (vx, vy) = (calc.variable("x"), calc.variable("y"));
            let bindings = Bindings::new().with(vx, x).with(vy, y);
            if let Ok(e) = calc.expand(h) {
                let expanded = calc.evaluate(&e, &bindings).unwrap();
                let direct = evaluate(calc.arena(), h, &bindings).unwrap();
                prop_assert!((expanded - direct).abs() <= 1e-8 * (1.0 + direct.abs()));
            }
        }

        #[test]
        fn expansion_is_idempotent(source in formula()) {
            let mut arena = ExprArena::new();
            let mut calc = Calculus::new(&mut arena);
            let e = expand(&mut calc, &source);
            let h = calc.to_expr(&e);
            prop_assert_eq!(calc.expand(h).unwrap(), e);
        }

        #[test]
        fn derivative_of_antiderivative(source in polynomial()) {
            let mut arena = ExprArena::new();
            let mut calc = Calculus::new(&mut arena);
            let x = calc.variable("x");
            let p = expand(&mut calc, &source);
            let big_p = calc.antiderivative(&p, x).unwrap();
            prop_assert_eq!(calc.diff(&big_p, x).unwrap(), p);
        }

        #[test]
        fn diff_is_linear(a in polynomial(), b in polynomial()) {
            let mut arena = ExprArena::new();
            let mut calc = Calculus::new(&mut arena);
            let y = calc.variable("y");
            let pa = expand(&mut calc, &a);
            let pb = expand(&mut calc, &b);
            let sum = calc.diff(&pa.add(&pb), y).unwrap();
            let parts = calc.diff(&pa, y).unwrap().add(&calc.diff(&pb, y).unwrap());
            prop_assert_eq!(sum, parts);
        }

        #[test]
        fn definite_integrals_are_additive(source in polynomial(), a in small_int(), b in small_int(), c in small_int()) {
            let mut arena = ExprArena::new();
            let mut calc = Calculus::new(&mut arena);
            let x = calc.variable("x");
            let p = expand(&mut calc, &source);
            let [a, b, c] = [a, b, c].map(|n| Expanded::constant(Rational::from_integer(n)));
            let ab = calc.definite(&p, x, &a, &b).unwrap();
            let bc = calc.definite(&p, x, &b, &c).unwrap();
            let ac = calc.definite(&p, x, &a, &c).unwrap();
            prop_assert_eq!(ab.add(&bc), ac);
        }

        #[test]
        fn quadrature_matches_exact(coeffs in prop::collection::vec(small_int(), 1..6), upper in 1i64..5) {
            let source = coeffs
                .iter()
                .enumerate()
                .map(|(i, c)| format!("({c})*x**{i}"))
                .collect::<Vec<_>>()
                .join(" + ");
            let mut arena = ExprArena::new();
            let mut calc = Calculus::new(&mut arena);
            let x = calc.variable("x");
            let p = expand(&mut calc, &source);
            let exact = calc
                .definite(&p, x, &Expanded::zero(), &Expanded::constant(Rational::from_integer(upper)))
                .unwrap()
                .as_constant()
                .unwrap()
                .to_f64();
            #[allow(clippy::cast_precision_loss)]
            let upper = upper as f64;
            let numeric = adaptive_integrate(
                |t| {
                    coeffs
                        .iter()
                        .rev()
                        .fold(0.0, |acc, &c| {
                            #[allow(clippy::cast_precision_loss)]
                            let c = c as f64;
                            acc * t + c
                        })
                },
                0.0,
                upper,
                &QuadratureConfig::default(),
            );
            prop_assert!((numeric.value - exact).abs() <= 1e-8 * (1.0 + exact.abs()));
        }
    }
}
