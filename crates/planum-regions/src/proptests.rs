//! Property-based tests for the Green pipeline.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::field::{Integrand, VectorField};
    use crate::greens::{rectangle, IntegrationOrder};
    use crate::{evaluate, GreenOptions, Region};
    use planum_calculus::Calculus;
    use planum_core::{ExprArena, Rational};

    fn small_int() -> impl Strategy<Value = i64> {
        -6i64..6i64
    }

    fn bound() -> impl Strategy<Value = Rational> {
        (small_int(), 1i64..4).prop_map(|(n, d)| Rational::from_i64(n, d))
    }

    /// Polynomials and a few smooth functions of `x` and `y`.
    fn component() -> impl Strategy<Value = String> {
        let term = prop_oneof![
            (small_int(), 0u32..3, 0u32..3).prop_map(|(c, i, j)| format!("({c})*x**{i}*y**{j}")),
            small_int().prop_map(|c| format!("({c})*sin(x)")),
            small_int().prop_map(|c| format!("({c})*x*exp(y)")),
            small_int().prop_map(|c| format!("({c})*cos(2*y)")),
        ];
        prop::collection::vec(term, 1..4).prop_map(|terms| terms.join(" + "))
    }

    fn ordered(a: Rational, b: Rational) -> (Rational, Rational) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    proptest! {
        #[test]
        fn rectangle_is_order_independent(
            p in component(),
            q in component(),
            xa in bound(), xb in bound(), ya in bound(), yb in bound(),
        ) {
            let (x1, x2) = ordered(xa, xb);
            let (y1, y2) = ordered(ya, yb);
            let mut arena = ExprArena::new();
            let field = VectorField::parse(&mut arena, &p, &q).unwrap();
            let mut calc = Calculus::new(&mut arena);
            let f = Integrand::of(&mut calc, &field).unwrap().value;
            let mut steps = Vec::new();
            let bounds = [&x1, &x2, &y1, &y2];
            let y_first = rectangle(&mut calc, &f, bounds, IntegrationOrder::YThenX, &mut steps).unwrap();
            let x_first = rectangle(&mut calc, &f, bounds, IntegrationOrder::XThenY, &mut steps).unwrap();
            prop_assert_eq!(y_first, x_first);
        }

        #[test]
        fn degenerate_rectangle_is_zero(p in component(), q in component(), x in bound(), ya in bound(), yb in bound()) {
            let (y1, y2) = ordered(ya, yb);
            let region = Region::rectangle(x.clone(), x, y1, y2).unwrap();
            let result = evaluate(&p, &q, &region, &GreenOptions::default()).unwrap();
            prop_assert_eq!(result.exact_text, "0");
        }

        #[test]
        fn gradient_fields_integrate_to_zero(coeffs in prop::collection::vec(small_int(), 3)) {
            // (P, Q) = ∇φ for φ = a x²y + b xy³ + c x has zero curl.
            let (a, b, c) = (coeffs[0], coeffs[1], coeffs[2]);
            let p = format!("2*({a})*x*y + ({b})*y**3 + ({c})");
            let q = format!("({a})*x**2 + 3*({b})*x*y**2");
            let region = Region::right_triangle(Rational::from_integer(2), Rational::from_integer(5)).unwrap();
            let result = evaluate(&p, &q, &region, &GreenOptions::default()).unwrap();
            prop_assert_eq!(result.exact_text, "0");
        }
    }
}
