//! Property-based tests for root finding and extrema.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::extrema::{find_extrema, Classification, ExtremaConfig};
    use crate::poly::DensePoly;
    use planum_core::Rational;

    fn root() -> impl Strategy<Value = Rational> {
        (-12i64..13, 1i64..5).prop_map(|(n, d)| Rational::from_i64(n, d))
    }

    proptest! {
        #[test]
        fn rational_roots_are_recovered(roots in prop::collection::vec(root(), 1..5)) {
            let mut poly = DensePoly::new(vec![Rational::from_integer(1)]);
            for r in &roots {
                poly = poly * DensePoly::new(vec![-r, Rational::from_integer(1)]);
            }
            let (found, rest) = poly.split_rational_roots();

            let mut expected = roots.clone();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(found, expected);
            prop_assert_eq!(rest.degree(), 0);
        }

        #[test]
        fn parabola_vertex_is_classified(a in -5i64..6, h in -20i64..21, k in -5i64..6) {
            prop_assume!(a != 0);
            let f = format!("({a})*(x - ({h}))**2 + ({k})");
            let report = find_extrema(&f, &ExtremaConfig::default()).unwrap();
            prop_assert_eq!(report.points.len(), 1);
            let point = &report.points[0];
            prop_assert_eq!(point.exact.clone(), Some(h.to_string()));
            let expected = if a > 0 { Classification::Minimum } else { Classification::Maximum };
            prop_assert_eq!(point.classification, expected);
        }

        #[test]
        fn numeric_roots_vanish(c in -50i64..50) {
            // x³ + x + c is strictly increasing, so it has exactly one real root.
            let poly = DensePoly::new(vec![Rational::from_integer(c), Rational::from_integer(1), Rational::from_integer(0), Rational::from_integer(1)]);
            let roots = poly.real_roots();
            prop_assert_eq!(roots.len(), 1);
            let x = roots[0];
            prop_assert!((x * x * x + x + c as f64).abs() < 1e-8);
        }
    }
}
