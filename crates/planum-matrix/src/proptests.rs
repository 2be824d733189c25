//! Property-based tests for exact matrices.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::cayley::{characteristic_polynomial, evaluate_polynomial, verify};
    use crate::matrix::Matrix;
    use planum_core::Rational;

    fn entry() -> impl Strategy<Value = Rational> {
        (-9i64..10, 1i64..5).prop_map(|(n, d)| Rational::from_i64(n, d))
    }

    fn square() -> impl Strategy<Value = Matrix> {
        (1usize..5).prop_flat_map(|n| {
            prop::collection::vec(prop::collection::vec(entry(), n), n)
                .prop_map(|rows| Matrix::from_rows(rows).unwrap())
        })
    }

    proptest! {
        #[test]
        fn cayley_hamilton_holds(a in square()) {
            let report = verify(&a).unwrap();
            prop_assert!(report.verified);
        }

        #[test]
        fn charpoly_ends_match_trace_and_det(a in square()) {
            let n = a.num_rows();
            let p = characteristic_polynomial(&a);
            prop_assert_eq!(p.len(), n + 1);
            prop_assert_eq!(p[1].clone(), -a.trace());
            let sign = if n % 2 == 0 { Rational::from_integer(1) } else { Rational::from_integer(-1) };
            prop_assert_eq!(p[n].clone(), sign * &a.det());
        }

        #[test]
        fn horner_is_linear_in_coefficients(a in square(), c in entry()) {
            let n = a.num_rows();
            let p = evaluate_polynomial(&[c.clone()], &a);
            prop_assert_eq!(p, Matrix::identity(n).scale(&c));
        }

        #[test]
        fn solve_inverts_mv(a in square(), x in prop::collection::vec(entry(), 4)) {
            let n = a.num_rows();
            let x = &x[..n];
            let b = a.mv(x);
            match a.solve(&b) {
                Some(found) => prop_assert_eq!(found, x.to_vec()),
                None => prop_assert!(a.det() == Rational::from_integer(0)),
            }
        }
    }
}
