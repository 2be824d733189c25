//! Property-based tests for rationals, the parser and the printers.

#[cfg(test)]
mod tests {
    use num_traits::Zero;
    use proptest::prelude::*;

    use crate::{evaluate, parse_expression, Bindings, ExprArena, Rational, SymbolTable};

    fn small_int() -> impl Strategy<Value = i64> {
        -1000i64..1000i64
    }

    fn non_zero_int() -> impl Strategy<Value = i64> {
        prop_oneof![(-1000i64..=-1i64), (1i64..=1000i64)]
    }

    fn rational() -> impl Strategy<Value = Rational> {
        (small_int(), non_zero_int()).prop_map(|(n, d)| Rational::from_i64(n, d))
    }

    /// Small formulas over `x` and `y` built from the grammar's operators.
    fn formula() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            Just("x".to_string()),
            Just("y".to_string()),
            (1i64..10).prop_map(|n| n.to_string()),
        ];
        leaf.prop_recursive(4, 24, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a}) + ({b})")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a}) - ({b})")),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a})*({b})")),
                (inner.clone(), 0u32..4).prop_map(|(a, k)| format!("({a})**{k}")),
                inner.clone().prop_map(|a| format!("-({a})")),
                inner.prop_map(|a| format!("sin({a})")),
            ]
        })
    }

    proptest! {
        #[test]
        fn rational_add_commutative(a in rational(), b in rational()) {
            prop_assert_eq!(&a + &b, &b + &a);
        }

        #[test]
        fn rational_distributive(a in rational(), b in rational(), c in rational()) {
            prop_assert_eq!(&a * &(&b + &c), &(&a * &b) + &(&a * &c));
        }

        #[test]
        fn rational_recip_inverse(a in rational()) {
            match a.checked_recip() {
                Some(inv) => prop_assert_eq!(&a * &inv, Rational::from_integer(1)),
                None => prop_assert!(a.is_zero()),
            }
        }

        #[test]
        fn integer_literals_parse_exactly(n in small_int()) {
            prop_assert_eq!(Rational::parse_decimal(&n.to_string()), Some(Rational::from_integer(n)));
        }

        #[test]
        fn parser_never_panics(input in "[ xy0-9+*/()^.a-z-]{0,24}") {
            let mut arena = ExprArena::new();
            let _ = parse_expression(&mut arena, &input, &SymbolTable::new(["x", "y"]));
        }

        #[test]
        fn printed_text_reparses_to_same_value(
            source in formula(),
            x in -2.0f64..2.0,
            y in -2.0f64..2.0,
        ) {
            let symbols = SymbolTable::new(["x", "y"]);
            let mut arena = ExprArena::new();
            let original = parse_expression(&mut arena, &source, &symbols).unwrap();
            let printed = arena.to_text(original);
            let reparsed = parse_expression(&mut arena, &printed, &symbols).unwrap();

            let mut bindings = Bindings::new();
            bindings.set_named(&mut arena, "x", x);
            bindings.set_named(&mut arena, "y", y);
            let a = evaluate(&arena, original, &bindings).unwrap();
            let b = evaluate(&arena, reparsed, &bindings).unwrap();
            prop_assert!((a - b).abs() <= 1e-9 * (1.0 + a.abs()), "{} vs {}", source, printed);
        }
    }
}
