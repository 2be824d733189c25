//! LaTeX and plain-text rendering.
//!
//! Both printers walk the arena with the same precedence rules and differ
//! only in notation: LaTeX uses `\frac`, `\sqrt` and `^{}`, plain text uses
//! `/`, `sqrt()` and `**`.

use std::fmt;

use dashu::integer::IBig;
use num_traits::One;

use crate::arena::ExprArena;
use crate::expr::{Constant, ExprNode, Func};
use crate::handle::ExprHandle;
use crate::rational::Rational;

/// Output notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// LaTeX math mode.
    Latex,
    /// Plain text with `**` for powers.
    Text,
}

const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_POWER: u8 = 3;
const PREC_ATOM: u8 = 4;

/// A term of a sum after its leading minus sign has been stripped.
enum Magnitude<'a> {
    Number(Rational),
    Handle(ExprHandle),
    Product(Rational, &'a [ExprHandle]),
}

impl ExprArena {
    /// Renders an expression as LaTeX.
    #[must_use]
    pub fn to_latex(&self, handle: ExprHandle) -> String {
        self.render(handle, Notation::Latex)
    }

    /// Renders an expression as plain text.
    #[must_use]
    pub fn to_text(&self, handle: ExprHandle) -> String {
        self.render(handle, Notation::Text)
    }

    /// Renders an expression in the given notation.
    #[must_use]
    pub fn render(&self, handle: ExprHandle, notation: Notation) -> String {
        let mut out = String::new();
        Printer {
            arena: self,
            notation,
        }
        .write(handle, 0, &mut out);
        out
    }

    /// A [`Display`](fmt::Display) adapter printing plain text.
    #[must_use]
    pub fn display(&self, handle: ExprHandle) -> Displayed<'_> {
        Displayed {
            arena: self,
            handle,
        }
    }
}

/// Plain-text display adapter returned by [`ExprArena::display`].
pub struct Displayed<'a> {
    arena: &'a ExprArena,
    handle: ExprHandle,
}

impl fmt::Display for Displayed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.arena.to_text(self.handle))
    }
}

struct Printer<'a> {
    arena: &'a ExprArena,
    notation: Notation,
}

impl Printer<'_> {
    fn latex(&self) -> bool {
        self.notation == Notation::Latex
    }

    fn precedence(&self, handle: ExprHandle) -> u8 {
        match self.arena.get(handle) {
            ExprNode::Number(n) => {
                if n.is_negative() || !n.is_integer() {
                    PREC_PRODUCT
                } else {
                    PREC_ATOM
                }
            }
            ExprNode::Symbol(_) | ExprNode::Constant(_) | ExprNode::Function { .. } => PREC_ATOM,
            ExprNode::Pow { exp, .. } => match self.arena.get(*exp) {
                ExprNode::Number(e) if e.is_negative() => PREC_PRODUCT,
                ExprNode::Number(e) if is_half(e) => PREC_ATOM,
                _ => PREC_POWER,
            },
            ExprNode::Mul(_) | ExprNode::Neg(_) | ExprNode::Div { .. } => PREC_PRODUCT,
            ExprNode::Add(_) => PREC_SUM,
        }
    }

    fn write(&self, handle: ExprHandle, min_prec: u8, out: &mut String) {
        let wrap = self.precedence(handle) < min_prec;
        if wrap {
            out.push_str(if self.latex() { "\\left(" } else { "(" });
        }
        self.write_node(handle, out);
        if wrap {
            out.push_str(if self.latex() { "\\right)" } else { ")" });
        }
    }

    fn write_node(&self, handle: ExprHandle, out: &mut String) {
        match self.arena.get(handle) {
            ExprNode::Number(n) => self.write_number(n, out),
            ExprNode::Symbol(id) => {
                let name = self.arena.symbol_name(*id).unwrap_or("?");
                out.push_str(&self.symbol(name));
            }
            ExprNode::Constant(Constant::Pi) => {
                out.push_str(if self.latex() { "\\pi" } else { "pi" });
            }
            ExprNode::Add(args) => self.write_sum(args, out),
            ExprNode::Mul(args) => {
                let (coefficient, rest) = match self.arena.get(args[0]) {
                    ExprNode::Number(n) => (n.clone(), &args[1..]),
                    _ => (Rational::one(), &args[..]),
                };
                if coefficient.is_negative() {
                    out.push('-');
                }
                self.write_product(&coefficient.abs(), rest, out);
            }
            ExprNode::Pow { base, exp } => match self.arena.get(*exp) {
                ExprNode::Number(e) if e.is_negative() => {
                    self.write_product(&Rational::one(), std::slice::from_ref(&handle), out);
                }
                ExprNode::Number(e) => self.write_power(*base, &PowerExp::Number(e.clone()), out),
                _ => self.write_power(*base, &PowerExp::Handle(*exp), out),
            },
            ExprNode::Neg(inner) => {
                out.push('-');
                self.write(*inner, PREC_PRODUCT, out);
            }
            ExprNode::Div { num, den } => {
                if self.latex() {
                    out.push_str("\\frac{");
                    self.write(*num, 0, out);
                    out.push_str("}{");
                    self.write(*den, 0, out);
                    out.push('}');
                } else {
                    self.write(*num, PREC_PRODUCT, out);
                    out.push('/');
                    self.write(*den, PREC_POWER, out);
                }
            }
            ExprNode::Function { func, arg } => self.write_function(*func, *arg, out),
        }
    }

    fn symbol(&self, name: &str) -> String {
        if !self.latex() {
            return name.to_string();
        }
        match name {
            "lam" | "lambda" => "\\lambda".to_string(),
            "theta" | "alpha" | "beta" | "gamma" | "phi" | "rho" | "mu" | "tau" | "omega" => {
                format!("\\{name}")
            }
            _ => name.to_string(),
        }
    }

    fn write_number(&self, n: &Rational, out: &mut String) {
        if n.is_integer() || !self.latex() {
            out.push_str(&n.to_string());
            return;
        }
        if n.is_negative() {
            out.push('-');
        }
        let magnitude = n.abs();
        out.push_str(&format!(
            "\\frac{{{}}}{{{}}}",
            magnitude.numerator(),
            magnitude.denominator()
        ));
    }

    fn write_sum(&self, args: &[ExprHandle], out: &mut String) {
        for (i, &term) in args.iter().enumerate() {
            if i == 0 {
                self.write(term, PREC_SUM, out);
                continue;
            }
            match self.negative_magnitude(term) {
                Some(magnitude) => {
                    out.push_str(" - ");
                    match magnitude {
                        Magnitude::Number(n) => self.write_number(&n, out),
                        Magnitude::Handle(h) => self.write(h, PREC_PRODUCT, out),
                        Magnitude::Product(coefficient, rest) => {
                            self.write_product(&coefficient, rest, out);
                        }
                    }
                }
                None => {
                    out.push_str(" + ");
                    self.write(term, PREC_PRODUCT, out);
                }
            }
        }
    }

    fn negative_magnitude(&self, term: ExprHandle) -> Option<Magnitude<'_>> {
        match self.arena.get(term) {
            ExprNode::Number(n) if n.is_negative() => Some(Magnitude::Number(n.abs())),
            ExprNode::Neg(inner) => Some(Magnitude::Handle(*inner)),
            ExprNode::Mul(args) => match self.arena.get(args[0]) {
                ExprNode::Number(n) if n.is_negative() => {
                    Some(Magnitude::Product(n.abs(), &args[1..]))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Writes `coefficient * factors`, moving negative powers below a
    /// fraction bar. `coefficient` must be non-negative.
    fn write_product(&self, coefficient: &Rational, factors: &[ExprHandle], out: &mut String) {
        let mut numerator: Vec<Factor> = Vec::new();
        let mut denominator: Vec<Factor> = Vec::new();

        let num = coefficient.numerator();
        let den = coefficient.denominator();
        if num != IBig::ONE || factors.is_empty() {
            numerator.push(Factor::Literal(num.to_string()));
        }
        if den != IBig::ONE {
            denominator.push(Factor::Literal(den.to_string()));
        }

        for &factor in factors {
            match self.arena.get(factor) {
                ExprNode::Pow { base, exp } => match self.arena.get(*exp) {
                    ExprNode::Number(e) if e.is_negative() => {
                        let flipped = e.abs();
                        if flipped.is_one() {
                            denominator.push(Factor::Handle(*base));
                        } else {
                            denominator.push(Factor::Power(*base, flipped));
                        }
                    }
                    _ => numerator.push(Factor::Handle(factor)),
                },
                _ => numerator.push(Factor::Handle(factor)),
            }
        }

        if self.latex() {
            if denominator.is_empty() {
                self.write_factors(&numerator, out);
            } else {
                out.push_str("\\frac{");
                if numerator.is_empty() {
                    out.push('1');
                } else {
                    self.write_factors(&numerator, out);
                }
                out.push_str("}{");
                self.write_factors(&denominator, out);
                out.push('}');
            }
            return;
        }

        if numerator.is_empty() {
            out.push('1');
        } else {
            self.write_factors(&numerator, out);
        }
        if !denominator.is_empty() {
            out.push('/');
            let grouped = denominator.len() > 1;
            if grouped {
                out.push('(');
            }
            self.write_factors(&denominator, out);
            if grouped {
                out.push(')');
            }
        }
    }

    fn write_factors(&self, factors: &[Factor], out: &mut String) {
        for (i, factor) in factors.iter().enumerate() {
            if i > 0 {
                let numeric_next = match factor {
                    Factor::Literal(_) => true,
                    Factor::Handle(h) => matches!(self.arena.get(*h), ExprNode::Number(_)),
                    Factor::Power(..) => false,
                };
                out.push_str(match (self.latex(), numeric_next) {
                    (true, true) => " \\cdot ",
                    (true, false) => " ",
                    (false, _) => "*",
                });
            }
            match factor {
                Factor::Literal(text) => out.push_str(text),
                Factor::Handle(h) => {
                    self.write(*h, PREC_POWER, out);
                }
                Factor::Power(base, exp) => {
                    self.write_power(*base, &PowerExp::Number(exp.clone()), out);
                }
            }
        }
    }

    fn write_power(&self, base: ExprHandle, exp: &PowerExp, out: &mut String) {
        if let PowerExp::Number(e) = exp {
            if is_half(e) {
                out.push_str(if self.latex() { "\\sqrt{" } else { "sqrt(" });
                self.write(base, 0, out);
                out.push(if self.latex() { '}' } else { ')' });
                return;
            }
        }

        self.write(base, PREC_ATOM, out);
        if self.latex() {
            out.push_str("^{");
            match exp {
                PowerExp::Number(e) => self.write_number(e, out),
                PowerExp::Handle(h) => self.write(*h, 0, out),
            }
            out.push('}');
        } else {
            out.push_str("**");
            match exp {
                PowerExp::Number(e) => {
                    if e.is_integer() && !e.is_negative() {
                        out.push_str(&e.to_string());
                    } else {
                        out.push_str(&format!("({e})"));
                    }
                }
                PowerExp::Handle(h) => self.write(*h, PREC_ATOM, out),
            }
        }
    }

    fn write_function(&self, func: Func, arg: ExprHandle, out: &mut String) {
        if !self.latex() {
            out.push_str(func.name());
            out.push('(');
            self.write(arg, 0, out);
            out.push(')');
            return;
        }
        match func {
            Func::Exp => {
                out.push_str("e^{");
                self.write(arg, 0, out);
                out.push('}');
            }
            Func::Sqrt => {
                out.push_str("\\sqrt{");
                self.write(arg, 0, out);
                out.push('}');
            }
            Func::Sin | Func::Cos | Func::Tan | Func::Log => {
                out.push('\\');
                out.push_str(func.name());
                out.push_str("{\\left(");
                self.write(arg, 0, out);
                out.push_str(" \\right)}");
            }
        }
    }
}

enum Factor {
    Literal(String),
    Handle(ExprHandle),
    Power(ExprHandle, Rational),
}

enum PowerExp {
    Number(Rational),
    Handle(ExprHandle),
}

fn is_half(e: &Rational) -> bool {
    *e == Rational::from_i64(1, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;
    use crate::symbols::SymbolTable;

    fn render(source: &str, notation: Notation) -> String {
        let mut arena = ExprArena::new();
        let symbols = SymbolTable::new(["x", "y", "r", "theta", "lam"]);
        let h = parse_expression(&mut arena, source, &symbols).unwrap();
        arena.render(h, notation)
    }

    fn text(source: &str) -> String {
        render(source, Notation::Text)
    }

    fn latex(source: &str) -> String {
        render(source, Notation::Latex)
    }

    #[test]
    fn test_text_round_trips_simple_forms() {
        assert_eq!(text("x**2 + 3*y"), "x**2 + 3*y");
        assert_eq!(text("x - y"), "x - y");
        assert_eq!(text("(x + y)*x"), "(x + y)*x");
        assert_eq!(text("-x**2"), "-x**2");
        assert_eq!(text("sin(x)*cos(y)"), "sin(x)*cos(y)");
        assert_eq!(text("x/(x + 1)"), "x/(x + 1)");
    }

    #[test]
    fn test_text_power_grouping() {
        assert_eq!(text("(x**2)**3"), "(x**2)**3");
        assert_eq!(text("x**(y + 1)"), "x**(y + 1)");
        assert_eq!(text("x**0.5"), "sqrt(x)");
        assert_eq!(text("x**-1"), "1/x");
    }

    #[test]
    fn test_latex_forms() {
        assert_eq!(latex("x**2"), "x^{2}");
        assert_eq!(latex("0.5"), "\\frac{1}{2}");
        assert_eq!(latex("x**(1/2)"), "x^{\\frac{1}{2}}");
        assert_eq!(latex("exp(x)"), "e^{x}");
        assert_eq!(latex("sqrt(x)"), "\\sqrt{x}");
        assert_eq!(latex("theta*lam"), "\\theta \\lambda");
        assert_eq!(latex("2*pi"), "2 \\pi");
        assert_eq!(latex("x**-2"), "\\frac{1}{x^{2}}");
        assert_eq!(latex("sin(x)"), "\\sin{\\left(x \\right)}");
    }

    #[test]
    fn test_negative_terms_print_as_subtraction() {
        assert_eq!(text("x + -3"), "x - 3");
        assert_eq!(text("x + -2*y"), "x - 2*y");
        assert_eq!(text("x - (y + 1)"), "x - (y + 1)");
    }

    #[test]
    fn test_display_adapter() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let two = arena.integer(2);
        let sq = arena.pow(x, two);
        assert_eq!(arena.display(sq).to_string(), "x**2");
    }
}
