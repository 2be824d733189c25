//! The expression parser.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := unary (('*' | '/') unary)*
//! unary      := ('-' | '+') unary | power
//! power      := primary (('**' | '^') unary)?
//! primary    := number | name '(' expression ')' | name | '(' expression ')'
//! ```
//!
//! `**` binds tighter than unary minus and is right associative, so
//! `-x**2` is `-(x**2)` and `2**-1` is `2**(-1)`. Names resolve against the
//! caller's [`SymbolTable`]; the only functions are [`Func::ALL`] and the only
//! constant is `pi`. Nothing in the input is ever executed.
//!
//! Parentheses, call arguments, signs and exponents may nest at most
//! [`MAX_DEPTH`] levels. Chains of `+ - * /` are kept flat and do not count.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, cut, map, opt, recognize},
    error::{context, VerboseError, VerboseErrorKind},
    multi::{many0, many0_count},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::arena::ExprArena;
use crate::error::ParseError;
use crate::expr::{ExprNode, Func};
use crate::handle::ExprHandle;
use crate::rational::Rational;
use crate::symbols::SymbolTable;

type PResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Deepest nesting of parentheses, call arguments, signs and exponents.
pub const MAX_DEPTH: usize = 32;

const TOO_DEEP: &str = "nesting limit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Syntax tree borrowing its names from the input, so offsets survive until
/// name resolution.
#[derive(Debug, Clone, PartialEq)]
enum Ast<'a> {
    Number(&'a str),
    Name(&'a str),
    Call(&'a str, Box<Ast<'a>>),
    Neg(Box<Ast<'a>>),
    Power(Box<Ast<'a>>, Box<Ast<'a>>),
    /// A left-associative run such as `a - b + c`.
    Chain(Box<Ast<'a>>, Vec<(BinOp, Ast<'a>)>),
}

/// Parses `source` into `arena`, resolving variables against `symbols`.
///
/// # Errors
///
/// Returns a [`ParseError`] for empty input, syntax errors, unknown names,
/// malformed numbers and nesting beyond [`MAX_DEPTH`].
pub fn parse_expression(
    arena: &mut ExprArena,
    source: &str,
    symbols: &SymbolTable,
) -> Result<ExprHandle, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let ast = match all_consuming(ws(|i| expression(i, 0)))(source) {
        Ok((_, ast)) => ast,
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => return Err(syntax_error(source, &e)),
        Err(nom::Err::Incomplete(_)) => {
            return Err(ParseError::Unexpected {
                offset: source.len(),
                found: "end of input".to_string(),
            })
        }
    };
    trace!(?ast, "parsed syntax tree");

    Lowering {
        arena,
        symbols,
        source,
    }
    .lower(&ast)
}

/// Parses an expression that must not mention any variable.
///
/// # Errors
///
/// Same as [`parse_expression`]; any name other than `pi` is unknown.
pub fn parse_constant(arena: &mut ExprArena, source: &str) -> Result<ExprHandle, ParseError> {
    parse_expression(arena, source, &SymbolTable::constants_only())
}

fn syntax_error(source: &str, error: &VerboseError<&str>) -> ParseError {
    let offset = error
        .errors
        .iter()
        .map(|(rest, _)| source.len() - rest.len())
        .max()
        .unwrap_or(0);
    if error
        .errors
        .iter()
        .any(|(_, kind)| matches!(kind, VerboseErrorKind::Context(c) if *c == TOO_DEEP))
    {
        return ParseError::TooDeep { offset, limit: MAX_DEPTH };
    }
    let found = source[offset..]
        .chars()
        .next()
        .map_or_else(|| "end of input".to_string(), |c| format!("'{c}'"));
    ParseError::Unexpected { offset, found }
}

fn offset_in(source: &str, slice: &str) -> usize {
    slice.as_ptr() as usize - source.as_ptr() as usize
}

// ============================================================================
// Grammar
// ============================================================================

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn number(input: &str) -> PResult<'_, &str> {
    recognize(tuple((
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn too_deep(input: &str) -> nom::Err<VerboseError<&str>> {
    nom::Err::Failure(VerboseError {
        errors: vec![(input, VerboseErrorKind::Context(TOO_DEEP))],
    })
}

fn call_or_name(input: &str, depth: usize) -> PResult<'_, Ast<'_>> {
    let (rest, name) = identifier(input)?;
    let (rest, arg) = opt(preceded(
        pair(multispace0, char('(')),
        cut(terminated(
            |i| expression(i, depth + 1),
            context("closing parenthesis", char(')')),
        )),
    ))(rest)?;
    let ast = match arg {
        Some(arg) => Ast::Call(name, Box::new(arg)),
        None => Ast::Name(name),
    };
    Ok((rest, ast))
}

fn primary(input: &str, depth: usize) -> PResult<'_, Ast<'_>> {
    ws(alt((
        map(number, Ast::Number),
        |i| call_or_name(i, depth),
        delimited(
            char('('),
            cut(|i| expression(i, depth + 1)),
            context("closing parenthesis", cut(char(')'))),
        ),
    )))(input)
}

fn power(input: &str, depth: usize) -> PResult<'_, Ast<'_>> {
    let (rest, base) = primary(input, depth)?;
    let (rest, exponent) = opt(preceded(
        ws(alt((tag("**"), tag("^")))),
        context("exponent", cut(|i| unary(i, depth + 1))),
    ))(rest)?;
    let ast = match exponent {
        Some(exp) => Ast::Power(Box::new(base), Box::new(exp)),
        None => base,
    };
    Ok((rest, ast))
}

fn unary(input: &str, depth: usize) -> PResult<'_, Ast<'_>> {
    if depth > MAX_DEPTH {
        return Err(too_deep(input));
    }
    alt((
        map(
            preceded(ws(char('-')), context("operand", cut(|i| unary(i, depth + 1)))),
            |inner| Ast::Neg(Box::new(inner)),
        ),
        preceded(ws(char('+')), context("operand", cut(|i| unary(i, depth + 1)))),
        |i| power(i, depth),
    ))(input)
}

fn term(input: &str, depth: usize) -> PResult<'_, Ast<'_>> {
    let (rest, first) = unary(input, depth)?;
    let (rest, tail) = many0(pair(ws(one_of("*/")), context("operand", cut(|i| unary(i, depth)))))(rest)?;
    Ok((rest, chain(first, tail)))
}

fn expression(input: &str, depth: usize) -> PResult<'_, Ast<'_>> {
    if depth > MAX_DEPTH {
        return Err(too_deep(input));
    }
    let (rest, first) = term(input, depth)?;
    let (rest, tail) = many0(pair(ws(one_of("+-")), context("operand", cut(|i| term(i, depth)))))(rest)?;
    Ok((rest, chain(first, tail)))
}

fn chain<'a>(first: Ast<'a>, tail: Vec<(char, Ast<'a>)>) -> Ast<'a> {
    if tail.is_empty() {
        return first;
    }
    let tail = tail
        .into_iter()
        .map(|(op, rhs)| {
            let op = match op {
                '+' => BinOp::Add,
                '-' => BinOp::Sub,
                '*' => BinOp::Mul,
                _ => BinOp::Div,
            };
            (op, rhs)
        })
        .collect();
    Ast::Chain(Box::new(first), tail)
}

// ============================================================================
// Name resolution
// ============================================================================

struct Lowering<'s, 'src> {
    arena: &'s mut ExprArena,
    symbols: &'s SymbolTable,
    source: &'src str,
}

impl Lowering<'_, '_> {
    fn lower(&mut self, ast: &Ast<'_>) -> Result<ExprHandle, ParseError> {
        match ast {
            Ast::Number(text) => {
                let value = Rational::parse_decimal(text).ok_or_else(|| ParseError::InvalidNumber {
                    text: (*text).to_string(),
                    offset: offset_in(self.source, text),
                })?;
                Ok(self.arena.number(value))
            }
            Ast::Name(name) => self.resolve_name(name),
            Ast::Call(name, arg) => {
                let func = Func::from_name(name).ok_or_else(|| ParseError::UnknownFunction {
                    name: (*name).to_string(),
                    offset: offset_in(self.source, name),
                })?;
                let arg = self.lower(arg)?;
                Ok(self.arena.apply(func, arg))
            }
            Ast::Neg(inner) => {
                let inner = self.lower(inner)?;
                Ok(self.negate(inner))
            }
            Ast::Power(base, exp) => {
                let base = self.lower(base)?;
                let exp = self.lower(exp)?;
                Ok(self.arena.pow(base, exp))
            }
            Ast::Chain(first, tail) => {
                let first = self.lower(first)?;
                let sum = matches!(tail.first(), Some((BinOp::Add | BinOp::Sub, _)));
                let mut args = self.operands(first, sum);
                for (op, rhs) in tail {
                    let rhs = self.lower(rhs)?;
                    match op {
                        BinOp::Add | BinOp::Mul => args.push(rhs),
                        BinOp::Sub => {
                            let rhs = self.negate(rhs);
                            args.push(rhs);
                        }
                        BinOp::Div => {
                            let lhs = self.arena.mul(std::mem::take(&mut args));
                            args.push(self.arena.div(lhs, rhs));
                        }
                    }
                }
                Ok(if sum { self.arena.add(args) } else { self.arena.mul(args) })
            }
        }
    }

    fn resolve_name(&mut self, name: &str) -> Result<ExprHandle, ParseError> {
        if name == "pi" {
            return Ok(self.arena.pi());
        }
        if self.symbols.contains(name) {
            return Ok(self.arena.symbol(name));
        }
        let offset = offset_in(self.source, name);
        if Func::from_name(name).is_some() {
            Err(ParseError::MissingArgument {
                name: name.to_string(),
                offset,
            })
        } else {
            Err(ParseError::UnknownSymbol {
                name: name.to_string(),
                offset,
            })
        }
    }

    /// Negates, folding numeric literals so `-3` is a single number.
    fn negate(&mut self, handle: ExprHandle) -> ExprHandle {
        if let ExprNode::Number(n) = self.arena.get(handle) {
            let negated = -n;
            return self.arena.number(negated);
        }
        self.arena.neg(handle)
    }

    /// The operands of `handle` when it already is a sum (or product), so
    /// that `(a + b) + c` lowers to a single three-term sum.
    fn operands(&self, handle: ExprHandle, sum: bool) -> SmallVec<[ExprHandle; 4]> {
        match self.arena.get(handle) {
            ExprNode::Add(existing) if sum => existing.clone(),
            ExprNode::Mul(existing) if !sum => existing.clone(),
            _ => smallvec![handle],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy() -> SymbolTable {
        SymbolTable::new(["x", "y"])
    }

    fn parse(source: &str) -> Result<(ExprArena, ExprHandle), ParseError> {
        let mut arena = ExprArena::new();
        let handle = parse_expression(&mut arena, source, &xy())?;
        Ok((arena, handle))
    }

    #[test]
    fn test_precedence() {
        let (arena, h) = parse("1 + 2*x**2").unwrap();
        let ExprNode::Add(args) = arena.get(h) else {
            panic!("expected a sum");
        };
        assert_eq!(args.len(), 2);
        assert!(matches!(arena.get(args[1]), ExprNode::Mul(_)));
    }

    #[test]
    fn test_power_binds_tighter_than_unary_minus() {
        let (arena, h) = parse("-x**2").unwrap();
        let ExprNode::Neg(inner) = arena.get(h) else {
            panic!("expected a negation");
        };
        assert!(matches!(arena.get(*inner), ExprNode::Pow { .. }));
    }

    #[test]
    fn test_caret_is_power() {
        let (mut arena, a) = parse("x^2").unwrap();
        let b = parse_expression(&mut arena, "x**2", &xy()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_literal_is_folded() {
        let (arena, h) = parse("-3").unwrap();
        assert_eq!(arena.get(h), &ExprNode::Number(Rational::from_integer(-3)));
    }

    #[test]
    fn test_functions_and_pi() {
        let (arena, h) = parse("sin(pi*x) + sqrt(y)").unwrap();
        assert!(matches!(arena.get(h), ExprNode::Add(_)));
    }

    #[test]
    fn test_malformed_operator_sequence() {
        let err = parse("x +* y").unwrap_err();
        assert_eq!(
            err,
            ParseError::Unexpected {
                offset: 3,
                found: "'*'".to_string()
            }
        );
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        assert!(matches!(
            parse("(x + y").unwrap_err(),
            ParseError::Unexpected { .. }
        ));
        assert!(matches!(
            parse("x + y)").unwrap_err(),
            ParseError::Unexpected { offset: 5, .. }
        ));
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(
            parse("x + z").unwrap_err(),
            ParseError::UnknownSymbol {
                name: "z".to_string(),
                offset: 4
            }
        );
        assert_eq!(
            parse("__import__(x)").unwrap_err(),
            ParseError::UnknownFunction {
                name: "__import__".to_string(),
                offset: 0
            }
        );
        assert!(matches!(
            parse("sin + x").unwrap_err(),
            ParseError::MissingArgument { .. }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}x{}", "(".repeat(n), ")".repeat(n));
        assert!(parse(&nested(MAX_DEPTH)).is_ok());
        assert!(matches!(
            parse(&nested(300)).unwrap_err(),
            ParseError::TooDeep { limit: MAX_DEPTH, .. }
        ));
        assert!(matches!(
            parse(&format!("{}x{}", "sin(".repeat(300), ")".repeat(300))).unwrap_err(),
            ParseError::TooDeep { .. }
        ));
        assert!(matches!(
            parse(&format!("{}x", "-".repeat(300))).unwrap_err(),
            ParseError::TooDeep { .. }
        ));
        assert!(matches!(
            parse(&vec!["x"; 300].join("**")).unwrap_err(),
            ParseError::TooDeep { .. }
        ));
    }

    #[test]
    fn test_long_sums_stay_flat() {
        let source = vec!["x"; 5000].join(" + ");
        let (arena, h) = parse(&source).unwrap();
        let ExprNode::Add(args) = arena.get(h) else {
            panic!("expected a sum");
        };
        assert_eq!(args.len(), 5000);
    }

    #[test]
    fn test_huge_exponent_literal() {
        assert!(matches!(
            parse("x*1e-999999999").unwrap_err(),
            ParseError::InvalidNumber { offset: 2, .. }
        ));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("   ").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn test_constant_parser_rejects_variables() {
        let mut arena = ExprArena::new();
        assert!(parse_constant(&mut arena, "2*pi").is_ok());
        assert!(parse_constant(&mut arena, "2*x").is_err());
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let mut arena = ExprArena::new();
        let a = parse_expression(&mut arena, "x*y + sin(x)", &xy()).unwrap();
        let b = parse_expression(&mut arena, "x*y + sin(x)", &xy()).unwrap();
        assert_eq!(a, b);
    }
}
