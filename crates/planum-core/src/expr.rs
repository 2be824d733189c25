//! Expression node types.
//!
//! Parsed input keeps the shape the user typed (`Neg`, `Div`, nested sums),
//! so it can be echoed back faithfully. The canonical expander in
//! `planum-calculus` rewrites everything into `Add`/`Mul`/`Pow` over atoms.

use smallvec::SmallVec;

use crate::handle::ExprHandle;
use crate::rational::Rational;

/// Unique identifier for a symbol within one arena.
pub type SymbolId = u32;

/// The whitelisted elementary functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Func {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Natural exponential.
    Exp,
    /// Natural logarithm.
    Log,
    /// Principal square root.
    Sqrt,
}

impl Func {
    /// Every function the parser accepts.
    pub const ALL: [Func; 6] = [
        Func::Sin,
        Func::Cos,
        Func::Tan,
        Func::Exp,
        Func::Log,
        Func::Sqrt,
    ];

    /// Looks a function up by its source name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// The source name, as typed by the user.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Sqrt => "sqrt",
        }
    }

    /// Evaluates the function on a float.
    #[must_use]
    pub fn apply_f64(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Exp => x.exp(),
            Func::Log => x.ln(),
            Func::Sqrt => x.sqrt(),
        }
    }
}

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    /// π.
    Pi,
}

impl Constant {
    /// Floating-point value.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
        }
    }
}

/// An expression node stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprNode {
    // === Atoms ===
    /// An exact rational literal.
    Number(Rational),

    /// A symbolic variable.
    Symbol(SymbolId),

    /// A named constant.
    Constant(Constant),

    // === Compound Expressions ===
    /// Sum of expressions: a + b + c + ...
    ///
    /// Invariant: at least 2 arguments.
    Add(SmallVec<[ExprHandle; 4]>),

    /// Product of expressions: a * b * c * ...
    ///
    /// Invariant: at least 2 arguments.
    Mul(SmallVec<[ExprHandle; 4]>),

    /// Power expression: base^exp.
    Pow {
        /// The base of the power.
        base: ExprHandle,
        /// The exponent.
        exp: ExprHandle,
    },

    /// Negation: -expr.
    Neg(ExprHandle),

    /// Division: numerator / denominator.
    Div {
        /// The numerator.
        num: ExprHandle,
        /// The denominator.
        den: ExprHandle,
    },

    /// A function application: f(arg).
    Function {
        /// Which function.
        func: Func,
        /// The argument.
        arg: ExprHandle,
    },
}

impl ExprNode {
    /// Returns true if this node has no children.
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            ExprNode::Number(_) | ExprNode::Symbol(_) | ExprNode::Constant(_)
        )
    }

    /// Returns the rational value of a numeric literal.
    #[must_use]
    pub fn as_number(&self) -> Option<&Rational> {
        match self {
            ExprNode::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the children of this node.
    #[must_use]
    pub fn children(&self) -> SmallVec<[ExprHandle; 4]> {
        match self {
            ExprNode::Number(_) | ExprNode::Symbol(_) | ExprNode::Constant(_) => SmallVec::new(),
            ExprNode::Add(args) | ExprNode::Mul(args) => args.clone(),
            ExprNode::Pow { base, exp } => smallvec::smallvec![*base, *exp],
            ExprNode::Neg(arg) | ExprNode::Function { arg, .. } => smallvec::smallvec![*arg],
            ExprNode::Div { num, den } => smallvec::smallvec![*num, *den],
        }
    }
}
