//! The expression tree, how it is built from prefix tokens and how it prints

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::ops;
use std::str::FromStr;

use itertools::Itertools;
use snafu::{ensure, OptionExt};

use super::error::{Error, MalformedExpressionSnafu, Result};
use super::prefix::to_prefix_tokens;
use super::token::{tokenize, Operator, Token};

/// Parsing refuses formulas nested deeper than this, counted in nodes along
/// the longest path. Every pass over a tree recurses once per level.
pub const MAX_NESTING_DEPTH: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Implies,
}

impl BinaryOp {
    pub fn operator(self) -> Operator {
        match self {
            BinaryOp::And => Operator::And,
            BinaryOp::Or => Operator::Or,
            BinaryOp::Implies => Operator::Implies,
        }
    }

    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            BinaryOp::And => lhs && rhs,
            BinaryOp::Or => lhs || rhs,
            BinaryOp::Implies => !lhs || rhs,
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operator())
    }
}

/// A propositional formula.
///
/// Every node owns its children outright, so a subtree can only appear
/// under two parents by being cloned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Var(String),
    Not(Box<Expr>),
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
}

// Constructors
impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn not(arg: Self) -> Self {
        Expr::Not(Box::new(arg))
    }

    pub fn binary(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Expr::binary(BinaryOp::And, lhs, rhs)
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Expr::binary(BinaryOp::Or, lhs, rhs)
    }

    pub fn implies(self, rhs: Self) -> Self {
        Expr::binary(BinaryOp::Implies, self, rhs)
    }
}

// Parsing
impl Expr {
    /// Build a tree from space separated prefix text such as `> A * B C`.
    pub fn from_prefix(prefix: &str) -> Result<Self> {
        Expr::from_prefix_tokens(tokenize(prefix))
    }

    /// Build a tree from a prefix token stream.
    ///
    /// Children are read strictly left before right. The stream must hold
    /// exactly one formula: running out early, leftover tokens and nesting
    /// deeper than [`MAX_NESTING_DEPTH`] are all [`Error::MalformedExpression`].
    pub fn from_prefix_tokens<I>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = Token>,
    {
        let tokens: Vec<Token> = tokens.into_iter().collect();
        let depth = prefix_depth(&tokens);
        ensure!(
            depth <= MAX_NESTING_DEPTH,
            MalformedExpressionSnafu {
                reason: format!("nested {depth} levels deep, the limit is {MAX_NESTING_DEPTH}"),
            }
        );

        let mut tokens = tokens.into_iter();
        let expr = build(&mut tokens)?;
        match tokens.next() {
            Some(extra) => MalformedExpressionSnafu {
                reason: format!("unexpected trailing token '{extra}'"),
            }
            .fail(),
            None => Ok(expr),
        }
    }

    /// Parse infix text, honouring precedence and parentheses.
    pub fn parse_infix(infix: &str) -> Result<Self> {
        Expr::from_prefix_tokens(to_prefix_tokens(&tokenize(infix)))
    }
}

/// Deepest node of the prefix stream, counted like [`Expr::height`].
///
/// Walks the stream once with a stack of operands still owed to each open
/// operator.
fn prefix_depth(tokens: &[Token]) -> usize {
    let mut owed: Vec<u8> = Vec::new();
    let mut deepest = 0;

    for token in tokens {
        deepest = deepest.max(owed.len() + 1);
        match token {
            Token::Op(op) if op.is_unary() => owed.push(1),
            Token::Op(_) => owed.push(2),
            _ => {
                // a finished node pays its parent, which may finish in turn
                while let Some(top) = owed.last_mut() {
                    *top -= 1;
                    if *top > 0 {
                        break;
                    }
                    owed.pop();
                }
            }
        }
    }

    deepest
}

fn build<I>(tokens: &mut I) -> Result<Expr>
where
    I: Iterator<Item = Token>,
{
    let token = tokens.next().context(MalformedExpressionSnafu {
        reason: "expression ended before all operands were read",
    })?;

    match token {
        Token::Ident(name) => Ok(Expr::Var(name)),
        Token::Op(Operator::Not) => Ok(Expr::not(build(tokens)?)),
        Token::Op(Operator::And) => build_binary(BinaryOp::And, tokens),
        Token::Op(Operator::Or) => build_binary(BinaryOp::Or, tokens),
        Token::Op(Operator::Implies) => build_binary(BinaryOp::Implies, tokens),
        paren => MalformedExpressionSnafu {
            reason: format!("unbalanced '{paren}'"),
        }
        .fail(),
    }
}

fn build_binary<I>(op: BinaryOp, tokens: &mut I) -> Result<Expr>
where
    I: Iterator<Item = Token>,
{
    let lhs = build(tokens)?;
    let rhs = build(tokens)?;
    Ok(Expr::binary(op, lhs, rhs))
}

impl FromStr for Expr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Expr::parse_infix(s)
    }
}

// Shape queries
impl Expr {
    /// Number of nodes on the longest root-to-leaf path; a lone variable is 1.
    pub fn height(&self) -> usize {
        match self {
            Expr::Var(_) => 1,
            Expr::Not(arg) => 1 + arg.height(),
            Expr::Binary { lhs, rhs, .. } => 1 + lhs.height().max(rhs.height()),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Expr::Var(_) => 1,
            Expr::Not(arg) => 1 + arg.node_count(),
            Expr::Binary { lhs, rhs, .. } => 1 + lhs.node_count() + rhs.node_count(),
        }
    }

    /// The distinct variable names, in lexicographic order.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Var(name) => {
                names.insert(name.as_str());
            }
            Expr::Not(arg) => arg.collect_variables(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
        }
    }

    pub fn is_literal(&self) -> bool {
        match self {
            Expr::Var(_) => true,
            Expr::Not(arg) => matches!(**arg, Expr::Var(_)),
            Expr::Binary { .. } => false,
        }
    }
}

// Rendering
impl Expr {
    /// The tree in prefix order, one token per node.
    pub fn prefix_tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(self.node_count());
        self.push_prefix(&mut tokens);
        tokens
    }

    fn push_prefix(&self, tokens: &mut Vec<Token>) {
        match self {
            Expr::Var(name) => tokens.push(Token::Ident(name.clone())),
            Expr::Not(arg) => {
                tokens.push(Token::Op(Operator::Not));
                arg.push_prefix(tokens);
            }
            Expr::Binary { op, lhs, rhs } => {
                tokens.push(Token::Op(op.operator()));
                lhs.push_prefix(tokens);
                rhs.push_prefix(tokens);
            }
        }
    }

    pub fn to_prefix(&self) -> String {
        self.prefix_tokens().iter().join(" ")
    }
}

/// `{}` renders fully parenthesised infix, `(A + ~(B * C))`, which parses
/// back to the same tree. `{:#}` renders the structure, `Or(A, Not(And(B, C)))`.
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            match self {
                Expr::Var(name) => write!(f, "{name}"),
                Expr::Not(arg) => write!(f, "Not({arg:#})"),
                Expr::Binary { op, lhs, rhs } => {
                    let name = match op {
                        BinaryOp::And => "And",
                        BinaryOp::Or => "Or",
                        BinaryOp::Implies => "Implies",
                    };
                    write!(f, "{name}({lhs:#}, {rhs:#})")
                }
            }
        } else {
            match self {
                Expr::Var(name) => write!(f, "{name}"),
                Expr::Not(arg) => write!(f, "~{arg}"),
                Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            }
        }
    }
}

impl ops::Not for Expr {
    type Output = Self;

    fn not(self) -> Self::Output {
        Expr::not(self)
    }
}

impl ops::BitAnd for Expr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Expr::and(self, rhs)
    }
}

impl ops::BitOr for Expr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Expr::or(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Expr {
        Expr::var("A")
    }
    fn b() -> Expr {
        Expr::var("B")
    }
    fn c() -> Expr {
        Expr::var("C")
    }

    #[test]
    fn builds_from_prefix() {
        let expr = Expr::from_prefix("> A * B C").unwrap();
        assert_eq!(expr, a().implies(b() & c()));

        let expr = Expr::from_prefix("+ ~ A ~ ~ P12").unwrap();
        assert_eq!(expr, !a() | !!Expr::var("P12"));
    }

    #[test]
    fn exhausted_stream_is_malformed() {
        for prefix in ["", "*", "* A", "~", "> A ~"] {
            let err = Expr::from_prefix(prefix).unwrap_err();
            assert!(matches!(err, Error::MalformedExpression { .. }), "prefix {prefix:?}: {err}");
        }
    }

    #[test]
    fn trailing_tokens_are_malformed() {
        let err = Expr::from_prefix("A B").unwrap_err();
        assert!(matches!(err, Error::MalformedExpression { .. }));
    }

    #[test]
    fn parentheses_in_prefix_are_malformed() {
        assert!(Expr::from_prefix("( * A B").is_err());
        assert!(Expr::parse_infix("(A * B").is_err());
        assert!(Expr::parse_infix("A * B)").is_err());
    }

    #[test]
    fn parses_infix() {
        let expr: Expr = "~A * B > C + D".parse().unwrap();
        assert_eq!(expr, (!a() & b()).implies(c() | Expr::var("D")));
    }

    #[test]
    fn renders_infix() {
        let expr = !(a() | !b()) & !!c();
        assert_eq!(expr.to_string(), "(~(A + ~B) * ~~C)");
        assert_eq!(format!("{expr:#}"), "And(Not(Or(A, Not(B))), Not(Not(C)))");
    }

    #[test]
    fn infix_rendering_parses_back() {
        let expr = (a().implies(!b())) | !(c() & a());
        assert_eq!(Expr::parse_infix(&expr.to_string()).unwrap(), expr);
    }

    #[test]
    fn renders_prefix() {
        let expr = a().implies(b() & !c());
        assert_eq!(expr.to_prefix(), "> A * B ~ C");
        assert_eq!(Expr::from_prefix(&expr.to_prefix()).unwrap(), expr);
    }

    #[test]
    fn height_counts_nodes() {
        assert_eq!(a().height(), 1);
        assert_eq!((!a()).height(), 2);
        assert_eq!(Expr::from_prefix("* A B").unwrap().height(), 2);
        assert_eq!((a() & (b() | !c())).height(), 4);
    }

    #[test]
    fn deep_nesting_is_refused() {
        let prefix = format!("{}A", "~ ".repeat(20_000));
        let err = Expr::from_prefix(&prefix).unwrap_err();
        assert!(matches!(err, Error::MalformedExpression { .. }));

        let infix = format!("{}A", "~".repeat(20_000));
        assert!(Expr::parse_infix(&infix).is_err());

        let chain = vec!["A"; 20_000].join(" + ");
        assert!(Expr::parse_infix(&chain).is_err());
    }

    #[test]
    fn nesting_up_to_the_limit_is_accepted() {
        let prefix = format!("{}A", "~ ".repeat(MAX_NESTING_DEPTH - 1));
        assert_eq!(Expr::from_prefix(&prefix).unwrap().height(), MAX_NESTING_DEPTH);

        let prefix = format!("{}A", "~ ".repeat(MAX_NESTING_DEPTH));
        assert!(Expr::from_prefix(&prefix).is_err());

        // parentheses alone add no depth
        let infix = format!("{}A{}", "(".repeat(20_000), ")".repeat(20_000));
        assert_eq!(Expr::parse_infix(&infix).unwrap(), a());
    }

    #[test]
    fn variables_are_sorted_and_distinct() {
        let expr = Expr::parse_infix("Q * (P2 + ~Q) > P10").unwrap();
        let vars: Vec<_> = expr.variables().into_iter().collect();
        assert_eq!(vars, vec!["P10", "P2", "Q"]);
    }

    #[test]
    fn clones_are_independent() {
        let original = a() | (b() & c());
        let mut copy = original.clone();
        if let Expr::Binary { rhs, .. } = &mut copy {
            **rhs = Expr::var("Z");
        }
        assert_eq!(original, a() | (b() & c()));
        assert_eq!(copy, a() | Expr::var("Z"));
    }
}
