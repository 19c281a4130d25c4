//! Rewriting formulas into negation and conjunctive normal form.
//!
//! The conversion runs three passes in order:
//! 1. [`eliminate_implications`]: `A > B` becomes `~A + B`
//! 2. [`to_nnf`]: negations are pushed down onto variables
//! 3. [`distribute`]: `+` is distributed over `*`
//!
//! Every pass takes its input by value and returns a new tree built from
//! the old nodes. The output of [`distribute`] can be exponentially larger
//! than its input.

use log::debug;

use super::error::{Error, PreconditionViolationSnafu, Result};
use super::tree::{BinaryOp, Expr};

/// Replace every `l > r` with `~l + r`.
pub fn eliminate_implications(expr: Expr) -> Expr {
    match expr {
        Expr::Var(_) => expr,
        Expr::Not(arg) => Expr::not(eliminate_implications(*arg)),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eliminate_implications(*lhs);
            let rhs = eliminate_implications(*rhs);
            match op {
                BinaryOp::Implies => Expr::or(Expr::not(lhs), rhs),
                _ => Expr::binary(op, lhs, rhs),
            }
        }
    }
}

/// Push negations inward until they sit directly on variables.
///
/// Double negations cancel and De Morgan's laws move `~` through `*` and
/// `+`. The input must be free of implications.
pub fn to_nnf(expr: Expr) -> Result<Expr> {
    match expr {
        Expr::Var(_) => Ok(expr),
        Expr::Not(arg) => negate(*arg),
        Expr::Binary {
            op: BinaryOp::Implies,
            ..
        } => Err(Error::unexpected_operator(
            "negation normal form",
            "implication-free",
            BinaryOp::Implies,
        )),
        Expr::Binary { op, lhs, rhs } => Ok(Expr::binary(op, to_nnf(*lhs)?, to_nnf(*rhs)?)),
    }
}

/// NNF of `~arg`.
fn negate(arg: Expr) -> Result<Expr> {
    match arg {
        Expr::Var(_) => Ok(Expr::not(arg)),
        Expr::Not(inner) => to_nnf(*inner),
        Expr::Binary {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } => Ok(Expr::and(negate(*lhs)?, negate(*rhs)?)),
        Expr::Binary {
            op: BinaryOp::And,
            lhs,
            rhs,
        } => Ok(Expr::or(negate(*lhs)?, negate(*rhs)?)),
        Expr::Binary {
            op: BinaryOp::Implies,
            ..
        } => Err(Error::unexpected_operator(
            "negation normal form",
            "implication-free",
            BinaryOp::Implies,
        )),
    }
}

/// Turn an NNF formula into a conjunction of clauses.
///
/// Children are converted first, then every `+` whose operand is a `*` is
/// split: `(P * Q) + B` becomes `(P + B) * (Q + B)`, with `B` cloned for one
/// of the two branches.
pub fn distribute(expr: Expr) -> Result<Expr> {
    match expr {
        Expr::Var(_) => Ok(expr),
        Expr::Not(arg) => match *arg {
            Expr::Var(name) => Ok(Expr::not(Expr::Var(name))),
            inner => PreconditionViolationSnafu {
                pass: "conjunctive normal form",
                expected: "negation normal",
                found: Expr::not(inner).to_string(),
            }
            .fail(),
        },
        Expr::Binary {
            op: BinaryOp::And,
            lhs,
            rhs,
        } => Ok(Expr::and(distribute(*lhs)?, distribute(*rhs)?)),
        Expr::Binary {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } => Ok(distribute_or(distribute(*lhs)?, distribute(*rhs)?)),
        Expr::Binary {
            op: BinaryOp::Implies,
            ..
        } => Err(Error::unexpected_operator(
            "conjunctive normal form",
            "negation normal",
            BinaryOp::Implies,
        )),
    }
}

/// `a + b` for two formulas already in CNF.
fn distribute_or(a: Expr, b: Expr) -> Expr {
    match (a, b) {
        (
            Expr::Binary {
                op: BinaryOp::And,
                lhs: p,
                rhs: q,
            },
            b,
        ) => Expr::and(distribute_or(*p, b.clone()), distribute_or(*q, b)),
        (
            a,
            Expr::Binary {
                op: BinaryOp::And,
                lhs: p,
                rhs: q,
            },
        ) => Expr::and(distribute_or(a.clone(), *p), distribute_or(a, *q)),
        (a, b) => Expr::or(a, b),
    }
}

/// Run all three passes.
pub fn to_cnf(expr: Expr) -> Result<Expr> {
    let before = expr.node_count();
    let cnf = distribute(to_nnf(eliminate_implications(expr))?)?;
    debug!("CNF conversion: {before} nodes -> {} nodes", cnf.node_count());
    Ok(cnf)
}

impl Expr {
    /// See [`to_cnf`].
    pub fn into_cnf(self) -> Result<Expr> {
        to_cnf(self)
    }

    /// See [`to_nnf`]; implications are eliminated first.
    pub fn into_nnf(self) -> Result<Expr> {
        to_nnf(eliminate_implications(self))
    }

    /// True for a conjunction of disjunctions of literals.
    pub fn is_cnf(&self) -> bool {
        match self {
            Expr::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => lhs.is_cnf() && rhs.is_cnf(),
            clause => clause.is_clause(),
        }
    }

    fn is_clause(&self) -> bool {
        match self {
            Expr::Binary {
                op: BinaryOp::Or,
                lhs,
                rhs,
            } => lhs.is_clause() && rhs.is_clause(),
            literal => literal.is_literal(),
        }
    }

    pub fn is_nnf(&self) -> bool {
        match self {
            Expr::Var(_) => true,
            Expr::Not(arg) => matches!(**arg, Expr::Var(_)),
            Expr::Binary {
                op: BinaryOp::Implies,
                ..
            } => false,
            Expr::Binary { lhs, rhs, .. } => lhs.is_nnf() && rhs.is_nnf(),
        }
    }
}
