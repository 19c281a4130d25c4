//! The formula pipeline.
//!
//! Text is split by [`tokenize`], reordered by [`infix_to_prefix`] and built
//! into an [`Expr`] by [`Expr::from_prefix`]. A tree is read by
//! [`Expr::evaluate`] and [`TruthTable`], or rewritten by [`to_cnf`], whose
//! rendering can be checked by [`is_valid_cnf`]. [`parse_dimacs`] and
//! [`dimacs_to_infix`] move between DIMACS CNF and the same infix syntax.

pub mod dimacs;
pub mod error;
pub mod eval;
pub mod normal;
pub mod prefix;
pub mod token;
pub mod tree;
pub mod validity;

pub use dimacs::{
    dimacs_to_infix, is_valid_dimacs, parse_dimacs, Clause, DimacsFormula, DimacsHeader, Literal,
};
pub use error::{Error, Result};
pub use eval::{EvalOptions, OnUnbound, TruthRow, TruthTable, Valuation, MAX_TRUTH_TABLE_VARIABLES};
pub use normal::{distribute, eliminate_implications, to_cnf, to_nnf};
pub use prefix::{infix_to_prefix, infix_to_prefix_split};
pub use token::{tokenize, Operator, Sentence, Token};
pub use tree::{BinaryOp, Expr, MAX_NESTING_DEPTH};
pub use validity::{check_cnf, is_valid_cnf, CnfReport};
