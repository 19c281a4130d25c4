//! Errors reported by the engine

use snafu::Snafu;

use super::tree::BinaryOp;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// the token stream does not describe a formula
    #[snafu(display("Malformed expression: {reason}"))]
    MalformedExpression { reason: String },

    /// evaluation reached a variable with no value
    #[snafu(display("No truth value for variable '{name}'"))]
    UnboundVariable { name: String },

    /// missing, repeated or unreadable `p cnf` line
    #[snafu(display("Invalid or missing 'p cnf' line: {reason}"))]
    MalformedDimacsHeader { reason: String },

    /// a clause line holds something other than an integer
    #[snafu(display("Invalid literal '{token}' on line {line}"))]
    MalformedDimacsClause { line: usize, token: String },

    #[snafu(display("Truth table over {count} variables exceeds the limit of {limit}"))]
    VariableLimitExceeded { count: usize, limit: usize },

    /// a rewrite pass was handed a shape it does not accept
    #[snafu(display("{pass} expects {expected} input, found '{found}'"))]
    PreconditionViolation {
        pass: &'static str,
        expected: &'static str,
        found: String,
    },
}

impl Error {
    pub(crate) fn unexpected_operator(
        pass: &'static str,
        expected: &'static str,
        op: BinaryOp,
    ) -> Self {
        PreconditionViolationSnafu {
            pass,
            expected,
            found: op.to_string(),
        }
        .build()
    }
}
