//! Evaluating formulas against truth assignments, one row or the whole table

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use itertools::Itertools;
use log::{debug, warn};
use rayon::prelude::*;
use snafu::ensure;

use super::error::{Result, UnboundVariableSnafu, VariableLimitExceededSnafu};
use super::tree::Expr;

/// Truth tables over more variables than this are refused.
pub const MAX_TRUTH_TABLE_VARIABLES: usize = 18;

/// Somewhere to look up the value of a variable
pub trait Valuation {
    fn value_of(&self, name: &str) -> Option<bool>;
}

impl<S: BuildHasher> Valuation for HashMap<String, bool, S> {
    fn value_of(&self, name: &str) -> Option<bool> {
        self.get(name).copied()
    }
}

impl Valuation for BTreeMap<String, bool> {
    fn value_of(&self, name: &str) -> Option<bool> {
        self.get(name).copied()
    }
}

/// What to do when a variable has no value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnUnbound {
    /// report [`Error::UnboundVariable`](super::Error::UnboundVariable)
    #[default]
    Fail,
    /// treat the variable as false and log a warning
    DefaultFalse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalOptions {
    pub on_unbound: OnUnbound,
}

impl Expr {
    /// Evaluate under `env`, failing on any unbound variable.
    pub fn evaluate<V>(&self, env: &V) -> Result<bool>
    where
        V: Valuation + ?Sized,
    {
        self.evaluate_with(env, EvalOptions::default())
    }

    /// Evaluate under `env`.
    ///
    /// Both operands of a binary node are always evaluated, so an unbound
    /// variable is reported even where its value could not matter.
    pub fn evaluate_with<V>(&self, env: &V, options: EvalOptions) -> Result<bool>
    where
        V: Valuation + ?Sized,
    {
        match self {
            Expr::Var(name) => match env.value_of(name) {
                Some(value) => Ok(value),
                None => match options.on_unbound {
                    OnUnbound::Fail => UnboundVariableSnafu { name: name.clone() }.fail(),
                    OnUnbound::DefaultFalse => {
                        warn!("No truth value for variable '{name}', using false");
                        Ok(false)
                    }
                },
            },
            Expr::Not(arg) => Ok(!arg.evaluate_with(env, options)?),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate_with(env, options)?;
                let rhs = rhs.evaluate_with(env, options)?;
                Ok(op.apply(lhs, rhs))
            }
        }
    }
}

/// Row `bits` of a table over sorted `names`: the first name is the highest bit.
struct Row<'a> {
    names: &'a [&'a str],
    bits: u32,
}

impl Row<'_> {
    fn value_at(&self, j: usize) -> bool {
        let n = self.names.len();
        (self.bits >> (n - 1 - j)) & 1 == 1
    }

    fn values(&self) -> Vec<bool> {
        (0..self.names.len()).map(|j| self.value_at(j)).collect()
    }
}

impl Valuation for Row<'_> {
    fn value_of(&self, name: &str) -> Option<bool> {
        self.names.binary_search(&name).ok().map(|j| self.value_at(j))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthRow {
    /// one value per variable, in the table's variable order
    pub values: Vec<bool>,
    pub result: bool,
}

/// Every assignment of a formula's variables with the formula's value.
///
/// Variables are in lexicographic order and the first one varies slowest,
/// so the rows over `A, B` run `FF, FT, TF, TT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    variables: Vec<String>,
    rows: Vec<TruthRow>,
}

impl TruthTable {
    pub fn new(expr: &Expr) -> Result<Self> {
        let names: Vec<&str> = expr.variables().into_iter().collect();
        let count = names.len();
        ensure!(
            count <= MAX_TRUTH_TABLE_VARIABLES,
            VariableLimitExceededSnafu {
                count,
                limit: MAX_TRUTH_TABLE_VARIABLES,
            }
        );

        let row_count = 1u32 << count;
        debug!("Enumerating {row_count} rows over {count} variables");

        let rows = (0..row_count)
            .into_par_iter()
            .map(|bits| {
                let row = Row { names: &names, bits };
                let result = expr.evaluate(&row)?;
                Ok(TruthRow {
                    values: row.values(),
                    result,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TruthTable {
            variables: names.into_iter().map(String::from).collect(),
            rows,
        })
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn rows(&self) -> &[TruthRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True in every row
    pub fn is_tautology(&self) -> bool {
        self.rows.iter().all(|row| row.result)
    }

    pub fn is_satisfiable(&self) -> bool {
        self.rows.iter().any(|row| row.result)
    }

    /// The rows where the formula holds, as name to value maps.
    pub fn models(&self) -> impl Iterator<Item = BTreeMap<&str, bool>> + '_ {
        self.rows.iter().filter(|row| row.result).map(|row| {
            self.variables
                .iter()
                .map(String::as_str)
                .zip(row.values.iter().copied())
                .collect()
        })
    }
}

fn letter(value: bool) -> char {
    if value {
        'T'
    } else {
        'F'
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\tResult", self.variables.iter().join("\t"))?;
        for row in &self.rows {
            writeln!(
                f,
                "{}\t{}",
                row.values.iter().map(|&v| letter(v)).join("\t"),
                letter(row.result)
            )?;
        }
        Ok(())
    }
}
