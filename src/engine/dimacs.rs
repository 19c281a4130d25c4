//! Reading, writing and checking formulas in DIMACS CNF format.
//!
//! ```text
//! c comment lines start with 'c'
//! p cnf <variables> <clauses>
//! 1 -2 0
//! -1 2 0
//! ```
//!
//! Each clause is a run of nonzero signed integers closed by `0`. The sign
//! is the polarity and the magnitude the variable index.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use log::{debug, warn};
use snafu::{ensure, OptionExt};

use super::error::{
    Error, MalformedDimacsClauseSnafu, MalformedDimacsHeaderSnafu, PreconditionViolationSnafu,
    Result,
};
use super::tree::{BinaryOp, Expr};

pub type Literal = i32;
pub type Clause = Vec<Literal>;

/// The `p cnf` line. Only informative: clauses are never checked against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimacsHeader {
    pub num_vars: usize,
    pub num_clauses: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimacsFormula {
    pub header: DimacsHeader,
    pub clauses: Vec<Clause>,
}

/// Parse DIMACS CNF text.
///
/// Blank lines and `c` lines are skipped anywhere. Exactly one `p cnf` line
/// is required and clause data is only read after it. A `0` closes the
/// clause collected so far, which may span several lines; integers left
/// open at the end of the input are dropped.
pub fn parse_dimacs(input: &str) -> Result<DimacsFormula> {
    let mut header: Option<DimacsHeader> = None;
    let mut clauses: Vec<Clause> = Vec::new();
    let mut current: Clause = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('c') {
            continue;
        }

        if line.starts_with('p') {
            ensure!(
                header.is_none(),
                MalformedDimacsHeaderSnafu {
                    reason: format!("second problem line on line {number}"),
                }
            );
            header = Some(parse_header(line)?);
            continue;
        }

        if header.is_none() {
            warn!("Skipping line {number} before the problem line: {line:?}");
            continue;
        }

        for token in line.split_whitespace() {
            let lit: Literal = token
                .parse()
                .ok()
                .filter(|&lit: &Literal| lit != Literal::MIN)
                .context(MalformedDimacsClauseSnafu { line: number, token })?;
            if lit == 0 {
                if !current.is_empty() {
                    clauses.push(std::mem::take(&mut current));
                }
            } else {
                current.push(lit);
            }
        }
    }

    let header = header.context(MalformedDimacsHeaderSnafu {
        reason: "no problem line found",
    })?;

    if !current.is_empty() {
        warn!("Dropping unterminated clause {current:?} at the end of the input");
    }
    if clauses.len() != header.num_clauses {
        warn!(
            "Header declares {} clauses, found {}",
            header.num_clauses,
            clauses.len()
        );
    }
    let max_var = max_variable(&clauses);
    if max_var > header.num_vars {
        warn!("Header declares {} variables, clauses use {max_var}", header.num_vars);
    }

    debug!("Parsed {} clauses over {max_var} variables", clauses.len());
    Ok(DimacsFormula { header, clauses })
}

fn parse_header(line: &str) -> Result<DimacsHeader> {
    let malformed = || MalformedDimacsHeaderSnafu {
        reason: format!("expected 'p cnf <variables> <clauses>', found {line:?}"),
    };

    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some("p"), Some("cnf"), Some(vars), Some(count)) => Ok(DimacsHeader {
            num_vars: vars.parse().ok().with_context(malformed)?,
            num_clauses: count.parse().ok().with_context(malformed)?,
        }),
        _ => malformed().fail(),
    }
}

fn max_variable(clauses: &[Clause]) -> usize {
    clauses
        .iter()
        .flatten()
        .map(|lit| lit.unsigned_abs() as usize)
        .max()
        .unwrap_or(0)
}

/// True when the clause holds some `v` together with `-v`.
pub fn is_clause_tautology(clause: &[Literal]) -> bool {
    let positive: BTreeSet<u32> = clause
        .iter()
        .filter(|&&lit| lit > 0)
        .map(|lit| lit.unsigned_abs())
        .collect();
    clause.iter().any(|&lit| lit < 0 && positive.contains(&lit.unsigned_abs()))
}

/// True when every clause is a tautology, including when there are none.
pub fn is_valid_dimacs(clauses: &[Clause]) -> bool {
    clauses.iter().all(|clause| is_clause_tautology(clause))
}

fn literal_name(lit: Literal) -> String {
    if lit < 0 {
        format!("~P{}", lit.unsigned_abs())
    } else {
        format!("P{lit}")
    }
}

/// Render clauses in infix notation with variables named `P<index>`.
///
/// ```
/// use proplogic::engine::dimacs_to_infix;
///
/// assert_eq!(dimacs_to_infix(&[vec![1, -2], vec![-1, 2]]), "(P1 + ~P2) * (~P1 + P2)");
/// ```
pub fn dimacs_to_infix(clauses: &[Clause]) -> String {
    clauses
        .iter()
        .filter(|clause| !clause.is_empty())
        .map(|clause| format!("({})", clause.iter().map(|&lit| literal_name(lit)).join(" + ")))
        .join(" * ")
}

impl DimacsFormula {
    /// Wrap clauses with a header that matches them.
    pub fn new(clauses: Vec<Clause>) -> Self {
        let header = DimacsHeader {
            num_vars: max_variable(&clauses),
            num_clauses: clauses.len(),
        };
        DimacsFormula { header, clauses }
    }

    /// Encode a CNF tree.
    ///
    /// Variables are numbered from 1 in lexicographic order of their names;
    /// the returned names list holds the name of variable `i` at `i - 1`.
    pub fn from_cnf(expr: &Expr) -> Result<(Self, Vec<String>)> {
        let names: Vec<String> = expr.variables().into_iter().map(String::from).collect();
        let index: BTreeMap<&str, Literal> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), (i + 1) as Literal))
            .collect();

        let mut clauses = Vec::new();
        collect_clauses(expr, &index, &mut clauses)?;
        Ok((DimacsFormula::new(clauses), names))
    }

    pub fn to_infix(&self) -> String {
        dimacs_to_infix(&self.clauses)
    }

    pub fn is_valid(&self) -> bool {
        is_valid_dimacs(&self.clauses)
    }
}

fn collect_clauses(
    expr: &Expr,
    index: &BTreeMap<&str, Literal>,
    clauses: &mut Vec<Clause>,
) -> Result<()> {
    match expr {
        Expr::Binary {
            op: BinaryOp::And,
            lhs,
            rhs,
        } => {
            collect_clauses(lhs, index, clauses)?;
            collect_clauses(rhs, index, clauses)
        }
        clause => {
            let mut lits = Vec::new();
            collect_literals(clause, index, &mut lits)?;
            clauses.push(lits);
            Ok(())
        }
    }
}

fn collect_literals(expr: &Expr, index: &BTreeMap<&str, Literal>, lits: &mut Clause) -> Result<()> {
    match expr {
        Expr::Binary {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } => {
            collect_literals(lhs, index, lits)?;
            collect_literals(rhs, index, lits)
        }
        Expr::Var(name) => {
            lits.push(index[name.as_str()]);
            Ok(())
        }
        Expr::Not(arg) => match &**arg {
            Expr::Var(name) => {
                lits.push(-index[name.as_str()]);
                Ok(())
            }
            _ => not_cnf(expr),
        },
        _ => not_cnf(expr),
    }
}

fn not_cnf(expr: &Expr) -> Result<()> {
    PreconditionViolationSnafu {
        pass: "DIMACS encoding",
        expected: "conjunctive normal form",
        found: expr.to_string(),
    }
    .fail()
}

impl FromStr for DimacsFormula {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_dimacs(s)
    }
}

impl fmt::Display for DimacsFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.header.num_vars, self.header.num_clauses)?;
        for clause in &self.clauses {
            writeln!(f, "{} 0", clause.iter().join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders() {
        let formula = parse_dimacs("p cnf 2 2\n1 -2 0\n-1 2 0\n").unwrap();
        assert_eq!(formula.clauses, vec![vec![1, -2], vec![-1, 2]]);
        assert_eq!(
            formula.header,
            DimacsHeader {
                num_vars: 2,
                num_clauses: 2
            }
        );
        assert_eq!(formula.to_infix(), "(P1 + ~P2) * (~P1 + P2)");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let input = "c example\n\n  c indented comment\np cnf 3 2\nc between\n1 2 3 0\n\n-3 0\n";
        let formula = parse_dimacs(input).unwrap();
        assert_eq!(formula.clauses, vec![vec![1, 2, 3], vec![-3]]);
    }

    #[test]
    fn clauses_may_span_lines() {
        let formula = parse_dimacs("p cnf 3 2\n1 2\n3 0 -1\n-2 0\n").unwrap();
        assert_eq!(formula.clauses, vec![vec![1, 2, 3], vec![-1, -2]]);
    }

    #[test]
    fn unterminated_clause_is_dropped() {
        let formula = parse_dimacs("p cnf 2 2\n1 -2 0\n-1 2\n").unwrap();
        assert_eq!(formula.clauses, vec![vec![1, -2]]);
    }

    #[test]
    fn missing_header_is_an_error() {
        let err = parse_dimacs("1 -2 0\n").unwrap_err();
        assert!(matches!(err, Error::MalformedDimacsHeader { .. }));
    }

    #[test]
    fn malformed_headers_are_errors() {
        for input in ["p dnf 2 2\n", "p cnf two 2\n", "p cnf 2\n", "p cnf 2 2\np cnf 2 2\n"] {
            let err = parse_dimacs(input).unwrap_err();
            assert!(matches!(err, Error::MalformedDimacsHeader { .. }), "input {input:?}: {err}");
        }
    }

    #[test]
    fn non_integer_literal_is_an_error() {
        let err = parse_dimacs("p cnf 2 1\n1 x 0\n").unwrap_err();
        assert_eq!(
            err,
            Error::MalformedDimacsClause {
                line: 2,
                token: "x".to_string()
            }
        );
    }

    #[test]
    fn validity_needs_every_clause_complemented() {
        assert!(is_valid_dimacs(&[vec![1, -1], vec![2, 3, -2]]));
        assert!(!is_valid_dimacs(&[vec![1, -1], vec![2, 3]]));
        assert!(!is_clause_tautology(&[1, 2, -3]));
        assert!(is_valid_dimacs(&[]));
    }

    #[test]
    fn empty_formula_renders_empty() {
        assert_eq!(dimacs_to_infix(&[]), "");
        let formula = parse_dimacs("p cnf 0 0\n").unwrap();
        assert_eq!(formula.to_infix(), "");
    }

    #[test]
    fn encodes_cnf_trees() {
        let expr = Expr::parse_infix("(B + ~A) * (~C + (A + B))").unwrap();
        let (formula, names) = DimacsFormula::from_cnf(&expr).unwrap();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(formula.clauses, vec![vec![2, -1], vec![-3, 1, 2]]);
        assert_eq!(formula.to_string(), "p cnf 3 2\n2 -1 0\n-3 1 2 0\n");
        assert_eq!(formula.to_string().parse::<DimacsFormula>().unwrap(), formula);
    }

    #[test]
    fn refuses_to_encode_non_cnf() {
        let expr = Expr::parse_infix("A + B * C").unwrap();
        assert!(DimacsFormula::from_cnf(&expr).is_err());
    }
}
