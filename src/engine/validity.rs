//! Syntactic validity of formulas already written in conjunctive normal form

use std::collections::BTreeSet;

use log::debug;

use super::prefix::strip_enclosing_parens;
use super::token::{tokenize, Operator, Token};

/// How many clauses of a CNF formula are tautologies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CnfReport {
    pub true_clauses: usize,
    pub false_clauses: usize,
}

impl CnfReport {
    pub fn clauses(&self) -> usize {
        self.true_clauses + self.false_clauses
    }

    /// At least one clause, and every clause holds a complementary pair.
    pub fn is_valid(&self) -> bool {
        self.clauses() > 0 && self.false_clauses == 0
    }
}

/// Split a CNF formula into clauses and classify each one.
///
/// Clauses are separated by `*` outside parentheses. A clause wrapped in
/// its own parentheses is unwrapped and split again, so the nested
/// conjunctions of a rendered CNF tree are flattened. A clause is true when
/// some variable occurs both plain and under `~`. No normal-form conversion
/// happens here, other shapes give meaningless counts.
pub fn check_cnf(formula: &str) -> CnfReport {
    let tokens = tokenize(formula);
    let mut clauses = Vec::new();
    split_clauses(&tokens, &mut clauses);

    let mut report = CnfReport::default();
    for clause in clauses {
        if clause_is_tautology(clause) {
            report.true_clauses += 1;
        } else {
            report.false_clauses += 1;
        }
    }

    debug!(
        "CNF check of {formula:?}: {} true clauses, {} false clauses",
        report.true_clauses, report.false_clauses
    );
    report
}

/// Whether every clause of a CNF formula is a tautology.
///
/// ```
/// use proplogic::engine::is_valid_cnf;
///
/// assert!(is_valid_cnf("(A + ~A) * (B + ~B)"));
/// assert!(!is_valid_cnf("(A + B) * (~A + ~B)"));
/// ```
pub fn is_valid_cnf(formula: &str) -> bool {
    check_cnf(formula).is_valid()
}

fn split_clauses<'a>(tokens: &'a [Token], clauses: &mut Vec<&'a [Token]>) {
    // pending pieces, leftmost on top
    let mut work = vec![tokens];

    while let Some(piece) = work.pop() {
        let piece = strip_enclosing_parens(piece);
        if piece.is_empty() {
            continue;
        }

        let parts = split_top_level(piece, Operator::And);
        if parts.len() == 1 {
            clauses.push(piece);
        } else {
            work.extend(parts.into_iter().rev());
        }
    }
}

fn split_top_level(tokens: &[Token], at: Operator) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::OpenParen => depth += 1,
            Token::CloseParen => depth -= 1,
            Token::Op(op) if *op == at && depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);

    parts
}

fn clause_is_tautology(tokens: &[Token]) -> bool {
    let mut positive = BTreeSet::new();
    let mut negative = BTreeSet::new();
    let mut negated = false;

    for token in tokens {
        match token {
            Token::Op(Operator::Not) => negated = !negated,
            Token::Ident(name) => {
                if negated {
                    negative.insert(name.as_str());
                } else {
                    positive.insert(name.as_str());
                }
                negated = false;
            }
            _ => {}
        }
    }

    !positive.is_disjoint(&negative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complementary_pairs_make_clauses_true() {
        assert!(is_valid_cnf("(A + ~A) * (B + ~B)"));
        assert!(!is_valid_cnf("(A + B) * (~A + ~B)"));
    }

    #[test]
    fn counts_clauses() {
        let report = check_cnf("(A + ~A) * (B + C) * (~P12 + D + P12)");
        assert_eq!(
            report,
            CnfReport {
                true_clauses: 2,
                false_clauses: 1
            }
        );
        assert!(!report.is_valid());
    }

    #[test]
    fn flattens_nested_conjunctions() {
        let report = check_cnf("((A + ~A) * (B + ~B)) * (C + D)");
        assert_eq!(report.clauses(), 3);
        assert_eq!(report.false_clauses, 1);

        assert!(is_valid_cnf("(((A + ~B) + B) * ((~C + D) + C))"));
    }

    #[test]
    fn single_clause_without_parentheses() {
        assert!(is_valid_cnf("A + B + ~A"));
        assert!(!is_valid_cnf("A"));
        assert!(!is_valid_cnf("~A"));
    }

    #[test]
    fn identifiers_must_match_exactly() {
        assert!(!is_valid_cnf("(P1 + ~P12)"));
        assert!(is_valid_cnf("(P12 + ~P12)"));
    }

    #[test]
    fn deeply_nested_input() {
        let depth = 20_000;
        let nested = format!("{}A + ~A{}", "(".repeat(depth), ")".repeat(depth));
        assert!(is_valid_cnf(&nested));

        let depth = 2_000;
        let grouped = format!("{}(A + ~A){}", "(".repeat(depth), " * (B + ~B))".repeat(depth));
        let report = check_cnf(&grouped);
        assert_eq!(report.clauses(), depth + 1);
        assert!(report.is_valid());
    }

    #[test]
    fn empty_formula_is_not_valid() {
        assert_eq!(check_cnf("").clauses(), 0);
        assert!(!is_valid_cnf(""));
        assert!(!is_valid_cnf("()"));
    }
}
