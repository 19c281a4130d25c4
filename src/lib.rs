//! Propositional formulas over `~`, `*`, `+` and `>`: parsing, evaluation,
//! normal forms, syntactic validity and DIMACS CNF.

pub mod engine;
