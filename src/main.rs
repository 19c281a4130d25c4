use std::{collections::HashMap, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, WrapErr};
use log::info;

use proplogic::engine::{
    check_cnf, infix_to_prefix, infix_to_prefix_split, parse_dimacs, DimacsFormula, EvalOptions,
    Expr, OnUnbound, TruthTable,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Parse, evaluate and normalise propositional formulas",
    long_about = "A command-line tool for propositional formulas over ~ (not), * (and), \
                  + (or) and > (implies): prefix conversion, evaluation, truth tables, \
                  CNF conversion, clause validity and DIMACS CNF"
)]
struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an infix formula to prefix notation
    Prefix {
        #[command(flatten)]
        input: Input,

        /// Split at the main operator instead of running the operator stack
        #[arg(long)]
        split: bool,
    },
    /// Build the tree of a prefix formula and describe it
    Tree {
        #[command(flatten)]
        input: Input,
    },
    /// Evaluate an infix formula under an assignment
    Eval {
        #[command(flatten)]
        input: Input,

        /// A truth value, as NAME=VALUE with VALUE one of T, F, 1, 0, true, false
        #[arg(short, long = "assign", value_parser = parse_assignment)]
        assignments: Vec<(String, bool)>,

        /// What to do with variables that have no value
        #[arg(long, value_enum, default_value_t = Unbound::Fail)]
        on_unbound: Unbound,
    },
    /// Print the truth table of an infix formula
    Table {
        #[command(flatten)]
        input: Input,
    },
    /// Convert an infix formula to conjunctive normal form
    Cnf {
        #[command(flatten)]
        input: Input,

        /// Print the result as DIMACS CNF
        #[arg(long)]
        dimacs: bool,
    },
    /// Check clause by clause whether a CNF formula is a tautology
    Valid {
        #[command(flatten)]
        input: Input,
    },
    /// Read DIMACS CNF, print it in infix notation and check it
    Dimacs {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args, Debug)]
struct Input {
    /// File containing the formula
    #[arg(short, long, group = "formula")]
    file: Option<PathBuf>,

    /// The formula
    #[arg(group = "formula")]
    text: Option<String>,
}

impl Input {
    fn read(&self) -> color_eyre::Result<String> {
        match (&self.file, &self.text) {
            (Some(file_path), _) => {
                info!("Reading formula from {file_path:?}");
                std::fs::read_to_string(file_path)
                    .wrap_err_with(|| format!("Unable to read {file_path:?}"))
            }
            (None, Some(text)) => Ok(text.clone()),
            (None, None) => bail!("Must provide either --file <PATH> or the formula itself"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
enum Unbound {
    #[default]
    #[value(help = "Stop with an error")]
    Fail,
    #[value(alias = "false", help = "Use false and log a warning")]
    DefaultFalse,
}

impl From<Unbound> for OnUnbound {
    fn from(value: Unbound) -> Self {
        match value {
            Unbound::Fail => OnUnbound::Fail,
            Unbound::DefaultFalse => OnUnbound::DefaultFalse,
        }
    }
}

fn parse_assignment(s: &str) -> Result<(String, bool), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, found {s:?}"))?;
    let value = match value.trim() {
        "T" | "t" | "1" | "true" => true,
        "F" | "f" | "0" | "false" => false,
        other => return Err(format!("{other:?} is not a truth value")),
    };
    Ok((name.trim().to_string(), value))
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    env_logger::init();

    let args = Arguments::parse();

    match args.command {
        Command::Prefix { input, split } => {
            let infix = input.read()?;
            let prefix = if split {
                infix_to_prefix_split(&infix)
            } else {
                infix_to_prefix(&infix)
            };
            println!("{prefix}");
        }
        Command::Tree { input } => {
            let tree = Expr::from_prefix(&input.read()?)?;
            println!("Infix: {tree}");
            println!("Height: {}", tree.height());
            println!("Structure: {tree:#}");
        }
        Command::Eval {
            input,
            assignments,
            on_unbound,
        } => {
            let tree = Expr::parse_infix(&input.read()?)?;
            let env: HashMap<String, bool> = assignments.into_iter().collect();
            let options = EvalOptions {
                on_unbound: on_unbound.into(),
            };
            let result = tree.evaluate_with(&env, options)?;
            println!("{}", if result { "True" } else { "False" });
        }
        Command::Table { input } => {
            let tree = Expr::parse_infix(&input.read()?)?;
            let table = TruthTable::new(&tree)?;
            print!("{table}");
            println!("Tautology: {}", yes_no(table.is_tautology()));
            println!("Satisfiable: {}", yes_no(table.is_satisfiable()));
        }
        Command::Cnf { input, dimacs } => {
            let cnf = Expr::parse_infix(&input.read()?)?.into_cnf()?;
            if dimacs {
                let (formula, names) = DimacsFormula::from_cnf(&cnf)?;
                for (i, name) in names.iter().enumerate() {
                    println!("c {} {name}", i + 1);
                }
                print!("{formula}");
            } else {
                println!("{cnf}");
            }
        }
        Command::Valid { input } => {
            let report = check_cnf(&input.read()?);
            println!("Number of false clauses: {}", report.false_clauses);
            println!("Number of true clauses: {}", report.true_clauses);
            println!("Valid: {}", yes_no(report.is_valid()));
        }
        Command::Dimacs { input } => {
            let formula = parse_dimacs(&input.read()?)?;
            println!("{}", formula.to_infix());
            println!("Valid: {}", yes_no(formula.is_valid()));
        }
    }

    Ok(())
}
