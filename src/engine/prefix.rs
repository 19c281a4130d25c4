//! Reordering infix formulas into prefix (operator first) notation.
//!
//! Two converters live here. [`to_prefix_tokens`] is a single stack pass over
//! the reversed token stream. [`split_to_prefix_tokens`] recursively splits at
//! the weakest top-level operator. Both group equal-precedence binary
//! operators to the left and both drop redundant parentheses.

use itertools::Itertools;
use log::debug;

use super::token::{Operator, Sentence, Token};

/// Reorder infix `tokens` into prefix order using an operator stack.
///
/// The stream is read back to front with the roles of `(` and `)` swapped.
/// A stacked operator is only emitted ahead of an incoming one when it binds
/// strictly tighter, which after the final reversal makes equal-precedence
/// operators group to the left. Unbalanced parentheses are kept in the output
/// so the tree builder can reject them.
pub fn to_prefix_tokens(tokens: &[Token]) -> Vec<Token> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens.iter().rev() {
        match token {
            Token::Ident(_) => output.push(token.clone()),

            // a `)` read backwards opens a group
            Token::CloseParen => stack.push(Token::OpenParen),

            Token::OpenParen => {
                let mut matched = false;
                while let Some(top) = stack.pop() {
                    match top {
                        Token::OpenParen => {
                            matched = true;
                            break;
                        }
                        _ => output.push(top),
                    }
                }
                if !matched {
                    output.push(Token::OpenParen);
                }
            }

            Token::Op(op) => {
                while let Some(Token::Op(top)) = stack.last() {
                    if top.precedence() > op.precedence() {
                        output.extend(stack.pop());
                    } else {
                        break;
                    }
                }
                stack.push(token.clone());
            }
        }
    }

    // Pop any remaining operators
    while let Some(top) = stack.pop() {
        match top {
            Token::OpenParen => output.push(Token::CloseParen),
            _ => output.push(top),
        }
    }

    output.reverse();
    output
}

/// Reorder infix `tokens` into prefix order by splitting at the main operator.
///
/// A fully parenthesised group is unwrapped first. The main operator is the
/// weakest binary operator outside any parentheses, the rightmost one on a
/// tie. Without one, a leading `~` applies to everything after it.
pub fn split_to_prefix_tokens(tokens: &[Token]) -> Vec<Token> {
    let mut output = Vec::with_capacity(tokens.len());
    // pending pieces, the next one to emit on top
    let mut work: Vec<&[Token]> = vec![tokens];

    while let Some(piece) = work.pop() {
        let piece = strip_enclosing_parens(piece);

        if let Some(pos) = main_operator(piece) {
            output.push(piece[pos].clone());
            work.push(&piece[pos + 1..]);
            work.push(&piece[..pos]);
            continue;
        }

        match piece.split_first() {
            Some((Token::Op(Operator::Not), rest)) => {
                output.push(Token::Op(Operator::Not));
                work.push(rest);
            }
            _ => output.extend(piece.iter().cloned()),
        }
    }

    output
}

/// Position of the weakest binary operator at parenthesis depth zero.
fn main_operator(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    let mut main: Option<(usize, u8)> = None;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::OpenParen => depth += 1,
            Token::CloseParen => depth -= 1,
            Token::Op(op) if depth == 0 && !op.is_unary() => {
                if main.map_or(true, |(_, weakest)| op.precedence() <= weakest) {
                    main = Some((i, op.precedence()));
                }
            }
            _ => {}
        }
    }

    main.map(|(i, _)| i)
}

/// Drop every parenthesis pair that wraps the whole slice, as in `((A + B))`.
pub(crate) fn strip_enclosing_parens(tokens: &[Token]) -> &[Token] {
    let leading = tokens.iter().take_while(|&token| *token == Token::OpenParen).count();
    if leading == 0 {
        return tokens;
    }

    // closing index of each leading `(`
    let mut closes: Vec<Option<usize>> = vec![None; leading];
    let mut open: Vec<usize> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::OpenParen => open.push(i),
            Token::CloseParen => {
                if let Some(start) = open.pop() {
                    if start < leading {
                        closes[start] = Some(i);
                    }
                }
            }
            _ => {}
        }
    }

    let last = tokens.len() - 1;
    let pairs = closes
        .iter()
        .enumerate()
        .take_while(|&(i, close)| *close == Some(last - i))
        .count();

    &tokens[pairs..tokens.len() - pairs]
}

/// Convert an infix formula into space separated prefix notation.
///
/// ```
/// use proplogic::engine::infix_to_prefix;
///
/// assert_eq!(infix_to_prefix("A > B * C"), "> A * B C");
/// ```
pub fn infix_to_prefix(infix: &str) -> String {
    let sentence = Sentence::from(infix);
    let prefix = to_prefix_tokens(&sentence.tokens).iter().join(" ");
    debug!("infix {infix:?} -> prefix {prefix:?}");
    prefix
}

/// Same contract as [`infix_to_prefix`], computed by top-level splitting.
pub fn infix_to_prefix_split(infix: &str) -> String {
    let sentence = Sentence::from(infix);
    split_to_prefix_tokens(&sentence.tokens).iter().join(" ")
}
