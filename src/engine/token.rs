//! Everything to turn formula text into a stream of tokens

use std::fmt;

/// The connectives of the formula language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `~`, the only unary operator
    Not,
    /// `*`
    And,
    /// `+`
    Or,
    /// `>`
    Implies,
}

impl Operator {
    /// the operator spelled by `ch`, if any
    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            '~' => Some(Operator::Not),
            '*' => Some(Operator::And),
            '+' => Some(Operator::Or),
            '>' => Some(Operator::Implies),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Not => '~',
            Operator::And => '*',
            Operator::Or => '+',
            Operator::Implies => '>',
        }
    }

    /// how tightly the operator binds, larger binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Implies => 1,
            Operator::Or => 2,
            Operator::And => 3,
            Operator::Not => 4,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Not)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One lexical unit of a formula
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// a variable name such as `A` or `P23`
    Ident(String),
    Op(Operator),
    /// (
    OpenParen,
    /// )
    CloseParen,
}

impl Token {
    pub fn ident(name: impl Into<String>) -> Self {
        Token::Ident(name.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{name}"),
            Token::Op(op) => write!(f, "{op}"),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
        }
    }
}

/// A formula as it was written, split into tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

impl From<&str> for Sentence {
    fn from(value: &str) -> Self {
        let mut tokens = Vec::new();
        let mut buffer = String::new();

        for ch in value.chars() {
            match ch {
                '(' => {
                    push_buffer(&mut buffer, &mut tokens);
                    tokens.push(Token::OpenParen);
                }
                ')' => {
                    push_buffer(&mut buffer, &mut tokens);
                    tokens.push(Token::CloseParen);
                }
                c if c.is_whitespace() => {
                    push_buffer(&mut buffer, &mut tokens);
                }
                c => match Operator::from_symbol(c) {
                    Some(op) => {
                        push_buffer(&mut buffer, &mut tokens);
                        tokens.push(Token::Op(op));
                    }
                    None => buffer.push(c),
                },
            }
        }

        push_buffer(&mut buffer, &mut tokens);

        Sentence { tokens }
    }
}

impl From<String> for Sentence {
    fn from(value: String) -> Self {
        Sentence::from(value.as_str())
    }
}

fn push_buffer(buffer: &mut String, tokens: &mut Vec<Token>) {
    if buffer.is_empty() {
        return;
    }
    tokens.push(Token::Ident(std::mem::take(buffer)));
}

/// Split `input` into operator, parenthesis and identifier tokens.
///
/// Whitespace only separates tokens. Any character that is not whitespace,
/// a parenthesis or one of `~ * + >` extends the current identifier, so
/// `P23` is a single token while `P2*3` is three. Nothing is rejected here;
/// later stages refuse streams that do not form a formula.
pub fn tokenize(input: &str) -> Vec<Token> {
    Sentence::from(input).tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Token {
        Token::ident(name)
    }

    #[test]
    fn splits_operators_and_identifiers() {
        let tokens = tokenize("~(P1+ Q23)>R");
        assert_eq!(
            tokens,
            vec![
                Token::Op(Operator::Not),
                Token::OpenParen,
                ident("P1"),
                Token::Op(Operator::Or),
                ident("Q23"),
                Token::CloseParen,
                Token::Op(Operator::Implies),
                ident("R"),
            ]
        );
    }

    #[test]
    fn whitespace_is_only_a_separator() {
        assert_eq!(tokenize("  A \t*\nB  "), tokenize("A*B"));
        assert_eq!(tokenize("A B"), vec![ident("A"), ident("B")]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn precedence_order() {
        let order = [Operator::Implies, Operator::Or, Operator::And, Operator::Not];
        for pair in order.windows(2) {
            assert!(pair[0].precedence() < pair[1].precedence());
        }
    }

    #[test]
    fn tokens_display_as_written() {
        let text = tokenize("~(A * B1) > C")
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(text, "~ ( A * B1 ) > C");
    }
}
