//! Tokens produced when lexing a gene protein reaction rule

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub enum Token {
    /// Gene identifier
    Identifier(String),
    And,
    Or,
    Not,
    LeftParen,
    RightParen,
    Eof,
}
