//! Tokens produced when lexing a reaction equation

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    /// Coefficient or metabolite identifier, told apart by the parser
    Word(String),
    Plus,
    Arrow(Direction),
    Eof,
}

/// Direction encoded by the arrow of an equation
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Direction {
    /// `-->`
    Forward,
    /// `<--`
    Backward,
    /// `<->`
    Reversible,
}
