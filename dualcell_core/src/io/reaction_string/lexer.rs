//! Lex a reaction equation into a series of tokens for later parsing
use thiserror::Error;

use crate::io::reaction_string::token::{Direction, Token};

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the whole equation into tokens, terminated by [`Token::Eof`]
    pub fn lex(&mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.tokens.push(Token::Eof);
        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        if let Some(direction) = self.match_arrow() {
            self.tokens.push(Token::Arrow(direction));
            return Ok(());
        }
        let c = self.advance();
        match c {
            ' ' | '\r' | '\n' | '\t' => {}
            '+' if self.peek().is_whitespace() || self.is_at_end() => self.tokens.push(Token::Plus),
            c if c.is_control() => {
                return Err(LexerError::InvalidCharacter {
                    character: c,
                    position: self.start,
                })
            }
            _ => self.read_word(),
        };
        Ok(())
    }

    fn match_arrow(&mut self) -> Option<Direction> {
        let direction = match self.lookahead(3).as_str() {
            "-->" => Direction::Forward,
            "<--" => Direction::Backward,
            "<->" => Direction::Reversible,
            _ => return None,
        };
        self.current += 3;
        Some(direction)
    }

    fn read_word(&mut self) {
        while !self.is_at_end() && !self.peek().is_whitespace() && !self.at_arrow() {
            self.advance();
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::Word(text));
    }

    fn at_arrow(&self) -> bool {
        matches!(self.lookahead(3).as_str(), "-->" | "<--" | "<->")
    }

    fn lookahead(&self, n: usize) -> String {
        self.source[self.current..(self.current + n).min(self.source.len())]
            .iter()
            .collect()
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexerError {
    #[error("Unexpected character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str) -> Token {
        Token::Word(w.to_string())
    }

    #[test]
    fn simple_equation() {
        let tokens = Lexer::new("2 M_MAL_c + M_NADP_c <-> B_MAL_c").lex().unwrap();
        assert_eq!(
            tokens,
            vec![
                word("2"),
                word("M_MAL_c"),
                Token::Plus,
                word("M_NADP_c"),
                Token::Arrow(Direction::Reversible),
                word("B_MAL_c"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn glued_arrow_and_sink() {
        let tokens = Lexer::new("0.5 10fthf_c-->").lex().unwrap();
        assert_eq!(
            tokens,
            vec![
                word("0.5"),
                word("10fthf_c"),
                Token::Arrow(Direction::Forward),
                Token::Eof
            ]
        );
    }

    #[test]
    fn plus_inside_identifier() {
        let tokens = Lexer::new("<-- nad+_c").lex().unwrap();
        assert_eq!(
            tokens,
            vec![Token::Arrow(Direction::Backward), word("nad+_c"), Token::Eof]
        );
    }
}
