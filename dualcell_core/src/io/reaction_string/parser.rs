use indexmap::IndexMap;
use thiserror::Error;

use crate::io::reaction_string::token::{Direction, Token};
/*
Equation Grammar:
equation -> side ARROW side ;
side -> ( term ( "+" term )* )? ;
term -> COEFFICIENT? IDENTIFIER ;

e.g. 2 M_PYR_c + M_ATP_c --> M_PEP_c
 */

/// Equation Parser
pub struct EquationParser {
    tokens: Vec<Token>,
    current: usize,
}

/// Stoichiometry and direction of a parsed equation
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    /// Net coefficient per metabolite (negative for substrates)
    pub metabolites: IndexMap<String, f64>,
    pub direction: Direction,
}

impl EquationParser {
    pub fn new(mut tokens: Vec<Token>) -> EquationParser {
        if tokens.last() != Some(&Token::Eof) {
            tokens.push(Token::Eof);
        }
        EquationParser { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Equation, ParseError> {
        let mut metabolites = IndexMap::new();
        let substrates = self.side()?;
        let direction = match self.peek() {
            Token::Arrow(direction) => *direction,
            Token::Eof => return Err(ParseError::MissingArrow),
            other => return Err(ParseError::UnexpectedToken(format!("{:?}", other))),
        };
        self.advance();
        let products = self.side()?;
        if !self.is_at_end() {
            return Err(match self.peek() {
                Token::Arrow(_) => ParseError::MultipleArrows,
                other => ParseError::UnexpectedToken(format!("{:?}", other)),
            });
        }
        for (id, coef) in substrates {
            *metabolites.entry(id).or_insert(0.) -= coef;
        }
        for (id, coef) in products {
            *metabolites.entry(id).or_insert(0.) += coef;
        }
        metabolites.retain(|_, coef| *coef != 0.);
        Ok(Equation {
            metabolites,
            direction,
        })
    }

    fn side(&mut self) -> Result<Vec<(String, f64)>, ParseError> {
        let mut terms = Vec::new();
        if !matches!(self.peek(), Token::Word(_)) {
            return Ok(terms);
        }
        terms.push(self.term()?);
        while matches!(self.peek(), Token::Plus) {
            self.advance();
            terms.push(self.term()?);
        }
        Ok(terms)
    }

    fn term(&mut self) -> Result<(String, f64), ParseError> {
        let first = self.expect_word()?;
        if let Token::Word(_) = self.peek() {
            let coefficient = Self::coefficient(&first)?;
            let id = self.expect_word()?;
            return Ok((id, coefficient));
        }
        Ok((first, 1.))
    }

    /// A leading word is a coefficient only when followed by another word
    fn coefficient(word: &str) -> Result<f64, ParseError> {
        let numeric_start = word
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '.');
        match word.parse::<f64>() {
            Ok(value) if numeric_start && value.is_finite() && value > 0. => Ok(value),
            _ => Err(ParseError::InvalidCoefficient(word.to_string())),
        }
    }

    fn expect_word(&mut self) -> Result<String, ParseError> {
        if let Token::Word(word) = self.peek() {
            let word = word.clone();
            self.advance();
            return Ok(word);
        }
        Err(ParseError::ExpectedIdentifier(self.current))
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseError {
    #[error("Equation has no arrow, expected one of -->, <-- or <->")]
    MissingArrow,
    #[error("Equation has more than one arrow")]
    MultipleArrows,
    #[error("Expected a metabolite identifier at token {0}")]
    ExpectedIdentifier(usize),
    #[error("{0} is not a valid positive coefficient")]
    InvalidCoefficient(String),
    #[error("Unexpected token {0}")]
    UnexpectedToken(String),
}
