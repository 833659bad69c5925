//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the [`Parser`] token cursor and the lazy
//! [`Statements`] iterator returned by [`parse`].

use std::collections::VecDeque;

use tracing::trace;

use crate::{
    ast::ast::{Expr, Stmt},
    errors::errors::{add_article, Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Location,
};

use super::{expr::parse_expression as parse_expr, stmt::parse_statement};

/// How many tokens the grammar ever needs to see ahead.
const MAX_LOOKAHEAD: usize = 2;

type TokenStream<'a> = Box<dyn Iterator<Item = Result<Token, Error>> + 'a>;

/// The token cursor shared by every parsing function.
///
/// Tokens are pulled from the underlying stream only when they are looked
/// at. Running out of tokens is reported as
/// [`ErrorImpl::UnexpectedEndOfFile`], which [`Statements`] moves to just
/// after the last token that was consumed.
pub struct Parser<'a> {
    /// The lexer, or anything else producing tokens
    tokens: TokenStream<'a>,
    /// Tokens that have been looked at but not consumed yet
    coming_up_stack: VecDeque<Token>,
    /// The most recently consumed token
    last_popped: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = Result<Token, Error>>,
        I::IntoIter: 'a,
    {
        Parser {
            tokens: Box::new(tokens.into_iter()),
            coming_up_stack: VecDeque::with_capacity(MAX_LOOKAHEAD),
            last_popped: None,
        }
    }

    fn fill(&mut self, count: usize) -> Result<(), Error> {
        while self.coming_up_stack.len() < count {
            match self.tokens.next() {
                Some(token) => self.coming_up_stack.push_back(token?),
                None => return Err(end_of_file()),
            }
        }
        Ok(())
    }

    /// Consumes and returns the next token.
    pub fn pop(&mut self) -> Result<Token, Error> {
        self.fill(1)?;
        let token = self.coming_up_stack.pop_front().ok_or_else(end_of_file)?;
        self.last_popped = Some(token.clone());
        Ok(token)
    }

    /// Returns the `n`th upcoming token without consuming anything.
    /// `coming_up(1)` is the token that `pop()` would return.
    pub fn coming_up(&mut self, n: usize) -> Result<&Token, Error> {
        debug_assert!((1..=MAX_LOOKAHEAD).contains(&n));
        self.fill(n)?;
        self.coming_up_stack.get(n - 1).ok_or_else(end_of_file)
    }

    /// Like `coming_up(1).is(kind, value)`, but the end of the file is just
    /// `false`.
    pub fn next_is(&mut self, kind: TokenKind, value: &str) -> Result<bool, Error> {
        match self.coming_up(1) {
            Ok(token) => Ok(token.is(kind, value)),
            Err(error) if error.is_end_of_file() => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Returns `true` when every token has been consumed.
    pub fn at_end(&mut self) -> Result<bool, Error> {
        match self.coming_up(1) {
            Ok(_) => Ok(false),
            Err(error) if error.is_end_of_file() => Ok(true),
            Err(error) => Err(error),
        }
    }

    /// Pops a token of the given kind, and with the given value if there is
    /// one.
    pub fn check_and_pop(&mut self, kind: TokenKind, value: Option<&str>) -> Result<Token, Error> {
        let token = self.coming_up(1)?;

        if let Some(value) = value {
            if token.value != value {
                return Err(Error::new(
                    ErrorImpl::ExpectedValue {
                        value: String::from(value),
                    },
                    token.location,
                ));
            }
        }

        if token.kind != kind {
            return Err(Error::new(
                ErrorImpl::ExpectedKind {
                    kind: add_article(kind.describe()),
                },
                token.location,
            ));
        }

        self.pop()
    }

    pub fn last_popped(&self) -> Option<&Token> {
        self.last_popped.as_ref()
    }

    /// Points an end of file error right after the last consumed token.
    fn relocate(&self, error: Error) -> Error {
        if !error.is_end_of_file() {
            return error;
        }

        let location = match &self.last_popped {
            Some(token) => {
                let end = token.location.end.unwrap_or(token.location.start);
                Location::new(token.location.line, end, end + 3)
            }
            None => Location::new(1, 0, 3),
        };
        Error::new(ErrorImpl::UnexpectedEndOfFile, location)
    }
}

fn end_of_file() -> Error {
    Error::unlocated(ErrorImpl::UnexpectedEndOfFile)
}

/// A lazy sequence of parsed statements.
///
/// `Type x = value;` produces two statements, so parsed statements wait in
/// `pending` until they are asked for. Nothing is yielded after an error.
pub struct Statements<'a> {
    parser: Parser<'a>,
    pending: VecDeque<Stmt>,
    finished: bool,
}

impl Iterator for Statements<'_> {
    type Item = Result<Stmt, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(stmt) = self.pending.pop_front() {
                return Some(Ok(stmt));
            }
            if self.finished {
                return None;
            }

            let parsed = match self.parser.at_end() {
                Ok(true) => {
                    self.finished = true;
                    return None;
                }
                Ok(false) => parse_statement(&mut self.parser),
                Err(error) => Err(error),
            };

            match parsed {
                Ok(stmts) => {
                    trace!(count = stmts.len(), "parsed a statement");
                    self.pending.extend(stmts);
                }
                Err(error) => {
                    self.finished = true;
                    return Some(Err(self.parser.relocate(error)));
                }
            }
        }
    }
}

/// Parses a stream of tokens into statements.
///
/// Lexer errors in the stream are passed through unchanged.
pub fn parse<'a, I>(tokens: I) -> Statements<'a>
where
    I: IntoIterator<Item = Result<Token, Error>>,
    I::IntoIter: 'a,
{
    Statements {
        parser: Parser::new(tokens),
        pending: VecDeque::new(),
        finished: false,
    }
}

/// Parses tokens that should contain exactly one expression, like `f(1, x)`.
pub fn parse_expression<'a, I>(tokens: I) -> Result<Expr, Error>
where
    I: IntoIterator<Item = Result<Token, Error>>,
    I::IntoIter: 'a,
{
    let mut parser = Parser::new(tokens);

    let expression = parse_expr(&mut parser).map_err(|error| parser.relocate(error))?;
    if !parser.at_end()? {
        let extra = parser.pop()?;
        return Err(Error::new(
            ErrorImpl::ExpectedValue {
                value: String::from(";"),
            },
            extra.location,
        ));
    }

    Ok(expression)
}
