use lazy_static::lazy_static;
use std::{collections::HashSet, fmt::Display};

use crate::Location;

lazy_static! {
    /// Names that have a special meaning and can't be used as variables.
    pub static ref RESERVED_WORDS: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("return");
        set.insert("if");
        set.insert("function");
        set.insert("returns");
        set
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Integer,
    Name,
    String,
    Op,
}

impl TokenKind {
    /// Human readable description used in "this should be ..." errors.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Integer => "integer",
            TokenKind::Name => "name",
            TokenKind::String => "string",
            TokenKind::Op => "operator",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text. Strings keep their quotes.
    pub value: String,
    pub location: Location,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.kind, self.value)
    }
}

impl Token {
    pub fn is(&self, kind: TokenKind, value: &str) -> bool {
        self.kind == kind && self.value == value
    }

    pub fn is_op(&self, value: &str) -> bool {
        self.is(TokenKind::Op, value)
    }

    pub fn is_reserved(&self) -> bool {
        self.kind == TokenKind::Name && RESERVED_WORDS.contains(self.value.as_str())
    }
}
