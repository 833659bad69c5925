use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    expand_tabs, Location, MK_TOKEN,
};

use super::tokens::{Token, TokenKind};

/// Handles one regex match. `Ok(None)` means the match is discarded.
pub type RegexHandler = fn(&mut Lexer, &str) -> Result<Option<Token>, Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Order matters, the first pattern that matches wins.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^[0-9]+").unwrap(), handler: integer_handler },
        RegexPattern { regex: Regex::new(r"^(?:->|'s|[(){}\[\];,=.])").unwrap(), handler: op_handler },
        RegexPattern { regex: Regex::new(r"^[\w&&\D]\w*").unwrap(), handler: name_handler },
        RegexPattern { regex: Regex::new(r#"^"[^"\n]*""#).unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new(r"^(?:\s+|//[^\n]*|/\*(?s:.*?)\*/)").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^/\*").unwrap(), handler: unterminated_comment_handler },
        RegexPattern { regex: Regex::new(r"^(?s:.)").unwrap(), handler: error_handler },
    ];
}

/// A lazy tokenizer. Yields tokens until the end of the source or the first
/// error, after which it yields nothing.
pub struct Lexer {
    source: String,
    pos: usize,
    line: usize,
    line_start: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Lexer {
        Lexer {
            source: expand_tabs(source),
            pos: 0,
            line: 1,
            line_start: 0,
            finished: false,
        }
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    /// Column of a byte offset on the current line.
    fn column(&self, offset: usize) -> usize {
        self.source[self.line_start..offset].chars().count()
    }

    fn location_of(&self, matched: &str) -> Location {
        let start = self.column(self.pos);
        Location::new(self.line, start, start + matched.chars().count())
    }

    fn make_token(&self, kind: TokenKind, matched: &str) -> Token {
        MK_TOKEN!(kind, String::from(matched), self.location_of(matched))
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished && !self.at_eof() {
            let (handler, matched) = PATTERNS.iter().find_map(|pattern| {
                pattern
                    .regex
                    .find(self.remainder())
                    .map(|found| (pattern.handler, found.as_str().to_string()))
            })?;

            match handler(self, &matched) {
                Ok(token) => {
                    self.pos += matched.len();
                    if token.is_some() {
                        return token.map(Ok);
                    }
                }
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }
        }

        None
    }
}

fn integer_handler(lexer: &mut Lexer, matched: &str) -> Result<Option<Token>, Error> {
    Ok(Some(lexer.make_token(TokenKind::Integer, matched)))
}

fn op_handler(lexer: &mut Lexer, matched: &str) -> Result<Option<Token>, Error> {
    Ok(Some(lexer.make_token(TokenKind::Op, matched)))
}

fn name_handler(lexer: &mut Lexer, matched: &str) -> Result<Option<Token>, Error> {
    Ok(Some(lexer.make_token(TokenKind::Name, matched)))
}

fn string_handler(lexer: &mut Lexer, matched: &str) -> Result<Option<Token>, Error> {
    Ok(Some(lexer.make_token(TokenKind::String, matched)))
}

fn skip_handler(lexer: &mut Lexer, matched: &str) -> Result<Option<Token>, Error> {
    if let Some(last_newline) = matched.rfind('\n') {
        lexer.line += matched.matches('\n').count();
        lexer.line_start = lexer.pos + last_newline + 1;
    }
    Ok(None)
}

fn unterminated_comment_handler(lexer: &mut Lexer, matched: &str) -> Result<Option<Token>, Error> {
    Err(Error::new(ErrorImpl::UnterminatedComment, lexer.location_of(matched)))
}

fn error_handler(lexer: &mut Lexer, matched: &str) -> Result<Option<Token>, Error> {
    let location = lexer.location_of(matched);
    match matched.chars().next() {
        Some('"') => Err(Error::new(ErrorImpl::UnterminatedString, location)),
        Some(character) => Err(Error::new(ErrorImpl::UnknownCharacter { character }, location)),
        None => Ok(None),
    }
}

/// Turns source code into a lazy sequence of tokens.
///
/// Tabs are expanded to [`crate::TAB_WIDTH`] columns first. Whitespace and
/// comments produce no tokens.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn tokenize(source: &str) -> Lexer {
    Lexer::new(source)
}
