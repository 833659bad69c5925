//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Integers, names and strings
//! - Operators
//! - Whitespace, comments and line tracking
//! - Tab expansion
//! - Error cases

use proptest::prelude::*;

use crate::{errors::errors::Error, expand_tabs, Location};

use super::{
    lexer::tokenize,
    tokens::{Token, TokenKind},
};

fn lex(source: &str) -> Result<Vec<Token>, Error> {
    tokenize(source).collect()
}

fn token(kind: TokenKind, value: &str, location: Location) -> Token {
    Token {
        kind,
        value: value.to_string(),
        location,
    }
}

#[test]
fn test_tokenize_integer() {
    assert_eq!(
        lex("123").unwrap(),
        vec![token(TokenKind::Integer, "123", Location::new(1, 0, 3))]
    );
}

#[test]
fn test_tokenize_ops() {
    for op in "= ( ) { } [ ] ; , . -> 's".split(' ') {
        let tokens = lex(op).unwrap();
        assert_eq!(
            tokens,
            vec![token(TokenKind::Op, op, Location::new(1, 0, op.len()))]
        );
    }
}

#[test]
fn test_tokenize_names() {
    assert_eq!(
        lex("hello").unwrap(),
        vec![token(TokenKind::Name, "hello", Location::new(1, 0, 5))]
    );
    assert_eq!(
        lex("lol123").unwrap(),
        vec![token(TokenKind::Name, "lol123", Location::new(1, 0, 6))]
    );
    assert_eq!(
        lex("_under_score").unwrap(),
        vec![token(TokenKind::Name, "_under_score", Location::new(1, 0, 12))]
    );
}

#[test]
fn test_names_do_not_start_with_digits() {
    assert_eq!(
        lex("123wolo").unwrap(),
        vec![
            token(TokenKind::Integer, "123", Location::new(1, 0, 3)),
            token(TokenKind::Name, "wolo", Location::new(1, 3, 7)),
        ]
    );
}

#[test]
fn test_tokenize_strings() {
    assert_eq!(
        lex("\"hello world\"").unwrap(),
        vec![token(TokenKind::String, "\"hello world\"", Location::new(1, 0, 13))]
    );
}

#[test]
fn test_strings_have_no_escapes() {
    assert_eq!(
        lex(r#""a\n""#).unwrap(),
        vec![token(TokenKind::String, r#""a\n""#, Location::new(1, 0, 5))]
    );
}

#[test]
fn test_unterminated_string() {
    let error = lex("x \"hello \n world\"").unwrap_err();
    assert_eq!(error.message(), "this string doesn't end");
    assert_eq!(error.get_location(), Some(Location::new(1, 2, 3)));
}

#[test]
fn test_unterminated_comment() {
    let error = lex("x /* never\n closed").unwrap_err();
    assert_eq!(error.message(), "this comment doesn't end");
    assert_eq!(error.get_location(), Some(Location::new(1, 2, 4)));

    // a lone slash is still just an unknown character
    let error = lex("x / y").unwrap_err();
    assert_eq!(error.message(), "unknown character '/'");
}

#[test]
fn test_whitespace() {
    assert_eq!(lex(" \n \t \r  ").unwrap(), vec![]);
    assert_eq!(
        lex(" \n \t 123 \r ").unwrap(),
        vec![token(TokenKind::Integer, "123", Location::new(2, 5, 8))]
    );
}

#[test]
fn test_comments() {
    assert_eq!(
        lex("// hello\n123").unwrap(),
        vec![token(TokenKind::Integer, "123", Location::new(2, 0, 3))]
    );
    assert_eq!(lex("/* hello\nhello\nhello */").unwrap(), vec![]);
    assert_eq!(
        lex("/* a */ x /* b\n */ y").unwrap(),
        vec![
            token(TokenKind::Name, "x", Location::new(1, 8, 9)),
            token(TokenKind::Name, "y", Location::new(2, 4, 5)),
        ]
    );
}

#[test]
fn test_tabs_are_expanded() {
    assert_eq!(
        lex("\tstuff").unwrap(),
        vec![token(TokenKind::Name, "stuff", Location::new(1, 4, 9))]
    );
    assert_eq!(
        lex("a\tb").unwrap(),
        vec![
            token(TokenKind::Name, "a", Location::new(1, 0, 1)),
            token(TokenKind::Name, "b", Location::new(1, 4, 5)),
        ]
    );
}

#[test]
fn test_errors() {
    let error = lex("+").unwrap_err();
    assert_eq!(error.message(), "unknown character '+'");
    assert_eq!(error.get_location(), Some(Location::new(1, 0, 1)));

    let error = lex("hello\n  ¤").unwrap_err();
    assert_eq!(error.message(), "unknown character '¤'");
    assert_eq!(error.get_location(), Some(Location::new(2, 2, 3)));
}

#[test]
fn test_lexer_is_lazy_and_stops_after_error() {
    let mut tokens = tokenize("a + b");
    assert_eq!(tokens.next().unwrap().unwrap().value, "a");
    assert!(tokens.next().unwrap().is_err());
    assert!(tokens.next().is_none());
}

#[test]
fn test_hello_world() {
    let source = "/* a hello world\n   program */\n\nfunction main() {\n\tprint(\"Hello World!\");\n}\n";
    let tokens = lex(source).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(TokenKind::Name, "function", Location::new(4, 0, 8)),
            token(TokenKind::Name, "main", Location::new(4, 9, 13)),
            token(TokenKind::Op, "(", Location::new(4, 13, 14)),
            token(TokenKind::Op, ")", Location::new(4, 14, 15)),
            token(TokenKind::Op, "{", Location::new(4, 16, 17)),
            token(TokenKind::Name, "print", Location::new(5, 4, 9)),
            token(TokenKind::Op, "(", Location::new(5, 9, 10)),
            token(TokenKind::String, "\"Hello World!\"", Location::new(5, 10, 24)),
            token(TokenKind::Op, ")", Location::new(5, 24, 25)),
            token(TokenKind::Op, ";", Location::new(5, 25, 26)),
            token(TokenKind::Op, "}", Location::new(6, 0, 1)),
        ]
    );
}

fn source_piece() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,6}",
        "[0-9]{1,5}",
        "\"[a-z ]{0,6}\"",
        Just("(".to_string()),
        Just(")".to_string()),
        Just(";".to_string()),
        Just(",".to_string()),
        Just("->".to_string()),
        Just(" ".to_string()),
        Just("\t".to_string()),
        Just("\n".to_string()),
        Just("// note\n".to_string()),
    ]
}

proptest! {
    #[test]
    fn relexing_a_location_reproduces_the_token(pieces in prop::collection::vec(source_piece(), 1..20)) {
        let source = pieces.join(" ");
        let tokens = lex(&source).unwrap();
        let expanded = expand_tabs(&source);
        let lines: Vec<&str> = expanded.split('\n').collect();

        for token in tokens {
            let line = lines[token.location.line - 1];
            let end = token.location.end.unwrap();
            let text: String = line.chars().skip(token.location.start).take(end - token.location.start).collect();
            prop_assert_eq!(&text, &token.value);

            let relexed = lex(&text).unwrap();
            prop_assert_eq!(relexed.len(), 1);
            prop_assert_eq!(&relexed[0].value, &token.value);
            prop_assert_eq!(relexed[0].kind, token.kind);
        }
    }
}
