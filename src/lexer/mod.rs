//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a lazy stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using ordered regex patterns
//! - Recognition of names, integers, strings and operators
//! - Line and column tracking (after tab expansion) for error reporting
//! - Comments and whitespace handling

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
