//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the recursive descent parser that turns a stream of
//! tokens into statements. It handles:
//!
//! - Statement parsing (declarations, assignments, if, return, functions)
//! - Expression parsing (names, literals and nested calls)
//! - Comma-separated lists with friendly errors for stray commas
//!
//! The parser never looks more than two tokens ahead, and it pulls tokens
//! from the lexer lazily.

pub mod expr;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
