#![allow(clippy::module_inception)]

use std::time::Instant;

use tracing::debug;

use crate::{
    ast::ast::Stmt,
    errors::errors::{Error, ErrorImpl, Warning},
    lexer::{lexer::tokenize, tokens::Token},
    parser::parser::parse,
    type_checker::type_checker::check_nodes,
};

pub mod ast;
pub mod brace_checker;
pub mod decref;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// Width of a tab character. Tabs are expanded before lexing so every
/// column in a [`Location`] is counted after expansion.
pub const TAB_WIDTH: usize = 4;

/// A source span on a single line.
///
/// `line` starts at 1. `start` and `end` are character columns after tab
/// expansion, `end` being exclusive. An `end` of `None` means "the rest of
/// the line".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub start: usize,
    pub end: Option<usize>,
}

impl Location {
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        Location {
            line,
            start,
            end: Some(end),
        }
    }

    pub fn rest_of_line(line: usize, start: usize) -> Self {
        Location {
            line,
            start,
            end: None,
        }
    }

    /// Creates a Location covering everything from `start` to `end`.
    ///
    /// If the two are on different lines the result extends to the end of
    /// `start`'s line.
    pub fn between(start: Location, end: Location) -> Self {
        if start.line < end.line {
            return Location::rest_of_line(start.line, start.start);
        }

        debug_assert!(start.line == end.line, "end is on a line before start");
        Location {
            line: start.line,
            start: start.start,
            end: end.end,
        }
    }
}

/// Expands tab characters to the next multiple of [`TAB_WIDTH`].
pub fn expand_tabs(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut column = 0;

    for ch in text.chars() {
        match ch {
            '\t' => {
                let spaces = TAB_WIDTH - column % TAB_WIDTH;
                result.extend(std::iter::repeat(' ').take(spaces));
                column += spaces;
            }
            '\n' | '\r' => {
                result.push(ch);
                column = 0;
            }
            _ => {
                result.push(ch);
                column += 1;
            }
        }
    }

    result
}

/// Compiler settings for one run of the front end.
#[derive(Debug, Clone)]
pub struct Options {
    /// Shown in diagnostics
    pub file_name: String,
    /// Turn the first warning into a fatal error
    pub deny_warnings: bool,
    /// Run the reference-count lowering pass after checking
    pub lower_refcounts: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            file_name: String::from("<stdin>"),
            deny_warnings: false,
            lower_refcounts: true,
        }
    }
}

/// Runs the whole front end over `source`.
///
/// Warnings are handed to `warn` as soon as the checker produces them. The
/// returned nodes are checked, pruned and, if enabled, lowered.
#[tracing::instrument(skip_all, fields(file = %options.file_name, source_len = source.len()))]
pub fn compile(
    source: &str,
    options: &Options,
    warn: &mut dyn FnMut(Warning),
) -> Result<Vec<Stmt>, Error> {
    let start = Instant::now();

    let tokens = tokenize(source).collect::<Result<Vec<Token>, Error>>()?;
    debug!("tokenized {} tokens in {:?}", tokens.len(), start.elapsed());

    brace_checker::brace_checker::check(&tokens)?;

    let parse_start = Instant::now();
    let nodes = parse(tokens.into_iter().map(Ok)).collect::<Result<Vec<Stmt>, Error>>()?;
    debug!("parsed {} nodes in {:?}", nodes.len(), parse_start.elapsed());

    let check_start = Instant::now();
    let mut denied = None;
    let checked = check_nodes(&nodes, &mut |warning: Warning| {
        if options.deny_warnings && denied.is_none() {
            denied = Some(warning.clone());
        }
        warn(warning);
    })?;
    debug!("checked in {:?}", check_start.elapsed());

    if let Some(warning) = denied {
        return Err(Error::new(
            ErrorImpl::DeniedWarning {
                warning: warning.get_message(),
            },
            warning.get_location(),
        ));
    }

    if !options.lower_refcounts {
        return Ok(checked);
    }

    let lowered = decref::decref::add_decrefs(&checked);
    debug!("front end finished in {:?}", start.elapsed());
    Ok(lowered)
}

/// Formats a diagnostic for the user.
///
/// `this_is` is usually `"error"` or `"warning"`. `line_of_code` is the
/// source line the location points into; it is ignored when there is no
/// location.
///
/// ```text
/// error in file 'hello.weird', line 3: no variable named 'lol'
///   print(lol);
///         ^^^
/// ```
pub fn display_diagnostic(
    this_is: &str,
    file_name: &str,
    message: &str,
    location: Option<Location>,
    line_of_code: &str,
) -> String {
    let location = match location {
        Some(location) => location,
        None => return format!("{} in file '{}': {}", this_is, file_name, message),
    };

    let expanded = expand_tabs(line_of_code.trim_end_matches(['\n', '\r']));
    let stripped = expanded.trim_start();
    let indent = expanded.chars().count() - stripped.chars().count();
    let line_length = expanded.trim_end().chars().count();

    let start = location.start.max(indent).min(line_length);
    let end = location.end.unwrap_or(line_length).min(line_length).max(start);

    format!(
        "{} in file '{}', line {}: {}\n  {}\n  {}{}",
        this_is,
        file_name,
        location.line,
        message,
        stripped.trim_end(),
        " ".repeat(start - indent),
        "^".repeat(end - start),
    )
}

/// Returns the line a location points into, or an empty string.
pub fn get_line(source: &str, location: Location) -> &str {
    source.lines().nth(location.line.saturating_sub(1)).unwrap_or("")
}
