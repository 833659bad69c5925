//! Type checking and semantic analysis module.
//!
//! This module checks the parsed statements before code is generated:
//!
//! - Resolving names through a chain of scopes
//! - Checking declarations, assignments, calls and return values
//! - Declaring every function before any body is checked
//! - Warning about unused variables and statements that do nothing, and
//!   leaving them out of the output
//!
//! Each scope builds a new list of statements, the input is never modified.

pub mod scope;
pub mod type_checker;
pub mod types;
