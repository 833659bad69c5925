//! Error and warning types for the compiler.
//!
//! This module defines the diagnostics produced throughout the front end.
//! It includes:
//!
//! - Fatal errors with an optional source location
//! - One error variant per fixed message template
//! - Non-fatal warnings delivered through a callback
//! - Optional suggestions shown below an error

pub mod errors;
