//! Brace balance pre-pass.
//!
//! Runs over the whole token list before parsing so that unbalanced `{}`
//! and `()` are reported at the brace itself instead of as a confusing
//! syntax error somewhere later in the file.

pub mod brace_checker;
