//! Shorthand for building nodes that are created in many places.
//!
//! - `MK_TOKEN!` builds a lexer `Token`
//! - `MK_NAME!` builds a `NameExpr`, mostly for temporaries made by the
//!   decref pass

/// Builds a `Token` from its kind, raw text and location.
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Integer, String::from("42"), Location::new(1, 0, 2));
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $text:expr, $location:expr) => {
        Token {
            kind: $kind,
            value: $text,
            location: $location,
        }
    };
}

/// Builds a `NameExpr` from anything that `String::from` accepts.
#[macro_export]
macro_rules! MK_NAME {
    ($name:expr, $location:expr) => {
        $crate::ast::expressions::NameExpr {
            name: String::from($name),
            location: $location,
        }
    };
}
