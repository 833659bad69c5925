use crate::Location;

use super::ast::Expr;

/// Name Expression
/// A variable, function or type name.
#[derive(Debug, Clone, PartialEq)]
pub struct NameExpr {
    pub name: String,
    pub location: Location,
}

/// Integer Expression
/// The digits are kept as written, integers don't have a size limit.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerExpr {
    pub value: String,
    pub location: Location,
}

/// String Expression
/// The content of a string literal without the quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct StringExpr {
    pub value: String,
    pub location: Location,
}

/// Call Expression
/// `function(args)`, spanning from the callee to the closing `)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub function: Box<Expr>,
    pub args: Vec<Expr>,
    pub location: Location,
}
