use crate::Location;

use super::{
    ast::{Expr, Stmt},
    expressions::NameExpr,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub location: Location,
}

/// `Type name`, without the initial value.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationStmt {
    pub var_type: NameExpr,
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmt {
    pub target: NameExpr,
    pub value: Expr,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Expr,
    pub location: Location,
}

/// One `Type name` in a function definition's argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub var_type: NameExpr,
    pub name: NameExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefStmt {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// `None` means the function returns nothing
    pub return_type: Option<NameExpr>,
    pub body: Vec<Stmt>,
    pub location: Location,
}

/// Releases the heap object held by `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecRefStmt {
    pub name: String,
    pub location: Location,
}

/// Takes one more reference to the heap object held by `name`. Added when
/// a value is copied from one binding to another.
#[derive(Debug, Clone, PartialEq)]
pub struct IncRefStmt {
    pub name: String,
    pub location: Location,
}
