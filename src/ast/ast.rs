use crate::Location;

use super::{
    expressions::{CallExpr, IntegerExpr, NameExpr, StringExpr},
    statements::{
        AssignmentStmt, DecRefStmt, DeclarationStmt, ExpressionStmt, FunctionDefStmt, IfStmt,
        IncRefStmt, ReturnStmt,
    },
};

/// Statement
///
/// Every statement kind in the language. `Type x = v;` is parsed into two
/// overlapping nodes, a `Declaration` followed by an `Assignment`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Declaration(DeclarationStmt),
    Assignment(AssignmentStmt),
    If(IfStmt),
    Return(ReturnStmt),
    FunctionDef(FunctionDefStmt),
    /// `IncRef` and `DecRef` are only produced by the reference-count
    /// lowering pass.
    IncRef(IncRefStmt),
    DecRef(DecRefStmt),
}

impl Stmt {
    pub fn get_location(&self) -> Location {
        match self {
            Stmt::Expression(stmt) => stmt.location,
            Stmt::Declaration(stmt) => stmt.location,
            Stmt::Assignment(stmt) => stmt.location,
            Stmt::If(stmt) => stmt.location,
            Stmt::Return(stmt) => stmt.location,
            Stmt::FunctionDef(stmt) => stmt.location,
            Stmt::IncRef(stmt) => stmt.location,
            Stmt::DecRef(stmt) => stmt.location,
        }
    }
}

/// Expression
///
/// Calls nest arbitrarily, `f()()()` is three `Call`s.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(NameExpr),
    Integer(IntegerExpr),
    String(StringExpr),
    Call(CallExpr),
}

impl Expr {
    pub fn get_location(&self) -> Location {
        match self {
            Expr::Name(expr) => expr.location,
            Expr::Integer(expr) => expr.location,
            Expr::String(expr) => expr.location,
            Expr::Call(expr) => expr.location,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call(_))
    }
}
