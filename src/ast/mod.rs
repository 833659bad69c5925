/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The closed `Stmt` and `Expr` node sets
/// - expressions: Definitions for the expression nodes
/// - statements: Definitions for the statement nodes
pub mod ast;
pub mod expressions;
pub mod statements;
