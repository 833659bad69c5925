use std::{collections::HashMap, time::Instant};

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Expr, Stmt},
        expressions::{CallExpr, NameExpr},
        statements::{AssignmentStmt, DeclarationStmt, FunctionDefStmt, IfStmt, ReturnStmt},
    },
    errors::errors::{add_article, Error, ErrorImpl, Warning, WarningImpl},
};

use super::{
    scope::{Scope, ScopeKind, Variable},
    types::{FunctionType, Type, Value},
};

/// Creates the root scope with the built-in types, constants and functions.
pub fn builtin_scope() -> Scope<'static> {
    let mut scope = Scope::builtin();

    for type_name in ["Int", "String", "Bool"] {
        scope.declare(type_name, Variable::builtin(Value::Type(Type::named(type_name))));
    }
    for constant in ["TRUE", "FALSE"] {
        scope.declare(constant, Variable::builtin(Value::Instance(Type::named("Bool"))));
    }

    scope.declare(
        "print",
        Variable::builtin(Value::Instance(Type::Function(FunctionType {
            name: String::from("print"),
            params: vec![Type::named("String")],
            returns: None,
        }))),
    );
    scope.declare(
        "input",
        Variable::builtin(Value::Instance(Type::Function(FunctionType {
            name: String::from("input"),
            params: vec![],
            returns: Some(Box::new(Type::named("String"))),
        }))),
    );

    scope
}

impl Scope<'_> {
    /// Evaluates `expression` and fails if it produces no value.
    fn evaluate_value(&mut self, expression: &Expr) -> Result<Value, Error> {
        self.evaluate(expression, false)?
            .ok_or_else(|| Error::new(ErrorImpl::ReturnsNothing, expression.get_location()))
    }

    /// Figures out what an expression evaluates to without running it.
    ///
    /// `Ok(None)` means a call to a function that returns nothing, which is
    /// only allowed with `allow_no_value`.
    pub fn evaluate(&mut self, expression: &Expr, allow_no_value: bool) -> Result<Option<Value>, Error> {
        self.evaluate_impl(expression, allow_no_value, true)
    }

    fn evaluate_impl(
        &mut self,
        expression: &Expr,
        allow_no_value: bool,
        mark_used: bool,
    ) -> Result<Option<Value>, Error> {
        match expression {
            Expr::Name(name) => self.evaluate_name(name, mark_used).map(Some),
            Expr::Integer(_) => Ok(Some(Value::Instance(Type::named("Int")))),
            Expr::String(_) => Ok(Some(Value::Instance(Type::named("String")))),
            Expr::Call(call) => self.evaluate_call(call, allow_no_value, mark_used),
        }
    }

    fn evaluate_name(&mut self, name: &NameExpr, mark_used: bool) -> Result<Value, Error> {
        let (value, kind, depth) = {
            let Some(binding) = self.lookup(&name.name) else {
                return Err(Error::new(
                    ErrorImpl::VariableNotDeclared {
                        variable: name.name.clone(),
                    },
                    name.location,
                ));
            };

            if !self.is_initialized(&name.name, &binding) {
                return Err(Error::new(
                    ErrorImpl::VariableNotInitialized {
                        variable: name.name.clone(),
                    },
                    name.location,
                ));
            }

            (binding.variable.value.clone(), binding.kind, binding.depth)
        };

        if mark_used {
            self.mark_used(&name.name, kind, depth);
        }
        Ok(value)
    }

    fn evaluate_call(
        &mut self,
        call: &CallExpr,
        allow_no_value: bool,
        mark_used: bool,
    ) -> Result<Option<Value>, Error> {
        let function = self
            .evaluate_impl(&call.function, false, mark_used)?
            .ok_or_else(|| Error::new(ErrorImpl::ReturnsNothing, call.function.get_location()))?;
        let Some(function) = function.as_function().cloned() else {
            return Err(Error::new(ErrorImpl::NotAFunction, call.function.get_location()));
        };

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let value = self
                .evaluate_impl(arg, false, mark_used)?
                .ok_or_else(|| Error::new(ErrorImpl::ReturnsNothing, arg.get_location()))?;
            args.push(value);
        }

        let args_match = args.len() == function.params.len()
            && args
                .iter()
                .zip(&function.params)
                .all(|(arg, param)| arg.is_instance_of(param));
        if !args_match {
            let expected: Vec<&str> = function.params.iter().map(Type::describe).collect();
            let received: Vec<&str> = args.iter().map(Value::describe).collect();
            return Err(Error::new(
                ErrorImpl::ArgumentMismatch {
                    function: function.name.clone(),
                    expected: expected.join(", "),
                    received: received.join(", "),
                },
                call.location,
            ));
        }

        match function.returns {
            Some(returns) => Ok(Some(Value::Instance(*returns))),
            None if allow_no_value => Ok(None),
            None => Err(Error::new(ErrorImpl::ReturnsNothing, call.location)),
        }
    }

    /// Evaluates a name that is used as a type, like the `Int` in `Int x;`.
    fn evaluate_type(&mut self, name: &NameExpr) -> Result<Type, Error> {
        match self.evaluate_name(name, false)? {
            Value::Type(found) => Ok(found),
            Value::Instance(_) => Err(Error::new(ErrorImpl::NotAType, name.location)),
        }
    }

    /// Checks one statement and adds it to the output if it should be kept.
    pub fn execute(&mut self, statement: &Stmt, warn: &mut dyn FnMut(Warning)) -> Result<(), Error> {
        trace!("checking statement at line {}", statement.get_location().line);

        match statement {
            Stmt::Declaration(declaration) => self.execute_declaration(declaration)?,
            Stmt::Assignment(assignment) => self.execute_assignment(assignment)?,
            Stmt::If(if_stmt) => self.execute_if(if_stmt, warn)?,
            Stmt::Return(return_stmt) => self.execute_return(return_stmt)?,
            Stmt::FunctionDef(function) => {
                return Err(Error::new(ErrorImpl::NestedFunction, function.location));
            }
            Stmt::Expression(expression_stmt) => {
                if expression_stmt.expression.is_call() {
                    self.evaluate(&expression_stmt.expression, true)?;
                    self.output.push(statement.clone());
                } else {
                    warn(Warning::new(WarningImpl::NoEffect, expression_stmt.location));
                    self.evaluate_impl(&expression_stmt.expression, false, false)?;
                }
            }
            Stmt::IncRef(_) | Stmt::DecRef(_) => self.output.push(statement.clone()),
        }

        Ok(())
    }

    fn execute_declaration(&mut self, declaration: &DeclarationStmt) -> Result<(), Error> {
        self.error_if_defined(&declaration.name, declaration.location)?;
        let var_type = self.evaluate_type(&declaration.var_type)?;

        self.declare(
            &declaration.name,
            Variable {
                value: Value::Instance(var_type),
                defined_location: Some(declaration.location),
                initialized: false,
                used: false,
            },
        );
        self.output.push(Stmt::Declaration(declaration.clone()));
        Ok(())
    }

    fn execute_assignment(&mut self, assignment: &AssignmentStmt) -> Result<(), Error> {
        let name = &assignment.target.name;

        let found = self
            .lookup(name)
            .map(|binding| (binding.variable.value.clone(), binding.kind, binding.depth));
        let Some((expected, kind, depth)) = found else {
            let type_name = match self.evaluate(&assignment.value, false) {
                Ok(Some(Value::Instance(Type::Named(type_name)))) => Some(type_name),
                _ => None,
            };
            return Err(Error::new(
                ErrorImpl::UndeclaredAssignment {
                    variable: name.clone(),
                    type_name,
                },
                assignment.location,
            ));
        };

        if kind != ScopeKind::Inner {
            let error = match expected.as_function() {
                Some(_) => ErrorImpl::FunctionAssignment,
                None => ErrorImpl::BuiltinAssignment { name: name.clone() },
            };
            return Err(Error::new(error, assignment.target.location));
        }

        let new_value = self.evaluate_value(&assignment.value)?;
        if new_value != expected {
            return Err(Error::new(
                ErrorImpl::AssignmentTypeMismatch {
                    variable: name.clone(),
                    expected: add_article(expected.describe()),
                    received: add_article(new_value.describe()),
                },
                assignment.location,
            ));
        }

        self.mark_initialized(name, depth);
        self.output.push(Stmt::Assignment(assignment.clone()));
        Ok(())
    }

    fn execute_if(&mut self, if_stmt: &IfStmt, warn: &mut dyn FnMut(Warning)) -> Result<(), Error> {
        let condition = self.evaluate_value(&if_stmt.condition)?;
        if !condition.is_instance_of(&Type::named("Bool")) {
            return Err(Error::new(
                ErrorImpl::ConditionTypeMismatch {
                    received: add_article(condition.describe()),
                },
                if_stmt.condition.get_location(),
            ));
        }

        let finished = {
            let mut subscope = Scope::child(self);
            for statement in &if_stmt.body {
                subscope.execute(statement, warn)?;
            }
            subscope.finish(warn)
        };

        self.apply(finished.effects);
        self.output.push(Stmt::If(IfStmt {
            condition: if_stmt.condition.clone(),
            body: finished.output,
            location: if_stmt.location,
        }));
        Ok(())
    }

    fn execute_return(&mut self, return_stmt: &ReturnStmt) -> Result<(), Error> {
        let value = self.evaluate_value(&return_stmt.value)?;

        let Some(expected) = &self.returns else {
            return Err(Error::new(ErrorImpl::UnexpectedReturnValue, return_stmt.location));
        };
        if !value.is_instance_of(expected) {
            return Err(Error::new(
                ErrorImpl::ReturnTypeMismatch {
                    expected: add_article(expected.describe()),
                    received: add_article(value.describe()),
                },
                return_stmt.location,
            ));
        }

        self.output.push(Stmt::Return(return_stmt.clone()));
        Ok(())
    }

    /// Adds a function's signature to the file scope so that it can be
    /// called before its definition.
    fn declare_function(&mut self, function: &FunctionDefStmt) -> Result<(), Error> {
        self.error_if_defined(&function.name, function.location)?;

        if function.name == "main" {
            if function.return_type.is_some() {
                return Err(Error::new(ErrorImpl::MainReturnsValue, function.location));
            }
            if !function.parameters.is_empty() {
                return Err(Error::new(ErrorImpl::MainTakesArguments, function.location));
            }
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for parameter in &function.parameters {
            *counts.entry(parameter.name.name.as_str()).or_default() += 1;
        }
        for parameter in &function.parameters {
            let count = counts[parameter.name.name.as_str()];
            if count > 1 {
                return Err(Error::new(
                    ErrorImpl::DuplicateArgument {
                        count,
                        name: parameter.name.name.clone(),
                    },
                    function.location,
                ));
            }
        }

        let mut params = Vec::with_capacity(function.parameters.len());
        for parameter in &function.parameters {
            params.push(self.evaluate_type(&parameter.var_type)?);
        }
        let returns = match &function.return_type {
            Some(return_type) => Some(Box::new(self.evaluate_type(return_type)?)),
            None => None,
        };

        self.declare(
            &function.name,
            Variable {
                value: Value::Instance(Type::Function(FunctionType {
                    name: function.name.clone(),
                    params,
                    returns,
                })),
                defined_location: Some(function.location),
                initialized: true,
                used: true,
            },
        );
        Ok(())
    }

    /// Checks the body of a function that has been declared in this scope.
    fn check_function(
        &self,
        function: &FunctionDefStmt,
        warn: &mut dyn FnMut(Warning),
    ) -> Result<FunctionDefStmt, Error> {
        debug!("checking function {}", function.name);

        let signature = self
            .lookup(&function.name)
            .and_then(|binding| binding.variable.value.as_function().cloned())
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::VariableNotDeclared {
                        variable: function.name.clone(),
                    },
                    function.location,
                )
            })?;

        let mut scope = Scope::child(self);
        scope.returns = signature.returns.map(|returns| *returns);

        for (parameter, param_type) in function.parameters.iter().zip(signature.params) {
            scope.error_if_defined(&parameter.name.name, parameter.name.location)?;
            scope.declare(
                &parameter.name.name,
                Variable {
                    value: Value::Instance(param_type),
                    defined_location: Some(parameter.name.location),
                    initialized: true,
                    used: true,
                },
            );
        }

        for statement in &function.body {
            scope.execute(statement, warn)?;
        }

        // there is no else, so only a return at the very end counts
        if let Some(expected) = &scope.returns {
            if !matches!(function.body.last(), Some(Stmt::Return(_))) {
                return Err(Error::new(
                    ErrorImpl::MissingReturn {
                        expected: add_article(expected.describe()),
                    },
                    function.location,
                ));
            }
        }
        let finished = scope.finish(warn);

        Ok(FunctionDefStmt {
            body: finished.output,
            ..function.clone()
        })
    }
}

/// Checks a whole file and returns the statements that should be compiled.
///
/// The input is not modified. Unused variables and statements that do
/// nothing are reported through `warn` and left out of the result.
#[tracing::instrument(skip_all, fields(nodes = nodes.len()))]
pub fn check_nodes(nodes: &[Stmt], warn: &mut dyn FnMut(Warning)) -> Result<Vec<Stmt>, Error> {
    let start = Instant::now();

    let mut functions = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Stmt::FunctionDef(function) => functions.push(function),
            other => {
                return Err(Error::new(
                    ErrorImpl::NotAFunctionDefinition,
                    other.get_location(),
                ))
            }
        }
    }

    if !functions.iter().any(|function| function.name == "main") {
        return Err(Error::unlocated(ErrorImpl::NoMainFunction));
    }

    let builtins = builtin_scope();
    let mut file_scope = Scope::child(&builtins);

    // everything is declared first so functions can call functions that are
    // defined after them
    for function in &functions {
        file_scope.declare_function(function)?;
    }

    let mut checked = Vec::with_capacity(functions.len());
    for function in functions {
        checked.push(Stmt::FunctionDef(file_scope.check_function(function, warn)?));
    }

    debug!("checked {} functions in {:?}", checked.len(), start.elapsed());
    Ok(checked)
}

/// Like [`check_nodes`], but replaces `nodes` with the checked statements.
pub fn check(nodes: &mut Vec<Stmt>, warn: &mut dyn FnMut(Warning)) -> Result<(), Error> {
    let checked = check_nodes(nodes, warn)?;
    *nodes = checked;
    Ok(())
}
