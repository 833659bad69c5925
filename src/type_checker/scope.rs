use std::collections::{HashMap, HashSet};

use crate::{
    ast::{
        ast::{Expr, Stmt},
        statements::ExpressionStmt,
    },
    errors::errors::{Error, ErrorImpl, Warning, WarningImpl},
    Location,
};

use super::types::{Type, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The root scope with the built-in types, constants and functions
    Builtin,
    /// Functions defined in the file
    File,
    /// A function body or an `if` body
    Inner,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub value: Value,
    /// `None` for built-ins
    pub defined_location: Option<Location>,
    pub initialized: bool,
    /// Set when the variable is read. Assigning to it doesn't count.
    pub used: bool,
}

impl Variable {
    pub fn builtin(value: Value) -> Self {
        Variable {
            value,
            defined_location: None,
            initialized: true,
            used: true,
        }
    }
}

/// Reads and initializations of variables that live in an enclosing scope.
///
/// A scope can't change its parents, so these are collected while the
/// scope runs and handed to the parent when it finishes. Keys are the depth
/// of the scope that owns the variable and the variable's name.
#[derive(Debug, Default)]
pub struct OuterEffects {
    pub used: HashSet<(usize, String)>,
    pub initialized: HashSet<(usize, String)>,
}

/// A lexical scope.
///
/// Lookups walk the parent chain. Declaring always happens in the scope
/// itself, so inner names shadow outer names without changing them.
#[derive(Debug)]
pub struct Scope<'a> {
    pub(super) parent: Option<&'a Scope<'a>>,
    pub(super) kind: ScopeKind,
    pub(super) depth: usize,
    variables: HashMap<String, Variable>,
    /// Names in the order they were declared
    declared: Vec<String>,
    outer: OuterEffects,
    /// Return type of the function being checked, `None` if it returns
    /// nothing. Only meaningful in inner scopes.
    pub(super) returns: Option<Type>,
    /// Checked statements that are kept
    pub(super) output: Vec<Stmt>,
}

/// A variable found by [`Scope::lookup`], and where it lives.
pub struct Binding<'s> {
    pub variable: &'s Variable,
    pub kind: ScopeKind,
    pub depth: usize,
}

/// What's left of a scope when it is done.
pub struct FinishedScope {
    pub output: Vec<Stmt>,
    pub effects: OuterEffects,
}

impl<'a> Scope<'a> {
    pub fn builtin() -> Scope<'static> {
        Scope {
            parent: None,
            kind: ScopeKind::Builtin,
            depth: 0,
            variables: HashMap::new(),
            declared: vec![],
            outer: OuterEffects::default(),
            returns: None,
            output: vec![],
        }
    }

    pub fn child(parent: &'a Scope<'a>) -> Self {
        let kind = match parent.kind {
            ScopeKind::Builtin => ScopeKind::File,
            ScopeKind::File | ScopeKind::Inner => ScopeKind::Inner,
        };

        Scope {
            parent: Some(parent),
            kind,
            depth: parent.depth + 1,
            variables: HashMap::new(),
            declared: vec![],
            outer: OuterEffects::default(),
            returns: parent.returns.clone(),
            output: vec![],
        }
    }

    /// Binds a name in this scope. Callers check for duplicates first.
    pub fn declare(&mut self, name: &str, variable: Variable) {
        if self.variables.insert(name.to_string(), variable).is_none() {
            self.declared.push(name.to_string());
        }
    }

    /// Finds the innermost variable called `name`.
    pub fn lookup(&self, name: &str) -> Option<Binding<'_>> {
        let mut scope: Option<&Scope> = Some(self);

        while let Some(current) = scope {
            if let Some(variable) = current.variables.get(name) {
                return Some(Binding {
                    variable,
                    kind: current.kind,
                    depth: current.depth,
                });
            }
            scope = current.parent;
        }

        None
    }

    /// Fails if `name` is taken in this scope, or if it names something
    /// defined outside function bodies.
    pub fn error_if_defined(&self, name: &str, location: Location) -> Result<(), Error> {
        let Some(binding) = self.lookup(name) else {
            return Ok(());
        };
        if binding.depth != self.depth && binding.kind == ScopeKind::Inner {
            return Ok(());
        }

        let what = match &binding.variable.value {
            Value::Type(_) => "type",
            value if value.as_function().is_some() => "function",
            Value::Instance(_) => "variable",
        };
        Err(Error::new(
            ErrorImpl::AlreadyDefined {
                what: String::from(what),
                name: String::from(name),
            },
            location,
        ))
    }

    pub fn is_initialized(&self, name: &str, binding: &Binding) -> bool {
        if binding.variable.initialized {
            return true;
        }

        let key = (binding.depth, name.to_string());
        let mut scope: Option<&Scope> = Some(self);
        while let Some(current) = scope {
            if current.depth <= binding.depth {
                break;
            }
            if current.outer.initialized.contains(&key) {
                return true;
            }
            scope = current.parent;
        }

        false
    }

    pub fn mark_used(&mut self, name: &str, kind: ScopeKind, depth: usize) {
        if kind != ScopeKind::Inner {
            return;
        }
        if depth == self.depth {
            if let Some(variable) = self.variables.get_mut(name) {
                variable.used = true;
            }
        } else {
            self.outer.used.insert((depth, name.to_string()));
        }
    }

    pub fn mark_initialized(&mut self, name: &str, depth: usize) {
        if depth == self.depth {
            if let Some(variable) = self.variables.get_mut(name) {
                variable.initialized = true;
            }
        } else {
            self.outer.initialized.insert((depth, name.to_string()));
        }
    }

    /// Takes the reads and initializations a finished child scope did to
    /// variables outside it.
    pub fn apply(&mut self, effects: OuterEffects) {
        for (depth, name) in effects.used {
            self.mark_used(&name, ScopeKind::Inner, depth);
        }
        for (depth, name) in effects.initialized {
            self.mark_initialized(&name, depth);
        }
    }

    /// Warns about variables that were never read and removes them from
    /// the output.
    pub fn finish(self, warn: &mut dyn FnMut(Warning)) -> FinishedScope {
        let mut output = self.output;

        for name in &self.declared {
            let Some(variable) = self.variables.get(name) else {
                continue;
            };
            if variable.used {
                continue;
            }

            if let Some(location) = variable.defined_location {
                warn(Warning::new(
                    WarningImpl::UnusedVariable {
                        variable: name.clone(),
                    },
                    location,
                ));
            }
            output = remove_variable(output, name);
        }

        FinishedScope {
            output,
            effects: self.outer,
        }
    }
}

/// Removes the declaration of `name` and every later assignment to it.
fn remove_variable(mut nodes: Vec<Stmt>, name: &str) -> Vec<Stmt> {
    let Some(position) = nodes
        .iter()
        .position(|node| matches!(node, Stmt::Declaration(declaration) if declaration.name == name))
    else {
        return nodes;
    };

    let mut after = nodes.split_off(position);
    after.remove(0);
    nodes.extend(remove_assignments(after, name));
    nodes
}

/// Drops assignments to `name`, keeping the calls in them. Nested `if`
/// bodies are included until they declare their own `name`.
fn remove_assignments(nodes: Vec<Stmt>, name: &str) -> Vec<Stmt> {
    let mut result = Vec::with_capacity(nodes.len());
    let mut shadowed = false;

    for node in nodes {
        if shadowed {
            result.push(node);
            continue;
        }

        match node {
            Stmt::Declaration(declaration) if declaration.name == name => {
                shadowed = true;
                result.push(Stmt::Declaration(declaration));
            }
            Stmt::Assignment(assignment) if assignment.target.name == name => {
                if let Expr::Call(_) = assignment.value {
                    let call_location = assignment.value.get_location();
                    let location = if call_location.line == assignment.location.line {
                        Location::between(call_location, assignment.location)
                    } else {
                        call_location
                    };
                    result.push(Stmt::Expression(ExpressionStmt {
                        expression: assignment.value,
                        location,
                    }));
                }
            }
            Stmt::If(mut if_stmt) => {
                if_stmt.body = remove_assignments(if_stmt.body, name);
                result.push(Stmt::If(if_stmt));
            }
            other => result.push(other),
        }
    }

    result
}
