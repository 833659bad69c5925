use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    ast::{
        ast::{Expr, Stmt},
        expressions::CallExpr,
        statements::{
            AssignmentStmt, DecRefStmt, DeclarationStmt, ExpressionStmt, FunctionDefStmt, IfStmt,
            IncRefStmt, ReturnStmt,
        },
    },
    Location, MK_NAME,
};

/// Types whose values are reference counted. `Bool` values are never
/// freed.
const HEAP_TYPES: [&str; 2] = ["Int", "String"];

fn is_heap(type_name: &str) -> bool {
    HEAP_TYPES.contains(&type_name)
}

/// State shared by every function lowered in one compilation.
pub struct LoweringContext {
    /// Every name the program uses, so temporaries never collide
    taken: HashSet<String>,
    temp_counter: usize,
    /// Return type names of functions, `None` for functions that return
    /// nothing
    returns: HashMap<String, Option<String>>,
}

impl LoweringContext {
    pub fn new(nodes: &[Stmt]) -> Self {
        let mut taken = HashSet::new();
        collect_names(nodes, &mut taken);

        let mut returns = HashMap::new();
        returns.insert(String::from("print"), None);
        returns.insert(String::from("input"), Some(String::from("String")));
        for node in nodes {
            if let Stmt::FunctionDef(function) = node {
                returns.insert(
                    function.name.clone(),
                    function.return_type.as_ref().map(|name| name.name.clone()),
                );
            }
        }

        LoweringContext {
            taken,
            temp_counter: 0,
            returns,
        }
    }

    /// Returns `tempvar1`, `tempvar2` and so on, skipping names that are
    /// already used.
    pub fn temp_name(&mut self) -> String {
        loop {
            self.temp_counter += 1;
            let name = format!("tempvar{}", self.temp_counter);
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }
}

fn collect_names(nodes: &[Stmt], taken: &mut HashSet<String>) {
    for node in nodes {
        match node {
            Stmt::Expression(statement) => collect_expr_names(&statement.expression, taken),
            Stmt::Declaration(declaration) => {
                taken.insert(declaration.name.clone());
                taken.insert(declaration.var_type.name.clone());
            }
            Stmt::Assignment(assignment) => {
                taken.insert(assignment.target.name.clone());
                collect_expr_names(&assignment.value, taken);
            }
            Stmt::If(if_stmt) => {
                collect_expr_names(&if_stmt.condition, taken);
                collect_names(&if_stmt.body, taken);
            }
            Stmt::Return(return_stmt) => collect_expr_names(&return_stmt.value, taken),
            Stmt::FunctionDef(function) => {
                taken.insert(function.name.clone());
                for parameter in &function.parameters {
                    taken.insert(parameter.name.name.clone());
                    taken.insert(parameter.var_type.name.clone());
                }
                collect_names(&function.body, taken);
            }
            Stmt::IncRef(IncRefStmt { name, .. }) | Stmt::DecRef(DecRefStmt { name, .. }) => {
                taken.insert(name.clone());
            }
        }
    }
}

fn collect_expr_names(expression: &Expr, taken: &mut HashSet<String>) {
    match expression {
        Expr::Name(name) => {
            taken.insert(name.name.clone());
        }
        Expr::Call(call) => {
            collect_expr_names(&call.function, taken);
            for arg in &call.args {
                collect_expr_names(arg, taken);
            }
        }
        Expr::Integer(_) | Expr::String(_) => {}
    }
}

/// Names that get a new value somewhere in `nodes`, `if` bodies included.
fn collect_assigned(nodes: &[Stmt], assigned: &mut HashSet<String>) {
    for node in nodes {
        match node {
            Stmt::Assignment(assignment) => {
                assigned.insert(assignment.target.name.clone());
            }
            Stmt::If(if_stmt) => collect_assigned(&if_stmt.body, assigned),
            _ => {}
        }
    }
}

fn incref(name: &str, location: Location) -> Stmt {
    Stmt::IncRef(IncRefStmt {
        name: name.to_string(),
        location,
    })
}

/// A variable in one of the scopes of the function being lowered.
#[derive(Debug, Clone)]
struct Local {
    name: String,
    type_name: String,
    location: Location,
    /// Parameters are owned by the caller until they get a new value
    owned: bool,
}

impl Local {
    fn release(&self) -> Stmt {
        Stmt::DecRef(DecRefStmt {
            name: self.name.clone(),
            location: self.location,
        })
    }
}

struct FunctionLowerer<'c> {
    context: &'c mut LoweringContext,
    /// Innermost scope last
    scopes: Vec<Vec<Local>>,
}

impl<'c> FunctionLowerer<'c> {
    fn new(context: &'c mut LoweringContext) -> Self {
        FunctionLowerer {
            context,
            scopes: vec![],
        }
    }

    fn lookup(&self, name: &str) -> Option<&Local> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|local| local.name == name)
    }

    fn declare(&mut self, local: Local) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(local);
        }
    }

    fn type_of(&self, expression: &Expr) -> Option<String> {
        match expression {
            Expr::Integer(_) => Some(String::from("Int")),
            Expr::String(_) => Some(String::from("String")),
            Expr::Name(name) => match self.lookup(&name.name) {
                Some(local) => Some(local.type_name.clone()),
                None if name.name == "TRUE" || name.name == "FALSE" => Some(String::from("Bool")),
                None => None,
            },
            Expr::Call(call) => match call.function.as_ref() {
                Expr::Name(function) => self.context.returns.get(&function.name).cloned().flatten(),
                _ => None,
            },
        }
    }

    /// Stores `value` in a new temporary variable.
    fn declare_temp(&mut self, value: Expr, type_name: &str, output: &mut Vec<Stmt>) -> Local {
        let location = value.get_location();
        let name = self.context.temp_name();
        let copied = matches!(value, Expr::Name(_)) && is_heap(type_name);

        output.push(Stmt::Declaration(DeclarationStmt {
            var_type: MK_NAME!(type_name, location),
            name: name.clone(),
            location,
        }));
        output.push(Stmt::Assignment(AssignmentStmt {
            target: MK_NAME!(name.as_str(), location),
            value,
            location,
        }));
        if copied {
            output.push(incref(&name, location));
        }

        Local {
            name,
            type_name: type_name.to_string(),
            location,
            owned: true,
        }
    }

    /// Moves heap values passed to functions into temporaries so that they
    /// can be released. The temporaries are added to `hoisted`.
    fn hoist_arguments(&mut self, expression: Expr, output: &mut Vec<Stmt>, hoisted: &mut Vec<Local>) -> Expr {
        let CallExpr {
            function,
            args,
            location,
        } = match expression {
            Expr::Call(call) => call,
            other => return other,
        };

        let mut lowered_args = Vec::with_capacity(args.len());
        for arg in args {
            if let Expr::Name(_) = arg {
                lowered_args.push(arg);
                continue;
            }

            let arg = self.hoist_arguments(arg, output, hoisted);
            match self.type_of(&arg) {
                Some(type_name) if is_heap(&type_name) => {
                    let temp = self.declare_temp(arg, &type_name, output);
                    lowered_args.push(Expr::Name(MK_NAME!(temp.name.as_str(), temp.location)));
                    hoisted.push(temp);
                }
                _ => lowered_args.push(arg),
            }
        }

        Expr::Call(CallExpr {
            function,
            args: lowered_args,
            location,
        })
    }

    /// Releases everything in the innermost scope, newest first.
    fn release_innermost(&self) -> Vec<Stmt> {
        match self.scopes.last() {
            Some(scope) => scope
                .iter()
                .rev()
                .filter(|local| local.owned && is_heap(&local.type_name))
                .map(Local::release)
                .collect(),
            None => vec![],
        }
    }

    /// Releases every scope of the function for a `return`, except the
    /// innermost variable called `keep`.
    fn release_all(&self, keep: Option<&str>) -> Vec<Stmt> {
        let mut keep = keep;
        let mut releases = vec![];

        for local in self.scopes.iter().rev().flat_map(|scope| scope.iter().rev()) {
            if keep == Some(local.name.as_str()) {
                keep = None;
                continue;
            }
            if local.owned && is_heap(&local.type_name) {
                releases.push(local.release());
            }
        }

        releases
    }

    fn lower_function(&mut self, function: &FunctionDefStmt) -> FunctionDefStmt {
        debug!("adding decrefs to {}", function.name);

        let mut assigned = HashSet::new();
        collect_assigned(&function.body, &mut assigned);

        // a parameter that gets a new value takes its own reference first,
        // after that it is released like any local
        let parameters: Vec<Local> = function
            .parameters
            .iter()
            .map(|parameter| Local {
                name: parameter.name.name.clone(),
                type_name: parameter.var_type.name.clone(),
                location: parameter.name.location,
                owned: is_heap(&parameter.var_type.name) && assigned.contains(&parameter.name.name),
            })
            .collect();
        let prologue = parameters
            .iter()
            .filter(|local| local.owned)
            .map(|local| incref(&local.name, local.location))
            .collect();

        self.scopes.clear();
        let body = self.lower_scope(&function.body, parameters, prologue);

        FunctionDefStmt {
            body,
            ..function.clone()
        }
    }

    /// Lowers the statements of a function or `if` body. `locals` are
    /// already in scope when it starts and `output` already has statements.
    fn lower_scope(&mut self, body: &[Stmt], locals: Vec<Local>, mut output: Vec<Stmt>) -> Vec<Stmt> {
        self.scopes.push(locals);

        let mut previous = None;
        for statement in body {
            self.lower_statement(statement, previous, &mut output);
            previous = Some(statement);
        }

        if !matches!(body.last(), Some(Stmt::Return(_))) {
            output.extend(self.release_innermost());
        }

        self.scopes.pop();
        output
    }

    fn lower_statement(&mut self, statement: &Stmt, previous: Option<&Stmt>, output: &mut Vec<Stmt>) {
        match statement {
            Stmt::Declaration(declaration) => {
                self.declare(Local {
                    name: declaration.name.clone(),
                    type_name: declaration.var_type.name.clone(),
                    location: declaration.location,
                    owned: true,
                });
                output.push(statement.clone());
            }
            Stmt::Assignment(assignment) => self.lower_assignment(assignment, previous, output),
            Stmt::If(if_stmt) => {
                let mut hoisted = vec![];
                let condition = self.hoist_arguments(if_stmt.condition.clone(), output, &mut hoisted);
                // the body may return, so these are released with the scope
                for local in hoisted {
                    self.declare(local);
                }

                let body = self.lower_scope(&if_stmt.body, vec![], vec![]);
                output.push(Stmt::If(IfStmt {
                    condition,
                    body,
                    location: if_stmt.location,
                }));
            }
            Stmt::Return(return_stmt) => self.lower_return(return_stmt, output),
            Stmt::Expression(expression_stmt) => {
                let mut hoisted = vec![];
                let expression =
                    self.hoist_arguments(expression_stmt.expression.clone(), output, &mut hoisted);

                match self.type_of(&expression) {
                    Some(type_name) if expression.is_call() && is_heap(&type_name) => {
                        let result = self.declare_temp(expression, &type_name, output);
                        output.push(result.release());
                    }
                    _ => output.push(Stmt::Expression(ExpressionStmt {
                        expression,
                        location: expression_stmt.location,
                    })),
                }

                output.extend(hoisted.iter().rev().map(Local::release));
            }
            Stmt::FunctionDef(_) | Stmt::IncRef(_) | Stmt::DecRef(_) => output.push(statement.clone()),
        }
    }

    fn lower_assignment(&mut self, assignment: &AssignmentStmt, previous: Option<&Stmt>, output: &mut Vec<Stmt>) {
        let mut hoisted = vec![];
        let value = self.hoist_arguments(assignment.value.clone(), output, &mut hoisted);

        let right_after_declaration = matches!(
            previous,
            Some(Stmt::Declaration(declaration)) if declaration.name == assignment.target.name
        );
        // heap targets are always owned, parameters included
        let target = self
            .lookup(&assignment.target.name)
            .filter(|local| is_heap(&local.type_name))
            .map(|local| (local.type_name.clone(), local.location));

        match target {
            Some((type_name, declared_at)) if !right_after_declaration => {
                let temp = self.declare_temp(value, &type_name, output);
                output.push(Stmt::DecRef(DecRefStmt {
                    name: assignment.target.name.clone(),
                    location: declared_at,
                }));
                output.push(Stmt::Assignment(AssignmentStmt {
                    target: assignment.target.clone(),
                    value: Expr::Name(MK_NAME!(temp.name.as_str(), temp.location)),
                    location: assignment.location,
                }));
            }
            Some(_) if matches!(value, Expr::Name(_)) => {
                output.push(Stmt::Assignment(AssignmentStmt {
                    value,
                    ..assignment.clone()
                }));
                output.push(incref(&assignment.target.name, assignment.target.location));
            }
            _ => output.push(Stmt::Assignment(AssignmentStmt {
                value,
                ..assignment.clone()
            })),
        }

        output.extend(hoisted.iter().rev().map(Local::release));
    }

    fn lower_return(&mut self, return_stmt: &ReturnStmt, output: &mut Vec<Stmt>) {
        let mut hoisted = vec![];

        let (value, keep) = match &return_stmt.value {
            Expr::Name(name) => {
                // the caller gets a reference of its own
                let borrowed = self
                    .lookup(&name.name)
                    .is_some_and(|local| !local.owned && is_heap(&local.type_name));
                if borrowed {
                    output.push(incref(&name.name, name.location));
                }
                (return_stmt.value.clone(), Some(name.name.clone()))
            }
            other => {
                let value = self.hoist_arguments(other.clone(), output, &mut hoisted);
                match self.type_of(&value) {
                    Some(type_name) => {
                        let temp = self.declare_temp(value, &type_name, output);
                        (Expr::Name(MK_NAME!(temp.name.as_str(), temp.location)), None)
                    }
                    None => (value, None),
                }
            }
        };

        output.extend(hoisted.iter().rev().map(Local::release));
        output.extend(self.release_all(keep.as_deref()));
        output.push(Stmt::Return(ReturnStmt {
            value,
            location: return_stmt.location,
        }));
    }
}

/// Adds `DecRef` statements to checked code.
///
/// Every heap reference gets exactly one release on every way out of the
/// scope that owns it. Copying a value from one variable to another, and
/// returning a parameter, take a new reference with `IncRef`. Values that
/// are returned are not released, the caller owns them.
#[tracing::instrument(skip_all, fields(nodes = nodes.len()))]
pub fn add_decrefs(nodes: &[Stmt]) -> Vec<Stmt> {
    let mut context = LoweringContext::new(nodes);
    add_decrefs_with(&mut context, nodes)
}

/// Like [`add_decrefs`], with a context that can outlive one call.
pub fn add_decrefs_with(context: &mut LoweringContext, nodes: &[Stmt]) -> Vec<Stmt> {
    let mut lowered = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Stmt::FunctionDef(function) => {
                let mut lowerer = FunctionLowerer::new(&mut *context);
                lowered.push(Stmt::FunctionDef(lowerer.lower_function(function)));
            }
            other => lowered.push(other.clone()),
        }
    }
    lowered
}
