//! Unit tests for the parser module.
//!
//! This module contains tests for parsing the language constructs including:
//! - Expressions and nested calls
//! - Comma lists and their errors
//! - Declarations and assignments
//! - If, return and function definitions
//! - End of file handling

use proptest::prelude::*;

use crate::{
    ast::{
        ast::{Expr, Stmt},
        expressions::{CallExpr, IntegerExpr, NameExpr},
        statements::{
            AssignmentStmt, DeclarationStmt, ExpressionStmt, FunctionDefStmt, IfStmt, Parameter,
            ReturnStmt,
        },
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
    Location, MK_NAME,
};

use super::parser::{parse, parse_expression};

fn get_ast(source: &str) -> Result<Vec<Stmt>, Error> {
    parse(tokenize(source)).collect()
}

fn get_expression(source: &str) -> Result<Expr, Error> {
    parse_expression(tokenize(source))
}

fn assert_error(result: Result<impl std::fmt::Debug, Error>, location: Location, message: &str) {
    let error = result.unwrap_err();
    assert_eq!(error.message(), message);
    assert_eq!(error.get_location(), Some(location));
}

fn name(name: &str, line: usize, start: usize, end: usize) -> NameExpr {
    MK_NAME!(name, Location::new(line, start, end))
}

fn integer(value: &str, line: usize, start: usize, end: usize) -> Expr {
    Expr::Integer(IntegerExpr {
        value: value.to_string(),
        location: Location::new(line, start, end),
    })
}

fn call(function: Expr, args: Vec<Expr>, location: Location) -> Expr {
    Expr::Call(CallExpr {
        function: Box::new(function),
        args,
        location,
    })
}

#[test]
fn test_parse_simple_expressions() {
    assert_eq!(
        get_expression("hello").unwrap(),
        Expr::Name(name("hello", 1, 0, 5))
    );
    assert_eq!(get_expression("123").unwrap(), integer("123", 1, 0, 3));

    match get_expression(r#""hello \n""#).unwrap() {
        Expr::String(string) => {
            assert_eq!(string.value, r"hello \n");
            assert_eq!(string.location, Location::new(1, 0, 10));
        }
        other => panic!("expected a string, got {:?}", other),
    }
}

#[test]
fn test_function_call_statements() {
    let nodes = get_ast("lol();\nlol(1);\nlol(1, 2, 3);\n").unwrap();

    assert_eq!(
        nodes,
        vec![
            Stmt::Expression(ExpressionStmt {
                expression: call(
                    Expr::Name(name("lol", 1, 0, 3)),
                    vec![],
                    Location::new(1, 0, 5)
                ),
                location: Location::new(1, 0, 6),
            }),
            Stmt::Expression(ExpressionStmt {
                expression: call(
                    Expr::Name(name("lol", 2, 0, 3)),
                    vec![integer("1", 2, 4, 5)],
                    Location::new(2, 0, 6)
                ),
                location: Location::new(2, 0, 7),
            }),
            Stmt::Expression(ExpressionStmt {
                expression: call(
                    Expr::Name(name("lol", 3, 0, 3)),
                    vec![
                        integer("1", 3, 4, 5),
                        integer("2", 3, 7, 8),
                        integer("3", 3, 10, 11)
                    ],
                    Location::new(3, 0, 12)
                ),
                location: Location::new(3, 0, 13),
            }),
        ]
    );
}

#[test]
fn test_trailing_commas() {
    assert_eq!(
        get_expression("lol(1,)").unwrap(),
        call(
            Expr::Name(name("lol", 1, 0, 3)),
            vec![integer("1", 1, 4, 5)],
            Location::new(1, 0, 7)
        )
    );
    assert_eq!(
        get_expression("lol(1, 2, 3,)").unwrap(),
        call(
            Expr::Name(name("lol", 1, 0, 3)),
            vec![
                integer("1", 1, 4, 5),
                integer("2", 1, 7, 8),
                integer("3", 1, 10, 11)
            ],
            Location::new(1, 0, 13)
        )
    );
}

#[test]
fn test_comma_errors() {
    assert_error(get_expression("lol(,)"), Location::new(1, 4, 5), "don't put a ',' here");
    assert_error(get_expression("lol(,,)"), Location::new(1, 4, 5), "don't put a ',' here");
    assert_error(
        get_expression("lol(something,,)"),
        Location::new(1, 13, 15),
        "two ',' characters",
    );
    assert_error(
        get_expression("lol(something,,,)"),
        Location::new(1, 13, 15),
        "two ',' characters",
    );
    assert_error(
        get_expression("lol(a b)"),
        Location::new(1, 6, 7),
        "this should be ','",
    );
}

#[test]
fn test_function_returns_function() {
    let lol = Expr::Name(name("lol", 1, 0, 3));
    let once = call(lol, vec![], Location::new(1, 0, 5));
    let twice = call(once, vec![], Location::new(1, 0, 7));
    let thrice = call(twice, vec![], Location::new(1, 0, 9));
    assert_eq!(get_expression("lol()()()").unwrap(), thrice);

    assert_eq!(
        get_expression("lol(1, 2)(3, 4)").unwrap(),
        call(
            call(
                Expr::Name(name("lol", 1, 0, 3)),
                vec![integer("1", 1, 4, 5), integer("2", 1, 7, 8)],
                Location::new(1, 0, 9)
            ),
            vec![integer("3", 1, 10, 11), integer("4", 1, 13, 14)],
            Location::new(1, 0, 15)
        )
    );
}

#[test]
fn test_leftover_tokens_after_expression() {
    assert_error(get_expression("lol() x"), Location::new(1, 6, 7), "this should be ';'");
}

#[test]
fn test_declaration_and_assignment() {
    assert_eq!(
        get_ast("Int i;").unwrap(),
        vec![Stmt::Declaration(DeclarationStmt {
            var_type: name("Int", 1, 0, 3),
            name: "i".to_string(),
            location: Location::new(1, 0, 6),
        })]
    );

    // the two nodes overlap
    assert_eq!(
        get_ast("Int i = 123;").unwrap(),
        vec![
            Stmt::Declaration(DeclarationStmt {
                var_type: name("Int", 1, 0, 3),
                name: "i".to_string(),
                location: Location::new(1, 0, 5),
            }),
            Stmt::Assignment(AssignmentStmt {
                target: name("i", 1, 4, 5),
                value: integer("123", 1, 8, 11),
                location: Location::new(1, 4, 12),
            }),
        ]
    );

    assert_eq!(
        get_ast("i = 123;").unwrap(),
        vec![Stmt::Assignment(AssignmentStmt {
            target: name("i", 1, 0, 1),
            value: integer("123", 1, 4, 7),
            location: Location::new(1, 0, 8),
        })]
    );
}

#[test]
fn test_if() {
    assert_eq!(
        get_ast("if thing { }").unwrap(),
        vec![Stmt::If(IfStmt {
            condition: Expr::Name(name("thing", 1, 3, 8)),
            body: vec![],
            location: Location::new(1, 0, 12),
        })]
    );

    assert_eq!(
        get_ast("if thing {\n\tstuff;\n\tmore_stuff;\n}").unwrap(),
        vec![Stmt::If(IfStmt {
            condition: Expr::Name(name("thing", 1, 3, 8)),
            body: vec![
                Stmt::Expression(ExpressionStmt {
                    expression: Expr::Name(name("stuff", 2, 4, 9)),
                    location: Location::new(2, 4, 10),
                }),
                Stmt::Expression(ExpressionStmt {
                    expression: Expr::Name(name("more_stuff", 3, 4, 14)),
                    location: Location::new(3, 4, 15),
                }),
            ],
            // not a one-liner
            location: Location::rest_of_line(1, 0),
        })]
    );
}

#[test]
fn test_return() {
    assert_eq!(
        get_ast("return 123;").unwrap(),
        vec![Stmt::Return(ReturnStmt {
            value: integer("123", 1, 7, 10),
            location: Location::new(1, 0, 11),
        })]
    );
}

#[test]
fn test_function_defs() {
    assert_eq!(
        get_ast("function thing() {\n\tlol();\n\tlol();\n}").unwrap(),
        vec![Stmt::FunctionDef(FunctionDefStmt {
            name: "thing".to_string(),
            parameters: vec![],
            return_type: None,
            body: vec![
                Stmt::Expression(ExpressionStmt {
                    expression: call(
                        Expr::Name(name("lol", 2, 4, 7)),
                        vec![],
                        Location::new(2, 4, 9)
                    ),
                    location: Location::new(2, 4, 10),
                }),
                Stmt::Expression(ExpressionStmt {
                    expression: call(
                        Expr::Name(name("lol", 3, 4, 7)),
                        vec![],
                        Location::new(3, 4, 9)
                    ),
                    location: Location::new(3, 4, 10),
                }),
            ],
            location: Location::rest_of_line(1, 0),
        })]
    );

    assert_eq!(
        get_ast("function thing(Int i, String s) returns String { }").unwrap(),
        vec![Stmt::FunctionDef(FunctionDefStmt {
            name: "thing".to_string(),
            parameters: vec![
                Parameter {
                    var_type: name("Int", 1, 15, 18),
                    name: name("i", 1, 19, 20),
                },
                Parameter {
                    var_type: name("String", 1, 22, 28),
                    name: name("s", 1, 29, 30),
                },
            ],
            return_type: Some(name("String", 1, 40, 46)),
            body: vec![],
            location: Location::new(1, 0, 50),
        })]
    );
}

#[test]
fn test_reserved_words() {
    assert_error(
        get_ast("Int if;"),
        Location::new(1, 4, 6),
        "if is not a valid variable name because it has a special meaning",
    );
    assert_error(
        get_ast("x = returns;"),
        Location::new(1, 4, 11),
        "returns is not a valid variable name because it has a special meaning",
    );
}

#[test]
fn test_unexpected_tokens() {
    assert_error(
        get_ast("function 123() { }"),
        Location::new(1, 9, 12),
        "this should be a name",
    );
    assert_error(
        get_ast("Int x = 1 2;"),
        Location::new(1, 10, 11),
        "this should be ';'",
    );
    assert_error(
        get_ast("x = ;"),
        Location::new(1, 4, 5),
        "this should be a variable name, a string or an integer",
    );
}

#[test]
fn test_end_of_file() {
    assert_error(
        get_ast("print(\"hi\")"),
        Location::new(1, 11, 14),
        "unexpected end of file",
    );
    assert_error(
        get_ast("function main() {"),
        Location::new(1, 17, 20),
        "unexpected end of file",
    );
    assert_error(get_ast("Int"), Location::new(1, 3, 6), "unexpected end of file");
    assert_error(get_expression(""), Location::new(1, 0, 3), "unexpected end of file");
}

#[test]
fn test_empty_file() {
    assert_eq!(get_ast("").unwrap(), vec![]);
    assert_eq!(get_ast("// nothing here\n").unwrap(), vec![]);
}

#[test]
fn test_lexer_errors_pass_through() {
    assert_error(get_ast("x = @;"), Location::new(1, 4, 5), "unknown character '@'");
}

#[test]
fn test_parser_is_lazy() {
    let mut nodes = parse(tokenize("a; b; +"));

    assert!(nodes.next().unwrap().is_ok());
    assert!(nodes.next().unwrap().is_ok());
    assert!(nodes.next().unwrap().is_err());
    assert!(nodes.next().is_none());
}

proptest! {
    #[test]
    fn comma_lists_keep_every_element(count in 0usize..6, trailing in any::<bool>()) {
        let args: Vec<String> = (0..count).map(|i| format!("a{}", i)).collect();
        let mut source = format!("f({}", args.join(", "));
        if trailing && count > 0 {
            source.push(',');
        }
        source.push(')');

        let call = match get_expression(&source).unwrap() {
            Expr::Call(call) => call,
            other => panic!("expected a call, got {:?}", other),
        };
        let names: Vec<String> = call
            .args
            .iter()
            .map(|arg| match arg {
                Expr::Name(name) => name.name.clone(),
                other => panic!("expected a name, got {:?}", other),
            })
            .collect();

        prop_assert_eq!(names, args);
        prop_assert_eq!(call.location, Location::new(1, 0, source.len()));
    }
}
