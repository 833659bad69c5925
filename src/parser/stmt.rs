use crate::{
    ast::{
        ast::Stmt,
        statements::{
            AssignmentStmt, DeclarationStmt, ExpressionStmt, FunctionDefStmt, IfStmt, Parameter,
            ReturnStmt,
        },
    },
    errors::errors::Error,
    lexer::tokens::{Token, TokenKind},
    Location,
};

use super::{
    expr::{parse_comma_list, parse_expression, parse_name},
    parser::Parser,
};

/// Parses one statement.
///
/// Usually this is one node, but `Type x = value;` becomes a declaration
/// and an assignment.
pub fn parse_statement(parser: &mut Parser) -> Result<Vec<Stmt>, Error> {
    let first = parser.coming_up(1)?.clone();

    if first.kind == TokenKind::Name {
        match first.value.as_str() {
            "return" => return Ok(vec![parse_return(parser)?]),
            "if" => return Ok(vec![parse_if(parser)?]),
            "function" => return Ok(vec![parse_function_def(parser)?]),
            _ => {}
        }

        let after_name = match parser.coming_up(2) {
            Ok(token) => token.clone(),
            Err(error) if error.is_end_of_file() => {
                return Ok(vec![parse_expression_statement(parser)?]);
            }
            Err(error) => return Err(error),
        };

        if after_name.is_op("=") {
            return Ok(vec![parse_assignment(parser)?]);
        }
        if after_name.kind == TokenKind::Name {
            return parse_declaration(parser);
        }
    }

    Ok(vec![parse_expression_statement(parser)?])
}

fn parse_semicolon(parser: &mut Parser) -> Result<Token, Error> {
    parser.check_and_pop(TokenKind::Op, Some(";"))
}

fn parse_expression_statement(parser: &mut Parser) -> Result<Stmt, Error> {
    let expression = parse_expression(parser)?;
    let semicolon = parse_semicolon(parser)?;

    Ok(Stmt::Expression(ExpressionStmt {
        location: Location::between(expression.get_location(), semicolon.location),
        expression,
    }))
}

fn parse_assignment(parser: &mut Parser) -> Result<Stmt, Error> {
    let target = parse_name(parser)?;
    parser.check_and_pop(TokenKind::Op, Some("="))?;
    let value = parse_expression(parser)?;
    let semicolon = parse_semicolon(parser)?;

    Ok(Stmt::Assignment(AssignmentStmt {
        location: Location::between(target.location, semicolon.location),
        target,
        value,
    }))
}

/// `Type name;` or `Type name = value;`
fn parse_declaration(parser: &mut Parser) -> Result<Vec<Stmt>, Error> {
    let var_type = parse_name(parser)?;
    let variable = parse_name(parser)?;

    if parser.coming_up(1)?.is_op(";") {
        let semicolon = parser.pop()?;
        return Ok(vec![Stmt::Declaration(DeclarationStmt {
            location: Location::between(var_type.location, semicolon.location),
            var_type,
            name: variable.name,
        })]);
    }

    parser.check_and_pop(TokenKind::Op, Some("="))?;
    let value = parse_expression(parser)?;
    let semicolon = parse_semicolon(parser)?;

    let declaration = Stmt::Declaration(DeclarationStmt {
        location: Location::between(var_type.location, variable.location),
        var_type,
        name: variable.name.clone(),
    });
    let assignment = Stmt::Assignment(AssignmentStmt {
        location: Location::between(variable.location, semicolon.location),
        target: variable,
        value,
    });
    Ok(vec![declaration, assignment])
}

/// Parses `{ statements }` and returns the closing brace too.
fn parse_block(parser: &mut Parser) -> Result<(Vec<Stmt>, Token), Error> {
    parser.check_and_pop(TokenKind::Op, Some("{"))?;

    let mut body = vec![];
    while !parser.coming_up(1)?.is_op("}") {
        body.extend(parse_statement(parser)?);
    }

    let closing = parser.pop()?;
    Ok((body, closing))
}

fn parse_if(parser: &mut Parser) -> Result<Stmt, Error> {
    let the_if = parser.check_and_pop(TokenKind::Name, Some("if"))?;
    let condition = parse_expression(parser)?;
    let (body, closing) = parse_block(parser)?;

    Ok(Stmt::If(IfStmt {
        condition,
        body,
        location: Location::between(the_if.location, closing.location),
    }))
}

fn parse_return(parser: &mut Parser) -> Result<Stmt, Error> {
    let the_return = parser.check_and_pop(TokenKind::Name, Some("return"))?;
    let value = parse_expression(parser)?;
    let semicolon = parse_semicolon(parser)?;

    Ok(Stmt::Return(ReturnStmt {
        value,
        location: Location::between(the_return.location, semicolon.location),
    }))
}

fn parse_parameter(parser: &mut Parser) -> Result<Parameter, Error> {
    let var_type = parse_name(parser)?;
    let name = parse_name(parser)?;
    Ok(Parameter { var_type, name })
}

/// `function name(Type arg, ...) returns Type { body }`, where the
/// `returns` part is optional.
fn parse_function_def(parser: &mut Parser) -> Result<Stmt, Error> {
    let function_keyword = parser.check_and_pop(TokenKind::Name, Some("function"))?;
    let name = parse_name(parser)?;
    let (parameters, _) = parse_comma_list(parser, "(", ")", parse_parameter)?;

    let return_type = if parser.coming_up(1)?.is(TokenKind::Name, "returns") {
        parser.pop()?;
        Some(parse_name(parser)?)
    } else {
        None
    };

    let (body, closing) = parse_block(parser)?;

    Ok(Stmt::FunctionDef(FunctionDefStmt {
        name: name.name,
        parameters,
        return_type,
        body,
        location: Location::between(function_keyword.location, closing.location),
    }))
}
