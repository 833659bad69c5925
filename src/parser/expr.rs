use crate::{
    ast::{
        ast::Expr,
        expressions::{CallExpr, IntegerExpr, NameExpr, StringExpr},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Location,
};

use super::parser::Parser;

/// Parses a name that can be used as a variable, function or type name.
pub fn parse_name(parser: &mut Parser) -> Result<NameExpr, Error> {
    let token = parser.check_and_pop(TokenKind::Name, None)?;
    if token.is_reserved() {
        return Err(Error::new(
            ErrorImpl::ReservedWord { word: token.value },
            token.location,
        ));
    }

    Ok(NameExpr {
        name: token.value,
        location: token.location,
    })
}

fn parse_primary(parser: &mut Parser) -> Result<Expr, Error> {
    let coming_up = parser.coming_up(1)?.clone();

    match coming_up.kind {
        TokenKind::Name => Ok(Expr::Name(parse_name(parser)?)),
        TokenKind::Integer => {
            let token = parser.pop()?;
            Ok(Expr::Integer(IntegerExpr {
                value: token.value,
                location: token.location,
            }))
        }
        TokenKind::String => {
            let token = parser.pop()?;
            let value = token.value[1..token.value.len() - 1].to_string();
            Ok(Expr::String(StringExpr {
                value,
                location: token.location,
            }))
        }
        TokenKind::Op => Err(Error::new(
            ErrorImpl::ExpectedExpression,
            coming_up.location,
        )),
    }
}

/// Parses an expression. Any number of call suffixes may follow the primary
/// expression, so `f(x)(y)` calls the result of `f(x)`.
pub fn parse_expression(parser: &mut Parser) -> Result<Expr, Error> {
    let mut result = parse_primary(parser)?;

    while parser.next_is(TokenKind::Op, "(")? {
        let (args, closing) = parse_comma_list(parser, "(", ")", parse_expression)?;
        result = Expr::Call(CallExpr {
            location: Location::between(result.get_location(), closing.location),
            function: Box::new(result),
            args,
        });
    }

    Ok(result)
}

/// Parses `start element, element, ... stop`.
///
/// One trailing comma is allowed. Returns the elements and the `stop` token.
pub fn parse_comma_list<T>(
    parser: &mut Parser,
    start: &str,
    stop: &str,
    parse_element: fn(&mut Parser) -> Result<T, Error>,
) -> Result<(Vec<T>, Token), Error> {
    parser.check_and_pop(TokenKind::Op, Some(start))?;
    let mut elements = Vec::new();

    if parser.coming_up(1)?.is_op(stop) {
        return Ok((elements, parser.pop()?));
    }

    loop {
        let coming_up = parser.coming_up(1)?;
        if coming_up.is_op(",") {
            return Err(Error::new(ErrorImpl::LeadingComma, coming_up.location));
        }

        elements.push(parse_element(parser)?);
        if parser.coming_up(1)?.is_op(stop) {
            return Ok((elements, parser.pop()?));
        }

        let comma = parser.check_and_pop(TokenKind::Op, Some(","))?;
        let coming_up = parser.coming_up(1)?;
        if coming_up.is_op(",") {
            return Err(Error::new(
                ErrorImpl::DoubleComma,
                Location::between(comma.location, coming_up.location),
            ));
        }
        if coming_up.is_op(stop) {
            return Ok((elements, parser.pop()?));
        }
    }
}
