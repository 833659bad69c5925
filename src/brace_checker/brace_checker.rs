use tracing::trace;

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
};

fn closing_for(opening: &str) -> Option<char> {
    match opening {
        "{" => Some('}'),
        "(" => Some(')'),
        _ => None,
    }
}

fn opening_for(closing: &str) -> Option<char> {
    match closing {
        "}" => Some('{'),
        ")" => Some('('),
        _ => None,
    }
}

/// Checks that every `{` and `(` has a matching closer.
///
/// When something is left open at the end of the file, the error points at
/// the outermost unclosed brace.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn check(tokens: &[Token]) -> Result<(), Error> {
    let mut brace_stack: Vec<&Token> = vec![];

    for token in tokens.iter().filter(|token| token.kind == TokenKind::Op) {
        if closing_for(&token.value).is_some() {
            brace_stack.push(token);
        } else if let Some(opening) = opening_for(&token.value) {
            let open_token = match brace_stack.pop() {
                Some(open_token) => open_token,
                None => {
                    return Err(Error::new(
                        ErrorImpl::MissingBrace { brace: opening },
                        token.location,
                    ))
                }
            };

            if !open_token.value.starts_with(opening) {
                if let Some(expected) = closing_for(&open_token.value) {
                    return Err(Error::new(
                        ErrorImpl::MismatchedBrace { brace: expected },
                        token.location,
                    ));
                }
            }
        }
    }

    if let Some(outermost) = brace_stack.first() {
        if let Some(closing) = closing_for(&outermost.value) {
            return Err(Error::new(
                ErrorImpl::MissingBrace { brace: closing },
                outermost.location,
            ));
        }
    }

    trace!("braces are balanced");
    Ok(())
}
