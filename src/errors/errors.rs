use std::fmt::Display;

use thiserror::Error;

use crate::Location;

/// A fatal compile error.
///
/// The location is `None` only for errors about the whole file, like a
/// missing `main()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    location: Option<Location>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, location: Location) -> Self {
        Error {
            internal_error: error_impl,
            location: Some(location),
        }
    }

    pub fn unlocated(error_impl: ErrorImpl) -> Self {
        Error {
            internal_error: error_impl,
            location: None,
        }
    }

    pub fn get_location(&self) -> Option<Location> {
        self.location
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// The message shown to the user.
    pub fn message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn is_end_of_file(&self) -> bool {
        matches!(self.internal_error, ErrorImpl::UnexpectedEndOfFile)
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnknownCharacter { .. } => "UnknownCharacter",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::ExpectedValue { .. } => "ExpectedValue",
            ErrorImpl::ExpectedKind { .. } => "ExpectedKind",
            ErrorImpl::ExpectedExpression => "ExpectedExpression",
            ErrorImpl::LeadingComma => "LeadingComma",
            ErrorImpl::DoubleComma => "DoubleComma",
            ErrorImpl::UnexpectedEndOfFile => "UnexpectedEndOfFile",
            ErrorImpl::ReservedWord { .. } => "ReservedWord",
            ErrorImpl::MissingBrace { .. } => "MissingBrace",
            ErrorImpl::MismatchedBrace { .. } => "MismatchedBrace",
            ErrorImpl::NotAFunctionDefinition => "NotAFunctionDefinition",
            ErrorImpl::NoMainFunction => "NoMainFunction",
            ErrorImpl::MainReturnsValue => "MainReturnsValue",
            ErrorImpl::MainTakesArguments => "MainTakesArguments",
            ErrorImpl::AlreadyDefined { .. } => "AlreadyDefined",
            ErrorImpl::DuplicateArgument { .. } => "DuplicateArgument",
            ErrorImpl::NotAType => "NotAType",
            ErrorImpl::UndeclaredAssignment { .. } => "UndeclaredAssignment",
            ErrorImpl::FunctionAssignment => "FunctionAssignment",
            ErrorImpl::BuiltinAssignment { .. } => "BuiltinAssignment",
            ErrorImpl::AssignmentTypeMismatch { .. } => "AssignmentTypeMismatch",
            ErrorImpl::NestedFunction => "NestedFunction",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::VariableNotInitialized { .. } => "VariableNotInitialized",
            ErrorImpl::NotAFunction => "NotAFunction",
            ErrorImpl::ArgumentMismatch { .. } => "ArgumentMismatch",
            ErrorImpl::ReturnsNothing => "ReturnsNothing",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::UnexpectedReturnValue => "UnexpectedReturnValue",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::ConditionTypeMismatch { .. } => "ConditionTypeMismatch",
            ErrorImpl::DeniedWarning { .. } => "DeniedWarning",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UndeclaredAssignment {
                variable,
                type_name: Some(type_name),
            } => ErrorTip::Suggestion(format!("e.g. \"{} {};\"", type_name, variable)),
            ErrorImpl::UnexpectedEndOfFile => {
                ErrorTip::Suggestion(String::from("did you forget a ';' or a '}'?"))
            }
            ErrorImpl::MainReturnsValue | ErrorImpl::MainTakesArguments => {
                ErrorTip::Suggestion(String::from("main() should look like \"function main() { }\""))
            }
            ErrorImpl::VariableNotInitialized { variable } => {
                ErrorTip::Suggestion(format!("assign something to '{}' before using it", variable))
            }
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.location {
            Some(location) => write!(f, "line {}: {}", location.line, self.internal_error),
            None => write!(f, "{}", self.internal_error),
        }
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // lexer
    #[error("unknown character '{character}'")]
    UnknownCharacter { character: char },
    #[error("this string doesn't end")]
    UnterminatedString,
    #[error("this comment doesn't end")]
    UnterminatedComment,

    // parser
    #[error("this should be '{value}'")]
    ExpectedValue { value: String },
    #[error("this should be {kind}")]
    ExpectedKind { kind: String },
    #[error("this should be a variable name, a string or an integer")]
    ExpectedExpression,
    #[error("don't put a ',' here")]
    LeadingComma,
    #[error("two ',' characters")]
    DoubleComma,
    #[error("unexpected end of file")]
    UnexpectedEndOfFile,
    #[error("{word} is not a valid variable name because it has a special meaning")]
    ReservedWord { word: String },

    // brace checker
    #[error("missing '{brace}'")]
    MissingBrace { brace: char },
    #[error("should be '{brace}'")]
    MismatchedBrace { brace: char },

    // checker
    #[error("only function definitions can be here")]
    NotAFunctionDefinition,
    #[error("there's no main() function")]
    NoMainFunction,
    #[error("main() must not return anything")]
    MainReturnsValue,
    #[error("main() must not take arguments")]
    MainTakesArguments,
    #[error("there's already a {what} named '{name}'")]
    AlreadyDefined { what: String, name: String },
    #[error("there are {count} arguments named '{name}'")]
    DuplicateArgument { count: usize, name: String },
    #[error("this is not a type")]
    NotAType,
    #[error("you need to declare '{variable}' first")]
    UndeclaredAssignment {
        variable: String,
        type_name: Option<String>,
    },
    #[error("functions can't be changed like this")]
    FunctionAssignment,
    #[error("'{name}' can't be changed")]
    BuiltinAssignment { name: String },
    #[error("'{variable}' needs to be {expected}, not {received}")]
    AssignmentTypeMismatch {
        variable: String,
        expected: String,
        received: String,
    },
    #[error("cannot define a function inside a function")]
    NestedFunction,
    #[error("no variable named '{variable}'")]
    VariableNotDeclared { variable: String },
    #[error("variable '{variable}' might not have a value yet")]
    VariableNotInitialized { variable: String },
    #[error("this is not a function")]
    NotAFunction,
    #[error("should be {function}({expected}), not {function}({received})")]
    ArgumentMismatch {
        function: String,
        expected: String,
        received: String,
    },
    #[error("this returns nothing")]
    ReturnsNothing,
    #[error("this function should return {expected}, not {received}")]
    ReturnTypeMismatch { expected: String, received: String },
    #[error("this function shouldn't return a value")]
    UnexpectedReturnValue,
    #[error("this function needs to return {expected} at the end")]
    MissingReturn { expected: String },
    #[error("this should be a Bool, not {received}")]
    ConditionTypeMismatch { received: String },

    #[error("{warning}")]
    DeniedWarning { warning: String },
}

/// A non-fatal diagnostic. Checking continues after a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    internal_warning: WarningImpl,
    location: Location,
}

impl Warning {
    pub fn new(warning_impl: WarningImpl, location: Location) -> Self {
        Warning {
            internal_warning: warning_impl,
            location,
        }
    }

    pub fn get_location(&self) -> Location {
        self.location
    }

    pub fn get_impl(&self) -> &WarningImpl {
        &self.internal_warning
    }

    pub fn get_message(&self) -> String {
        self.internal_warning.to_string()
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.location.line, self.internal_warning)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarningImpl {
    #[error("this variable isn't used anywhere")]
    UnusedVariable { variable: String },
    #[error("this does nothing")]
    NoEffect,
}

/// Prefixes a type name with "a" or "an".
pub fn add_article(name: &str) -> String {
    let first_letter = name
        .trim_start_matches(|c: char| c.is_ascii_punctuation())
        .chars()
        .next();

    match first_letter {
        Some(c) if "AEIOUYaeiouy".contains(c) => format!("an {}", name),
        _ => format!("a {}", name),
    }
}
