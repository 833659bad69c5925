/// A type known to the checker.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// `Int`, `String` and `Bool`. These have no further structure.
    Named(String),
    Function(FunctionType),
}

/// The signature of a function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub name: String,
    pub params: Vec<Type>,
    /// `None` means the function returns nothing
    pub returns: Option<Box<Type>>,
}

impl Type {
    pub fn named(name: &str) -> Self {
        Type::Named(String::from(name))
    }

    /// The word used for this type in error messages. All function types
    /// are just "function".
    pub fn describe(&self) -> &str {
        match self {
            Type::Named(name) => name,
            Type::Function(_) => "function",
        }
    }
}

/// What a name or an expression evaluates to while checking.
///
/// `Int` is a `Type`, while `123` and every `Int` variable are instances of
/// it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Type(Type),
    Instance(Type),
}

impl Value {
    pub fn describe(&self) -> &str {
        match self {
            Value::Type(_) => "type",
            Value::Instance(instance_type) => instance_type.describe(),
        }
    }

    pub fn instance_type(&self) -> Option<&Type> {
        match self {
            Value::Instance(instance_type) => Some(instance_type),
            Value::Type(_) => None,
        }
    }

    pub fn is_instance_of(&self, expected: &Type) -> bool {
        self.instance_type() == Some(expected)
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Value::Instance(Type::Function(function)) => Some(function),
            _ => None,
        }
    }
}
