use crate::{
    query::ast::{ExpressionNode, ValueType},
    CompileError,
};

/// The methods the compiler can translate. Anything else is rejected when the
/// call node is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Equals,
    ToLower,
    ToUpper,
    Reverse,
    Length,
    Concat,
    Substring,
    Replace,
    Trim,
    TrimStart,
    TrimEnd,
    Contains,
    StartsWith,
    EndsWith,
}

const ALL_METHODS: [MethodKind; 14] = [
    MethodKind::Equals,
    MethodKind::ToLower,
    MethodKind::ToUpper,
    MethodKind::Reverse,
    MethodKind::Length,
    MethodKind::Concat,
    MethodKind::Substring,
    MethodKind::Replace,
    MethodKind::Trim,
    MethodKind::TrimStart,
    MethodKind::TrimEnd,
    MethodKind::Contains,
    MethodKind::StartsWith,
    MethodKind::EndsWith,
];

impl MethodKind {
    pub fn name(&self) -> &'static str {
        match self {
            MethodKind::Equals => "Equals",
            MethodKind::ToLower => "ToLower",
            MethodKind::ToUpper => "ToUpper",
            MethodKind::Reverse => "Reverse",
            MethodKind::Length => "Length",
            MethodKind::Concat => "Concat",
            MethodKind::Substring => "Substring",
            MethodKind::Replace => "Replace",
            MethodKind::Trim => "Trim",
            MethodKind::TrimStart => "TrimStart",
            MethodKind::TrimEnd => "TrimEnd",
            MethodKind::Contains => "Contains",
            MethodKind::StartsWith => "StartsWith",
            MethodKind::EndsWith => "EndsWith",
        }
    }

    /// Accepts `StartsWith`, `startswith` and `starts_with` alike.
    pub fn from_name(name: &str) -> Option<MethodKind> {
        let wanted: String = name.chars().filter(|c| *c != '_').collect::<String>().to_ascii_lowercase();
        ALL_METHODS.iter().copied().find(|m| m.name().eq_ignore_ascii_case(&wanted))
    }

    /// Static calls (`Concat`) have no receiver.
    pub fn has_receiver(&self) -> bool {
        !matches!(self, MethodKind::Concat)
    }

    /// Arguments are values of the receiver's kind (matched, searched or
    /// stripped against it) rather than positions or counts.
    pub fn compares_with_receiver(&self) -> bool {
        matches!(
            self,
            MethodKind::Equals
                | MethodKind::Contains
                | MethodKind::StartsWith
                | MethodKind::EndsWith
                | MethodKind::Replace
                | MethodKind::Trim
                | MethodKind::TrimStart
                | MethodKind::TrimEnd
        )
    }

    /// The result is the receiver's text, reshaped.
    pub fn transforms_receiver(&self) -> bool {
        matches!(
            self,
            MethodKind::ToLower
                | MethodKind::ToUpper
                | MethodKind::Reverse
                | MethodKind::Substring
                | MethodKind::Replace
                | MethodKind::Trim
                | MethodKind::TrimStart
                | MethodKind::TrimEnd
        )
    }

    /// Accepted argument counts, receiver excluded.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            MethodKind::ToLower | MethodKind::ToUpper | MethodKind::Reverse | MethodKind::Length => (0, 0),
            MethodKind::Equals | MethodKind::Contains | MethodKind::StartsWith | MethodKind::EndsWith => (1, 1),
            MethodKind::Concat => (1, usize::MAX),
            MethodKind::Substring => (1, 2),
            MethodKind::Replace => (2, 2),
            MethodKind::Trim | MethodKind::TrimStart | MethodKind::TrimEnd => (0, 1),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            MethodKind::Equals | MethodKind::Contains | MethodKind::StartsWith | MethodKind::EndsWith => ValueType::Boolean,
            MethodKind::Length => ValueType::Integer,
            _ => ValueType::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub kind: MethodKind,
    pub receiver: Option<Box<ExpressionNode>>,
    pub arguments: Vec<ExpressionNode>,
}

impl MethodCall {
    /// Resolve `name` and validate the call shape.
    pub fn new(name: &str, receiver: Option<ExpressionNode>, arguments: Vec<ExpressionNode>) -> Result<MethodCall, CompileError> {
        let kind = MethodKind::from_name(name).ok_or_else(|| {
            CompileError::UnsupportedOperation(format!("method {} is not supported", name))
        })?;
        Self::of(kind, receiver, arguments)
    }

    pub fn of(kind: MethodKind, receiver: Option<ExpressionNode>, arguments: Vec<ExpressionNode>) -> Result<MethodCall, CompileError> {
        if kind.has_receiver() != receiver.is_some() {
            let expected = if kind.has_receiver() { "a receiver" } else { "no receiver" };
            return Err(CompileError::UnsupportedOperation(format!("method {} expects {}", kind.name(), expected)));
        }

        let (min, max) = kind.arity();
        if arguments.len() < min || arguments.len() > max {
            return Err(CompileError::UnsupportedOperation(format!(
                "method {} does not accept {} argument(s)",
                kind.name(),
                arguments.len()
            )));
        }

        Ok(MethodCall { kind, receiver: receiver.map(Box::new), arguments })
    }
}
