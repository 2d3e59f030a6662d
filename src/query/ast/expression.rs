use crate::{
    query::ast::{BinaryOp, Literal, MethodCall, QueryModel, RowShape, SourceReference, UnaryOp, ValueType},
    CompileError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub op: BinaryOp,
    pub left: Box<ExpressionNode>,
    pub right: Box<ExpressionNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub test: Box<ExpressionNode>,
    pub if_true: Box<ExpressionNode>,
    pub if_false: Box<ExpressionNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub op: UnaryOp,
    pub operand: Box<ExpressionNode>,
}

/// `.`-delimited member path. The first segment names a table column, the
/// following segments walk into its JSON content.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    /// Source the path starts from; `None` means the table being compiled.
    pub root: Option<Box<SourceReference>>,
    pub path: Vec<String>,
    pub value_type: ValueType,
}

impl MemberAccess {
    /// Name of the last member on the path.
    pub fn member_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// `x.Name.Length`: a length taken over another member access.
    pub fn is_length_of_member(&self) -> bool {
        self.path.len() > 1 && self.member_name() == "Length"
    }

    /// The access this one is taken over (`x.Name` for `x.Name.Length`).
    pub fn parent(&self) -> MemberAccess {
        MemberAccess {
            root: self.root.clone(),
            path: self.path[..self.path.len().saturating_sub(1)].to_vec(),
            value_type: ValueType::Text,
        }
    }
}

/// One node of a query's expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    SourceReference(SourceReference),
    SubQuery(Box<QueryModel>),
    Binary(BinaryExpression),
    Conditional(ConditionalExpression),
    Constant(Literal),
    MemberAccess(MemberAccess),
    MethodCall(MethodCall),
    New(Vec<ExpressionNode>),
    Unary(UnaryExpression),
}

impl ExpressionNode {
    pub fn source(item: RowShape) -> Self {
        ExpressionNode::SourceReference(SourceReference::new(item))
    }

    /// Member access on the compiled table, e.g. `member("Address.City", ValueType::Text)`.
    pub fn member(path: &str, value_type: ValueType) -> Self {
        ExpressionNode::MemberAccess(MemberAccess {
            root: None,
            path: path.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect(),
            value_type,
        })
    }

    /// Member access starting from an explicit source, used for joined tables.
    pub fn member_of(root: SourceReference, path: &str, value_type: ValueType) -> Self {
        ExpressionNode::MemberAccess(MemberAccess {
            root: Some(Box::new(root)),
            path: path.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect(),
            value_type,
        })
    }

    pub fn constant(value: impl Into<Literal>) -> Self {
        ExpressionNode::Constant(value.into())
    }

    pub fn binary(op: BinaryOp, left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::Binary(BinaryExpression { op, left: Box::new(left), right: Box::new(right) })
    }

    pub fn eq(left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::binary(BinaryOp::Equal, left, right)
    }

    pub fn and_also(left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::binary(BinaryOp::AndAlso, left, right)
    }

    pub fn or_else(left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::binary(BinaryOp::OrElse, left, right)
    }

    pub fn conditional(test: ExpressionNode, if_true: ExpressionNode, if_false: ExpressionNode) -> Self {
        ExpressionNode::Conditional(ConditionalExpression {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        })
    }

    pub fn unary(op: UnaryOp, operand: ExpressionNode) -> Self {
        ExpressionNode::Unary(UnaryExpression { op, operand: Box::new(operand) })
    }

    pub fn not(operand: ExpressionNode) -> Self {
        Self::unary(UnaryOp::Not, operand)
    }

    /// Method call by name; unknown names and bad arities fail here, not
    /// while compiling.
    pub fn method(name: &str, receiver: Option<ExpressionNode>, arguments: Vec<ExpressionNode>) -> Result<Self, CompileError> {
        MethodCall::new(name, receiver, arguments).map(ExpressionNode::MethodCall)
    }

    pub fn new_object(arguments: Vec<ExpressionNode>) -> Self {
        ExpressionNode::New(arguments)
    }

    pub fn sub_query(model: QueryModel) -> Self {
        ExpressionNode::SubQuery(Box::new(model))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ExpressionNode::SourceReference(_) | ExpressionNode::SubQuery(_) | ExpressionNode::New(_) => ValueType::Unknown,
            ExpressionNode::Binary(b) => {
                if b.op.is_comparison() || b.op.is_logical() {
                    return ValueType::Boolean;
                }
                if b.op.is_bitwise() {
                    return ValueType::Integer;
                }
                let (l, r) = (b.left.value_type(), b.right.value_type());
                match b.op {
                    BinaryOp::Add if l.is_text() || r.is_text() => ValueType::Text,
                    _ if l == ValueType::Float || r == ValueType::Float => ValueType::Float,
                    _ if l == ValueType::Unknown => r,
                    _ => l,
                }
            }
            ExpressionNode::Conditional(c) => match c.if_true.value_type() {
                ValueType::Unknown => c.if_false.value_type(),
                ty => ty,
            },
            ExpressionNode::Constant(literal) => literal.value_type(),
            ExpressionNode::MemberAccess(m) if m.is_length_of_member() => ValueType::Integer,
            ExpressionNode::MemberAccess(m) => m.value_type,
            ExpressionNode::MethodCall(call) => call.kind.value_type(),
            ExpressionNode::Unary(u) => match u.op {
                UnaryOp::Not => ValueType::Boolean,
                _ => u.operand.value_type(),
            },
        }
    }
}
