use crate::query::ast::ExpressionNode;

/// The row type a query source produces: its name and the settable members
/// it exposes, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowShape {
    pub type_name: String,
    pub members: Vec<String>,
}

impl RowShape {
    pub fn new(type_name: &str) -> Self {
        Self { type_name: type_name.to_string(), members: Vec::new() }
    }

    pub fn with_members(type_name: &str, members: &[&str]) -> Self {
        Self {
            type_name: type_name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Keys of a group join; the inner key is evaluated against a correlated
/// copy of the table to count the members of each group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupJoin {
    pub outer_key: ExpressionNode,
    pub inner_key: ExpressionNode,
}

/// Reference to a query source (the main `FROM`, a joined table or a group
/// join).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceReference {
    pub item: RowShape,
    /// Table backing the source, `None` for the table being compiled.
    pub table: Option<String>,
    pub group_join: Option<Box<GroupJoin>>,
}

impl SourceReference {
    pub fn new(item: RowShape) -> Self {
        Self { item, table: None, group_join: None }
    }

    pub fn from_table(item: RowShape, table: &str) -> Self {
        Self { item, table: Some(table.to_string()), group_join: None }
    }

    pub fn group_join(item: RowShape, outer_key: ExpressionNode, inner_key: ExpressionNode) -> Self {
        Self {
            item,
            table: None,
            group_join: Some(Box::new(GroupJoin { outer_key, inner_key })),
        }
    }
}
