use crate::query::{
    ast::{ExpressionNode, RowShape, SourceReference},
    filters::{FilterExpression, LimitClauseNumber},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

/// `JOIN "table" ON <outer_key> = <inner_key>`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: String,
    pub outer_key: ExpressionNode,
    pub inner_key: ExpressionNode,
}

impl JoinClause {
    pub fn inner(table: &str, outer_key: ExpressionNode, inner_key: ExpressionNode) -> Self {
        Self { kind: JoinKind::Inner, table: table.to_string(), outer_key, inner_key }
    }

    pub fn left(table: &str, outer_key: ExpressionNode, inner_key: ExpressionNode) -> Self {
        Self { kind: JoinKind::Left, table: table.to_string(), outer_key, inner_key }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub expression: ExpressionNode,
    pub direction: OrderingDirection,
}

/// A whole query: where rows come from, what is selected and every clause
/// applied to them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryModel {
    pub main_from: SourceReference,
    /// Select list; the main source's columns when `None`.
    pub selector: Option<ExpressionNode>,
    pub joins: Vec<JoinClause>,
    pub where_clauses: Vec<ExpressionNode>,
    pub filters: Vec<FilterExpression>,
    pub group_by: Vec<ExpressionNode>,
    pub order_by: Vec<Ordering>,
    pub limit: Option<LimitClauseNumber>,
    pub offset: Option<u64>,
    pub distinct: bool,
    pub count: bool,
}

impl QueryModel {
    pub fn new(item: RowShape) -> Self {
        Self { main_from: SourceReference::new(item), ..Default::default() }
    }

    pub fn from_source(main_from: SourceReference) -> Self {
        Self { main_from, ..Default::default() }
    }

    pub fn select(mut self, selector: ExpressionNode) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn join(mut self, join: JoinClause) -> Self {
        self.joins.push(join);
        self
    }

    pub fn where_expression(mut self, predicate: ExpressionNode) -> Self {
        self.where_clauses.push(predicate);
        self
    }

    pub fn where_filter(mut self, filter: FilterExpression) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn group_by(mut self, key: ExpressionNode) -> Self {
        self.group_by.push(key);
        self
    }

    pub fn order_by(mut self, expression: ExpressionNode, direction: OrderingDirection) -> Self {
        self.order_by.push(Ordering { expression, direction });
        self
    }

    pub fn order_asc(self, expression: ExpressionNode) -> Self {
        self.order_by(expression, OrderingDirection::Asc)
    }

    pub fn order_desc(self, expression: ExpressionNode) -> Self {
        self.order_by(expression, OrderingDirection::Desc)
    }

    /// `LIMIT`; zero means no limit. Written inline, not bound.
    pub fn take(mut self, count: u64) -> Self {
        self.limit = Some(LimitClauseNumber::new(count));
        self
    }

    /// `OFFSET`, written inline like the limit.
    pub fn skip(mut self, count: u64) -> Self {
        self.offset = Some(count);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Replace the select list with `COUNT(*)`.
    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }
}
