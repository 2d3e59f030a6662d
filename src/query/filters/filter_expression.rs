use uuid::Uuid;

use crate::{
    database::{MetadataProvider, PgType},
    query::{
        ast::Literal,
        filters::{ColumnPath, ParameterBinding, PathTarget, PgSqlCommand},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl CompareOp {
    pub fn token(&self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterThanOrEqual => ">=",
            CompareOp::LessThan => "<",
            CompareOp::LessThanOrEqual => "<=",
        }
    }

    /// Short key the parameter names of this operator start with.
    pub fn key(&self) -> &'static str {
        match self {
            CompareOp::Equal => "eq",
            CompareOp::NotEqual => "ne",
            CompareOp::GreaterThan => "gt",
            CompareOp::GreaterThanOrEqual => "gte",
            CompareOp::LessThan => "lt",
            CompareOp::LessThanOrEqual => "lte",
        }
    }
}

/// A value held by a filter node under a name fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParameter {
    pub name: String,
    pub value: Literal,
}

impl FilterParameter {
    pub fn new(key: &str, value: impl Into<Literal>) -> Self {
        Self { name: format!("{}_{}", key, Uuid::new_v4().simple()), value: value.into() }
    }

    fn token(&self) -> String {
        format!("@{}", self.name)
    }

    fn binding(&self, target: &PathTarget) -> ParameterBinding {
        ParameterBinding::new(&self.name, self.value.clone()).with_override(target.json_terminus.then_some(PgType::Text))
    }
}

/// Predicate on a column path that renders its own SQL from the target
/// column's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Compare { path: String, op: CompareOp, value: FilterParameter },
    Like { path: String, pattern: FilterParameter },
    IsNull { path: String, negated: bool },
    Between { path: String, low: FilterParameter, high: FilterParameter },
    And(Vec<FilterExpression>),
    Or(Vec<FilterExpression>),
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    pub fn compare(path: &str, op: CompareOp, value: impl Into<Literal>) -> Self {
        FilterExpression::Compare { path: path.to_string(), op, value: FilterParameter::new(op.key(), value) }
    }

    pub fn equal(path: &str, value: impl Into<Literal>) -> Self {
        Self::compare(path, CompareOp::Equal, value)
    }

    pub fn not_equal(path: &str, value: impl Into<Literal>) -> Self {
        Self::compare(path, CompareOp::NotEqual, value)
    }

    pub fn greater_than(path: &str, value: impl Into<Literal>) -> Self {
        Self::compare(path, CompareOp::GreaterThan, value)
    }

    pub fn greater_than_or_equal(path: &str, value: impl Into<Literal>) -> Self {
        Self::compare(path, CompareOp::GreaterThanOrEqual, value)
    }

    pub fn less_than(path: &str, value: impl Into<Literal>) -> Self {
        Self::compare(path, CompareOp::LessThan, value)
    }

    pub fn less_than_or_equal(path: &str, value: impl Into<Literal>) -> Self {
        Self::compare(path, CompareOp::LessThanOrEqual, value)
    }

    /// `LIKE` with a caller-supplied pattern (`%`/`_` wildcards).
    pub fn like(path: &str, pattern: &str) -> Self {
        FilterExpression::Like { path: path.to_string(), pattern: FilterParameter::new("like", pattern) }
    }

    pub fn is_null(path: &str) -> Self {
        FilterExpression::IsNull { path: path.to_string(), negated: false }
    }

    pub fn is_not_null(path: &str) -> Self {
        FilterExpression::IsNull { path: path.to_string(), negated: true }
    }

    pub fn between(path: &str, low: impl Into<Literal>, high: impl Into<Literal>) -> Self {
        FilterExpression::Between {
            path: path.to_string(),
            low: FilterParameter::new("low", low),
            high: FilterParameter::new("high", high),
        }
    }

    pub fn and(filters: Vec<FilterExpression>) -> Self {
        FilterExpression::And(filters)
    }

    pub fn or(filters: Vec<FilterExpression>) -> Self {
        FilterExpression::Or(filters)
    }

    pub fn not(filter: FilterExpression) -> Self {
        FilterExpression::Not(Box::new(filter))
    }

    /// Render the predicate against `metadata`. Parameter names are those
    /// chosen at construction, so rendering twice yields the same command.
    pub fn get_sql_command(&self, metadata: &dyn MetadataProvider) -> PgSqlCommand {
        let mut command = PgSqlCommand::default();
        self.write_sql(metadata, None, &mut command);
        command
    }

    /// Render the predicate with every column qualified by `table`, for
    /// statements that join other tables.
    pub fn get_qualified_sql_command(&self, metadata: &dyn MetadataProvider, table: &str) -> PgSqlCommand {
        let mut command = PgSqlCommand::default();
        self.write_sql(metadata, Some(table), &mut command);
        command
    }

    fn write_sql(&self, metadata: &dyn MetadataProvider, table: Option<&str>, command: &mut PgSqlCommand) {
        match self {
            FilterExpression::Compare { path, op, value } => {
                let target = ColumnPath::parse(path).resolve_in(metadata, table);
                command.append_command(&target.predicate(&format!("{} {}", op.token(), value.token())));
                command.add_parameter(value.binding(&target));
            }
            FilterExpression::Like { path, pattern } => {
                let target = ColumnPath::parse(path).resolve_in(metadata, table);
                command.append_command(&target.predicate(&format!("LIKE {}", pattern.token())));
                command.add_parameter(pattern.binding(&target));
            }
            FilterExpression::IsNull { path, negated } => {
                let target = ColumnPath::parse(path).resolve_in(metadata, table);
                command.append_command(&target.predicate(if *negated { "IS NOT NULL" } else { "IS NULL" }));
            }
            FilterExpression::Between { path, low, high } => {
                let target = ColumnPath::parse(path).resolve_in(metadata, table);
                command.append_command(&target.predicate(&format!("BETWEEN {} AND {}", low.token(), high.token())));
                command.add_parameter(low.binding(&target));
                command.add_parameter(high.binding(&target));
            }
            FilterExpression::And(filters) => Self::write_junction(filters, " AND ", "TRUE", metadata, table, command),
            FilterExpression::Or(filters) => Self::write_junction(filters, " OR ", "FALSE", metadata, table, command),
            FilterExpression::Not(inner) => {
                command.append_command("NOT (");
                inner.write_sql(metadata, table, command);
                command.append_command(")");
            }
        }
    }

    fn write_junction(
        filters: &[FilterExpression],
        separator: &str,
        empty: &str,
        metadata: &dyn MetadataProvider,
        table: Option<&str>,
        command: &mut PgSqlCommand,
    ) {
        if filters.is_empty() {
            command.append_command(empty);
            return;
        }
        for (i, filter) in filters.iter().enumerate() {
            if i > 0 {
                command.append_command(separator);
            }
            command.append_command("(");
            filter.write_sql(metadata, table, command);
            command.append_command(")");
        }
    }
}
