//! Compiles query expression trees into parameterized PostgreSQL statements.
//!
//! A [`QueryModel`] (or a single [`ExpressionNode`]) is compiled against a
//! [`MetadataProvider`], usually a [`TableDefinition`], into a
//! [`PgSqlCommand`]: SQL text plus one binding per parameter token. Literal
//! values never appear in the SQL text.

pub mod database;
pub use database::{Column, CompilerConfig, MetadataProvider, OrderedColumnsList, ParameterStyle, PgType, TableDefinition, ValueShape};

pub mod query;
pub use query::{
    CompileError, ExpressionNode, ExpressionVisitor, ExpressionVisitorOptions, FilterExpression, LimitClauseNumber, Literal,
    ParameterBinding, PgSqlCommand, QueryModel, QueryModelCompiler, ValueType,
};
