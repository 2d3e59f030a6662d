use tracing::debug;

use crate::{
    database::{CompilerConfig, MetadataProvider},
    query::{
        ast::{ExpressionNode, OrderingDirection, QueryModel},
        compiler::{
            quote_identifier, CompileError, ExpressionVisitor, ExpressionVisitorOptions, ParameterAggregator, QueryParts,
            Result, StatementFrame, SubQueryScope,
        },
        filters::PgSqlCommand,
    },
};

/// Compilation context for one pass: the table metadata, the configuration,
/// the parameters registered so far and the statements being assembled.
pub struct QueryModelCompiler<'a> {
    metadata: &'a dyn MetadataProvider,
    config: &'a CompilerConfig,
    parameters: ParameterAggregator,
    parts: QueryParts,
}

impl<'a> QueryModelCompiler<'a> {
    pub fn new(metadata: &'a dyn MetadataProvider, config: &'a CompilerConfig) -> Self {
        Self {
            metadata,
            config,
            parameters: ParameterAggregator::new(config),
            parts: QueryParts::default(),
        }
    }

    /// Compile a whole query into a parameterized `SELECT`.
    pub fn compile(model: &QueryModel, metadata: &dyn MetadataProvider, config: &CompilerConfig) -> Result<PgSqlCommand> {
        debug!(table = metadata.table_name(), "compiling query model");
        let mut compiler = QueryModelCompiler::new(metadata, config);
        let statement = {
            let mut scope = compiler.open_sub_query_scope();
            scope.visit_query_model(model)?;
            scope.finish()
        };
        Ok(compiler.into_command(statement))
    }

    /// Compile a single expression (a predicate, a projection...) on its own.
    pub fn compile_expression(
        node: &ExpressionNode,
        metadata: &dyn MetadataProvider,
        config: &CompilerConfig,
    ) -> Result<PgSqlCommand> {
        debug!(table = metadata.table_name(), "compiling expression");
        let mut compiler = QueryModelCompiler::new(metadata, config);
        let text = ExpressionVisitor::get_psql_expression(node, &mut compiler)?;
        Ok(compiler.into_command(text))
    }

    pub fn metadata(&self) -> &'a dyn MetadataProvider {
        self.metadata
    }

    pub fn config(&self) -> &'a CompilerConfig {
        self.config
    }

    pub fn parameters(&self) -> &ParameterAggregator {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterAggregator {
        &mut self.parameters
    }

    pub(crate) fn parts_mut(&mut self) -> &mut QueryParts {
        &mut self.parts
    }

    /// Push a statement frame for a nested query; it is popped when the
    /// returned guard is finished or dropped.
    pub fn open_sub_query_scope(&mut self) -> SubQueryScope<'_, 'a> {
        SubQueryScope::new(self)
    }

    /// Render every clause of `model` into the innermost open statement.
    pub fn visit_query_model(&mut self, model: &QueryModel) -> Result<()> {
        let options = ExpressionVisitorOptions { table_name: model.main_from.table.clone() };
        let mut frame = StatementFrame {
            distinct: model.distinct,
            from: self.from_clause(model),
            ..Default::default()
        };

        frame.select = if model.count {
            "COUNT(*)".to_string()
        } else {
            let selector = model
                .selector
                .clone()
                .unwrap_or_else(|| ExpressionNode::SourceReference(model.main_from.clone()));
            ExpressionVisitor::get_psql_expression_with_options(&selector, self, &options)?
        };

        for join in &model.joins {
            let outer = ExpressionVisitor::get_psql_expression_with_options(&join.outer_key, self, &options)?;
            let inner = ExpressionVisitor::get_psql_expression_with_options(&join.inner_key, self, &options)?;
            frame.joins.push(format!("{} {} ON {} = {}", join.kind.keyword(), quote_identifier(&join.table), outer, inner));
        }

        for predicate in &model.where_clauses {
            frame.where_parts.push(ExpressionVisitor::get_psql_expression_with_options(predicate, self, &options)?);
        }
        let metadata = self.metadata;
        let filter_table = model.main_from.table.as_deref().unwrap_or(metadata.table_name());
        for filter in &model.filters {
            let command = filter.get_qualified_sql_command(metadata, filter_table);
            frame.where_parts.push(self.parameters.absorb(command));
        }

        for key in &model.group_by {
            frame.group_by.push(ExpressionVisitor::get_psql_expression_with_options(key, self, &options)?);
        }

        for ordering in &model.order_by {
            let expression = ExpressionVisitor::get_psql_expression_with_options(&ordering.expression, self, &options)?;
            let direction = match ordering.direction {
                OrderingDirection::Asc => "ASC",
                OrderingDirection::Desc => "DESC",
            };
            frame.order_by.push(format!("{} {}", expression, direction));
        }

        frame.limit = model.limit.map(|limit| limit.get_sql_command().command);
        frame.offset = model.offset;

        let current = self
            .parts
            .current_mut()
            .ok_or_else(|| CompileError::UnsupportedOperation("query model compiled outside of a statement scope".to_string()))?;
        *current = frame;
        Ok(())
    }

    /// `"schema"."table"` for the metadata table, `"table"` otherwise.
    fn from_clause(&self, model: &QueryModel) -> String {
        let own_table = self.metadata.table_name();
        let table = model.main_from.table.as_deref().unwrap_or(own_table);
        match self.metadata.schema_name() {
            Some(schema) if table == own_table => format!("{}.{}", quote_identifier(schema), quote_identifier(table)),
            _ => quote_identifier(table),
        }
    }

    fn into_command(self, command: String) -> PgSqlCommand {
        let parameters = self.parameters.into_parameters();
        debug!(length = command.len(), parameters = parameters.len(), "compiled statement");
        PgSqlCommand { command, parameters }
    }
}
