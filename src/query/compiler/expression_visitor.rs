use tracing::warn;

use crate::{
    database::ValueShape,
    query::{
        ast::{
            BinaryExpression, BinaryOp, ExpressionNode, Literal, MemberAccess, MethodCall, MethodKind, QueryModel,
            SourceReference, UnaryExpression, UnaryOp,
        },
        compiler::{
            json_traversal, qualified_column, quote_identifier, CompileError, MethodTemplates, ParameterContext,
            QueryModelCompiler, Result, VisitState,
        },
    },
};

/// Per-call overrides for an expression compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionVisitorOptions {
    /// Name members without an explicit source are qualified with, in place
    /// of the metadata table name (used for aliases).
    pub table_name: Option<String>,
}

impl ExpressionVisitorOptions {
    pub fn with_table_name(table_name: &str) -> Self {
        Self { table_name: Some(table_name.to_string()) }
    }
}

// Precedence `->>` / `||` share with the other non-arithmetic operators.
const OTHER_OPERATOR_PRECEDENCE: u8 = 5;
const NOT_PRECEDENCE: u8 = 3;
const COMPARISON_PRECEDENCE: u8 = 4;

type Arm<'n> = (Vec<&'n ExpressionNode>, &'n ExpressionNode);

/// Walks one expression tree and writes its SQL text, registering every
/// constant with the compiler's parameter aggregator.
pub struct ExpressionVisitor<'c, 'a> {
    buffer: String,
    compiler: &'c mut QueryModelCompiler<'a>,
    options: ExpressionVisitorOptions,
    /// Column the last visited member resolved to; read by constants compared
    /// against it. Cleared once the comparison or call that set it is done.
    column_context: Option<ParameterContext>,
}

impl<'c, 'a> ExpressionVisitor<'c, 'a> {
    pub fn get_psql_expression(node: &ExpressionNode, compiler: &'c mut QueryModelCompiler<'a>) -> Result<String> {
        Self::get_psql_expression_with_options(node, compiler, &ExpressionVisitorOptions::default())
    }

    pub fn get_psql_expression_with_options(
        node: &ExpressionNode,
        compiler: &'c mut QueryModelCompiler<'a>,
        options: &ExpressionVisitorOptions,
    ) -> Result<String> {
        let mut visitor = ExpressionVisitor {
            buffer: String::new(),
            compiler,
            options: options.clone(),
            column_context: None,
        };
        visitor.visit(node, VisitState::default())?;
        Ok(visitor.buffer)
    }

    /// Compile `node` into its own buffer with a fresh visitor sharing this
    /// one's compiler. The column context flows in and back out.
    fn get_nested_psql_expression(&mut self, node: &ExpressionNode, state: VisitState) -> Result<String> {
        let options = self.options.clone();
        self.nested(options, |v| v.visit(node, state))
    }

    fn nested(
        &mut self,
        options: ExpressionVisitorOptions,
        walk: impl FnOnce(&mut ExpressionVisitor<'_, 'a>) -> Result<()>,
    ) -> Result<String> {
        let mut nested = ExpressionVisitor {
            buffer: String::new(),
            compiler: &mut *self.compiler,
            options,
            column_context: self.column_context,
        };
        walk(&mut nested)?;
        let ExpressionVisitor { buffer, column_context, .. } = nested;
        self.column_context = column_context;
        Ok(buffer)
    }

    fn visit(&mut self, node: &ExpressionNode, state: VisitState) -> Result<()> {
        match node {
            ExpressionNode::SourceReference(src) => self.visit_source_reference(src, state),
            ExpressionNode::SubQuery(model) => self.visit_sub_query(model),
            ExpressionNode::Binary(binary) => self.visit_binary(binary, state),
            ExpressionNode::Conditional(_) => self.visit_conditional(node, state),
            ExpressionNode::Constant(literal) => {
                self.visit_constant(literal);
                Ok(())
            }
            ExpressionNode::MemberAccess(member) => self.visit_member(member, state),
            ExpressionNode::MethodCall(call) => self.visit_method_call(call, state),
            ExpressionNode::New(arguments) => self.visit_new(arguments, state),
            ExpressionNode::Unary(unary) => self.visit_unary(unary, state),
        }
    }

    fn table_name(&self, source: Option<&SourceReference>) -> String {
        source
            .and_then(|s| s.table.clone())
            .or_else(|| self.options.table_name.clone())
            .unwrap_or_else(|| self.compiler.metadata().table_name().to_string())
    }

    /// A source backed by a table other than the one the metadata describes.
    fn is_foreign(&self, source: Option<&SourceReference>) -> bool {
        source
            .and_then(|s| s.table.as_deref())
            .is_some_and(|t| t != self.compiler.metadata().table_name())
    }

    /// `(member, db column)` pairs a source expands to.
    fn source_columns(&self, source: &SourceReference) -> Vec<(String, String)> {
        let metadata = self.compiler.metadata();
        let foreign = self.is_foreign(Some(source));

        if source.item.members.is_empty() {
            if foreign {
                return Vec::new();
            }
            return metadata
                .columns()
                .iter()
                .map(|c| (c.member_name.clone().unwrap_or_else(|| c.db_name.clone()), c.db_name.clone()))
                .collect();
        }

        source
            .item
            .members
            .iter()
            .map(|member| {
                let db_name = (!foreign)
                    .then(|| metadata.column_by_member(member))
                    .flatten()
                    .map(|c| c.db_name.clone())
                    .unwrap_or_else(|| member.clone());
                (member.clone(), db_name)
            })
            .collect()
    }

    fn visit_source_reference(&mut self, source: &SourceReference, state: VisitState) -> Result<()> {
        let table = self.table_name(Some(source));

        if let Some(group) = &source.group_join {
            let type_name = &source.item.type_name;
            let list = self
                .source_columns(source)
                .iter()
                .map(|(member, db_name)| {
                    format!("{} AS {}", qualified_column(&table, db_name), quote_identifier(&format!("{}.{}", type_name, member)))
                })
                .collect::<Vec<_>>()
                .join(", ");

            let alias = format!("temp_{}", table);
            let inner = self.nested(ExpressionVisitorOptions::with_table_name(&alias), |v| {
                v.visit(&group.inner_key, VisitState::default())
            })?;
            let outer = self.get_nested_psql_expression(&group.outer_key, VisitState::default())?;

            self.buffer.push_str(&list);
            self.buffer.push_str(&format!(
                ", (SELECT COUNT(*) FROM {} AS {} WHERE {} = {}) AS {}",
                quote_identifier(&table),
                quote_identifier(&alias),
                inner,
                outer,
                quote_identifier(&format!("{}.__GROUP_COUNT", type_name))
            ));
            return Ok(());
        }

        if state.triggered_by_member_visit {
            self.buffer.push_str(&quote_identifier(&table));
            return Ok(());
        }

        let columns = self.source_columns(source);
        if columns.is_empty() {
            self.buffer.push_str(&format!("{}.*", quote_identifier(&table)));
            return Ok(());
        }
        let list = columns.iter().map(|(_, db_name)| qualified_column(&table, db_name)).collect::<Vec<_>>().join(", ");
        self.buffer.push_str(&list);
        Ok(())
    }

    fn visit_sub_query(&mut self, model: &QueryModel) -> Result<()> {
        let statement = {
            let mut scope = self.compiler.open_sub_query_scope();
            scope.visit_query_model(model)?;
            scope.finish()
        };
        self.column_context = None;
        self.buffer.push('(');
        self.buffer.push_str(&statement);
        self.buffer.push(')');
        Ok(())
    }

    fn visit_binary(&mut self, binary: &BinaryExpression, state: VisitState) -> Result<()> {
        self.column_context = None;
        let operand = state.operand();

        if matches!(binary.op, BinaryOp::Equal | BinaryOp::NotEqual) {
            let other = match (&*binary.left, &*binary.right) {
                (other, ExpressionNode::Constant(Literal::Null)) | (ExpressionNode::Constant(Literal::Null), other) => Some(other),
                _ => None,
            };
            if let Some(other) = other {
                self.visit_operand(other, (binary.op, false), COMPARISON_PRECEDENCE, false, operand)?;
                self.buffer.push_str(if binary.op == BinaryOp::Equal { " IS NULL" } else { " IS NOT NULL" });
                self.column_context = None;
                return Ok(());
            }
        }

        let concat = Self::is_concatenation(binary);
        let (token, precedence) = if concat {
            (" || ", OTHER_OPERATOR_PRECEDENCE)
        } else {
            (binary.op.token(), binary.op.precedence())
        };

        self.visit_operand(&binary.left, (binary.op, concat), precedence, false, operand)?;
        self.buffer.push_str(token);
        self.visit_operand(&binary.right, (binary.op, concat), precedence, true, operand)?;
        self.column_context = None;
        Ok(())
    }

    fn is_concatenation(binary: &BinaryExpression) -> bool {
        binary.op == BinaryOp::Add && (binary.left.value_type().is_text() || binary.right.value_type().is_text())
    }

    /// Visit one side of a binary operator, parenthesized when the SQL
    /// operator precedence would otherwise regroup it.
    fn visit_operand(
        &mut self,
        child: &ExpressionNode,
        parent: (BinaryOp, bool),
        parent_precedence: u8,
        is_right: bool,
        state: VisitState,
    ) -> Result<()> {
        let (parent_op, parent_concat) = parent;
        let wrap = match Self::precedence_of(child, state) {
            None => false,
            Some(p) if p != parent_precedence => p < parent_precedence,
            Some(_) if parent_op.is_comparison() => true,
            Some(_) => {
                let same_op = matches!(child, ExpressionNode::Binary(b) if b.op == parent_op && Self::is_concatenation(b) == parent_concat);
                is_right && !(same_op && parent_op.is_associative())
            }
        };

        if wrap {
            self.buffer.push('(');
            self.visit(child, state)?;
            self.buffer.push(')');
            Ok(())
        } else {
            self.visit(child, state)
        }
    }

    /// Binding strength of the SQL a node renders to; `None` for atoms.
    fn precedence_of(node: &ExpressionNode, state: VisitState) -> Option<u8> {
        match node {
            ExpressionNode::Binary(b) if Self::is_concatenation(b) => Some(OTHER_OPERATOR_PRECEDENCE),
            ExpressionNode::Binary(b) => Some(b.op.precedence()),
            ExpressionNode::MemberAccess(m) if m.path.len() > 1 && !m.is_length_of_member() => Some(OTHER_OPERATOR_PRECEDENCE),
            ExpressionNode::MethodCall(call)
                if matches!(call.kind, MethodKind::Equals | MethodKind::Contains | MethodKind::StartsWith | MethodKind::EndsWith) =>
            {
                Some(COMPARISON_PRECEDENCE)
            }
            ExpressionNode::Unary(u) if u.op == UnaryOp::Not => Some(NOT_PRECEDENCE),
            ExpressionNode::Conditional(_) if state.inside_conditional => Some(0),
            _ => None,
        }
    }

    /// Renders a (possibly nested) conditional as a single `CASE`. Conditionals
    /// in a false branch add arms; conditionals in a true branch become arms
    /// guarded by every enclosing test.
    fn visit_conditional(&mut self, node: &ExpressionNode, state: VisitState) -> Result<()> {
        let mut arms: Vec<Arm<'_>> = Vec::new();
        let fallback = Self::flatten_conditional(node, Vec::new(), &mut arms);
        let arm_state = state.in_conditional();

        self.buffer.push_str("CASE");
        for (guards, value) in arms {
            self.column_context = None;
            self.buffer.push_str(" WHEN ");
            if let [single] = guards.as_slice() {
                self.visit(single, arm_state)?;
            } else {
                for (i, guard) in guards.iter().enumerate() {
                    if i > 0 {
                        self.buffer.push_str(" AND ");
                    }
                    self.column_context = None;
                    self.buffer.push('(');
                    self.visit(guard, arm_state)?;
                    self.buffer.push(')');
                }
            }
            self.column_context = None;
            self.buffer.push_str(" THEN ");
            self.visit(value, arm_state)?;
        }
        self.column_context = None;
        self.buffer.push_str(" ELSE ");
        self.visit(fallback, arm_state)?;
        self.buffer.push_str(" END");
        self.column_context = None;
        Ok(())
    }

    /// Push the arms of `node` under `guards` and return the value left when
    /// none of them match.
    fn flatten_conditional<'n>(node: &'n ExpressionNode, guards: Vec<&'n ExpressionNode>, arms: &mut Vec<Arm<'n>>) -> &'n ExpressionNode {
        let ExpressionNode::Conditional(conditional) = node else {
            return node;
        };
        let mut inner = guards.clone();
        inner.push(&conditional.test);
        let value = Self::flatten_conditional(&conditional.if_true, inner.clone(), arms);
        arms.push((inner, value));
        Self::flatten_conditional(&conditional.if_false, guards, arms)
    }

    fn visit_constant(&mut self, literal: &Literal) {
        let name = self.compiler.parameters_mut().add_parameter(literal.clone(), self.column_context.as_ref());
        let token = self.compiler.parameters().token(&name);
        self.buffer.push_str(&token);
    }

    fn visit_member(&mut self, member: &MemberAccess, state: VisitState) -> Result<()> {
        if member.path.is_empty() {
            return CompileError::UnsupportedOperation("member access without a member name".to_string()).err();
        }

        if member.is_length_of_member() {
            let parent = ExpressionNode::MemberAccess(member.parent());
            let nested = self.get_nested_psql_expression(&parent, state.operand())?;
            self.buffer.push_str(&format!("LENGTH({})", nested));
            self.column_context = None;
            self.push_alias(member, state);
            return Ok(());
        }

        let root = member.root.as_deref();
        let qualifier = match root {
            Some(source) => {
                let options = self.options.clone();
                self.nested(options, |v| v.visit_source_reference(source, state.for_member_root()))?
            }
            None => quote_identifier(&self.table_name(None)),
        };

        let base = &member.path[0];
        let foreign = self.is_foreign(root);
        let metadata = self.compiler.metadata();
        let column = if foreign { None } else { metadata.column_by_member(base) };

        let (db_name, shape) = match column {
            Some(column) => (column.db_name.as_str(), column.shape),
            None if foreign => (base.as_str(), ValueShape::Scalar),
            None if self.compiler.config().strict_member_resolution => {
                return CompileError::AmbiguousPath(format!(
                    "member {} does not match a column of {}",
                    member.path.join("."),
                    metadata.table_name()
                ))
                .err();
            }
            None => {
                warn!(member = %member.path.join("."), table = metadata.table_name(), "member does not match a column, using its name");
                (base.as_str(), ValueShape::Scalar)
            }
        };

        self.column_context = Some(ParameterContext { shape, json_terminus: member.path.len() > 1 });
        self.buffer.push_str(&qualifier);
        self.buffer.push('.');
        self.buffer.push_str(&quote_identifier(db_name));
        self.buffer.push_str(&json_traversal(&member.path[1..]));
        self.push_alias(member, state);
        Ok(())
    }

    fn push_alias(&mut self, member: &MemberAccess, state: VisitState) {
        if state.renaming_columns && !state.inside_conditional {
            self.buffer.push_str(" AS ");
            self.buffer.push_str(&quote_identifier(member.member_name()));
        }
    }

    fn visit_method_call(&mut self, call: &MethodCall, state: VisitState) -> Result<()> {
        self.column_context = None;
        let operand = state.operand();

        let mut fragments = Vec::new();
        let mut result_context = None;
        if call.kind == MethodKind::Concat {
            let mut arguments = Vec::with_capacity(call.arguments.len());
            for argument in &call.arguments {
                self.column_context = None;
                arguments.push(self.get_nested_psql_expression(argument, operand)?);
            }
            fragments.push(arguments.join(", "));
        } else {
            if let Some(receiver) = &call.receiver {
                fragments.push(self.get_nested_psql_expression(receiver, operand)?);
            }
            let receiver_context = self.column_context;
            for argument in &call.arguments {
                self.column_context = receiver_context.filter(|_| call.kind.compares_with_receiver());
                fragments.push(self.get_nested_psql_expression(argument, operand)?);
            }
            result_context = receiver_context.filter(|_| call.kind.transforms_receiver());
        }
        self.column_context = result_context;

        let template = MethodTemplates::template_for(call.kind, call.arguments.len());
        let expected = MethodTemplates::placeholder_count(template);
        if fragments.len() < expected {
            fragments.resize(expected, String::new());
        }
        self.buffer.push_str(&MethodTemplates::render(template, &fragments));
        Ok(())
    }

    fn visit_new(&mut self, arguments: &[ExpressionNode], state: VisitState) -> Result<()> {
        if arguments.is_empty() {
            return CompileError::UnsupportedOperation("projection without members".to_string()).err();
        }
        let member_state = state.operand().renaming();
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.buffer.push_str(", ");
            }
            self.column_context = None;
            self.visit(argument, member_state)?;
        }
        self.column_context = None;
        Ok(())
    }

    fn visit_unary(&mut self, unary: &UnaryExpression, state: VisitState) -> Result<()> {
        match unary.op {
            UnaryOp::Not => {
                let nested = self.get_nested_psql_expression(&unary.operand, state.operand())?;
                self.buffer.push_str(&format!("NOT ({})", nested));
                Ok(())
            }
            // Conversions leave no trace in the SQL text.
            UnaryOp::Convert | UnaryOp::TypeAs => match &*unary.operand {
                ExpressionNode::MemberAccess(member) => self.visit_member(member, state),
                other => self.visit(other, state),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Column, CompilerConfig, PgType, TableDefinition};
    use crate::query::ast::ValueType;

    fn table() -> TableDefinition {
        TableDefinition::new("people")
            .column(Column::new("name", PgType::Text))
            .column(Column::new("age", PgType::Integer))
            .column(Column::new("address", PgType::Jsonb))
            .column(Column::builder("e_mail").member_name("Email").pg_type(PgType::Text))
    }

    fn compile(node: &ExpressionNode) -> Result<String> {
        let table = table();
        let config = CompilerConfig::default();
        let mut compiler = QueryModelCompiler::new(&table, &config);
        ExpressionVisitor::get_psql_expression(node, &mut compiler)
    }

    fn member(path: &str, ty: ValueType) -> ExpressionNode {
        ExpressionNode::member(path, ty)
    }

    #[test]
    fn members_are_qualified_and_mapped() {
        assert_eq!(compile(&member("age", ValueType::Integer)).unwrap(), "\"people\".\"age\"");
        assert_eq!(compile(&member("Email", ValueType::Text)).unwrap(), "\"people\".\"e_mail\"");
        assert_eq!(
            compile(&member("address.geo.city", ValueType::Text)).unwrap(),
            "\"people\".\"address\"->'geo'->>'city'"
        );
    }

    #[test]
    fn length_of_member_wraps_nested_access() {
        assert_eq!(compile(&member("name.Length", ValueType::Integer)).unwrap(), "LENGTH(\"people\".\"name\")");
    }

    #[test]
    fn options_override_the_qualifier() {
        let table = table();
        let config = CompilerConfig::default();
        let mut compiler = QueryModelCompiler::new(&table, &config);
        let sql = ExpressionVisitor::get_psql_expression_with_options(
            &member("age", ValueType::Integer),
            &mut compiler,
            &ExpressionVisitorOptions::with_table_name("p"),
        )
        .unwrap();
        assert_eq!(sql, "\"p\".\"age\"");
    }

    #[test]
    fn precedence_adds_parentheses_only_where_needed() {
        let a = member("age", ValueType::Integer);
        let sum = ExpressionNode::binary(BinaryOp::Add, a.clone(), ExpressionNode::constant(1));
        let product = ExpressionNode::binary(BinaryOp::Multiply, sum.clone(), ExpressionNode::constant(2));
        assert_eq!(compile(&product).unwrap(), "(\"people\".\"age\" + @p0) * @p1");

        let difference = ExpressionNode::binary(BinaryOp::Subtract, a.clone(), ExpressionNode::binary(BinaryOp::Subtract, a.clone(), a.clone()));
        assert_eq!(compile(&difference).unwrap(), "\"people\".\"age\" - (\"people\".\"age\" - \"people\".\"age\")");

        let or = ExpressionNode::or_else(ExpressionNode::eq(a.clone(), ExpressionNode::constant(1)), ExpressionNode::eq(a.clone(), ExpressionNode::constant(2)));
        let and = ExpressionNode::and_also(or, ExpressionNode::eq(a, ExpressionNode::constant(3)));
        assert_eq!(
            compile(&and).unwrap(),
            "(\"people\".\"age\" = @p0 OR \"people\".\"age\" = @p1) AND \"people\".\"age\" = @p2"
        );
    }

    #[test]
    fn null_comparisons_become_is_null() {
        let node = ExpressionNode::binary(BinaryOp::NotEqual, member("name", ValueType::Text), ExpressionNode::constant(Literal::Null));
        let table = table();
        let config = CompilerConfig::default();
        let mut compiler = QueryModelCompiler::new(&table, &config);
        let sql = ExpressionVisitor::get_psql_expression(&node, &mut compiler).unwrap();
        assert_eq!(sql, "\"people\".\"name\" IS NOT NULL");
        assert!(compiler.parameters().is_empty());
    }

    #[test]
    fn unresolved_members_fall_back_or_fail_in_strict_mode() {
        assert_eq!(compile(&member("Nickname", ValueType::Text)).unwrap(), "\"people\".\"Nickname\"");

        let table = table();
        let config = CompilerConfig::default().strict();
        let mut compiler = QueryModelCompiler::new(&table, &config);
        let err = ExpressionVisitor::get_psql_expression(&member("Nickname", ValueType::Text), &mut compiler).unwrap_err();
        assert!(matches!(err, CompileError::AmbiguousPath(_)));
    }

    #[test]
    fn conversions_render_their_operand() {
        let member_only = ExpressionNode::unary(UnaryOp::Convert, member("age", ValueType::Integer));
        assert_eq!(compile(&member_only).unwrap(), "\"people\".\"age\"");

        let sum = ExpressionNode::binary(BinaryOp::Add, member("age", ValueType::Integer), ExpressionNode::constant(1));
        let converted = ExpressionNode::unary(UnaryOp::Convert, sum);
        assert_eq!(compile(&converted).unwrap(), "\"people\".\"age\" + @p0");

        let constant = ExpressionNode::unary(UnaryOp::TypeAs, ExpressionNode::constant(1));
        assert_eq!(compile(&constant).unwrap(), "@p0");
    }

    #[test]
    fn not_wraps_its_operand() {
        let node = ExpressionNode::not(ExpressionNode::eq(member("age", ValueType::Integer), ExpressionNode::constant(1)));
        assert_eq!(compile(&node).unwrap(), "NOT (\"people\".\"age\" = @p0)");
    }
}
