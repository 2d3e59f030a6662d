use tracing::warn;

use crate::{
    database::{MetadataProvider, ValueShape},
    query::compiler::{json_traversal, qualified_column, quote_identifier},
};

/// A dotted column path as used by filters: the first segment names the
/// column, the rest address a value inside its JSON content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPath {
    segments: Vec<String>,
}

/// Left-hand side of a filter condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTarget {
    /// Rendered operand, `"col"` or `"col"->'a'->>'b'` (`objects->...` when
    /// the condition runs over unnested array elements). Columns carry a
    /// `"table".` prefix when resolved with a qualifier.
    pub operand: String,
    /// `unnest`ed array column the condition must be wrapped in an `exists`
    /// over.
    pub unnest: Option<String>,
    /// The operand is extracted text, so bound values are sent as `text`.
    pub json_terminus: bool,
}

impl PathTarget {
    /// Wrap a rendered condition on `operand` into the final predicate.
    pub fn predicate(&self, condition: &str) -> String {
        match &self.unnest {
            Some(column) => format!(
                "exists (Select 1 from unnest({}) as objects where {} {})",
                column, self.operand, condition
            ),
            None => format!("{} {}", self.operand, condition),
        }
    }
}

impl ColumnPath {
    pub fn parse(path: &str) -> Self {
        Self { segments: path.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect() }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn base(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or_default()
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// Decide how the path is addressed from the shape of its base column.
    pub fn resolve(&self, metadata: &dyn MetadataProvider) -> PathTarget {
        self.resolve_in(metadata, None)
    }

    /// Like [`ColumnPath::resolve`], with columns qualified by `table`. A
    /// table other than the one `metadata` describes is not looked up: its
    /// columns are named verbatim and treated as scalars.
    pub fn resolve_in(&self, metadata: &dyn MetadataProvider, table: Option<&str>) -> PathTarget {
        let foreign = table.is_some_and(|t| t != metadata.table_name());
        let (column_name, shape) = match metadata.column_by_member(self.base()).filter(|_| !foreign) {
            Some(column) => (column.db_name.as_str(), column.shape),
            None if foreign => (self.base(), ValueShape::Scalar),
            None => {
                warn!(path = %self, table = metadata.table_name(), "filter path does not match a column, using it verbatim");
                (self.base(), ValueShape::Scalar)
            }
        };
        let column = match table {
            Some(table) => qualified_column(table, column_name),
            None => quote_identifier(column_name),
        };
        let steps = &self.segments[self.segments.len().min(1)..];

        match shape {
            ValueShape::JsonArray if self.is_nested() => PathTarget {
                operand: format!("objects{}", json_traversal(steps)),
                unnest: Some(column),
                json_terminus: true,
            },
            ValueShape::JsonObject if self.is_nested() => PathTarget {
                operand: format!("{}{}", column, json_traversal(steps)),
                unnest: None,
                json_terminus: true,
            },
            _ => PathTarget { operand: column, unnest: None, json_terminus: false },
        }
    }
}

impl std::fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Column, PgType, TableDefinition};

    fn table() -> TableDefinition {
        TableDefinition::new("people")
            .column(Column::new("age", PgType::Integer))
            .column(Column::new("address", PgType::Jsonb))
            .column(Column::new("tags", PgType::JsonbArray))
            .column(Column::builder("full_name").member_name("Name").pg_type(PgType::Text))
    }

    #[test]
    fn scalar_and_single_segment_paths_compare_the_column() {
        let t = table();
        assert_eq!(ColumnPath::parse("age").resolve(&t).predicate("= @x"), "\"age\" = @x");
        assert_eq!(ColumnPath::parse("address").resolve(&t).predicate("IS NULL"), "\"address\" IS NULL");
        assert_eq!(ColumnPath::parse("tags").resolve(&t).predicate("IS NULL"), "\"tags\" IS NULL");
        assert_eq!(ColumnPath::parse("Name").resolve(&t).operand, "\"full_name\"");
    }

    #[test]
    fn object_paths_traverse_the_document() {
        let target = ColumnPath::parse("address.geo.city").resolve(&table());
        assert!(target.json_terminus);
        assert_eq!(target.predicate("= @x"), "\"address\"->'geo'->>'city' = @x");
    }

    #[test]
    fn array_paths_unnest_elements() {
        let target = ColumnPath::parse("tags.name").resolve(&table());
        assert!(target.json_terminus);
        assert_eq!(
            target.predicate("= @x"),
            "exists (Select 1 from unnest(\"tags\") as objects where objects->>'name' = @x)"
        );
    }

    #[test]
    fn qualified_paths_prefix_the_column_with_the_table() {
        let t = table();
        assert_eq!(ColumnPath::parse("Name").resolve_in(&t, Some("people")).operand, "\"people\".\"full_name\"");
        assert_eq!(
            ColumnPath::parse("tags.name").resolve_in(&t, Some("people")).predicate("= @x"),
            "exists (Select 1 from unnest(\"people\".\"tags\") as objects where objects->>'name' = @x)"
        );
        assert_eq!(
            ColumnPath::parse("address.city").resolve_in(&t, Some("people")).operand,
            "\"people\".\"address\"->>'city'"
        );
    }

    #[test]
    fn other_tables_are_not_looked_up() {
        let target = ColumnPath::parse("Name.first").resolve_in(&table(), Some("orders"));
        assert!(!target.json_terminus);
        assert_eq!(target.operand, "\"orders\".\"Name\"");
    }

    #[test]
    fn unknown_columns_are_used_verbatim() {
        let target = ColumnPath::parse("missing.inner").resolve(&table());
        assert!(!target.json_terminus);
        assert_eq!(target.operand, "\"missing\"");
    }
}
