use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    database::{Column, MetadataProvider, OrderedColumnsList, PgType, ValueShape},
    CompileError,
};

/// Read-only description of a table used while compiling: its name, the
/// schema it lives in, and its columns in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    columns: OrderedColumnsList,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self { schema: None, name: name.to_string(), columns: OrderedColumnsList::new() }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Fluent form of [`TableDefinition::add_column`]; duplicates are ignored.
    pub fn column(mut self, column: impl Into<Column>) -> Self {
        self.add_column(column.into());
        self
    }

    /// Adds a column, returning `false` when a column with the same database
    /// name already exists.
    pub fn add_column(&mut self, column: Column) -> bool {
        if self.get_column_by_db_name(&column.db_name).is_some() {
            return false;
        }
        self.columns.add(column);
        true
    }

    pub fn ordered_columns(&self) -> &OrderedColumnsList {
        &self.columns
    }

    pub fn get_column_by_db_name(&self, db_name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.db_name == db_name)
    }

    /// Build a definition from one sample JSON document, deriving each
    /// column's type and shape from the value found under its key.
    pub fn infer_from_object(name: &str, obj: &Map<String, Value>) -> TableDefinition {
        let mut table = TableDefinition::new(name);
        for (key, value) in obj {
            let builder = Column::builder(key)
                .pg_type(Self::infer_pg_type(value))
                .shape(ValueShape::of_value(value));
            table.add_column(builder.build());
        }
        table
    }

    fn infer_pg_type(value: &Value) -> PgType {
        match (value, ValueShape::of_value(value)) {
            (_, ValueShape::JsonArray) => PgType::JsonbArray,
            (_, ValueShape::JsonObject) => PgType::Jsonb,
            (Value::Bool(_), _) => PgType::Boolean,
            (Value::Number(n), _) if n.is_i64() || n.is_u64() => PgType::BigInt,
            (Value::Number(_), _) => PgType::Double,
            _ => PgType::Text,
        }
    }

    pub fn load_from_json(json_value: Value) -> Result<TableDefinition, CompileError> {
        let table: TableDefinition = serde_json::from_value(json_value)
            .map_err(|e| CompileError::InvalidMetadata(format!("table definition is not valid: {}", e)))?;
        debug!(table = %table.name, columns = table.columns.len(), "loaded table definition");
        Ok(table)
    }

    pub fn load_from_file(file_path: impl AsRef<Path>) -> Result<TableDefinition, CompileError> {
        let file_path = file_path.as_ref();

        let file_content = fs::read_to_string(file_path).map_err(|e| {
            CompileError::InvalidMetadata(format!("could not read file {}: {}", file_path.display(), e))
        })?;

        let json_value = serde_json::from_str::<Value>(&file_content).map_err(|e| {
            CompileError::InvalidMetadata(format!("file {} does not contain valid JSON: {}", file_path.display(), e))
        })?;

        Self::load_from_json(json_value)
    }
}

impl MetadataProvider for TableDefinition {
    fn table_name(&self) -> &str {
        &self.name
    }

    fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    fn columns(&self) -> &[Column] {
        self.columns.get_ordered_columns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn users() -> TableDefinition {
        TableDefinition::new("users")
            .with_schema("public")
            .column(Column::new("name", PgType::Text))
            .column(Column::builder("profile").pg_type(PgType::Jsonb).member_name("Profile"))
            .column(Column::builder("id").pg_type(PgType::Uuid).position(0))
    }

    #[test]
    fn lookups_by_db_and_member_name() {
        let t = users();
        assert_eq!(t.table_name(), "users");
        assert_eq!(t.schema_name(), Some("public"));
        assert_eq!(t.columns()[0].db_name, "id");
        assert!(t.column_by_db_name("profile").is_some());
        assert!(t.column_by_db_name("Profile").is_none());
        assert_eq!(t.column_by_member("Profile").map(|c| c.db_name.as_str()), Some("profile"));
        assert!(t.column_by_member("missing").is_none());
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let mut t = users();
        assert!(!t.add_column(Column::new("name", PgType::Integer)));
        assert_eq!(t.columns().len(), 3);
        assert_eq!(t.get_column_by_db_name("name").unwrap().pg_type, PgType::Text);
    }

    #[test]
    fn infers_columns_from_sample_document() {
        let sample = json!({
            "id": 1,
            "name": "Alice",
            "score": 9.5,
            "vip": true,
            "address": {"city": "Porto"},
            "tags": [{"name": "red"}],
            "nickname": null
        });
        let t = TableDefinition::infer_from_object("people", sample.as_object().unwrap());
        let by = |n: &str| t.get_column_by_db_name(n).unwrap().clone();
        assert_eq!(by("id").pg_type, PgType::BigInt);
        assert_eq!(by("score").pg_type, PgType::Double);
        assert_eq!(by("vip").pg_type, PgType::Boolean);
        assert_eq!(by("address").shape, ValueShape::JsonObject);
        assert_eq!(by("tags").pg_type, PgType::JsonbArray);
        assert_eq!(by("tags").shape, ValueShape::JsonArray);
        assert_eq!(by("nickname").pg_type, PgType::Text);
        assert_eq!(t.columns().len(), 7);
    }

    #[test]
    fn load_from_json_derives_shapes() {
        let t = TableDefinition::load_from_json(json!({
            "schema": "crm",
            "name": "contacts",
            "columns": [
                { "db_name": "email", "pg_type": "varchar" },
                { "db_name": "tags", "pg_type": "_jsonb" },
                { "db_name": "id", "pg_type": "int8", "position": 0 }
            ]
        })).unwrap();
        assert_eq!(t.schema_name(), Some("crm"));
        assert_eq!(t.columns()[0].db_name, "id");
        assert_eq!(t.get_column_by_db_name("tags").unwrap().shape, ValueShape::JsonArray);
    }

    #[test]
    fn load_from_json_rejects_unknown_types() {
        let result = TableDefinition::load_from_json(json!({
            "name": "t",
            "columns": [{ "db_name": "x", "pg_type": "money" }]
        }));
        assert!(matches!(result, Err(CompileError::InvalidMetadata(_))));
    }

    #[test]
    fn load_from_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("users.json");
        let mut file = File::create(&file_path).unwrap();
        file.write_all(serde_json::to_string(&users()).unwrap().as_bytes()).unwrap();

        let loaded = TableDefinition::load_from_file(&file_path).unwrap();
        assert_eq!(loaded, users());
    }

    #[test]
    fn load_from_file_reports_missing_and_invalid_files() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(TableDefinition::load_from_file(&missing), Err(CompileError::InvalidMetadata(_))));

        let invalid = temp_dir.path().join("invalid.json");
        File::create(&invalid).unwrap().write_all(b"{ not json").unwrap();
        let err = TableDefinition::load_from_file(&invalid).unwrap_err();
        assert!(err.to_string().contains("valid JSON"));
    }
}
