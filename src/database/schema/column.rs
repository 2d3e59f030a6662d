use serde::{Deserialize, Serialize};

use crate::database::{PgType, ValueShape};

/// A column as the compiler sees it.
///
/// - `db_name`: name of the column in the database, unique within its table.
/// - `member_name`: name used by expression trees when it differs from `db_name`.
/// - `pg_type`: declared wire type.
/// - `shape`: value shape, computed once when the column is built.
/// - `position`: requested ordinal slot among the table columns, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColumnBuilder")]
pub struct Column {
    pub db_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    pub pg_type: PgType,
    pub shape: ValueShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    pub nullable: bool,
}

impl Column {
    pub fn new(db_name: &str, pg_type: PgType) -> Self {
        ColumnBuilder::new(db_name).pg_type(pg_type).build()
    }

    pub fn builder(db_name: &str) -> ColumnBuilder {
        ColumnBuilder::new(db_name)
    }
}

/// Fluent builder for [`Column`]; also the deserialization form of a column,
/// so shapes are always derived the same way.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ColumnBuilder {
    db_name: String,
    #[serde(default)]
    member_name: Option<String>,
    #[serde(default)]
    pg_type: Option<PgType>,
    #[serde(default)]
    shape: Option<ValueShape>,
    #[serde(default)]
    position: Option<usize>,
    #[serde(default = "default_nullable")]
    nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl ColumnBuilder {
    pub fn new(db_name: &str) -> Self {
        Self {
            db_name: db_name.to_string(),
            nullable: true,
            ..Default::default()
        }
    }

    pub fn member_name(mut self, member_name: &str) -> Self {
        self.member_name = Some(member_name.to_string());
        self
    }

    pub fn pg_type(mut self, pg_type: PgType) -> Self {
        self.pg_type = Some(pg_type);
        self
    }

    /// Overrides the shape implied by the type, e.g. a `text` column that
    /// stores serialized JSON documents.
    pub fn shape(mut self, shape: ValueShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn build(self) -> Column {
        let pg_type = self.pg_type.unwrap_or(PgType::Text);
        Column {
            shape: self.shape.unwrap_or_else(|| pg_type.shape()),
            db_name: self.db_name,
            member_name: self.member_name,
            pg_type,
            position: self.position,
            nullable: self.nullable,
        }
    }
}

impl From<ColumnBuilder> for Column {
    fn from(builder: ColumnBuilder) -> Self {
        builder.build()
    }
}
