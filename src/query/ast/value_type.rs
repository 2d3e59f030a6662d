use crate::database::PgType;

/// Static type of an expression node, known when the tree is built.
///
/// Used for type-directed rewrites such as rendering `Add` as string
/// concatenation when one side is text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
    Timestamp,
    Json,
    #[default]
    Unknown,
}

impl ValueType {
    pub fn from_pg_type(pg_type: PgType) -> ValueType {
        match pg_type {
            PgType::Text | PgType::Varchar => ValueType::Text,
            PgType::SmallInt | PgType::Integer | PgType::BigInt => ValueType::Integer,
            PgType::Real | PgType::Double | PgType::Numeric => ValueType::Float,
            PgType::Boolean => ValueType::Boolean,
            PgType::Uuid => ValueType::Uuid,
            PgType::Timestamp | PgType::TimestampTz | PgType::Date => ValueType::Timestamp,
            PgType::Json | PgType::Jsonb | PgType::JsonbArray | PgType::TextArray => ValueType::Json,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ValueType::Text)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }
}
