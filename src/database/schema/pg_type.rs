use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::database::ValueShape;

/// PostgreSQL wire types the compiler knows how to bind.
///
/// This table is authored here and versioned with the crate; it is the only
/// place that maps type names to value shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PgType {
    Text,
    Varchar,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Boolean,
    Uuid,
    Timestamp,
    TimestampTz,
    Date,
    Json,
    Jsonb,
    JsonbArray,
    TextArray,
}

static PG_TYPE_NAMES: Lazy<IndexMap<&'static str, PgType>> = Lazy::new(|| {
    let mut m = IndexMap::new();
    m.insert("text", PgType::Text);
    m.insert("varchar", PgType::Varchar);
    m.insert("character varying", PgType::Varchar);
    m.insert("smallint", PgType::SmallInt);
    m.insert("int2", PgType::SmallInt);
    m.insert("integer", PgType::Integer);
    m.insert("int", PgType::Integer);
    m.insert("int4", PgType::Integer);
    m.insert("bigint", PgType::BigInt);
    m.insert("int8", PgType::BigInt);
    m.insert("real", PgType::Real);
    m.insert("float4", PgType::Real);
    m.insert("double precision", PgType::Double);
    m.insert("float8", PgType::Double);
    m.insert("numeric", PgType::Numeric);
    m.insert("decimal", PgType::Numeric);
    m.insert("boolean", PgType::Boolean);
    m.insert("bool", PgType::Boolean);
    m.insert("uuid", PgType::Uuid);
    m.insert("timestamp", PgType::Timestamp);
    m.insert("timestamp without time zone", PgType::Timestamp);
    m.insert("timestamptz", PgType::TimestampTz);
    m.insert("timestamp with time zone", PgType::TimestampTz);
    m.insert("date", PgType::Date);
    m.insert("json", PgType::Json);
    m.insert("jsonb", PgType::Jsonb);
    m.insert("jsonb[]", PgType::JsonbArray);
    m.insert("_jsonb", PgType::JsonbArray);
    m.insert("text[]", PgType::TextArray);
    m.insert("_text", PgType::TextArray);
    m
});

impl PgType {
    /// Canonical PostgreSQL name, as sent to the driver.
    pub fn name(&self) -> &'static str {
        match self {
            PgType::Text => "text",
            PgType::Varchar => "varchar",
            PgType::SmallInt => "smallint",
            PgType::Integer => "integer",
            PgType::BigInt => "bigint",
            PgType::Real => "real",
            PgType::Double => "double precision",
            PgType::Numeric => "numeric",
            PgType::Boolean => "boolean",
            PgType::Uuid => "uuid",
            PgType::Timestamp => "timestamp",
            PgType::TimestampTz => "timestamptz",
            PgType::Date => "date",
            PgType::Json => "json",
            PgType::Jsonb => "jsonb",
            PgType::JsonbArray => "jsonb[]",
            PgType::TextArray => "text[]",
        }
    }

    /// Case-insensitive lookup that also accepts the usual aliases
    /// (`int4`, `_jsonb`, `character varying`...).
    pub fn from_name(name: &str) -> Option<PgType> {
        let key = name.trim().to_ascii_lowercase();
        PG_TYPE_NAMES.get(key.as_str()).copied()
    }

    pub fn shape(&self) -> ValueShape {
        match self {
            PgType::Json | PgType::Jsonb => ValueShape::JsonObject,
            PgType::JsonbArray => ValueShape::JsonArray,
            _ => ValueShape::Scalar,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, PgType::Text | PgType::Varchar)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, PgType::SmallInt | PgType::Integer | PgType::BigInt | PgType::Real | PgType::Double | PgType::Numeric)
    }
}

impl fmt::Display for PgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<PgType> for String {
    fn from(value: PgType) -> Self {
        value.name().to_string()
    }
}

impl TryFrom<String> for PgType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PgType::from_name(&value).ok_or_else(|| format!("unknown PostgreSQL type '{}'", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_accepts_aliases_and_case() {
        assert_eq!(PgType::from_name("int4"), Some(PgType::Integer));
        assert_eq!(PgType::from_name("  JSONB "), Some(PgType::Jsonb));
        assert_eq!(PgType::from_name("_jsonb"), Some(PgType::JsonbArray));
        assert_eq!(PgType::from_name("Timestamp With Time Zone"), Some(PgType::TimestampTz));
        assert_eq!(PgType::from_name("hstore"), None);
    }

    #[test]
    fn every_canonical_name_round_trips() {
        for ty in PG_TYPE_NAMES.values() {
            assert_eq!(PgType::from_name(ty.name()), Some(*ty));
        }
    }

    #[test]
    fn shapes_follow_json_types() {
        assert_eq!(PgType::Jsonb.shape(), ValueShape::JsonObject);
        assert_eq!(PgType::Json.shape(), ValueShape::JsonObject);
        assert_eq!(PgType::JsonbArray.shape(), ValueShape::JsonArray);
        assert_eq!(PgType::TextArray.shape(), ValueShape::Scalar);
        assert_eq!(PgType::Integer.shape(), ValueShape::Scalar);
    }

    #[test]
    fn serializes_as_type_name() {
        let s = serde_json::to_string(&PgType::Double).unwrap();
        assert_eq!(s, "\"double precision\"");
        let back: PgType = serde_json::from_str("\"int8\"").unwrap();
        assert_eq!(back, PgType::BigInt);
        assert!(serde_json::from_str::<PgType>("\"money\"").is_err());
    }
}
