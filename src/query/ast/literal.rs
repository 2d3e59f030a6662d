use chrono::{DateTime, Utc};
use ordered_float::NotNan;
use serde_json::{Number, Value};
use std::fmt::{self, Display};
use uuid::Uuid;

use crate::{database::PgType, query::ast::ValueType};

/// A constant carried by the expression tree. Literals are always bound as
/// parameters, never written into the SQL text.
#[derive(Clone, PartialEq, Eq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(NotNan<f64>),
    String(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Json(Value),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Type the driver would infer for this value when no override is given.
    pub fn native_pg_type(&self) -> Option<PgType> {
        match self {
            Literal::Null => None,
            Literal::Bool(_) => Some(PgType::Boolean),
            Literal::Int(_) => Some(PgType::BigInt),
            Literal::Float(_) => Some(PgType::Double),
            Literal::String(_) => Some(PgType::Text),
            Literal::Uuid(_) => Some(PgType::Uuid),
            Literal::Timestamp(_) => Some(PgType::TimestampTz),
            Literal::Json(_) => Some(PgType::Jsonb),
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.native_pg_type().map(ValueType::from_pg_type).unwrap_or(ValueType::Unknown)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Number(Number::from(*i)),
            Literal::Float(f) => Number::from_f64(f.into_inner()).map(Value::Number).unwrap_or(Value::Null),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Uuid(u) => Value::String(u.to_string()),
            Literal::Timestamp(t) => Value::String(t.to_rfc3339()),
            Literal::Json(v) => v.clone(),
        }
    }

    /// Classify a JSON value; objects and arrays stay JSON documents.
    pub fn from_json(value: Value) -> Literal {
        match value {
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Literal::Int(i),
                None => n
                    .as_f64()
                    .and_then(|f| NotNan::new(f).ok())
                    .map(Literal::Float)
                    .unwrap_or(Literal::Null),
            },
            Value::String(s) => Literal::String(s),
            other => Literal::Json(other),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(value as i64)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<NotNan<f64>> for Literal {
    fn from(value: NotNan<f64>) -> Self {
        Literal::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<Uuid> for Literal {
    fn from(value: Uuid) -> Self {
        Literal::Uuid(value)
    }
}

impl From<DateTime<Utc>> for Literal {
    fn from(value: DateTime<Utc>) -> Self {
        Literal::Timestamp(value)
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        Literal::from_json(value)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(n) => write!(f, "{}", n.into_inner()),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Uuid(u) => write!(f, "{}", u),
            Literal::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Literal::Json(v) => write!(f, "{}", v),
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "Null"),
            Literal::Bool(_) => write!(f, "Bool({})", self),
            Literal::Int(_) => write!(f, "Int({})", self),
            Literal::Float(_) => write!(f, "Float({})", self),
            Literal::String(_) => write!(f, "String({})", self),
            Literal::Uuid(_) => write!(f, "Uuid({})", self),
            Literal::Timestamp(_) => write!(f, "Timestamp({})", self),
            Literal::Json(_) => write!(f, "Json({})", self),
        }
    }
}
