//! JSON values as PostgreSQL bind parameters.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// One bind parameter derived from a JSON value. Strings that parse as UUIDs
/// bind in canonical text form so uuid columns compare correctly.
#[derive(Clone, Debug)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(Value),
}

impl From<&Value> for BindValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => BindValue::Null,
            Value::Bool(b) => BindValue::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => BindValue::Int(i),
                (None, Some(f)) => BindValue::Float(f),
                (None, None) => BindValue::Null,
            },
            Value::String(s) => match uuid::Uuid::parse_str(s) {
                Ok(u) => BindValue::Text(u.to_string()),
                Err(_) => BindValue::Text(s.clone()),
            },
            Value::Array(_) | Value::Object(_) => BindValue::Json(v.clone()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            BindValue::Null => <Option<i32> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            BindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            BindValue::Int(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            BindValue::Float(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            BindValue::Text(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            BindValue::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }
}

impl sqlx::Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_map_to_native_variants() {
        assert!(matches!(BindValue::from(&Value::Null), BindValue::Null));
        assert!(matches!(BindValue::from(&json!(true)), BindValue::Bool(true)));
        assert!(matches!(BindValue::from(&json!(42)), BindValue::Int(42)));
        assert!(matches!(BindValue::from(&json!(1.5)), BindValue::Float(_)));
        assert!(matches!(BindValue::from(&json!("hi")), BindValue::Text(_)));
    }

    #[test]
    fn uuid_strings_normalize() {
        let v = json!("67E55044-10B1-426F-9247-BB680E5FE0C8");
        match BindValue::from(&v) {
            BindValue::Text(s) => assert_eq!(s, "67e55044-10b1-426f-9247-bb680e5fe0c8"),
            other => panic!("expected Text, got {:?}", other),
        }
    }

    #[test]
    fn composite_values_bind_as_json() {
        assert!(matches!(BindValue::from(&json!({"a": 1})), BindValue::Json(_)));
        assert!(matches!(BindValue::from(&json!([1, 2])), BindValue::Json(_)));
    }
}
