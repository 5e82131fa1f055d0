//! Wire types for the query endpoint: operation, filters, ordering.

use serde::Deserialize;
use serde_json::Value;

/// The four dispatchable operations. The wire field is a free string so an
/// unrecognized operation surfaces as a gateway validation error, not a 422
/// from deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "select" => Some(Operation::Select),
            "insert" => Some(Operation::Insert),
            "update" => Some(Operation::Update),
            "delete" => Some(Operation::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Supported filter operators. Adding one is a compile-time-checked change in
/// the SQL builder's match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    In,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Operator::Eq),
            "neq" => Some(Operator::Neq),
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "like" => Some(Operator::Like),
            "ilike" => Some(Operator::Ilike),
            "in" => Some(Operator::In),
            _ => None,
        }
    }
}

/// One `(column, operator, value)` predicate. The operator stays a string on
/// the wire: filters with an operator outside the supported set are ignored
/// rather than rejected.
#[derive(Clone, Debug, Deserialize)]
pub struct Filter {
    pub column: String,
    pub operator: String,
    pub value: Value,
}

impl Filter {
    pub fn operator(&self) -> Option<Operator> {
        Operator::parse(&self.operator)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Single-column sort. The wire shape is `{"<column>": "asc"|"desc"}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// Body of `POST /api/db/{table}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryRequest {
    pub operation: String,
    pub filters: Vec<Filter>,
    pub data: Option<Value>,
    pub order_by: Option<serde_json::Map<String, Value>>,
    pub limit: Option<i64>,
    pub single: bool,
}

impl QueryRequest {
    /// The one honored column/direction pair. Extra pairs in the wire object
    /// are ignored.
    pub fn order(&self) -> Option<OrderBy> {
        let map = self.order_by.as_ref()?;
        let (column, dir) = map.iter().next()?;
        let direction = match dir.as_str() {
            Some(s) if s.eq_ignore_ascii_case("desc") => Direction::Desc,
            _ => Direction::Asc,
        };
        Some(OrderBy {
            column: column.clone(),
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_supported_operator_parses() {
        for (s, op) in [
            ("eq", Operator::Eq),
            ("neq", Operator::Neq),
            ("gt", Operator::Gt),
            ("gte", Operator::Gte),
            ("lt", Operator::Lt),
            ("lte", Operator::Lte),
            ("like", Operator::Like),
            ("ilike", Operator::Ilike),
            ("in", Operator::In),
        ] {
            assert_eq!(Operator::parse(s), Some(op));
        }
    }

    #[test]
    fn unsupported_operator_parses_to_none() {
        assert_eq!(Operator::parse("regex"), None);
        assert_eq!(Operator::parse("EQ"), None);
        assert_eq!(Operator::parse(""), None);
    }

    #[test]
    fn unknown_operation_parses_to_none() {
        assert_eq!(Operation::parse("upsert"), None);
        assert_eq!(Operation::parse("select"), Some(Operation::Select));
    }

    #[test]
    fn request_deserializes_from_wire_shape() {
        let req: QueryRequest = serde_json::from_value(json!({
            "operation": "select",
            "filters": [{"column": "status", "operator": "eq", "value": "active"}],
            "orderBy": {"name": "asc"},
            "limit": 10,
            "single": true
        }))
        .unwrap();
        assert_eq!(req.operation, "select");
        assert_eq!(req.filters.len(), 1);
        assert_eq!(req.limit, Some(10));
        assert!(req.single);
        assert_eq!(
            req.order(),
            Some(OrderBy {
                column: "name".into(),
                direction: Direction::Asc
            })
        );
    }

    #[test]
    fn order_direction_defaults_to_asc() {
        let req: QueryRequest =
            serde_json::from_value(json!({"operation": "select", "orderBy": {"name": "sideways"}}))
                .unwrap();
        assert_eq!(req.order().unwrap().direction, Direction::Asc);

        let req: QueryRequest =
            serde_json::from_value(json!({"operation": "select", "orderBy": {"name": "desc"}}))
                .unwrap();
        assert_eq!(req.order().unwrap().direction, Direction::Desc);
    }

    #[test]
    fn missing_fields_default() {
        let req: QueryRequest = serde_json::from_value(json!({"operation": "select"})).unwrap();
        assert!(req.filters.is_empty());
        assert!(req.data.is_none());
        assert!(req.order().is_none());
        assert_eq!(req.limit, None);
        assert!(!req.single);
    }
}
