//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for the bound path,
//! plus the restricted raw statements used when no binding exists.

use crate::error::GatewayError;
use crate::query::{Filter, Operator, OrderBy};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// LIKE/ILIKE match by containment: wildcard characters in the raw value are
/// stripped rather than honored.
fn contains_pattern(v: &Value) -> String {
    let raw = match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let cleaned: String = raw.chars().filter(|c| *c != '%' && *c != '_').collect();
    format!("%{}%", cleaned)
}

/// Translate one filter to a condition, binding its value. Returns None for
/// an operator outside the supported set: such filters are dropped, not
/// rejected.
fn condition(q: &mut QueryBuf, f: &Filter) -> Result<Option<String>, GatewayError> {
    let Some(op) = f.operator() else {
        return Ok(None);
    };
    let col = quoted(&f.column);
    let cond = match op {
        Operator::Eq => format!("{} = ${}", col, q.push_param(f.value.clone())),
        Operator::Neq => format!("{} <> ${}", col, q.push_param(f.value.clone())),
        Operator::Gt => format!("{} > ${}", col, q.push_param(f.value.clone())),
        Operator::Gte => format!("{} >= ${}", col, q.push_param(f.value.clone())),
        Operator::Lt => format!("{} < ${}", col, q.push_param(f.value.clone())),
        Operator::Lte => format!("{} <= ${}", col, q.push_param(f.value.clone())),
        Operator::Like => {
            let needle = contains_pattern(&f.value);
            format!("{} LIKE ${}", col, q.push_param(Value::String(needle)))
        }
        Operator::Ilike => {
            let needle = contains_pattern(&f.value);
            format!("{} ILIKE ${}", col, q.push_param(Value::String(needle)))
        }
        Operator::In => match &f.value {
            Value::Array(items) if items.is_empty() => "1 = 0".to_string(),
            Value::Array(items) => {
                let placeholders: Vec<String> = items
                    .iter()
                    .map(|v| format!("${}", q.push_param(v.clone())))
                    .collect();
                format!("{} IN ({})", col, placeholders.join(", "))
            }
            _ => {
                return Err(GatewayError::Validation(format!(
                    "'in' filter on '{}' requires an array value",
                    f.column
                )))
            }
        },
    };
    Ok(Some(cond))
}

/// AND of all translated filters. Empty filter list (or all filters dropped)
/// yields no WHERE clause: the statement applies to every row.
fn where_clause(q: &mut QueryBuf, filters: &[Filter]) -> Result<String, GatewayError> {
    let mut conds = Vec::new();
    for f in filters {
        if let Some(c) = condition(q, f)? {
            conds.push(c);
        }
    }
    Ok(if conds.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conds.join(" AND "))
    })
}

fn order_clause(order: Option<&OrderBy>) -> String {
    order
        .map(|o| format!(" ORDER BY {} {}", quoted(&o.column), o.direction.as_sql()))
        .unwrap_or_default()
}

// No upper clamp: a caller can request an unbounded scan.
fn limit_clause(limit: Option<i64>) -> String {
    limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default()
}

/// SELECT with the full operator set.
pub fn select(
    table: &str,
    filters: &[Filter],
    order: Option<&OrderBy>,
    limit: Option<i64>,
) -> Result<QueryBuf, GatewayError> {
    let mut q = QueryBuf::new();
    let where_c = where_clause(&mut q, filters)?;
    q.sql = format!(
        "SELECT * FROM {}{}{}{}",
        quoted(table),
        where_c,
        order_clause(order),
        limit_clause(limit)
    );
    Ok(q)
}

/// Multi-row INSERT returning the created rows. Column list comes from the
/// first record; later records bind NULL for columns they omit.
pub fn insert(table: &str, records: &[Map<String, Value>]) -> Result<QueryBuf, GatewayError> {
    let first = records
        .first()
        .ok_or_else(|| GatewayError::Validation("insert requires at least one record".into()))?;
    if first.is_empty() {
        return Err(GatewayError::Validation(
            "insert records must have at least one column".into(),
        ));
    }
    let columns: Vec<&String> = first.keys().collect();
    let mut q = QueryBuf::new();
    let mut rows = Vec::with_capacity(records.len());
    for rec in records {
        let placeholders: Vec<String> = columns
            .iter()
            .map(|c| {
                let v = rec.get(*c).cloned().unwrap_or(Value::Null);
                format!("${}", q.push_param(v))
            })
            .collect();
        rows.push(format!("({})", placeholders.join(", ")));
    }
    let col_list: Vec<String> = columns.iter().map(|c| quoted(c)).collect();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES {} RETURNING *",
        quoted(table),
        col_list.join(", "),
        rows.join(", ")
    );
    Ok(q)
}

/// UPDATE scoped by the translated filters. No filters means every row is
/// updated; the caller owns that decision.
pub fn update(
    table: &str,
    data: &Map<String, Value>,
    filters: &[Filter],
) -> Result<QueryBuf, GatewayError> {
    if data.is_empty() {
        return Err(GatewayError::Validation(
            "update requires a non-empty 'data' object".into(),
        ));
    }
    let mut q = QueryBuf::new();
    let sets: Vec<String> = data
        .iter()
        .map(|(k, v)| format!("{} = ${}", quoted(k), q.push_param(v.clone())))
        .collect();
    let where_c = where_clause(&mut q, filters)?;
    q.sql = format!("UPDATE {} SET {}{}", quoted(table), sets.join(", "), where_c);
    Ok(q)
}

/// DELETE scoped by the translated filters. Matching zero rows is success.
pub fn delete(table: &str, filters: &[Filter]) -> Result<QueryBuf, GatewayError> {
    let mut q = QueryBuf::new();
    let where_c = where_clause(&mut q, filters)?;
    q.sql = format!("DELETE FROM {}{}", quoted(table), where_c);
    Ok(q)
}

/// Raw SELECT for an allow-listed table. Only `eq` filters are honored on
/// this path; every other operator is dropped.
pub fn fallback_select(
    table: &'static str,
    filters: &[Filter],
    order: Option<&OrderBy>,
    limit: Option<i64>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut conds = Vec::new();
    for f in filters {
        if f.operator() == Some(Operator::Eq) {
            conds.push(format!(
                "{} = ${}",
                quoted(&f.column),
                q.push_param(f.value.clone())
            ));
        }
    }
    let where_c = if conds.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conds.join(" AND "))
    };
    q.sql = format!(
        "SELECT * FROM {}{}{}{}",
        quoted(table),
        where_c,
        order_clause(order),
        limit_clause(limit)
    );
    q
}

/// The raw store accepts scalar columns only: arrays and objects go in as
/// serialized text.
fn scalarized(v: Value) -> Value {
    match v {
        Value::Array(_) | Value::Object(_) => Value::String(v.to_string()),
        other => other,
    }
}

/// Raw multi-row INSERT for an allow-listed table. Each record gains a
/// generated `id` and `created_at`/`updated_at` timestamps when absent.
/// Returns the statement and the augmented records, which are echoed back to
/// the caller as the result.
pub fn fallback_insert(
    table: &'static str,
    records: &[Map<String, Value>],
) -> Result<(QueryBuf, Vec<Value>), GatewayError> {
    if records.is_empty() {
        return Err(GatewayError::Validation(
            "insert requires at least one record".into(),
        ));
    }
    let now = chrono::Utc::now().to_rfc3339();
    let mut augmented: Vec<Map<String, Value>> = Vec::with_capacity(records.len());
    for rec in records {
        let mut rec = rec.clone();
        rec.entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        rec.entry("created_at")
            .or_insert_with(|| Value::String(now.clone()));
        rec.entry("updated_at")
            .or_insert_with(|| Value::String(now.clone()));
        augmented.push(rec);
    }

    // union of keys so sparse records still line up with one column list
    let columns: BTreeSet<&String> = augmented.iter().flat_map(|r| r.keys()).collect();
    let mut q = QueryBuf::new();
    let mut rows = Vec::with_capacity(augmented.len());
    for rec in &augmented {
        let placeholders: Vec<String> = columns
            .iter()
            .map(|c| {
                let v = rec.get(*c).cloned().unwrap_or(Value::Null);
                format!("${}", q.push_param(scalarized(v)))
            })
            .collect();
        rows.push(format!("({})", placeholders.join(", ")));
    }
    let col_list: Vec<String> = columns.iter().map(|c| quoted(c)).collect();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        quoted(table),
        col_list.join(", "),
        rows.join(", ")
    );
    let echoed = augmented.into_iter().map(Value::Object).collect();
    Ok((q, echoed))
}
