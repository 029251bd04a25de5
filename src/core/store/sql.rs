//! Predicate to SQL translation
//!
//! Scalar fields map to indexed columns of `parts`. Multi-valued fields live
//! only in the JSON document and are matched element-wise through
//! `json_each`. Regex matching uses the `REGEXP` function registered on the
//! connection.

use rusqlite::types::Value;

use crate::core::filter::{timestamp_key, CompiledFilter, Field, Predicate};

use super::types::FindOptions;

/// A WHERE clause with its positional parameters
#[derive(Debug, Default)]
pub(super) struct SqlFilter {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Translate a compiled filter into a WHERE clause body
pub(super) fn where_clause(filter: &CompiledFilter) -> SqlFilter {
    let mut out = SqlFilter::default();
    match filter.predicate() {
        None => out.sql.push_str("1=1"),
        Some(p) => translate(p, &mut out),
    }
    out
}

/// ORDER BY / LIMIT / OFFSET tail for a find
pub(super) fn order_and_window(options: &FindOptions) -> String {
    let sort = if options.sort.is_empty() {
        FindOptions::newest_first().sort
    } else {
        options.sort.clone()
    };

    let order = sort
        .iter()
        .map(|s| format!("{} {}", s.key.column(), s.order.keyword()))
        .collect::<Vec<_>>()
        .join(", ");

    // SQLite takes LIMIT -1 as "no limit"
    let limit = options
        .limit
        .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
        .unwrap_or(-1);
    let offset = i64::try_from(options.skip).unwrap_or(i64::MAX);

    format!(" ORDER BY {} LIMIT {} OFFSET {}", order, limit, offset)
}

fn column(field: Field) -> Option<&'static str> {
    match field {
        Field::Id => Some("id"),
        Field::PartNumber => Some("part_number"),
        Field::PartName => Some("part_name"),
        Field::Description => Some("description"),
        Field::CreatedAt => Some("created_at"),
        _ => None,
    }
}

/// Open an EXISTS over the elements of a multi-valued field; `elem` names
/// the SQL expression for one element.
fn element_source(field: Field) -> (String, &'static str) {
    match field {
        Field::ChildMainPartId => (
            "EXISTS (SELECT 1 FROM json_each(parts.doc, '$.childParts') je WHERE ".to_string(),
            "json_extract(je.value, '$.mainPartId')",
        ),
        other => (
            format!(
                "EXISTS (SELECT 1 FROM json_each(parts.doc, '$.{}') je WHERE ",
                other.as_str()
            ),
            "je.value",
        ),
    }
}

/// Emit `<field expr> <op>` for a scalar column, or an EXISTS over elements
fn field_condition(field: Field, op: &str, out: &mut SqlFilter) {
    match column(field) {
        Some(col) => {
            out.sql.push_str(col);
            out.sql.push(' ');
            out.sql.push_str(op);
        }
        None => {
            let (open, elem) = element_source(field);
            out.sql.push_str(&open);
            out.sql.push_str(elem);
            out.sql.push(' ');
            out.sql.push_str(op);
            out.sql.push(')');
        }
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn join(args: &[Predicate], glue: &str, empty: &str, out: &mut SqlFilter) {
    if args.is_empty() {
        out.sql.push_str(empty);
        return;
    }
    out.sql.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.sql.push_str(glue);
        }
        translate(arg, out);
    }
    out.sql.push(')');
}

fn translate(predicate: &Predicate, out: &mut SqlFilter) {
    match predicate {
        Predicate::Equals { field, value } => {
            field_condition(*field, "= ?", out);
            out.params.push(Value::Text(value.clone()));
        }
        Predicate::Regex {
            field,
            pattern,
            case_insensitive,
        } => {
            field_condition(*field, "REGEXP ?", out);
            let pattern = if *case_insensitive {
                format!("(?i){}", pattern)
            } else {
                pattern.clone()
            };
            out.params.push(Value::Text(pattern));
        }
        Predicate::ContainsAll { field, values } => {
            let args: Vec<Predicate> = values
                .iter()
                .map(|v| Predicate::Equals {
                    field: *field,
                    value: v.clone(),
                })
                .collect();
            join(&args, " AND ", "1=1", out);
        }
        Predicate::ContainsAny { field, values } => {
            if values.is_empty() {
                out.sql.push_str("0=1");
                return;
            }
            field_condition(*field, &format!("IN ({})", placeholders(values.len())), out);
            out.params
                .extend(values.iter().map(|v| Value::Text(v.clone())));
        }
        Predicate::RangeClosed { field, from, to } => {
            field_condition(*field, "BETWEEN ? AND ?", out);
            out.params.push(Value::Text(timestamp_key(from)));
            out.params.push(Value::Text(timestamp_key(to)));
        }
        Predicate::And { args } => join(args, " AND ", "1=1", out),
        Predicate::Or { args } => join(args, " OR ", "0=1", out),
    }
}
