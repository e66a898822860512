//! SQL statement construction from entity descriptors.
//!
//! Identifiers (tables, columns, join aliases) come only from descriptors,
//! which the registry has already checked to be plain identifiers. Every
//! caller-derived value goes into [`Statement::params`].

use plug_core::error::CoreError;
use plug_core::fields::{Assignment, ColumnValue};
use plug_core::filter::ListFilter;
use plug_core::schema::{EntityDescriptor, SchemaRegistry};
use plug_core::types::{DbId, Timestamp};

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<ColumnValue>,
}

impl Statement {
    fn new(sql: String, params: Vec<ColumnValue>) -> Self {
        Self { sql, params }
    }

    /// Next positional placeholder (`$n`).
    fn next_placeholder(&self) -> String {
        format!("${}", self.params.len() + 1)
    }
}

/// `SELECT <columns> FROM <table> t <joins>` shared by every read.
fn select_from(registry: &SchemaRegistry, d: &EntityDescriptor) -> Result<String, CoreError> {
    let mut columns = vec!["t.id".to_string()];
    let mut joins = String::new();

    for column in d.columns {
        columns.push(format!("t.{}", column.name));
    }

    for (i, column) in d.columns.iter().enumerate() {
        let (Some(lookup), Some(display)) = (column.references, column.display_field()) else {
            continue;
        };
        let lookup_table = registry.resolve_lookup(lookup)?.table_name;
        columns.push(format!("r{i}.value AS {display}"));
        joins.push_str(&format!(
            " LEFT JOIN {lookup_table} r{i} ON r{i}.id = t.{}",
            column.name
        ));
    }

    columns.push("t.created_at".into());
    columns.push("t.updated_at".into());
    if d.has_soft_delete() {
        columns.push("t.deleted_at".into());
    }

    Ok(format!(
        "SELECT {} FROM {} t{joins}",
        columns.join(", "),
        d.table_name
    ))
}

/// Live rows, newest first, optionally narrowed by a search term.
pub fn list(
    registry: &SchemaRegistry,
    d: &EntityDescriptor,
    filter: &ListFilter,
) -> Result<Statement, CoreError> {
    let mut stmt = Statement::new(select_from(registry, d)?, Vec::new());
    let mut conditions = Vec::new();

    if d.has_soft_delete() {
        conditions.push("t.deleted_at IS NULL".to_string());
    }

    let searchable: Vec<_> = d.columns.iter().filter(|c| c.searchable).collect();
    if let (Some(pattern), false) = (filter.search_pattern(), searchable.is_empty()) {
        let p = stmt.next_placeholder();
        let clauses: Vec<String> = searchable
            .iter()
            .map(|c| format!("t.{} ILIKE {p}", c.name))
            .collect();
        conditions.push(format!("({})", clauses.join(" OR ")));
        stmt.params.push(ColumnValue::Text(pattern));
    }

    if !conditions.is_empty() {
        stmt.sql.push_str(&format!(" WHERE {}", conditions.join(" AND ")));
    }

    let limit = stmt.next_placeholder();
    stmt.params.push(ColumnValue::Integer(filter.limit()));
    let offset = stmt.next_placeholder();
    stmt.params.push(ColumnValue::Integer(filter.offset()));
    stmt.sql
        .push_str(&format!(" ORDER BY t.id DESC LIMIT {limit} OFFSET {offset}"));

    Ok(stmt)
}

/// Soft-deleted rows, most recently deleted first.
pub fn list_deleted(registry: &SchemaRegistry, d: &EntityDescriptor) -> Result<Statement, CoreError> {
    let sql = format!(
        "{} WHERE t.deleted_at IS NOT NULL ORDER BY t.deleted_at DESC, t.id DESC",
        select_from(registry, d)?
    );
    Ok(Statement::new(sql, Vec::new()))
}

/// One row by id. Soft-deleted rows are included only when asked for.
pub fn find(
    registry: &SchemaRegistry,
    d: &EntityDescriptor,
    id: DbId,
    include_deleted: bool,
) -> Result<Statement, CoreError> {
    let mut sql = format!("{} WHERE t.id = $1", select_from(registry, d)?);
    if d.has_soft_delete() && !include_deleted {
        sql.push_str(" AND t.deleted_at IS NULL");
    }
    Ok(Statement::new(sql, vec![ColumnValue::Integer(id)]))
}

/// `INSERT ... RETURNING id`; `created_at` and `updated_at` share one parameter.
pub fn insert(d: &EntityDescriptor, assignments: &[Assignment], now: Timestamp) -> Statement {
    let mut names: Vec<&str> = assignments.iter().map(|(name, _)| *name).collect();
    let mut params: Vec<ColumnValue> = assignments.iter().map(|(_, v)| v.clone()).collect();
    let mut placeholders: Vec<String> = (1..=params.len()).map(|i| format!("${i}")).collect();

    params.push(ColumnValue::Timestamp(now));
    let stamp = format!("${}", params.len());
    names.extend(["created_at", "updated_at"]);
    placeholders.extend([stamp.clone(), stamp]);

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
        d.table_name,
        names.join(", "),
        placeholders.join(", ")
    );
    Statement::new(sql, params)
}

/// Partial update of a live row; always refreshes `updated_at`.
pub fn update(
    d: &EntityDescriptor,
    id: DbId,
    assignments: &[Assignment],
    now: Timestamp,
) -> Statement {
    let (sets, mut params) = set_clause(assignments, now);
    params.push(ColumnValue::Integer(id));

    let mut sql = format!(
        "UPDATE {} SET {sets} WHERE id = ${}",
        d.table_name,
        params.len()
    );
    if d.has_soft_delete() {
        sql.push_str(" AND deleted_at IS NULL");
    }
    Statement::new(sql, params)
}

/// Like [`update`], but locks the row first and returns the value `column`
/// held before the write as `prior_value`.
///
/// Concurrent writers queue on the row lock, so each one sees the value the
/// previous writer left behind. No row comes back when the id is missing or
/// soft-deleted.
pub fn update_returning_prior(
    d: &EntityDescriptor,
    id: DbId,
    assignments: &[Assignment],
    now: Timestamp,
    column: &str,
) -> Statement {
    let (sets, mut params) = set_clause(assignments, now);
    params.push(ColumnValue::Integer(id));

    let mut locked = format!(
        "SELECT id, {column} AS prior_value FROM {} WHERE id = ${}",
        d.table_name,
        params.len()
    );
    if d.has_soft_delete() {
        locked.push_str(" AND deleted_at IS NULL");
    }

    let sql = format!(
        "UPDATE {table} t SET {sets} FROM ({locked} FOR UPDATE) p \
         WHERE t.id = p.id RETURNING p.prior_value",
        table = d.table_name,
    );
    Statement::new(sql, params)
}

/// `a = $1, b = $2, updated_at = $3` with its parameters.
fn set_clause(assignments: &[Assignment], now: Timestamp) -> (String, Vec<ColumnValue>) {
    let mut params: Vec<ColumnValue> = assignments.iter().map(|(_, v)| v.clone()).collect();
    let mut sets: Vec<String> = assignments
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("{name} = ${}", i + 1))
        .collect();

    params.push(ColumnValue::Timestamp(now));
    sets.push(format!("updated_at = ${}", params.len()));
    (sets.join(", "), params)
}

/// Stamp `deleted_at` on a live row. Matches nothing if already deleted.
pub fn soft_delete(d: &EntityDescriptor, id: DbId, now: Timestamp) -> Statement {
    Statement::new(
        format!(
            "UPDATE {} SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL",
            d.table_name
        ),
        vec![ColumnValue::Timestamp(now), ColumnValue::Integer(id)],
    )
}

pub fn hard_delete(d: &EntityDescriptor, id: DbId) -> Statement {
    Statement::new(
        format!("DELETE FROM {} WHERE id = $1", d.table_name),
        vec![ColumnValue::Integer(id)],
    )
}

/// Clear `deleted_at` on a soft-deleted row.
pub fn restore(d: &EntityDescriptor, id: DbId, now: Timestamp) -> Statement {
    Statement::new(
        format!(
            "UPDATE {} SET deleted_at = NULL, updated_at = $1 \
             WHERE id = $2 AND deleted_at IS NOT NULL",
            d.table_name
        ),
        vec![ColumnValue::Timestamp(now), ColumnValue::Integer(id)],
    )
}

/// Live lookup row whose value matches case-insensitively, other than `exclude_id`.
pub fn find_lookup_value(d: &EntityDescriptor, value: &str, exclude_id: Option<DbId>) -> Statement {
    let mut sql = format!(
        "SELECT id FROM {} WHERE lower(value) = lower($1) AND deleted_at IS NULL",
        d.table_name
    );
    let mut params = vec![ColumnValue::Text(value.to_string())];
    if let Some(id) = exclude_id {
        sql.push_str(" AND id <> $2");
        params.push(ColumnValue::Integer(id));
    }
    sql.push_str(" LIMIT 1");
    Statement::new(sql, params)
}
