//! In-memory rendition of the clinic schema, used by the tests.
//!
//! Behaves like the hosted store for the operations this crate issues:
//! generated ids and timestamps, last-write-wins upsert on a conflict key,
//! case-insensitive substring search, ordering, nested embeds, and the
//! patients → patient_assessments delete cascade. Inserts and upserts can
//! be primed to fail once, which is how the workflow tests force partial
//! failures.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::IntakeError;

use super::store::{Embed, Join, Order, Row, SelectQuery, TableStore, ASSESSMENTS, PATIENTS};

type Tables = HashMap<String, Vec<Row>>;

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_insert: Mutex<HashMap<String, String>>,
    fail_upsert: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next insert into `table` fail with `message`.
    pub fn fail_next_insert(&self, table: &str, message: &str) {
        lock(&self.fail_insert).insert(table.to_string(), message.to_string());
    }

    /// Make the next upsert into `table` fail with `message`.
    pub fn fail_next_upsert(&self, table: &str, message: &str) {
        lock(&self.fail_upsert).insert(table.to_string(), message.to_string());
    }

    /// Raw rows of a table, for assertions.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Stamp a new row with a generated id and timestamps, like the store's
/// column defaults would.
fn stamped(mut row: Row) -> Row {
    let now = Utc::now().to_rfc3339();
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at").or_insert(Value::String(now.clone()));
    row.entry("updated_at").or_insert(Value::String(now));
    row
}

fn matches_eq(row: &Row, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(column, value)| {
        row.get(column)
            .map(|v| match v {
                Value::String(s) => s == value,
                other => other.to_string() == *value,
            })
            .unwrap_or(false)
    })
}

fn matches_search(row: &Row, search: Option<&(Vec<String>, String)>) -> bool {
    let Some((columns, term)) = search else {
        return true;
    };
    let term = term.to_lowercase();
    columns.iter().any(|column| {
        row.get(column)
            .and_then(Value::as_str)
            .is_some_and(|v| v.to_lowercase().contains(&term))
    })
}

fn sort_rows(rows: &mut [Row], order: &Order) {
    rows.sort_by(|a, b| {
        let a = a.get(&order.column).and_then(Value::as_str).unwrap_or("");
        let b = b.get(&order.column).and_then(Value::as_str).unwrap_or("");
        if order.descending {
            b.cmp(a)
        } else {
            a.cmp(b)
        }
    });
}

fn project(row: Row, columns: &[String]) -> Row {
    if columns.is_empty() {
        return row;
    }
    row.into_iter()
        .filter(|(column, _)| columns.contains(column))
        .collect()
}

fn resolve_embeds(tables: &Tables, mut row: Row, embeds: &[Embed]) -> Value {
    for embed in embeds {
        let related = tables.get(&embed.table).cloned().unwrap_or_default();
        match &embed.join {
            Join::Children { fk } => {
                let id = row.get("id").cloned().unwrap_or(Value::Null);
                let children: Vec<Value> = related
                    .into_iter()
                    .filter(|child| child.get(fk) == Some(&id))
                    .map(|child| resolve_embeds(tables, project(child, &embed.columns), &embed.embed))
                    .collect();
                row.insert(embed.table.clone(), Value::Array(children));
            }
            Join::Parent { fk } => {
                let key = row.get(fk).cloned().unwrap_or(Value::Null);
                let parent = related
                    .into_iter()
                    .find(|candidate| candidate.get("id") == Some(&key))
                    .map(|parent| resolve_embeds(tables, project(parent, &embed.columns), &embed.embed))
                    .unwrap_or(Value::Null);
                row.insert(embed.table.clone(), parent);
            }
        }
    }
    Value::Object(row)
}

impl TableStore for MemoryStore {
    async fn insert(&self, table: &str, row: Row) -> Result<Value, IntakeError> {
        if let Some(message) = lock(&self.fail_insert).remove(table) {
            return Err(IntakeError::store(&format!("insert into {table}"), message));
        }
        let row = stamped(row);
        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(Value::Object(row))
    }

    async fn upsert(
        &self,
        table: &str,
        row: Row,
        on_conflict: &[&str],
    ) -> Result<(), IntakeError> {
        if let Some(message) = lock(&self.fail_upsert).remove(table) {
            return Err(IntakeError::store(&format!("upsert into {table}"), message));
        }
        let mut tables = lock(&self.tables);
        let rows = tables.entry(table.to_string()).or_default();
        match rows
            .iter_mut()
            .find(|existing| on_conflict.iter().all(|c| existing.get(*c) == row.get(*c)))
        {
            Some(existing) => {
                // last write wins for every provided column; identity and
                // creation time survive
                for (column, value) in row {
                    existing.insert(column, value);
                }
                existing.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
            }
            None => rows.push(stamped(row)),
        }
        Ok(())
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, IntakeError> {
        let tables = lock(&self.tables);
        let mut selected: Vec<Row> = tables
            .get(table)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| matches_eq(row, &query.eq) && matches_search(row, query.search.as_ref()))
            .collect();
        if let Some(order) = &query.order {
            sort_rows(&mut selected, order);
        }
        Ok(selected
            .into_iter()
            .map(|row| resolve_embeds(&tables, row, &query.embed))
            .collect())
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<Value, IntakeError> {
        let mut tables = lock(&self.tables);
        let row = tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
            })
            .ok_or_else(|| IntakeError::not_found(table, id))?;
        for (column, value) in patch {
            row.insert(column, value);
        }
        row.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
        Ok(Value::Object(row.clone()))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), IntakeError> {
        let mut tables = lock(&self.tables);
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| row.get("id").and_then(Value::as_str) != Some(id));
        }
        // referential integrity the deployed schema enforces with
        // ON DELETE CASCADE
        if table == PATIENTS {
            if let Some(assessments) = tables.get_mut(ASSESSMENTS) {
                assessments.retain(|a| a.get("patient_id").and_then(Value::as_str) != Some(id));
            }
        }
        Ok(())
    }
}
