//! The tabular query interface the rest of the crate is written against.
//!
//! The hosted store is an external collaborator: each operation here is one
//! logical query — insert-with-return, upsert-with-conflict-target,
//! select-with-nested-join, update-by-id or delete-by-id. [`RestStore`]
//! talks to the real service; [`MemoryStore`] backs the tests.
//!
//! [`RestStore`]: super::rest::RestStore
//! [`MemoryStore`]: super::memory::MemoryStore

use serde_json::{Map, Value};

use crate::error::IntakeError;

/// One row on the wire: column name to JSON value.
pub type Row = Map<String, Value>;

/// Table names, column-exact per the deployed schema.
pub const DOCTORS: &str = "doctors";
pub const PATIENTS: &str = "patients";
pub const ASSESSMENTS: &str = "patient_assessments";

/// Ordering for a select.
#[derive(Debug, Clone)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// How an embedded table relates to the base row.
#[derive(Debug, Clone)]
pub enum Join {
    /// Child rows whose `fk` column references the base row's id.
    Children { fk: String },
    /// The single parent row the base row's `fk` column points at.
    Parent { fk: String },
}

/// A nested table to join into each selected row.
#[derive(Debug, Clone)]
pub struct Embed {
    pub table: String,
    /// Columns to project; empty means all.
    pub columns: Vec<String>,
    pub join: Join,
    pub embed: Vec<Embed>,
}

impl Embed {
    pub fn children(table: &str, fk: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            join: Join::Children { fk: fk.to_string() },
            embed: Vec::new(),
        }
    }

    pub fn parent(table: &str, fk: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            join: Join::Parent { fk: fk.to_string() },
            embed: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn nest(mut self, embed: Embed) -> Self {
        self.embed.push(embed);
        self
    }
}

/// Parameters for a single select query.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub eq: Vec<(String, String)>,
    /// Case-insensitive substring match against any of the named columns.
    pub search: Option<(Vec<String>, String)>,
    pub order: Option<Order>,
    pub embed: Vec<Embed>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.eq.push((column.to_string(), value.into()));
        self
    }

    pub fn search(mut self, columns: &[&str], term: &str) -> Self {
        self.search = Some((
            columns.iter().map(|c| c.to_string()).collect(),
            term.to_string(),
        ));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            descending: false,
        });
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            descending: true,
        });
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embed.push(embed);
        self
    }
}

/// A handle to the remote relational store.
///
/// Implementations serialize conflicting writes on their own; this layer
/// adds no locking, retries, pagination or timeout semantics of its own.
#[allow(async_fn_in_trait)]
pub trait TableStore {
    /// Insert one row, returning it as stored (generated id and timestamps
    /// included).
    async fn insert(&self, table: &str, row: Row) -> Result<Value, IntakeError>;

    /// Insert-or-update on the declared conflict columns. On conflict the
    /// existing row's other columns are overwritten with the new values;
    /// there is no field-level merge, and no row is returned.
    async fn upsert(&self, table: &str, row: Row, on_conflict: &[&str])
        -> Result<(), IntakeError>;

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, IntakeError>;

    /// Patch the row with the given id, returning it as stored. Fails with
    /// [`IntakeError::NotFound`] when no row matches.
    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<Value, IntakeError>;

    /// Delete the row with the given id. Deleting a patient cascades to its
    /// assessments at the store level; this layer relies on that invariant
    /// but does not enforce it.
    async fn delete(&self, table: &str, id: &str) -> Result<(), IntakeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_filters_in_order() {
        let query = SelectQuery::new()
            .eq("full_name", "Dr. A")
            .eq("contact", "555-1")
            .order_desc("created_at");
        assert_eq!(query.eq.len(), 2);
        assert_eq!(query.eq[0].0, "full_name");
        let order = query.order.unwrap();
        assert_eq!(order.column, "created_at");
        assert!(order.descending);
    }

    #[test]
    fn embed_builders_set_join_direction() {
        let embed = Embed::children(ASSESSMENTS, "patient_id")
            .nest(Embed::parent(DOCTORS, "doctor_id").columns(&["full_name", "specialization"]));
        assert!(matches!(embed.join, Join::Children { ref fk } if fk == "patient_id"));
        let nested = &embed.embed[0];
        assert!(matches!(nested.join, Join::Parent { ref fk } if fk == "doctor_id"));
        assert_eq!(nested.columns, vec!["full_name", "specialization"]);
    }
}
