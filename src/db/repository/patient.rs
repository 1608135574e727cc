use serde_json::{json, Map};
use uuid::Uuid;

use crate::db::store::{Row, SelectQuery, TableStore, PATIENTS};
use crate::error::IntakeError;
use crate::models::{PatientForm, PatientPatch, PatientRecord};

use super::decode;

/// Demographics only; the assessment section of the sheet goes to its own
/// table.
fn patient_row(patient: &PatientForm) -> Row {
    let mut row = Map::new();
    row.insert("name".into(), json!(patient.name));
    row.insert("age".into(), json!(patient.age));
    row.insert("contact".into(), json!(patient.contact));
    row.insert("gender".into(), json!(patient.gender));
    row
}

fn patch_row(patch: &PatientPatch) -> Result<Row, IntakeError> {
    let mut row = Map::new();
    if let Some(name) = &patch.name {
        row.insert("name".into(), json!(name));
    }
    if let Some(age) = &patch.age {
        row.insert("age".into(), json!(age));
    }
    if let Some(contact) = &patch.contact {
        row.insert("contact".into(), json!(contact));
    }
    if let Some(gender) = &patch.gender {
        row.insert("gender".into(), json!(gender));
    }
    if row.is_empty() {
        return Err(IntakeError::validation("patch", "no fields to update"));
    }
    Ok(row)
}

/// Insert a new patient, returning the row with its store-generated id.
/// The four required fields are checked here, before any request goes out.
pub async fn insert_patient(
    store: &impl TableStore,
    patient: &PatientForm,
) -> Result<PatientRecord, IntakeError> {
    patient.validate()?;
    let stored = store.insert(PATIENTS, patient_row(patient)).await?;
    decode(PATIENTS, stored)
}

pub async fn get_patient_record(
    store: &impl TableStore,
    id: Uuid,
) -> Result<Option<PatientRecord>, IntakeError> {
    let query = SelectQuery::new().eq("id", id.to_string());
    let mut rows = store.select(PATIENTS, &query).await?;
    if rows.is_empty() {
        return Ok(None);
    }
    decode(PATIENTS, rows.remove(0)).map(Some)
}

/// Sparse patch: only fields present in the input are sent; the rest stay
/// untouched in storage.
pub async fn update_patient(
    store: &impl TableStore,
    id: Uuid,
    patch: &PatientPatch,
) -> Result<PatientRecord, IntakeError> {
    let row = patch_row(patch)?;
    let stored = store.update(PATIENTS, &id.to_string(), row).await?;
    decode(PATIENTS, stored)
}

/// Delete a patient. The store cascades the delete to the patient's
/// assessments.
pub async fn delete_patient(store: &impl TableStore, id: Uuid) -> Result<(), IntakeError> {
    store.delete(PATIENTS, &id.to_string()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn p1() -> PatientForm {
        PatientForm {
            name: "Jane Doe".into(),
            age: "40".into(),
            contact: "555-0102".into(),
            gender: "female".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_returns_generated_identifier() {
        let store = MemoryStore::new();
        let record = insert_patient(&store, &p1()).await.unwrap();
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.age, "40");

        let fetched = get_patient_record(&store, record.id).await.unwrap().unwrap();
        assert_eq!(fetched.contact, "555-0102");
    }

    #[tokio::test]
    async fn missing_required_field_never_reaches_the_store() {
        let store = MemoryStore::new();
        let mut patient = p1();
        patient.gender.clear();

        let err = insert_patient(&store, &patient).await.unwrap_err();
        assert!(matches!(err, IntakeError::Validation { ref field, .. } if field == "gender"));
        assert!(store.rows(PATIENTS).is_empty());
    }

    #[tokio::test]
    async fn sparse_update_leaves_other_fields_alone() {
        let store = MemoryStore::new();
        let record = insert_patient(&store, &p1()).await.unwrap();

        let patch = PatientPatch {
            contact: Some("555-0199".into()),
            ..Default::default()
        };
        let updated = update_patient(&store, record.id, &patch).await.unwrap();

        assert_eq!(updated.contact, "555-0199");
        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(updated.age, "40");
        assert_eq!(updated.gender, "female");
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let store = MemoryStore::new();
        let record = insert_patient(&store, &p1()).await.unwrap();
        let err = update_patient(&store, record.id, &PatientPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Validation { .. }));
    }

    #[tokio::test]
    async fn update_of_unknown_patient_is_not_found() {
        let store = MemoryStore::new();
        let patch = PatientPatch {
            name: Some("New Name".into()),
            ..Default::default()
        };
        let err = update_patient(&store, Uuid::new_v4(), &patch).await.unwrap_err();
        assert!(matches!(err, IntakeError::NotFound { .. }));
    }
}
