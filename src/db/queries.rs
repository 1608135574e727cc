//! Read paths. These bypass the save workflow and hit the store directly;
//! every function is a single query with no side effects.

use uuid::Uuid;

use crate::error::IntakeError;
use crate::models::{DoctorRecord, PatientRecord, PatientWithAssessments};

use super::repository::decode;
use super::store::{Embed, SelectQuery, TableStore, ASSESSMENTS, DOCTORS, PATIENTS};

/// The nested join used by the patient read paths: each patient's
/// assessments, each assessment's doctor summary.
fn assessments_embed() -> Embed {
    Embed::children(ASSESSMENTS, "patient_id")
        .nest(Embed::parent(DOCTORS, "doctor_id").columns(&["full_name", "specialization"]))
}

/// All patients, newest first, with their nested assessments.
pub async fn list_patients_with_assessments(
    store: &impl TableStore,
) -> Result<Vec<PatientWithAssessments>, IntakeError> {
    let query = SelectQuery::new()
        .order_desc("created_at")
        .embed(assessments_embed());
    let rows = store.select(PATIENTS, &query).await?;
    rows.into_iter().map(|row| decode(PATIENTS, row)).collect()
}

/// One patient with the same nested shape. `Ok(None)` is the not-found
/// outcome; errors are reserved for transport and store failures.
pub async fn get_patient_by_id(
    store: &impl TableStore,
    id: Uuid,
) -> Result<Option<PatientWithAssessments>, IntakeError> {
    let query = SelectQuery::new()
        .eq("id", id.to_string())
        .embed(assessments_embed());
    let mut rows = store.select(PATIENTS, &query).await?;
    if rows.is_empty() {
        return Ok(None);
    }
    decode(PATIENTS, rows.remove(0)).map(Some)
}

/// All doctors, alphabetical by name.
pub async fn list_doctors(store: &impl TableStore) -> Result<Vec<DoctorRecord>, IntakeError> {
    let query = SelectQuery::new().order_asc("full_name");
    let rows = store.select(DOCTORS, &query).await?;
    rows.into_iter().map(|row| decode(DOCTORS, row)).collect()
}

/// Case-insensitive substring search on patient name or contact, newest
/// first. A blank term matches every patient.
pub async fn search_patients(
    store: &impl TableStore,
    term: &str,
) -> Result<Vec<PatientRecord>, IntakeError> {
    let query = SelectQuery::new()
        .search(&["name", "contact"], term.trim())
        .order_desc("created_at");
    let rows = store.select(PATIENTS, &query).await?;
    rows.into_iter().map(|row| decode(PATIENTS, row)).collect()
}
