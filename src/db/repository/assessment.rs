use serde_json::{json, Map};
use uuid::Uuid;

use crate::db::store::{Row, TableStore, ASSESSMENTS};
use crate::error::IntakeError;
use crate::models::{AssessmentPatch, AssessmentRecord, PatientForm};

use super::decode;

/// The sheet's assessment section keyed to an already-persisted patient
/// and doctor. The form's `trauma` narrative lands in the
/// `medical_history` column.
fn assessment_row(patient_id: Uuid, doctor_id: Uuid, form: &PatientForm) -> Row {
    let mut row = Map::new();
    row.insert("patient_id".into(), json!(patient_id));
    row.insert("doctor_id".into(), json!(doctor_id));
    row.insert("symptoms".into(), json!(form.symptoms));
    row.insert("emotional_assessment".into(), json!(form.emotional));
    row.insert("financial_assessment".into(), json!(form.financial));
    row.insert("spiritual_assessment".into(), json!(form.spiritual));
    row.insert("medical_history".into(), json!(form.trauma));
    row
}

fn patch_row(patch: &AssessmentPatch) -> Result<Row, IntakeError> {
    let mut row = Map::new();
    if let Some(symptoms) = &patch.symptoms {
        row.insert("symptoms".into(), json!(symptoms));
    }
    if let Some(emotional) = &patch.emotional {
        row.insert("emotional_assessment".into(), json!(emotional));
    }
    if let Some(financial) = &patch.financial {
        row.insert("financial_assessment".into(), json!(financial));
    }
    if let Some(spiritual) = &patch.spiritual {
        row.insert("spiritual_assessment".into(), json!(spiritual));
    }
    if let Some(trauma) = &patch.trauma {
        row.insert("medical_history".into(), json!(trauma));
    }
    if row.is_empty() {
        return Err(IntakeError::validation("patch", "no fields to update"));
    }
    Ok(row)
}

pub async fn insert_assessment(
    store: &impl TableStore,
    patient_id: Uuid,
    doctor_id: Uuid,
    form: &PatientForm,
) -> Result<AssessmentRecord, IntakeError> {
    let row = assessment_row(patient_id, doctor_id, form);
    let stored = store.insert(ASSESSMENTS, row).await?;
    decode(ASSESSMENTS, stored)
}

/// Sparse patch: only fields present in the input are sent. A narrative
/// set to `Some("")` is a deliberate clearing, distinct from `None`.
pub async fn update_assessment(
    store: &impl TableStore,
    id: Uuid,
    patch: &AssessmentPatch,
) -> Result<AssessmentRecord, IntakeError> {
    let row = patch_row(patch)?;
    let stored = store.update(ASSESSMENTS, &id.to_string(), row).await?;
    decode(ASSESSMENTS, stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn form() -> PatientForm {
        PatientForm {
            name: "Jane Doe".into(),
            age: "40".into(),
            contact: "555-0102".into(),
            gender: "female".into(),
            symptoms: vec!["Pain".into(), "Fatigue".into()],
            emotional: "anxious about prognosis".into(),
            financial: "stable".into(),
            spiritual: "finds comfort in family".into(),
            trauma: "prior surgery 2019".into(),
        }
    }

    #[tokio::test]
    async fn insert_links_patient_and_doctor() {
        let store = MemoryStore::new();
        let patient_id = Uuid::new_v4();
        let doctor_id = Uuid::new_v4();

        let record = insert_assessment(&store, patient_id, doctor_id, &form())
            .await
            .unwrap();
        assert_eq!(record.patient_id, patient_id);
        assert_eq!(record.doctor_id, doctor_id);
        assert_eq!(record.symptoms, vec!["Pain", "Fatigue"]);
        assert_eq!(record.medical_history, "prior surgery 2019");
    }

    #[tokio::test]
    async fn sparse_update_touches_only_named_narratives() {
        let store = MemoryStore::new();
        let record = insert_assessment(&store, Uuid::new_v4(), Uuid::new_v4(), &form())
            .await
            .unwrap();

        let patch = AssessmentPatch {
            financial: Some("new debt concerns".into()),
            ..Default::default()
        };
        let updated = update_assessment(&store, record.id, &patch).await.unwrap();

        assert_eq!(updated.financial_assessment, "new debt concerns");
        assert_eq!(updated.emotional_assessment, "anxious about prognosis");
        assert_eq!(updated.spiritual_assessment, "finds comfort in family");
        assert_eq!(updated.medical_history, "prior surgery 2019");
    }

    #[tokio::test]
    async fn present_but_empty_narrative_clears_the_column() {
        let store = MemoryStore::new();
        let record = insert_assessment(&store, Uuid::new_v4(), Uuid::new_v4(), &form())
            .await
            .unwrap();

        let patch = AssessmentPatch {
            emotional: Some(String::new()),
            ..Default::default()
        };
        let updated = update_assessment(&store, record.id, &patch).await.unwrap();

        assert_eq!(updated.emotional_assessment, "");
        assert_eq!(updated.financial_assessment, "stable");
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let store = MemoryStore::new();
        let err = update_assessment(&store, Uuid::new_v4(), &AssessmentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Validation { .. }));
    }
}
