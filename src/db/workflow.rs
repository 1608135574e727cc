//! The aggregate save: one completed intake becomes a doctor upsert, a
//! doctor lookup, a patient insert and an assessment insert, in that
//! order. Later steps need the identifiers earlier steps produce, so the
//! chain never runs in parallel.
//!
//! There is no rollback: a failure partway leaves the completed steps'
//! rows in place, so an assessment-insert failure strands the patient row.
//! A double submission creates a second patient and assessment — only the
//! doctor upsert is naturally idempotent on its conflict key.

use tracing::{info, warn};

use crate::error::IntakeError;
use crate::models::{AssessmentRecord, DoctorForm, DoctorRecord, PatientForm, PatientRecord};

use super::repository::assessment::insert_assessment;
use super::repository::doctor::{find_doctor_by_identity, upsert_doctor};
use super::repository::patient::insert_patient;
use super::store::TableStore;

/// Which of the save steps failed. Rendered into the error message so the
/// caller can report more than "the save failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    DoctorUpsert,
    DoctorLookup,
    PatientInsert,
    AssessmentInsert,
}

impl std::fmt::Display for SaveStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DoctorUpsert => write!(f, "doctor upsert"),
            Self::DoctorLookup => write!(f, "doctor lookup"),
            Self::PatientInsert => write!(f, "patient creation"),
            Self::AssessmentInsert => write!(f, "assessment creation"),
        }
    }
}

/// Everything one successful intake persisted.
#[derive(Debug, Clone)]
pub struct CompletedIntake {
    pub doctor: DoctorRecord,
    pub patient: PatientRecord,
    pub assessment: AssessmentRecord,
}

/// Persist one completed intake.
///
/// Strictly sequential; the first failure aborts the remaining steps and
/// is tagged with the step it occurred in. Required patient fields are
/// checked before any request goes out.
pub async fn save_complete_assessment(
    store: &impl TableStore,
    doctor: &DoctorForm,
    patient: &PatientForm,
) -> Result<CompletedIntake, IntakeError> {
    patient.validate()?;

    upsert_doctor(store, doctor)
        .await
        .map_err(|e| e.in_step(SaveStep::DoctorUpsert))?;

    // the upsert returns no row, so resolve the generated id by the same
    // identity pair it conflicted on
    let doctor_record = find_doctor_by_identity(store, &doctor.full_name, &doctor.contact)
        .await
        .map_err(|e| e.in_step(SaveStep::DoctorLookup))?
        .ok_or_else(|| {
            IntakeError::not_found(
                "doctor",
                format!("{} / {}", doctor.full_name, doctor.contact),
            )
            .in_step(SaveStep::DoctorLookup)
        })?;

    let patient_record = insert_patient(store, patient)
        .await
        .map_err(|e| e.in_step(SaveStep::PatientInsert))?;

    let assessment = insert_assessment(store, patient_record.id, doctor_record.id, patient)
        .await
        .map_err(|e| {
            // the patient row from the previous step stays behind; there
            // is no compensating delete
            warn!(patient_id = %patient_record.id, "assessment insert failed after patient insert");
            e.in_step(SaveStep::AssessmentInsert)
        })?;

    info!(
        doctor_id = %doctor_record.id,
        patient_id = %patient_record.id,
        assessment_id = %assessment.id,
        "intake saved"
    );

    Ok(CompletedIntake {
        doctor: doctor_record,
        patient: patient_record,
        assessment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::store::{ASSESSMENTS, DOCTORS, PATIENTS};

    fn dr_a() -> DoctorForm {
        DoctorForm {
            full_name: "Dr. A".into(),
            contact: "555-1".into(),
            specialization: "palliative-care".into(),
            ..Default::default()
        }
    }

    fn p1() -> PatientForm {
        PatientForm {
            name: "P1".into(),
            age: "40".into(),
            contact: "555-2".into(),
            gender: "female".into(),
            symptoms: vec!["Pain".into()],
            emotional: "calm".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn full_intake_creates_one_row_per_table() {
        let store = MemoryStore::new();
        let intake = save_complete_assessment(&store, &dr_a(), &p1())
            .await
            .unwrap();

        assert_eq!(store.rows(DOCTORS).len(), 1);
        assert_eq!(store.rows(PATIENTS).len(), 1);
        assert_eq!(store.rows(ASSESSMENTS).len(), 1);

        assert_eq!(intake.doctor.full_name, "Dr. A");
        assert_eq!(intake.patient.name, "P1");
        assert_eq!(intake.assessment.patient_id, intake.patient.id);
        assert_eq!(intake.assessment.doctor_id, intake.doctor.id);
        assert_eq!(intake.assessment.symptoms, vec!["Pain"]);
    }

    #[tokio::test]
    async fn resubmission_reuses_the_doctor_but_duplicates_the_rest() {
        let store = MemoryStore::new();
        save_complete_assessment(&store, &dr_a(), &p1()).await.unwrap();
        save_complete_assessment(&store, &dr_a(), &p1()).await.unwrap();

        assert_eq!(store.rows(DOCTORS).len(), 1);
        assert_eq!(store.rows(PATIENTS).len(), 2);
        assert_eq!(store.rows(ASSESSMENTS).len(), 2);
    }

    #[tokio::test]
    async fn doctor_failure_stops_the_chain_before_the_patient_insert() {
        let store = MemoryStore::new();
        store.fail_next_upsert(DOCTORS, "constraint violation");

        let err = save_complete_assessment(&store, &dr_a(), &p1())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("doctor upsert failed"), "{err}");
        assert!(store.rows(PATIENTS).is_empty());
        assert!(store.rows(ASSESSMENTS).is_empty());
    }

    #[tokio::test]
    async fn assessment_failure_leaves_the_patient_row_behind() {
        let store = MemoryStore::new();
        store.fail_next_insert(ASSESSMENTS, "network failure");

        let err = save_complete_assessment(&store, &dr_a(), &p1())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("assessment creation failed"), "{err}");
        assert!(err.to_string().contains("network failure"));

        // no rollback: the orphaned patient persists
        assert_eq!(store.rows(DOCTORS).len(), 1);
        assert_eq!(store.rows(PATIENTS).len(), 1);
        assert!(store.rows(ASSESSMENTS).is_empty());
    }

    #[tokio::test]
    async fn invalid_patient_aborts_before_any_write() {
        let store = MemoryStore::new();
        let mut patient = p1();
        patient.age.clear();

        let err = save_complete_assessment(&store, &dr_a(), &patient)
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Validation { ref field, .. } if field == "age"));
        assert!(store.rows(DOCTORS).is_empty());
        assert!(store.rows(PATIENTS).is_empty());
    }
}
