use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctor::DoctorSummary;

/// A patient_assessments row as persisted. An assessment only exists for
/// an already-persisted patient and doctor; the foreign keys are never
/// null. The four narrative columns may legitimately be empty strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub symptoms: Vec<String>,
    pub emotional_assessment: String,
    pub financial_assessment: String,
    pub spiritual_assessment: String,
    pub medical_history: String,
    pub created_at: DateTime<Utc>,
}

/// Sparse update for an assessment row. `Some(String::new())` clears a
/// narrative; `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct AssessmentPatch {
    pub symptoms: Option<Vec<String>>,
    pub emotional: Option<String>,
    pub financial: Option<String>,
    pub spiritual: Option<String>,
    pub trauma: Option<String>,
}

impl AssessmentPatch {
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_none()
            && self.emotional.is_none()
            && self.financial.is_none()
            && self.spiritual.is_none()
            && self.trauma.is_none()
    }
}

/// An assessment joined with its doctor's summary columns.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentWithDoctor {
    #[serde(flatten)]
    pub assessment: AssessmentRecord,
    pub doctors: DoctorSummary,
}
