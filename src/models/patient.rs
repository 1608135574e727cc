use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IntakeError;

use super::assessment::AssessmentWithDoctor;

/// Patient demographics plus the assessment fields captured on the same
/// sheet. Age stays text here and in the patients table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientForm {
    pub name: String,
    pub age: String,
    pub contact: String,
    pub gender: String,
    pub symptoms: Vec<String>,
    pub emotional: String,
    pub financial: String,
    pub spiritual: String,
    pub trauma: String,
}

impl PatientForm {
    /// The four required-field checks. Everything else on the sheet is
    /// optional, including the whole assessment section.
    pub fn validate(&self) -> Result<(), IntakeError> {
        for (field, value) in [
            ("name", &self.name),
            ("age", &self.age),
            ("contact", &self.contact),
            ("gender", &self.gender),
        ] {
            if value.trim().is_empty() {
                return Err(IntakeError::validation(field, "required"));
            }
        }
        Ok(())
    }
}

/// A patients row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: Uuid,
    pub name: String,
    pub age: String,
    pub contact: String,
    pub gender: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sparse update for a patients row. `None` means "leave untouched" —
/// fields are checked by presence, not truthiness.
#[derive(Debug, Clone, Default)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub age: Option<String>,
    pub contact: Option<String>,
    pub gender: Option<String>,
}

impl PatientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.contact.is_none() && self.gender.is_none()
    }
}

/// A patient with its assessments, each carrying a doctor summary.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientWithAssessments {
    #[serde(flatten)]
    pub patient: PatientRecord,
    #[serde(default)]
    pub patient_assessments: Vec<AssessmentWithDoctor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> PatientForm {
        PatientForm {
            name: "Jane Doe".into(),
            age: "40".into(),
            contact: "555-0102".into(),
            gender: "female".into(),
            ..Default::default()
        }
    }

    #[test]
    fn complete_form_passes_validation() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn each_required_field_is_checked() {
        for field in ["name", "age", "contact", "gender"] {
            let mut form = valid_form();
            match field {
                "name" => form.name.clear(),
                "age" => form.age.clear(),
                "contact" => form.contact.clear(),
                _ => form.gender.clear(),
            }
            let err = form.validate().unwrap_err();
            match err {
                IntakeError::Validation { field: f, .. } => assert_eq!(f, field),
                other => panic!("expected validation error, got {other}"),
            }
        }
    }

    #[test]
    fn whitespace_only_fields_fail_validation() {
        let mut form = valid_form();
        form.contact = "   ".into();
        assert!(form.validate().is_err());
    }

    #[test]
    fn empty_patch_knows_it_is_empty() {
        assert!(PatientPatch::default().is_empty());
        let patch = PatientPatch {
            name: Some("Jane".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
