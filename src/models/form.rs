//! Intake form state.
//!
//! The sheet is one screen: patient demographics, doctor demographics, the
//! symptom checklist and four assessment narratives. State lives in this
//! struct for the lifetime of the form and is owned by whoever renders it;
//! there is no process-wide container.

use crate::error::IntakeError;

use super::doctor::DoctorForm;
use super::patient::PatientForm;

/// The symptom checklist vocabulary, in display order.
pub const SYMPTOM_CHECKLIST: [&str; 12] = [
    "Pain",
    "Nausea/Vomiting",
    "Fatigue",
    "Shortness of Breath",
    "Loss of Appetite",
    "Sleep Disturbances",
    "Anxiety",
    "Depression",
    "Constipation",
    "Difficulty Swallowing",
    "Confusion",
    "Weakness",
];

/// Doctor specialization options.
pub const SPECIALIZATIONS: [&str; 8] = [
    "pain-management",
    "palliative-care",
    "anesthesiology",
    "oncology",
    "neurology",
    "orthopedics",
    "general-medicine",
    "other",
];

/// Doctor qualification options.
pub const QUALIFICATIONS: [&str; 7] = ["mbbs", "md", "ms", "dnb", "diploma", "fellowship", "other"];

/// Gender options on the doctor form.
pub const DOCTOR_GENDERS: [&str; 3] = ["male", "female", "other"];

/// Gender options on the patient form.
pub const PATIENT_GENDERS: [&str; 4] = ["male", "female", "other", "prefer-not-to-say"];

/// One intake sheet's in-memory state.
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    pub doctor: DoctorForm,
    pub patient: PatientForm,
}

impl IntakeForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a checklist symptom on the patient section.
    pub fn toggle_symptom(&mut self, symptom: &str) {
        let symptoms = &mut self.patient.symptoms;
        match symptoms.iter().position(|s| s == symptom) {
            Some(i) => {
                symptoms.remove(i);
            }
            None => symptoms.push(symptom.to_string()),
        }
    }

    /// Required-field checks before submission.
    pub fn validate(&self) -> Result<(), IntakeError> {
        self.patient.validate()
    }

    /// Clear the sheet after a successful save.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
