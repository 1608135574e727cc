use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Doctor demographics as entered on the intake sheet. Everything is text
/// at this stage; only `full_name` and `contact` identify the doctor, the
/// rest may be left blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorForm {
    pub full_name: String,
    pub age: String,
    pub contact: String,
    pub specialization: String,
    pub gender: String,
    pub emergency_contact: String,
    pub qualifications: String,
}

/// A doctors row as persisted. `(full_name, contact)` is the uniqueness
/// pair the store is expected to enforce; `id` is store-generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: Uuid,
    pub full_name: String,
    pub age: Option<i64>,
    pub contact: String,
    pub specialization: String,
    pub gender: String,
    pub emergency_contact: String,
    pub qualifications: String,
}

/// The doctor columns embedded in patient read paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub full_name: String,
    pub specialization: String,
}
