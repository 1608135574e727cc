use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::db::store::{Row, SelectQuery, TableStore, DOCTORS};
use crate::error::IntakeError;
use crate::models::{DoctorForm, DoctorRecord};

use super::decode;

/// Uniqueness pair the store enforces for doctors.
pub const DOCTOR_CONFLICT_KEY: [&str; 2] = ["full_name", "contact"];

/// Translate the form into the doctors row shape. The age box is free
/// text: blank becomes SQL null, anything non-numeric is rejected here,
/// before a request goes out.
fn doctor_row(doctor: &DoctorForm) -> Result<Row, IntakeError> {
    let age = match doctor.age.trim() {
        "" => Value::Null,
        raw => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| IntakeError::validation("age", &format!("not a number: {raw:?}")))?,
    };

    let mut row = Map::new();
    row.insert("full_name".into(), json!(doctor.full_name));
    row.insert("age".into(), age);
    row.insert("contact".into(), json!(doctor.contact));
    row.insert("specialization".into(), json!(doctor.specialization));
    row.insert("gender".into(), json!(doctor.gender));
    row.insert("emergency_contact".into(), json!(doctor.emergency_contact));
    row.insert("qualifications".into(), json!(doctor.qualifications));
    Ok(row)
}

pub async fn insert_doctor(
    store: &impl TableStore,
    doctor: &DoctorForm,
) -> Result<DoctorRecord, IntakeError> {
    let row = doctor_row(doctor)?;
    let stored = store.insert(DOCTORS, row).await?;
    decode(DOCTORS, stored)
}

/// Create the doctor or refresh the existing row with the same
/// (full_name, contact). Last write wins; no field-level merge.
pub async fn upsert_doctor(store: &impl TableStore, doctor: &DoctorForm) -> Result<(), IntakeError> {
    let row = doctor_row(doctor)?;
    store.upsert(DOCTORS, row, &DOCTOR_CONFLICT_KEY).await
}

/// Look a doctor up by the identity pair. The upsert does not return the
/// generated id, so the save workflow comes back through here.
pub async fn find_doctor_by_identity(
    store: &impl TableStore,
    full_name: &str,
    contact: &str,
) -> Result<Option<DoctorRecord>, IntakeError> {
    let query = SelectQuery::new()
        .eq("full_name", full_name)
        .eq("contact", contact);
    let mut rows = store.select(DOCTORS, &query).await?;
    if rows.is_empty() {
        return Ok(None);
    }
    decode(DOCTORS, rows.remove(0)).map(Some)
}

pub async fn get_doctor_by_id(
    store: &impl TableStore,
    id: Uuid,
) -> Result<Option<DoctorRecord>, IntakeError> {
    let query = SelectQuery::new().eq("id", id.to_string());
    let mut rows = store.select(DOCTORS, &query).await?;
    if rows.is_empty() {
        return Ok(None);
    }
    decode(DOCTORS, rows.remove(0)).map(Some)
}
