use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    repo::MedicationFields,
    repo_types::{DoseAction, Drug, DrugUnit, Medication, MAX_REMAINING_QUANTITY},
};
use crate::{
    error::{AppError, FieldErrors},
    schedules::{dto::ScheduleInput, repo_types::ScheduleView},
};

pub const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    50
}

impl Pagination {
    /// Limit within `1..=200`, offset non-negative.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 200), self.offset.max(0))
    }
}

/// Editable medication fields as they arrive on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct MedicationInput {
    pub name: String,
    #[serde(default = "default_dosage")]
    pub dosage: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub remaining_quantity: i32,
}
fn default_dosage() -> i32 {
    1
}

impl MedicationInput {
    /// Trims text, turns blank notes into `None`, and checks bounds.
    pub fn validate(self, fields: &mut FieldErrors) -> MedicationFields {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            fields.insert("name", "This field is required".into());
        } else if name.chars().count() > MAX_NAME_LEN {
            fields.insert("name", format!("At most {MAX_NAME_LEN} characters"));
        }
        if self.dosage < 1 {
            fields.insert("dosage", "Must be at least 1".into());
        }
        if self.remaining_quantity < 0 {
            fields.insert("remaining_quantity", "Must not be negative".into());
        } else if self.remaining_quantity > MAX_REMAINING_QUANTITY {
            fields.insert(
                "remaining_quantity",
                format!("At most {MAX_REMAINING_QUANTITY}"),
            );
        }
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        MedicationFields {
            name,
            dosage: self.dosage,
            notes,
            remaining_quantity: self.remaining_quantity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrugInput {
    #[serde(default = "default_drug_quantity")]
    pub quantity: i32,
    #[serde(default = "default_drug_unit")]
    pub unit: DrugUnit,
}
fn default_drug_quantity() -> i32 {
    1
}
fn default_drug_unit() -> DrugUnit {
    DrugUnit::Mg
}

#[derive(Debug, Deserialize)]
pub struct CreateMedicationRequest {
    #[serde(flatten)]
    pub medication: MedicationInput,
    #[serde(default)]
    pub drug: Option<DrugInput>,
    #[serde(default)]
    pub schedule: Option<ScheduleInput>,
}

/// Validated create request.
#[derive(Debug)]
pub struct NewMedication {
    pub fields: MedicationFields,
    pub drug: Option<DrugInput>,
    pub schedule: Option<ScheduleInput>,
}

impl CreateMedicationRequest {
    pub fn validate(self) -> Result<NewMedication, AppError> {
        let mut errors = FieldErrors::new();
        let fields = self.medication.validate(&mut errors);
        if let Some(drug) = &self.drug {
            if drug.quantity < 1 {
                errors.insert("drug.quantity", "Must be at least 1".into());
            }
        }
        if let Some(Err(AppError::Validation(schedule_errors))) =
            self.schedule.as_ref().map(ScheduleInput::validate)
        {
            errors.extend(schedule_errors);
        }
        AppError::check(errors)?;
        Ok(NewMedication {
            fields,
            drug: self.drug,
            schedule: self.schedule,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateMedicationRequest {
    #[serde(flatten)]
    pub medication: MedicationInput,
}

impl UpdateMedicationRequest {
    pub fn validate(self) -> Result<MedicationFields, AppError> {
        let mut errors = FieldErrors::new();
        let fields = self.medication.validate(&mut errors);
        AppError::check(errors)?;
        Ok(fields)
    }
}

#[derive(Debug, Deserialize)]
pub struct DoseAdjustRequest {
    pub action: DoseAction,
}

#[derive(Debug, Serialize)]
pub struct MedicationView {
    pub id: Uuid,
    pub name: String,
    pub dosage: i32,
    pub notes: Option<String>,
    pub remaining_quantity: i32,
    pub remaining_doses: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_taken: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Medication> for MedicationView {
    fn from(m: Medication) -> Self {
        Self {
            remaining_doses: m.remaining_doses(),
            id: m.id,
            name: m.name,
            dosage: m.dosage,
            notes: m.notes,
            remaining_quantity: m.remaining_quantity,
            last_taken: m.last_taken,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MedicationDetails {
    #[serde(flatten)]
    pub medication: MedicationView,
    pub drug: Option<Drug>,
    pub schedules: Vec<ScheduleView>,
}

#[derive(Debug, Serialize)]
pub struct DoseTakenResponse {
    /// `false` when the stock was empty and nothing changed.
    pub taken: bool,
    pub medication: MedicationView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medications::repo_types::fixtures::medication;

    fn fields_of(err: AppError) -> FieldErrors {
        match err {
            AppError::Validation(f) => f,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_applies_defaults() {
        let req: CreateMedicationRequest =
            serde_json::from_str(r#"{"name":"  Ibalgin  "}"#).unwrap();
        let new = req.validate().unwrap();
        assert_eq!(new.fields.name, "Ibalgin");
        assert_eq!(new.fields.dosage, 1);
        assert_eq!(new.fields.remaining_quantity, 0);
        assert_eq!(new.fields.notes, None);
        assert!(new.drug.is_none());
        assert!(new.schedule.is_none());
    }

    #[test]
    fn create_reports_every_bad_field() {
        let req: CreateMedicationRequest = serde_json::from_str(
            r#"{"name":" ","dosage":0,"remaining_quantity":-3,"drug":{"quantity":0},"schedule":{}}"#,
        )
        .unwrap();
        let fields = fields_of(req.validate().unwrap_err());
        for key in ["name", "dosage", "remaining_quantity", "drug.quantity", "schedule"] {
            assert!(fields.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn name_length_is_bounded() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let req: UpdateMedicationRequest =
            serde_json::from_value(serde_json::json!({ "name": long })).unwrap();
        assert!(fields_of(req.validate().unwrap_err()).contains_key("name"));
    }

    #[test]
    fn remaining_quantity_is_bounded() {
        let req: UpdateMedicationRequest = serde_json::from_value(serde_json::json!({
            "name": "Paralen",
            "remaining_quantity": i32::MAX,
        }))
        .unwrap();
        assert!(fields_of(req.validate().unwrap_err()).contains_key("remaining_quantity"));

        let req: UpdateMedicationRequest = serde_json::from_value(serde_json::json!({
            "name": "Paralen",
            "remaining_quantity": MAX_REMAINING_QUANTITY,
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap().remaining_quantity, MAX_REMAINING_QUANTITY);
    }

    #[test]
    fn blank_notes_become_none() {
        let req: UpdateMedicationRequest =
            serde_json::from_str(r#"{"name":"A","notes":"   ","dosage":2,"remaining_quantity":4}"#)
                .unwrap();
        let fields = req.validate().unwrap();
        assert_eq!(fields.notes, None);
        assert_eq!(fields.dosage, 2);
    }

    #[test]
    fn create_with_drug_and_schedule() {
        let req: CreateMedicationRequest = serde_json::from_str(
            r#"{"name":"Euthyrox","drug":{"quantity":50,"unit":"g"},"schedule":{"day_of_week":"Monday","time":"06:30"}}"#,
        )
        .unwrap();
        let new = req.validate().unwrap();
        let drug = new.drug.unwrap();
        assert_eq!((drug.quantity, drug.unit), (50, DrugUnit::G));
        assert!(new.schedule.unwrap().time.is_some());
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination { limit: 10_000, offset: -5 };
        assert_eq!(p.clamped(), (200, 0));
        let p = Pagination { limit: 0, offset: 7 };
        assert_eq!(p.clamped(), (1, 7));
    }

    #[test]
    fn view_carries_remaining_doses() {
        let view = MedicationView::from(medication(3, 10));
        assert_eq!(view.remaining_doses, 3);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["remaining_doses"], 3);
        assert!(json["last_taken"].is_null());
    }
}
