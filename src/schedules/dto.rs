use serde::{Deserialize, Serialize};
use time::Time;
use uuid::Uuid;

use super::repo_types::{hour_minute, DayOfWeek};
use crate::error::{AppError, FieldErrors};

/// Body for adding a schedule slot; both parts are optional but not both at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleInput {
    #[serde(default)]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default, with = "hour_minute::option")]
    pub time: Option<Time>,
}

impl ScheduleInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut fields = FieldErrors::new();
        if self.day_of_week.is_none() && self.time.is_none() {
            fields.insert("schedule", "day_of_week or time is required".into());
        }
        AppError::check(fields)
    }
}

/// One dose planned for the current weekday.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PlannedDose {
    pub schedule_id: Uuid,
    pub medication_id: Uuid,
    pub medication_name: String,
    pub dosage: i32,
    #[serde(with = "hour_minute::option")]
    pub time: Option<Time>,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub day_of_week: DayOfWeek,
    pub doses: Vec<PlannedDose>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn parses_day_and_time() {
        let input: ScheduleInput =
            serde_json::from_str(r#"{"day_of_week":"Tuesday","time":"07:45"}"#).unwrap();
        assert_eq!(input.day_of_week, Some(DayOfWeek::Tuesday));
        assert_eq!(input.time, Some(time!(07:45)));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn either_part_is_enough() {
        let day_only: ScheduleInput = serde_json::from_str(r#"{"day_of_week":"Sunday"}"#).unwrap();
        assert!(day_only.validate().is_ok());
        let time_only: ScheduleInput = serde_json::from_str(r#"{"time":"21:00"}"#).unwrap();
        assert!(time_only.validate().is_ok());
    }

    #[test]
    fn empty_schedule_is_rejected() {
        let input: ScheduleInput = serde_json::from_str("{}").unwrap();
        assert!(matches!(input.validate(), Err(AppError::Validation(f)) if f.contains_key("schedule")));
    }

    #[test]
    fn malformed_time_fails_to_parse() {
        assert!(serde_json::from_str::<ScheduleInput>(r#"{"time":"25:99"}"#).is_err());
        assert!(serde_json::from_str::<ScheduleInput>(r#"{"day_of_week":"Someday"}"#).is_err());
    }
}
