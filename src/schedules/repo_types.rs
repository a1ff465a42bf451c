use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Time;
use uuid::Uuid;

time::serde::format_description!(pub hour_minute, Time, "[hour]:[minute]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unknown day of week: {s}"))
    }
}

impl From<time::Weekday> for DayOfWeek {
    fn from(w: time::Weekday) -> Self {
        match w {
            time::Weekday::Monday => DayOfWeek::Monday,
            time::Weekday::Tuesday => DayOfWeek::Tuesday,
            time::Weekday::Wednesday => DayOfWeek::Wednesday,
            time::Weekday::Thursday => DayOfWeek::Thursday,
            time::Weekday::Friday => DayOfWeek::Friday,
            time::Weekday::Saturday => DayOfWeek::Saturday,
            time::Weekday::Sunday => DayOfWeek::Sunday,
        }
    }
}

/// Schedule row; `day_of_week` holds a [`DayOfWeek`] name.
#[derive(Debug, Clone, FromRow)]
pub struct Schedule {
    pub id: Uuid,
    pub day_of_week: Option<String>,
    pub time_of_day: Option<Time>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub id: Uuid,
    pub day_of_week: Option<DayOfWeek>,
    #[serde(with = "hour_minute::option")]
    pub time: Option<Time>,
}

impl From<Schedule> for ScheduleView {
    fn from(s: Schedule) -> Self {
        Self {
            id: s.id,
            day_of_week: s.day_of_week.as_deref().and_then(|d| d.parse().ok()),
            time: s.time_of_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, time};

    #[test]
    fn parses_day_names_case_insensitively() {
        assert_eq!("monday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!(" Sunday ".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
        assert!("Pondeli".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn every_day_round_trips_through_its_name() {
        for day in DayOfWeek::ALL {
            assert_eq!(day.to_string().parse::<DayOfWeek>().unwrap(), day);
        }
    }

    #[test]
    fn converts_from_calendar_weekday() {
        let wednesday = datetime!(2025-02-19 12:00 UTC);
        assert_eq!(DayOfWeek::from(wednesday.weekday()), DayOfWeek::Wednesday);
    }

    #[test]
    fn view_renders_time_as_hour_minute() {
        let view = ScheduleView::from(Schedule {
            id: Uuid::nil(),
            day_of_week: Some("Friday".into()),
            time_of_day: Some(time!(08:30)),
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["day_of_week"], "Friday");
        assert_eq!(json["time"], "08:30");
    }

    #[test]
    fn view_with_empty_slots() {
        let view = ScheduleView {
            id: Uuid::nil(),
            day_of_week: None,
            time: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["day_of_week"].is_null());
        assert!(json["time"].is_null());
    }
}
