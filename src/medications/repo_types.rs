use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Largest stock a medication may hold.
pub const MAX_REMAINING_QUANTITY: i32 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Medication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub drug_id: Option<Uuid>,
    pub name: String,
    pub dosage: i32,             // units consumed per dose, >= 1
    pub notes: Option<String>,
    pub remaining_quantity: i32, // units in stock, >= 0
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_taken: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseAction {
    Increase,
    Decrease,
}

impl Medication {
    /// Whole doses left in stock.
    pub fn remaining_doses(&self) -> i32 {
        if self.dosage <= 0 {
            return 0;
        }
        self.remaining_quantity / self.dosage
    }

    /// Consumes one unit and stamps `last_taken`. Returns `false` and leaves
    /// the medication untouched when nothing is left.
    pub fn take_dose(&mut self, now: OffsetDateTime) -> bool {
        if self.remaining_quantity <= 0 {
            return false;
        }
        self.remaining_quantity -= 1;
        self.last_taken = Some(now);
        true
    }

    /// Moves stock by one unit. Decreasing an empty stock is a no-op;
    /// increasing a full one is refused with `false`.
    pub fn adjust(&mut self, action: DoseAction) -> bool {
        match action {
            DoseAction::Increase => match self.remaining_quantity.checked_add(1) {
                Some(next) if next <= MAX_REMAINING_QUANTITY => {
                    self.remaining_quantity = next;
                    true
                }
                _ => false,
            },
            DoseAction::Decrease => {
                if self.remaining_quantity > 0 {
                    self.remaining_quantity -= 1;
                }
                true
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrugUnit {
    Mg,
    G,
}

impl DrugUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DrugUnit::Mg => "mg",
            DrugUnit::G => "g",
        }
    }
}

/// Strength of the active substance a medication is linked to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Drug {
    pub id: Uuid,
    pub quantity: i32,
    pub unit: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}


#[cfg(test)]
mod tests {
    use super::fixtures::medication;
    use super::*;
    use time::macros::datetime;

    #[test]
    fn remaining_doses_is_integer_division() {
        assert_eq!(medication(1, 10).remaining_doses(), 10);
        assert_eq!(medication(3, 10).remaining_doses(), 3);
        assert_eq!(medication(4, 3).remaining_doses(), 0);
        assert_eq!(medication(2, 0).remaining_doses(), 0);
    }

    #[test]
    fn take_dose_decrements_by_one_and_stamps_time() {
        let now = datetime!(2025-02-19 21:28 UTC);
        let mut med = medication(2, 5);
        assert!(med.take_dose(now));
        assert_eq!(med.remaining_quantity, 4);
        assert_eq!(med.last_taken, Some(now));
    }

    #[test]
    fn take_dose_on_empty_stock_is_noop() {
        let mut med = medication(1, 0);
        let before = med.clone();
        assert!(!med.take_dose(datetime!(2025-02-19 21:28 UTC)));
        assert_eq!(med, before);
    }

    #[test]
    fn adjust_never_goes_negative() {
        let mut med = medication(1, 1);
        assert!(med.adjust(DoseAction::Decrease));
        assert_eq!(med.remaining_quantity, 0);
        assert!(med.adjust(DoseAction::Decrease));
        assert_eq!(med.remaining_quantity, 0);
        assert!(med.adjust(DoseAction::Increase));
        assert_eq!(med.remaining_quantity, 1);
    }

    #[test]
    fn adjust_refuses_to_grow_past_ceiling() {
        let mut full = medication(1, MAX_REMAINING_QUANTITY);
        assert!(!full.adjust(DoseAction::Increase));
        assert_eq!(full.remaining_quantity, MAX_REMAINING_QUANTITY);

        let mut overflowing = medication(1, i32::MAX);
        assert!(!overflowing.adjust(DoseAction::Increase));
        assert_eq!(overflowing.remaining_quantity, i32::MAX);
        assert!(overflowing.adjust(DoseAction::Decrease));
        assert_eq!(overflowing.remaining_quantity, i32::MAX - 1);
    }

    #[test]
    fn serializes_timestamps_as_rfc3339() {
        let mut med = medication(1, 1);
        med.last_taken = Some(datetime!(2025-02-19 21:28 UTC));
        let json = serde_json::to_value(&med).unwrap();
        assert_eq!(json["last_taken"], "2025-02-19T21:28:00Z");
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn dose_action_wire_names() {
        let a: DoseAction = serde_json::from_str("\"increase\"").unwrap();
        assert_eq!(a, DoseAction::Increase);
        assert!(serde_json::from_str::<DoseAction>("\"double\"").is_err());
        assert_eq!(DrugUnit::G.as_str(), "g");
    }
}
