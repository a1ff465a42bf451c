use crate::medications::repo_types::Medication;

/// A tracked field whose value differs between two versions of a medication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old_value: String,
    pub new_value: String,
}

fn render_notes(notes: &Option<String>) -> String {
    notes.clone().unwrap_or_default()
}

/// Tracked fields are `dosage`, `notes` and `remaining_quantity`, in that order.
pub fn diff(before: &Medication, after: &Medication) -> Vec<FieldChange> {
    let candidates = [
        ("dosage", before.dosage.to_string(), after.dosage.to_string()),
        ("notes", render_notes(&before.notes), render_notes(&after.notes)),
        (
            "remaining_quantity",
            before.remaining_quantity.to_string(),
            after.remaining_quantity.to_string(),
        ),
    ];

    candidates
        .into_iter()
        .filter(|(_, old, new)| old != new)
        .map(|(field, old_value, new_value)| FieldChange {
            field,
            old_value,
            new_value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medications::repo_types::fixtures::medication;

    #[test]
    fn identical_versions_produce_nothing() {
        let med = medication(2, 10);
        assert!(diff(&med, &med.clone()).is_empty());
    }

    #[test]
    fn each_changed_field_is_recorded_once() {
        let before = medication(2, 10);
        let mut after = before.clone();
        after.dosage = 3;
        after.notes = Some("after food".into());
        after.remaining_quantity = 7;

        let changes = diff(&before, &after);
        assert_eq!(
            changes,
            vec![
                FieldChange {
                    field: "dosage",
                    old_value: "2".into(),
                    new_value: "3".into()
                },
                FieldChange {
                    field: "notes",
                    old_value: "".into(),
                    new_value: "after food".into()
                },
                FieldChange {
                    field: "remaining_quantity",
                    old_value: "10".into(),
                    new_value: "7".into()
                },
            ]
        );
    }

    #[test]
    fn untracked_fields_are_ignored() {
        let before = medication(1, 1);
        let mut after = before.clone();
        after.name = "Paralen".into();
        after.last_taken = Some(time::OffsetDateTime::UNIX_EPOCH);
        assert!(diff(&before, &after).is_empty());
    }

    #[test]
    fn empty_notes_equal_missing_notes() {
        let before = medication(1, 1);
        let mut after = before.clone();
        after.notes = Some(String::new());
        assert!(diff(&before, &after).is_empty());
    }
}
