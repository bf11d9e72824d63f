//! Anonymization filter applied before a record reaches any prompt.

use serde_json::Value;

use dxpanel_contracts::patient::PatientRecord;

/// Direct identifiers removed from `personal_information`.
pub const IDENTIFYING_FIELDS: [&str; 2] = ["full_name", "phone_number"];

/// Return a copy of `record` without direct identifiers.
///
/// Only the listed keys of the top-level `personal_information` object are
/// removed; missing keys and non-object sections are left alone.
pub fn anonymize(record: &PatientRecord) -> PatientRecord {
    let mut copy = record.clone();
    if let Some(info) = copy
        .0
        .get_mut("personal_information")
        .and_then(Value::as_object_mut)
    {
        for field in IDENTIFYING_FIELDS {
            info.remove(field);
        }
    }
    copy
}
