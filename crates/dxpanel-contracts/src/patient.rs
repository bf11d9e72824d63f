//! The patient record handed to a deliberation.
//!
//! A record is a nested JSON document: `personal_information`,
//! `medical_history`, `vital_signs_data` (ECG and video-derived vitals) and
//! `symptoms_context`. The engine reads a few clinical paths directly and
//! otherwise passes the document through to prompts untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::{resolve_path, resolve_str};

/// An immutable patient record.
///
/// The engine never mutates a caller's record. The anonymizer works on a
/// clone and the result carries the caller's original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientRecord(pub Value);

impl PatientRecord {
    /// Wrap a JSON document as a patient record.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a dot-separated path inside the record.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        resolve_path(&self.0, path)
    }

    /// The presenting complaint, e.g. `chest_pain`.
    pub fn chief_complaint(&self) -> Option<&str> {
        resolve_str(&self.0, "symptoms_context.chief_complaint")
    }

    /// Heart rate reported by the cardiac-rhythm analysis, in beats per minute.
    pub fn ecg_heart_rate(&self) -> Option<f64> {
        self.lookup("vital_signs_data.ecg_analysis.heart_rate_bpm")
            .and_then(Value::as_f64)
    }

    /// Pretty-printed JSON used when the record is embedded in a prompt.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

impl From<Value> for PatientRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
