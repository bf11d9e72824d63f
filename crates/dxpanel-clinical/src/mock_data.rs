//! Fictional patient data for the CLI and tests.
//!
//! Nothing here describes a real person.

use serde_json::json;

use dxpanel_contracts::patient::PatientRecord;

/// A 45-year-old presenting with chest pain, an elevated heart rate,
/// borderline oxygen saturation and a raised respiratory rate.
pub fn sample_patient_record() -> PatientRecord {
    PatientRecord::new(json!({
        "personal_information": {
            "full_name": "Budi Santoso",
            "age": 45,
            "gender": "male",
            "phone_number": "+62812000000"
        },
        "medical_history": {
            "known_conditions": ["hypertension"],
            "current_medications": ["Lisinopril 10mg daily"],
            "allergies": ["penicillin"]
        },
        "vital_signs_data": {
            "ecg_analysis": {
                "heart_rate_bpm": 95.1,
                "rhythm_analysis": "sinus rhythm",
                "confidence_score": 0.91
            },
            "video_vitals_analysis": {
                "spo2_mean": 93.8,
                "pulse_rate_mean": 94.3,
                "respiratory_rate_mean": 22.6,
                "confidence_score": 0.87
            }
        },
        "symptoms_context": {
            "chief_complaint": "chest_pain",
            "pain_scale": 7,
            "staff_observations": "Patient appears anxious, diaphoretic"
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_carries_identifying_fields_and_clinical_paths() {
        let record = sample_patient_record();
        assert!(record.lookup("personal_information.full_name").is_some());
        assert!(record.lookup("personal_information.phone_number").is_some());
        assert_eq!(record.chief_complaint(), Some("chest_pain"));
        assert_eq!(record.ecg_heart_rate(), Some(95.1));
    }
}
