//! Consensus scoring for a single debate round.
//!
//! The consensus level is a plurality-agreement ratio, averaged over the
//! risk and urgency signals. Only valid (parsed) responses take part.

use dxpanel_contracts::assessment::SpecialistAssessment;

use crate::signals;

/// Returned when valid responses exist but none carries a risk or urgency
/// signal. Sits halfway between agreement and disagreement.
pub const INSUFFICIENT_SIGNAL_LEVEL: f64 = 0.5;

/// Most frequent value and its count. Ties go to the value seen first.
pub fn plurality<'a, I>(values: I) -> Option<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best
}

/// Share of `values` that agree with the plurality value.
pub fn agreement_ratio(values: &[String]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let (_, count) = plurality(values.iter().map(String::as_str))?;
    Some(count as f64 / values.len() as f64)
}

/// Score one round's responses.
///
/// - no valid responses → `0.0`
/// - valid responses but no extractable signal → [`INSUFFICIENT_SIGNAL_LEVEL`]
/// - otherwise the mean of the risk and urgency agreement ratios that could
///   be computed
pub fn score(responses: &[SpecialistAssessment]) -> f64 {
    let valid: Vec<_> = responses
        .iter()
        .filter_map(|r| r.analysis.as_structured())
        .collect();

    if valid.is_empty() {
        return 0.0;
    }

    let risks: Vec<String> = valid.iter().filter_map(|a| signals::risk_level(a)).collect();
    let urgencies: Vec<String> = valid.iter().filter_map(|a| signals::urgency(a)).collect();

    let ratios: Vec<f64> = [agreement_ratio(&risks), agreement_ratio(&urgencies)]
        .into_iter()
        .flatten()
        .collect();

    if ratios.is_empty() {
        INSUFFICIENT_SIGNAL_LEVEL
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;
    use serde_json::{json, Value};

    use dxpanel_contracts::{
        assessment::{Analysis, RawTextFallback, SpecialistAssessment},
        specialist::{SpecialistId, SpecialistRole},
    };

    use super::*;

    pub(crate) fn structured(id: &str, value: Value) -> SpecialistAssessment {
        SpecialistAssessment {
            specialist_id: SpecialistId::new(id),
            role: SpecialistRole::DifferentialAssessment,
            analysis: Analysis::Structured(value.as_object().cloned().unwrap()),
            produced_at: Utc::now(),
        }
    }

    pub(crate) fn core(id: &str, risk: &str, urgency: &str) -> SpecialistAssessment {
        structured(
            id,
            json!({ "core_assessment": { "risk_level": risk, "urgency": urgency } }),
        )
    }

    pub(crate) fn failed(id: &str) -> SpecialistAssessment {
        SpecialistAssessment {
            specialist_id: SpecialistId::new(id),
            role: SpecialistRole::Validator,
            analysis: Analysis::error("service unavailable"),
            produced_at: Utc::now(),
        }
    }

    pub(crate) fn unparsable(id: &str) -> SpecialistAssessment {
        SpecialistAssessment {
            specialist_id: SpecialistId::new(id),
            role: SpecialistRole::Challenger,
            analysis: Analysis::RawText(RawTextFallback::new("I think it's high", "expected value")),
            produced_at: Utc::now(),
        }
    }

    #[test]
    fn test_plurality_prefers_first_seen_on_ties() {
        assert_eq!(plurality(["low", "high", "high", "low"]), Some(("low", 2)));
        assert_eq!(plurality(["medium", "high", "high"]), Some(("high", 2)));
        assert_eq!(plurality(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_worked_example_scores_point_eight() {
        let round = vec![
            core("a", "high", "urgent"),
            core("b", "high", "urgent"),
            core("c", "high", "urgent"),
            core("d", "medium", "urgent"),
            core("e", "low", "urgent"),
        ];
        assert!((score(&round) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_unanimous_round_scores_one() {
        let round: Vec<_> = ["a", "b", "c"].iter().map(|id| core(id, "low", "routine")).collect();
        assert_eq!(score(&round), 1.0);
    }

    #[test]
    fn test_no_valid_responses_scores_zero() {
        assert_eq!(score(&[]), 0.0);
        assert_eq!(score(&[failed("a"), unparsable("b")]), 0.0);
    }

    #[test]
    fn test_no_signals_scores_neutral() {
        let round = vec![structured("a", json!({ "bias_alerts": ["anchoring"] }))];
        assert_eq!(score(&round), INSUFFICIENT_SIGNAL_LEVEL);
    }

    #[test]
    fn test_only_one_signal_present_uses_that_ratio() {
        let round = vec![
            structured("a", json!({ "core_assessment": { "risk_level": "high" } })),
            structured("b", json!({ "core_assessment": { "risk_level": "low" } })),
        ];
        assert_eq!(score(&round), 0.5);
    }

    #[test]
    fn test_invalid_responses_are_excluded() {
        let round = vec![
            core("a", "high", "urgent"),
            failed("b"),
            core("c", "high", "urgent"),
            unparsable("d"),
            core("e", "medium", "urgent"),
        ];
        let expected = (2.0 / 3.0 + 1.0) / 2.0;
        assert!((score(&round) - expected).abs() < 1e-9);
    }
}
