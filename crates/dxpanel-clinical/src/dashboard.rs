//! Flattens a `DeliberationResult` into the shape a clinic dashboard shows.
//!
//! The formatter tolerates any verdict shape: generated verdicts, fallback
//! verdicts and the empty-history placeholder all format without error.
//! Missing fields fall back to conservative defaults.

use serde::Serialize;
use serde_json::Value;

use dxpanel_contracts::{
    assessment::StructuredAnalysis,
    consensus::{DeliberationResult, FinalConsensus},
    path::{resolve_path, resolve_str},
    specialist::SpecialistRole,
};

pub const MAX_FINDINGS: usize = 5;
pub const MAX_SUGGESTIONS: usize = 4;
pub const MAX_DISAGREEMENTS: usize = 3;

const DEFAULT_CONFIDENCE: f64 = 0.7;
const DEFAULT_INSIGHT_CONFIDENCE: f64 = 0.8;
const HIGH_BAND_PERCENT: u32 = 80;
const MEDIUM_BAND_PERCENT: u32 = 60;
const HIGH_PANEL_CONSENSUS: f64 = 0.8;
const INSIGHT_EXCERPT_CHARS: usize = 50;

// ── Output shape ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub overall_risk_assessment: OverallRisk,
    pub ai_identified_clinical_findings: Vec<Finding>,
    pub preliminary_diagnostic_suggestions: Vec<Suggestion>,
    pub ai_panel_insights: PanelInsights,
    pub metadata: DashboardMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallRisk {
    pub risk_level: String,
    pub ai_confidence: u32,
    pub summary: String,
    pub confidence_level: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub finding: String,
    pub severity: String,
    pub confidence: u32,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub recommendation: String,
    pub confidence: u32,
    pub urgency: String,
    pub category: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelInsights {
    pub debate_quality: DebateQuality,
    pub key_disagreements_resolved: Vec<String>,
    pub specialist_insights: Vec<SpecialistInsight>,
    pub panel_confidence: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebateQuality {
    pub total_rounds: usize,
    pub final_consensus: u32,
    pub consensus_evolution: Vec<ConsensusPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusPoint {
    pub round: u32,
    pub consensus_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialistInsight {
    pub specialist: &'static str,
    pub key_insight: String,
    pub confidence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetadata {
    pub analysis_timestamp: String,
    pub debate_rounds: usize,
    pub panel_consensus_level: u32,
}

// ── Entry point ──────────────────────────────────────────────────────────────

pub fn format_for_dashboard(result: &DeliberationResult) -> DashboardView {
    let consensus = &result.final_consensus;
    let meta = &result.panel_metadata;

    DashboardView {
        overall_risk_assessment: overall_risk(consensus, meta.rounds_completed),
        ai_identified_clinical_findings: clinical_findings(consensus),
        preliminary_diagnostic_suggestions: diagnostic_suggestions(consensus),
        ai_panel_insights: panel_insights(result),
        metadata: DashboardMetadata {
            analysis_timestamp: meta.timestamp.to_rfc3339(),
            debate_rounds: meta.rounds_completed,
            panel_consensus_level: percent(meta.final_consensus_level),
        },
    }
}

// ── Sections ─────────────────────────────────────────────────────────────────

fn overall_risk(consensus: &FinalConsensus, rounds: usize) -> OverallRisk {
    let risk_level = risk_display(consensus.overall_risk_level().unwrap_or("medium"));
    let ai_confidence = percent(consensus.confidence_score().unwrap_or(DEFAULT_CONFIDENCE));

    let concerns = consensus.primary_concerns();
    let mut summary = if concerns.is_empty() {
        format!("{risk_level} condition requiring appropriate medical evaluation")
    } else {
        let lead: Vec<&str> = concerns.into_iter().take(2).collect();
        format!("Multiple indicators suggest {}", lead.join(", "))
    };
    summary.push_str(&format!(" (Assessed by {rounds}-round medical panel debate)"));

    OverallRisk {
        risk_level: risk_level.to_string(),
        ai_confidence,
        summary,
        confidence_level: band(ai_confidence),
    }
}

fn clinical_findings(consensus: &FinalConsensus) -> Vec<Finding> {
    let mut findings: Vec<Finding> = consensus
        .lookup("clinical_findings")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|f| Finding {
            finding: str_or(f, "finding", "Clinical finding detected").to_string(),
            severity: title_case(str_or(f, "severity", "moderate")),
            confidence: percent(resolve_path(f, "confidence").and_then(Value::as_f64).unwrap_or(0.8)),
            category: title_case(str_or(f, "category", "general")),
        })
        .collect();

    let vitals: [(&str, &str, u32, fn(&str) -> &'static str, &str); 3] = [
        (
            "vital_signs_interpretation.spo2_assessment.status",
            "SpO2",
            89,
            spo2_severity,
            "Respiratory",
        ),
        (
            "vital_signs_interpretation.cardiovascular_assessment.heart_rate_status",
            "Heart rate",
            85,
            heart_rate_severity,
            "Cardiovascular",
        ),
        (
            "vital_signs_interpretation.respiratory_assessment.rate_status",
            "Respiratory rate",
            92,
            respiratory_severity,
            "Respiratory",
        ),
    ];
    for (path, label, confidence, severity, category) in vitals {
        let Some(status) = consensus.lookup(path).and_then(Value::as_str) else {
            continue;
        };
        if status.is_empty() || status == "normal" {
            continue;
        }
        findings.push(Finding {
            finding: format!("{label} {}", status.replace('_', " ")),
            severity: severity(status).to_string(),
            confidence,
            category: category.to_string(),
        });
    }

    if findings.is_empty() {
        findings.push(Finding {
            finding: "Vital signs within acceptable ranges".to_string(),
            severity: "Low".to_string(),
            confidence: 75,
            category: "General".to_string(),
        });
    }
    findings.truncate(MAX_FINDINGS);
    findings
}

fn diagnostic_suggestions(consensus: &FinalConsensus) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for action in strings_at(consensus, "recommendations.immediate_actions") {
        suggestions.push(Suggestion {
            recommendation: action.to_string(),
            confidence: 85,
            urgency: "immediate".to_string(),
            category: "immediate_action",
        });
    }

    if let Some(specialty) = consensus
        .lookup("recommendations.specialist_consultation.specialty")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        let urgency = consensus
            .lookup("recommendations.specialist_consultation.urgency")
            .and_then(Value::as_str)
            .unwrap_or("routine");
        suggestions.push(Suggestion {
            recommendation: format!("{} consultation recommended", title_case(&specialty.replace('_', " "))),
            confidence: 78,
            urgency: urgency.to_string(),
            category: "specialist_referral",
        });
    }

    for monitor in strings_at(consensus, "recommendations.monitoring_recommendations") {
        suggestions.push(Suggestion {
            recommendation: monitor.to_string(),
            confidence: 82,
            urgency: "routine".to_string(),
            category: "monitoring",
        });
    }

    match consensus
        .lookup("risk_assessment.immediate_risk")
        .and_then(Value::as_str)
    {
        Some("high") => suggestions.insert(
            0,
            Suggestion {
                recommendation: "Immediate ECG recommended to rule out acute coronary syndrome".to_string(),
                confidence: 85,
                urgency: "immediate".to_string(),
                category: "diagnostic",
            },
        ),
        Some("medium") => suggestions.push(Suggestion {
            recommendation: "Consider chest X-ray to assess pulmonary status".to_string(),
            confidence: 78,
            urgency: "expedited".to_string(),
            category: "diagnostic",
        }),
        _ => {}
    }

    if suggestions.is_empty() {
        suggestions.push(Suggestion {
            recommendation: "Continue routine monitoring and follow-up care".to_string(),
            confidence: 70,
            urgency: "routine".to_string(),
            category: "general",
        });
    }
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

fn panel_insights(result: &DeliberationResult) -> PanelInsights {
    let history = &result.debate_history;
    let level = result.panel_metadata.final_consensus_level;

    let consensus_evolution = history
        .iter()
        .map(|round| ConsensusPoint {
            round: round.round_number,
            consensus_level: percent(round.consensus_level),
        })
        .collect();

    let key_disagreements_resolved = history
        .iter()
        .flat_map(|round| round.key_disagreements.iter().cloned())
        .take(MAX_DISAGREEMENTS)
        .collect();

    let specialist_insights = history
        .latest()
        .into_iter()
        .flat_map(|round| round.valid_responses())
        .filter_map(|r| {
            let analysis = r.analysis.as_structured()?;
            specialist_insight(r.role, analysis)
        })
        .collect();

    PanelInsights {
        debate_quality: DebateQuality {
            total_rounds: result.panel_metadata.rounds_completed,
            final_consensus: percent(level),
            consensus_evolution,
        },
        key_disagreements_resolved,
        specialist_insights,
        panel_confidence: if level >= HIGH_PANEL_CONSENSUS { "high" } else { "medium" },
    }
}

/// One headline per role, or `None` when the role's key field is absent.
fn specialist_insight(role: SpecialistRole, analysis: &StructuredAnalysis) -> Option<SpecialistInsight> {
    let field = |path: &str| {
        let (head, rest) = path.split_once('.').unwrap_or((path, ""));
        let top = analysis.get(head)?;
        if rest.is_empty() {
            Some(top)
        } else {
            resolve_path(top, rest)
        }
    };
    let score = |path: &str| percent(field(path).and_then(Value::as_f64).unwrap_or(DEFAULT_INSIGHT_CONFIDENCE));
    let text = |path: &str| field(path).and_then(Value::as_str).filter(|s| !s.is_empty());

    let (key_insight, confidence) = match role {
        SpecialistRole::DifferentialAssessment => {
            let top = field("differential_assessments")?.as_array()?.first()?;
            let condition = str_or(top, "condition", "Unknown condition");
            let probability = resolve_path(top, "probability").and_then(Value::as_f64).unwrap_or(0.0);
            (format!("Primary assessment: {condition}"), percent(probability))
        }
        SpecialistRole::MonitoringStrategy => {
            let risk = text("risk_stratification.immediate_risk")?;
            (
                format!("Risk classification: {risk} risk requiring monitoring"),
                score("monitoring_confidence"),
            )
        }
        SpecialistRole::Challenger => {
            let first = field("challenges_raised")?.as_array()?.first()?;
            let concern = resolve_str(first, "challenge")
                .or_else(|| resolve_str(first, "specific_concern"))
                .unwrap_or_default();
            (format!("Key challenge: {}", excerpt(concern)), score("challenger_confidence"))
        }
        SpecialistRole::ResourceSteward => {
            let approval = text("stewardship_decision.overall_approval")?;
            (
                format!("Resource optimization: {approval}"),
                score("stewardship_decision.cost_effectiveness_score"),
            )
        }
        SpecialistRole::Validator => {
            let status = text("validation_decision.approval_status")?;
            (
                format!("Quality validation: {status}"),
                score("quality_metrics.overall_quality_score"),
            )
        }
    };

    Some(SpecialistInsight {
        specialist: role.title(),
        key_insight,
        confidence,
    })
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A `[0, 1]` fraction as a whole percentage, rounded.
fn percent(fraction: f64) -> u32 {
    if fraction.is_finite() {
        (fraction * 100.0).round().clamp(0.0, 100.0) as u32
    } else {
        0
    }
}

fn band(percent: u32) -> &'static str {
    if percent >= HIGH_BAND_PERCENT {
        "high"
    } else if percent >= MEDIUM_BAND_PERCENT {
        "medium"
    } else {
        "low"
    }
}

fn risk_display(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "low" => "Low Risk",
        "high" => "High Risk",
        "critical" => "Critical Risk",
        _ => "Medium Risk",
    }
}

fn spo2_severity(status: &str) -> &'static str {
    match status {
        "critically_low" => "High",
        "normal" => "Low",
        _ => "Moderate",
    }
}

fn heart_rate_severity(status: &str) -> &'static str {
    match status {
        "tachycardic" => "High",
        "normal" => "Low",
        _ => "Moderate",
    }
}

fn respiratory_severity(status: &str) -> &'static str {
    match status {
        "tachypneic" => "High",
        "normal" => "Low",
        _ => "Moderate",
    }
}

fn str_or<'v>(value: &'v Value, key: &str, default: &'v str) -> &'v str {
    resolve_str(value, key).unwrap_or(default)
}

fn strings_at<'c>(consensus: &'c FinalConsensus, path: &str) -> Vec<&'c str> {
    consensus
        .lookup(path)
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn excerpt(text: &str) -> String {
    if text.chars().count() > INSIGHT_EXCERPT_CHARS {
        let cut: String = text.chars().take(INSIGHT_EXCERPT_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
