use crate::config::AssessmentConfig;
use crate::types::{CategoryTag, RiskLevel, TestCase};

const SEVERE_SYMPTOMS: &[&str] = &["crash", "exception", "error 500"];
const MODERATE_SYMPTOMS: &[&str] = &["timeout", "failed", "broken"];
const MINOR_SYMPTOMS: &[&str] = &["slow", "issue"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
}

fn symptom_points(description: &str, cfg: &AssessmentConfig) -> u32 {
    let text = description.to_lowercase();
    let has_any = |needles: &[&str]| needles.iter().any(|needle| text.contains(needle));
    if has_any(SEVERE_SYMPTOMS) {
        cfg.severe_symptom
    } else if has_any(MODERATE_SYMPTOMS) {
        cfg.moderate_symptom
    } else if has_any(MINOR_SYMPTOMS) {
        cfg.minor_symptom
    } else {
        0
    }
}

fn category_points(failed: &TestCase, cfg: &AssessmentConfig) -> u32 {
    match failed.category.tag() {
        Some(CategoryTag::Authentication | CategoryTag::Security) => cfg.auth_security_category,
        Some(CategoryTag::Api | CategoryTag::Database) => cfg.api_database_category,
        _ => 0,
    }
}

pub fn level_for_score(score: u32, cfg: &AssessmentConfig) -> RiskLevel {
    if score >= cfg.critical {
        RiskLevel::Critical
    } else if score >= cfg.high {
        RiskLevel::High
    } else if score >= cfg.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Scores a single failure event from its priority, blast radius, symptoms and category.
pub fn assess_failure_risk(
    failed: &TestCase,
    description: &str,
    related_count: usize,
    cfg: &AssessmentConfig,
) -> FailureRiskAssessment {
    let related_points = u32::try_from(related_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(cfg.per_related)
        .min(cfg.related_cap);
    let score = cfg
        .priority_points(failed.priority)
        .saturating_add(related_points)
        .saturating_add(symptom_points(description, cfg))
        .saturating_add(category_points(failed, cfg));
    FailureRiskAssessment {
        score,
        level: level_for_score(score, cfg),
    }
}
