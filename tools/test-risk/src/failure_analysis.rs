use crate::blocking::recommend_blocking;
use crate::config::EngineConfig;
use crate::errors::RiskEngineError;
use crate::failure_risk::assess_failure_risk;
use crate::keywords::{categorize_failure, extract_keywords};
use crate::logging::append_run_log;
use crate::narrative::{suggested_actions, testing_impact};
use crate::prioritization::ensure_identities;
use crate::related::find_related_tests;
use crate::types::{FailureAnalysis, TestCase};
use serde_json::json;

/// Runs extractor, related-test finder, risk assessor, blocking generator and narrator over one
/// observed failure. `all_test_cases` may include `failed`; it is skipped as a candidate.
pub fn analyze_failure(
    failed: &TestCase,
    description: &str,
    all_test_cases: &[TestCase],
    cfg: &EngineConfig,
) -> Result<FailureAnalysis, RiskEngineError> {
    if !failed.has_identity() {
        return Err(RiskEngineError::InvalidInput(
            "failed test case has no id".to_string(),
        ));
    }
    ensure_identities(all_test_cases)?;

    append_run_log(
        "info",
        "failure_analysis.started",
        json!({
            "test_case_id": failed.id,
            "candidate_count": all_test_cases.len(),
            "description_len": description.len(),
        }),
    );

    let keywords = extract_keywords(description);
    let impact_category = categorize_failure(description);
    let related = find_related_tests(failed, &keywords, all_test_cases, &cfg.relevance);
    append_run_log(
        "debug",
        "failure_analysis.related.found",
        json!({
            "test_case_id": failed.id,
            "keywords": keywords,
            "impact_category": impact_category.label(),
            "related_ids": related.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        }),
    );

    let assessment = assess_failure_risk(failed, description, related.len(), &cfg.assessment);
    let blocking = recommend_blocking(&failed.id, assessment.level, &related, &cfg.blocking);
    let actions = suggested_actions(assessment.level, impact_category);
    let impact = testing_impact(description, &failed.category, related.len());

    append_run_log(
        "info",
        "failure_analysis.completed",
        json!({
            "test_case_id": failed.id,
            "risk_score": assessment.score,
            "risk_level": assessment.level.as_str(),
            "related_count": related.len(),
            "should_block": blocking.should_block,
            "blocked_count": blocking.test_cases_to_block.len(),
        }),
    );

    Ok(FailureAnalysis {
        failed_test_case_id: failed.id.clone(),
        keywords,
        related_test_cases: related,
        risk_score: assessment.score,
        risk_level: assessment.level,
        impact_category,
        blocking_recommendation: blocking,
        suggested_actions: actions,
        testing_impact: impact,
    })
}

/// Looks `failed_id` up in `all_test_cases` and analyzes it.
pub fn analyze_failure_by_id(
    failed_id: &str,
    description: &str,
    all_test_cases: &[TestCase],
    cfg: &EngineConfig,
) -> Result<FailureAnalysis, RiskEngineError> {
    let failed = all_test_cases
        .iter()
        .find(|tc| tc.id == failed_id)
        .ok_or_else(|| {
            RiskEngineError::InvalidInput(format!("no test case with id {failed_id}"))
        })?;
    analyze_failure(failed, description, all_test_cases, cfg)
}
