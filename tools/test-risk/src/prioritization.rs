use crate::config::EngineConfig;
use crate::errors::RiskEngineError;
use crate::logging::append_run_log;
use crate::risk_model::score_test_case;
use crate::types::{
    AnalysisInsights, PrioritizationAnalysis, PrioritizationResult, RiskLevel, ScoredTestCase,
    TestCase,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub(crate) fn ensure_identities(test_cases: &[TestCase]) -> Result<(), RiskEngineError> {
    match test_cases.iter().position(|tc| !tc.has_identity()) {
        Some(index) => Err(RiskEngineError::InvalidInput(format!(
            "test case at position {index} has no id"
        ))),
        None => Ok(()),
    }
}

/// Risk level, then failure probability, then declared priority, all descending.
fn rank_order(a: &ScoredTestCase, b: &ScoredTestCase) -> Ordering {
    b.ai_score
        .risk_level
        .rank()
        .cmp(&a.ai_score.risk_level.rank())
        .then_with(|| {
            b.ai_score
                .failure_probability
                .total_cmp(&a.ai_score.failure_probability)
        })
        .then_with(|| b.test_case.priority.rank().cmp(&a.test_case.priority.rank()))
}

/// Scores every test case against the whole collection and returns them in execution order.
///
/// Each score scans all peers, so this is O(n²) in the collection size. For collections in the
/// thousands, callers should split by category or release before ranking.
pub fn prioritize(
    test_cases: &[TestCase],
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<PrioritizationResult, RiskEngineError> {
    ensure_identities(test_cases)?;
    append_run_log(
        "info",
        "prioritization.started",
        json!({
            "test_case_count": test_cases.len(),
            "now": now.to_rfc3339(),
        }),
    );

    let mut scored = test_cases
        .iter()
        .map(|tc| ScoredTestCase {
            test_case: tc.clone(),
            ai_score: score_test_case(tc, test_cases, cfg, now),
        })
        .collect::<Vec<_>>();

    // sort_by is stable, so ties keep input order.
    scored.sort_by(rank_order);
    for (index, item) in scored.iter_mut().enumerate() {
        item.ai_score.recommended_order = index + 1;
    }

    let analysis = build_analysis(&scored, cfg);
    append_run_log(
        "info",
        "prioritization.completed",
        json!({
            "total_tests": analysis.total_tests,
            "high_risk_tests": analysis.high_risk_tests,
            "critical_risk_tests": analysis.critical_risk_tests,
            "recommended_execution_order": analysis.recommended_execution_order,
        }),
    );

    Ok(PrioritizationResult {
        test_cases: scored,
        analysis,
    })
}

pub fn build_analysis(scored: &[ScoredTestCase], cfg: &EngineConfig) -> PrioritizationAnalysis {
    let a = &cfg.analysis;
    let total = scored.len();
    let critical = scored
        .iter()
        .filter(|s| s.ai_score.risk_level == RiskLevel::Critical)
        .count();
    let high_risk = scored
        .iter()
        .filter(|s| s.ai_score.risk_level.is_elevated())
        .count();
    let never_executed = scored
        .iter()
        .filter(|s| s.test_case.never_executed())
        .count();
    let high_share = if total == 0 {
        0.0
    } else {
        high_risk as f64 / total as f64
    };

    let mut insights = AnalysisInsights::default();
    insights
        .summary
        .push(format!("Analyzed {total} test cases"));
    insights.summary.push(format!(
        "{high_risk} high-risk test cases (high or critical risk level)"
    ));
    if critical > 0 {
        insights.summary.push(format!(
            "{critical} critical-risk test cases need immediate execution"
        ));
    }

    if high_share > a.unstable_share {
        insights.patterns.push(format!(
            "{:.0}% of test cases are high risk, which points to an unstable build",
            high_share * 100.0
        ));
    }
    if let Some((category, sum)) = riskiest_category(scored) {
        if sum > a.risky_category_sum {
            insights.patterns.push(format!(
                "Riskiest category: {category} (cumulative failure probability {sum:.2})"
            ));
        }
    }
    if never_executed > 0 {
        insights.patterns.push(format!(
            "{never_executed} test cases have never been executed"
        ));
    }

    if critical > 0 {
        insights.recommendations.push(
            "Hold the release until every critical-risk test case passes".to_string(),
        );
    }
    if high_share > a.front_load_share {
        insights.recommendations.push(format!(
            "Execute the {high_risk} high-risk test cases first"
        ));
    }
    insights.recommendations.push(
        "Follow the recommended execution order to surface failures as early as possible"
            .to_string(),
    );

    PrioritizationAnalysis {
        total_tests: total,
        high_risk_tests: high_risk,
        critical_risk_tests: critical,
        recommended_execution_order: scored
            .iter()
            .take(a.recommended_order_len)
            .map(|s| s.test_case.id.clone())
            .collect(),
        insights,
    }
}

/// Category with the largest summed failure probability; ties go to the alphabetically first.
fn riskiest_category(scored: &[ScoredTestCase]) -> Option<(String, f64)> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for item in scored {
        *sums
            .entry(item.test_case.category.label().to_string())
            .or_default() += item.ai_score.failure_probability;
    }
    sums.into_iter().fold(None, |best, (category, sum)| match best {
        Some((_, best_sum)) if best_sum >= sum => best,
        _ => Some((category, sum)),
    })
}
