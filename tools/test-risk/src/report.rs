use crate::types::{FailureAnalysis, PrioritizationResult};

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn bullet_section(out: &mut String, heading: &str, items: &[String]) {
    out.push_str(&format!("## {heading}\n"));
    if items.is_empty() {
        out.push_str("- none\n");
    }
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
    out.push('\n');
}

pub fn render_prioritization_markdown(result: &PrioritizationResult) -> String {
    let analysis = &result.analysis;
    let mut out = String::new();
    out.push_str("# Test Execution Priorities\n\n");
    out.push_str(&format!(
        "- total_tests: {}\n- high_risk_tests: {}\n- critical_risk_tests: {}\n\n",
        analysis.total_tests, analysis.high_risk_tests, analysis.critical_risk_tests
    ));

    out.push_str("## Execution Order\n");
    out.push_str("| # | Test Case | Category | Priority | Risk | Failure Probability | Confidence |\n");
    out.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    for item in &result.test_cases {
        let score = &item.ai_score;
        out.push_str(&format!(
            "| {} | {} {} | {} | {} | {} | {:.2} | {:.2} |\n",
            score.recommended_order,
            cell(&item.test_case.id),
            cell(&item.test_case.title),
            cell(item.test_case.category.label()),
            item.test_case.priority.as_str(),
            score.risk_level.as_str(),
            score.failure_probability,
            score.confidence_score,
        ));
    }
    out.push('\n');

    bullet_section(&mut out, "Summary", &analysis.insights.summary);
    bullet_section(&mut out, "Patterns", &analysis.insights.patterns);
    bullet_section(&mut out, "Recommendations", &analysis.insights.recommendations);
    out
}

pub fn render_failure_analysis_markdown(analysis: &FailureAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Failure Analysis: {}\n\n",
        cell(&analysis.failed_test_case_id)
    ));
    out.push_str(&format!(
        "- risk_level: {}\n- risk_score: {}\n- impact_category: {}\n- keywords: {}\n\n",
        analysis.risk_level.as_str(),
        analysis.risk_score,
        analysis.impact_category.label(),
        if analysis.keywords.is_empty() {
            "none".to_string()
        } else {
            analysis.keywords.join(", ")
        }
    ));
    out.push_str(&format!("## Testing Impact\n{}\n\n", analysis.testing_impact));

    out.push_str("## Related Test Cases\n");
    out.push_str("| Test Case | Category | Relevance | Reasons |\n| --- | --- | --- | --- |\n");
    for related in &analysis.related_test_cases {
        out.push_str(&format!(
            "| {} {} | {} | {:.1} | {} |\n",
            cell(&related.id),
            cell(&related.title),
            cell(related.category.label()),
            related.relevance_score,
            cell(&related.match_reasons.join("; ")),
        ));
    }
    out.push('\n');

    let blocking = &analysis.blocking_recommendation;
    out.push_str("## Blocking Recommendation\n");
    out.push_str(&format!(
        "- should_block: {}\n- reason: {}\n",
        blocking.should_block, blocking.reason
    ));
    if !blocking.test_cases_to_block.is_empty() {
        out.push_str(&format!(
            "- block: {}\n",
            blocking.test_cases_to_block.join(", ")
        ));
    }
    out.push('\n');

    bullet_section(&mut out, "Suggested Actions", &analysis.suggested_actions);
    out
}
