use crate::config::RelevanceConfig;
use crate::types::{RelatedTestCase, TestCase, TestStep};

fn first_word(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

fn steps_overlap(failed: &str, candidate: &str) -> bool {
    first_word(candidate).is_some_and(|word| failed.contains(word))
        || first_word(failed).is_some_and(|word| candidate.contains(word))
}

/// Share of the failed case's steps that have a counterpart among the candidate's steps, over
/// the longer of the two step lists. Zero when either list is empty.
pub fn step_similarity(failed: &[TestStep], candidate: &[TestStep]) -> f64 {
    if failed.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    let candidate_actions = candidate
        .iter()
        .map(|step| step.action.to_lowercase())
        .collect::<Vec<_>>();
    let matched = failed
        .iter()
        .map(|step| step.action.to_lowercase())
        .filter(|action| {
            candidate_actions
                .iter()
                .any(|other| steps_overlap(action, other))
        })
        .count();
    matched as f64 / failed.len().max(candidate.len()) as f64
}

/// Ranks `candidates` by how likely they share the failure's root cause.
///
/// Runs in O(n·k) for n candidates and k keywords plus steps. The failed case itself is never
/// returned, even if it appears in `candidates`.
pub fn find_related_tests(
    failed: &TestCase,
    keywords: &[String],
    candidates: &[TestCase],
    cfg: &RelevanceConfig,
) -> Vec<RelatedTestCase> {
    let mut related = candidates
        .iter()
        .filter(|candidate| candidate.id != failed.id)
        .filter_map(|candidate| {
            let mut score = 0.0;
            let mut reasons = Vec::new();

            if candidate.category == failed.category {
                score += cfg.same_category;
                reasons.push("same category".to_string());
            }

            for requirement in &failed.linked_requirements {
                if candidate.linked_requirements.contains(requirement) {
                    score += cfg.shared_requirement;
                    reasons.push(format!("shares requirement {requirement}"));
                }
            }

            let haystack = format!("{} {}", candidate.title, candidate.description).to_lowercase();
            for keyword in keywords {
                if !keyword.is_empty() && haystack.contains(&keyword.to_lowercase()) {
                    score += cfg.keyword_match;
                    reasons.push(format!("keyword: {keyword}"));
                }
            }

            let similarity = step_similarity(&failed.steps, &candidate.steps);
            if similarity > 0.0 {
                score += cfg.step_similarity * similarity;
                reasons.push(format!("similar steps ({:.0}%)", similarity * 100.0));
            }

            (score > cfg.min_score).then(|| RelatedTestCase {
                id: candidate.id.clone(),
                title: candidate.title.clone(),
                category: candidate.category.clone(),
                priority: candidate.priority,
                relevance_score: score,
                match_reasons: reasons,
            })
        })
        .collect::<Vec<_>>();

    related.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    related.truncate(cfg.max_results);
    related
}
