use crate::config::BlockingConfig;
use crate::types::{BlockingRecommendation, RelatedTestCase, RiskLevel};

fn first_ids(related: &[RelatedTestCase], limit: usize) -> Vec<String> {
    related.iter().take(limit).map(|r| r.id.clone()).collect()
}

/// Decides whether the related test cases should be held back until the root cause is fixed.
/// Blocked ids are always a prefix of `related`.
pub fn recommend_blocking(
    failed_id: &str,
    level: RiskLevel,
    related: &[RelatedTestCase],
    cfg: &BlockingConfig,
) -> BlockingRecommendation {
    let related_count = related.len();
    let crowded = related_count > cfg.related_count_threshold;

    match level {
        RiskLevel::Critical => BlockingRecommendation {
            should_block: true,
            reason: format!(
                "Critical failure in {failed_id}: block related test cases to prevent cascade failures"
            ),
            test_cases_to_block: first_ids(related, cfg.critical_limit),
        },
        RiskLevel::High => BlockingRecommendation {
            should_block: true,
            reason: format!(
                "High-risk failure impacts {related_count} related test cases; block them until the root cause is resolved"
            ),
            test_cases_to_block: first_ids(related, cfg.high_limit),
        },
        _ if crowded => BlockingRecommendation {
            should_block: true,
            reason: format!(
                "Multiple related test cases ({related_count}) share this root cause; block them to avoid redundant failures"
            ),
            test_cases_to_block: first_ids(related, cfg.related_limit),
        },
        _ => BlockingRecommendation {
            should_block: false,
            reason: "Low risk failure; continue execution and monitor related test cases"
                .to_string(),
            test_cases_to_block: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::recommend_blocking;
    use crate::config::BlockingConfig;
    use crate::types::{Priority, RelatedTestCase, RiskLevel, TestCategory};

    fn related(count: usize) -> Vec<RelatedTestCase> {
        (0..count)
            .map(|i| RelatedTestCase {
                id: format!("R{i}"),
                title: String::new(),
                category: TestCategory::from("API"),
                priority: Priority::Medium,
                relevance_score: 100.0 - i as f64,
                match_reasons: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn critical_blocks_first_eight_in_order() {
        let list = related(12);
        let rec = recommend_blocking("F", RiskLevel::Critical, &list, &BlockingConfig::default());
        assert!(rec.should_block);
        let expected = (0..8).map(|i| format!("R{i}")).collect::<Vec<_>>();
        assert_eq!(rec.test_cases_to_block, expected);
        assert!(rec.reason.contains("cascade"));
    }

    #[test]
    fn high_blocks_five() {
        let list = related(7);
        let rec = recommend_blocking("F", RiskLevel::High, &list, &BlockingConfig::default());
        assert!(rec.should_block);
        assert_eq!(rec.test_cases_to_block.len(), 5);
        assert!(rec.reason.contains("7 related"));
    }

    #[test]
    fn crowded_low_risk_blocks_three() {
        let list = related(6);
        let rec = recommend_blocking("F", RiskLevel::Medium, &list, &BlockingConfig::default());
        assert!(rec.should_block);
        assert_eq!(rec.test_cases_to_block, vec!["R0", "R1", "R2"]);
        assert!(rec.reason.contains("redundant"));
    }

    #[test]
    fn quiet_low_risk_only_monitors() {
        let list = related(5);
        let rec = recommend_blocking("F", RiskLevel::Low, &list, &BlockingConfig::default());
        assert!(!rec.should_block);
        assert!(rec.test_cases_to_block.is_empty());
        assert!(rec.reason.contains("monitor"));
    }

    #[test]
    fn elevated_level_blocks_even_without_related_cases() {
        let rec = recommend_blocking("F", RiskLevel::High, &[], &BlockingConfig::default());
        assert!(rec.should_block);
        assert!(rec.test_cases_to_block.is_empty());
    }
}
