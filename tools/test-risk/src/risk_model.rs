//! Per-test failure-probability model.
//!
//! Five sub-scores (history, recency, category + priority, related-test impact, environment)
//! are combined with the weights in [`FactorWeights`](crate::config::FactorWeights) and clamped
//! to `[0, 1]`. The related-impact factor scans every peer, so scoring a whole collection is
//! quadratic in its size.

use crate::config::{EngineConfig, RiskThresholds};
use crate::logging::append_run_log;
use crate::timeline::{elapsed_days, most_recent};
use crate::types::{AiScore, ExecutionStatus, FactorBreakdown, Priority, RiskLevel, TestCase};
use chrono::{DateTime, Utc};
use serde_json::json;

pub fn historical_failure_rate(test_case: &TestCase, cfg: &EngineConfig) -> f64 {
    let history = &cfg.history;
    if test_case.execution_history.is_empty() {
        return if test_case.last_execution.is_none() {
            history.never_executed
        } else {
            history.executed_without_history
        };
    }

    let recent = most_recent(&test_case.execution_history, history.window);
    let failures = recent
        .iter()
        .filter(|record| record.status.is_failure())
        .count();
    let mut rate = failures as f64 / recent.len() as f64;

    if recent
        .iter()
        .take(history.recent_window)
        .any(|record| record.status.is_failure())
    {
        rate += history.recent_failure_bonus;
    }
    rate.min(1.0)
}

pub fn recency_factor(test_case: &TestCase, cfg: &EngineConfig, now: DateTime<Utc>) -> f64 {
    let recency = &cfg.recency;
    let Some(last) = &test_case.last_execution else {
        return recency.never_executed;
    };
    let Some(days) = elapsed_days(now, &last.date) else {
        return recency.fallback;
    };

    if last.status == ExecutionStatus::Fail && days < recency.recent_failure_days {
        recency.recent_failure
    } else if last.status == ExecutionStatus::Blocked && days < recency.recent_blocked_days {
        recency.recent_blocked
    } else if days > recency.stale_after_days {
        recency.stale
    } else if last.status == ExecutionStatus::Pass && days < recency.recent_pass_days {
        recency.recent_pass
    } else {
        recency.fallback
    }
}

/// Category weight plus priority weight. The two are summed, so this can exceed 1.0.
pub fn category_factor(test_case: &TestCase, cfg: &EngineConfig) -> f64 {
    cfg.category_weight(&test_case.category) + cfg.priority_weights.weight(test_case.priority)
}

pub fn related_impact_factor(test_case: &TestCase, peers: &[TestCase], cfg: &EngineConfig) -> f64 {
    let impact = &cfg.related_impact;
    let others = peers.iter().filter(|peer| peer.id != test_case.id);

    let mut same_category = 0usize;
    let mut shared_requirement = 0usize;
    let mut elevated_same_category = 0usize;
    for peer in others {
        if peer.category == test_case.category {
            same_category += 1;
            if peer.priority.is_elevated() {
                elevated_same_category += 1;
            }
        }
        if test_case.shares_requirement_with(peer) {
            shared_requirement += 1;
        }
    }

    let score = (same_category as f64 * impact.same_category).min(impact.same_category_cap)
        + (shared_requirement as f64 * impact.shared_requirement)
            .min(impact.shared_requirement_cap)
        + (elevated_same_category as f64 * impact.elevated_peer).min(impact.elevated_peer_cap);
    score.min(1.0)
}

pub fn environment_factor(test_case: &TestCase, cfg: &EngineConfig) -> f64 {
    let env = &cfg.environment;
    if test_case.execution_history.is_empty() {
        return env.no_history;
    }

    let matches = most_recent(&test_case.execution_history, env.window)
        .iter()
        .map(|record| {
            let notes = record.notes.to_lowercase();
            env.keywords
                .iter()
                .filter(|keyword| !keyword.is_empty() && notes.contains(&keyword.to_lowercase()))
                .count()
        })
        .sum::<usize>();

    if matches == 0 {
        env.stable
    } else {
        (matches as f64 * env.per_match).min(env.cap)
    }
}

pub fn confidence_score(factors: &FactorBreakdown, cfg: &EngineConfig) -> f64 {
    let c = &cfg.confidence;
    let mut confidence = c.base;
    confidence += if factors.history > 0.0 {
        c.history_signal
    } else {
        c.history_fallback
    };
    confidence += if factors.recency > c.recency_threshold {
        c.recency_signal
    } else {
        c.recency_fallback
    };
    confidence += c.baseline;
    if factors.related_impact > 0.0 {
        confidence += c.related_signal;
    }
    confidence.clamp(0.0, 1.0)
}

/// Thresholds are inclusive; the priority floors let Critical/High tests escalate early. The high
/// floor applies to Critical as well as High, so raising a priority never lowers the level.
pub fn classify_risk_level(
    failure_probability: f64,
    priority: Priority,
    thresholds: &RiskThresholds,
) -> RiskLevel {
    if failure_probability >= thresholds.critical
        || (priority == Priority::Critical
            && failure_probability >= thresholds.critical_priority_floor)
    {
        RiskLevel::Critical
    } else if failure_probability >= thresholds.high
        || (priority.is_elevated() && failure_probability >= thresholds.high_priority_floor)
    {
        RiskLevel::High
    } else if failure_probability >= thresholds.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn risk_flags(test_case: &TestCase, factors: &FactorBreakdown) -> Vec<String> {
    let mut flags = Vec::new();
    if factors.history > 0.5 {
        flags.push("high failure rate".to_string());
    }
    if factors.recency > 0.7 {
        flags.push("recently failed or stale".to_string());
    }
    if factors.category > 0.7 {
        flags.push("high-risk category".to_string());
    }
    if factors.related_impact > 0.5 {
        flags.push("wide related-test impact".to_string());
    }
    if factors.environment > 0.5 {
        flags.push("environment instability".to_string());
    }
    if test_case.never_executed() {
        flags.push("never executed".to_string());
    }
    flags
}

fn strategic_insight(failure_probability: f64) -> Option<&'static str> {
    if failure_probability > 0.8 {
        Some("Strategic: schedule in the first execution batch")
    } else if failure_probability > 0.6 {
        Some("Strategic: run before lower-risk suites")
    } else if failure_probability < 0.2 {
        Some("Strategic: candidate for reduced execution frequency")
    } else {
        None
    }
}

fn priority_reason(level: RiskLevel, failure_probability: f64, flags: &[String]) -> String {
    let lead = match level {
        RiskLevel::Critical => "Execute immediately",
        RiskLevel::High => "Execute early in the cycle",
        RiskLevel::Medium => "Execute in the standard rotation",
        RiskLevel::Low => "Execute when capacity allows",
    };
    let drivers = if flags.is_empty() {
        "baseline risk profile".to_string()
    } else {
        flags.join(", ")
    };
    format!(
        "{lead}: {:.0}% predicted failure probability ({drivers})",
        failure_probability * 100.0
    )
}

/// Scores one test case against its peers. `recommended_order` is left at zero for the ranker.
pub fn score_test_case(
    test_case: &TestCase,
    peers: &[TestCase],
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> AiScore {
    let factors = FactorBreakdown {
        history: historical_failure_rate(test_case, cfg),
        recency: recency_factor(test_case, cfg, now),
        category: category_factor(test_case, cfg),
        related_impact: related_impact_factor(test_case, peers, cfg),
        environment: environment_factor(test_case, cfg),
    };
    let w = &cfg.factor_weights;
    let weighted = factors.history * w.history
        + factors.recency * w.recency
        + factors.category * w.category
        + factors.related_impact * w.related_impact
        + factors.environment * w.environment;
    let failure_probability = if weighted.is_finite() {
        weighted.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let risk_level = classify_risk_level(failure_probability, test_case.priority, &cfg.risk_thresholds);
    let confidence = confidence_score(&factors, cfg);
    let flags = risk_flags(test_case, &factors);
    let reason = priority_reason(risk_level, failure_probability, &flags);

    let mut insights = flags;
    if let Some(strategic) = strategic_insight(failure_probability) {
        insights.push(strategic.to_string());
    }

    append_run_log(
        "debug",
        "risk_model.scored",
        json!({
            "test_case_id": test_case.id,
            "failure_probability": failure_probability,
            "risk_level": risk_level.as_str(),
            "confidence": confidence,
            "factors": factors,
        }),
    );

    AiScore {
        failure_probability,
        risk_level,
        confidence_score: confidence,
        priority_reason: reason,
        recommended_order: 0,
        insights,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        classify_risk_level, confidence_score, environment_factor, historical_failure_rate,
        recency_factor, related_impact_factor, score_test_case,
    };
    use crate::config::{EngineConfig, RiskThresholds};
    use crate::types::{
        ExecutionRecord, ExecutionStatus, FactorBreakdown, LastExecution, Priority, RiskLevel,
        TestCase, TestCategory,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0)
            .single()
            .expect("now")
    }

    fn days_ago(days: i64) -> String {
        (now() - Duration::days(days)).to_rfc3339()
    }

    fn case(id: &str, category: &str, priority: Priority) -> TestCase {
        TestCase {
            id: id.to_string(),
            title: format!("{id} title"),
            category: TestCategory::from(category),
            priority,
            ..TestCase::default()
        }
    }

    fn run(status: ExecutionStatus, days: i64, notes: &str) -> ExecutionRecord {
        ExecutionRecord {
            execution_id: format!("exec-{days}"),
            date: days_ago(days),
            status,
            notes: notes.to_string(),
            ..ExecutionRecord::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn history_factor_distinguishes_never_run_from_missing_history() {
        let cfg = EngineConfig::default();
        let mut tc = case("TC-1", "Functional", Priority::Low);
        assert!(close(historical_failure_rate(&tc, &cfg), 0.4));

        tc.last_execution = Some(LastExecution {
            date: days_ago(1),
            status: ExecutionStatus::Pass,
            ..LastExecution::default()
        });
        assert!(close(historical_failure_rate(&tc, &cfg), 0.2));
    }

    #[test]
    fn history_factor_uses_latest_ten_and_recent_bonus() {
        let cfg = EngineConfig::default();
        let mut tc = case("TC-1", "Functional", Priority::Low);
        // Newest failure sits outside the input's first slot to prove we sort by date.
        tc.execution_history = (2..12)
            .map(|d| run(ExecutionStatus::Pass, d, ""))
            .chain(std::iter::once(run(ExecutionStatus::Blocked, 1, "")))
            .chain(std::iter::once(run(ExecutionStatus::Fail, 40, "")))
            .collect();
        // Window keeps days 1..=10: one blocked out of ten, plus the recent bonus.
        assert!(close(historical_failure_rate(&tc, &cfg), 0.1 + 0.3));

        tc.execution_history = vec![
            run(ExecutionStatus::Pass, 1, ""),
            run(ExecutionStatus::Pass, 2, ""),
            run(ExecutionStatus::Pass, 3, ""),
            run(ExecutionStatus::Fail, 4, ""),
        ];
        assert!(close(historical_failure_rate(&tc, &cfg), 0.25));

        tc.execution_history = (1..=5).map(|d| run(ExecutionStatus::Fail, d, "")).collect();
        assert!(close(historical_failure_rate(&tc, &cfg), 1.0));
    }

    #[test]
    fn recency_rules_apply_in_order() {
        let cfg = EngineConfig::default();
        let mut tc = case("TC-1", "Functional", Priority::Low);
        assert!(close(recency_factor(&tc, &cfg, now()), 0.6));

        let cases = [
            (ExecutionStatus::Fail, 2, 0.8),
            (ExecutionStatus::Fail, 10, 0.3),
            (ExecutionStatus::Blocked, 10, 0.7),
            (ExecutionStatus::Blocked, 20, 0.3),
            (ExecutionStatus::Fail, 45, 0.5),
            (ExecutionStatus::Pass, 3, 0.1),
            (ExecutionStatus::Pass, 12, 0.3),
        ];
        for (status, days, expected) in cases {
            tc.last_execution = Some(LastExecution {
                date: days_ago(days),
                status,
                ..LastExecution::default()
            });
            assert!(
                close(recency_factor(&tc, &cfg, now()), expected),
                "{status:?} {days}d"
            );
        }

        tc.last_execution = Some(LastExecution {
            date: "sometime".to_string(),
            status: ExecutionStatus::Fail,
            ..LastExecution::default()
        });
        assert!(close(recency_factor(&tc, &cfg, now()), 0.3));
    }

    #[test]
    fn related_impact_caps_each_component() {
        let cfg = EngineConfig::default();
        let mut target = case("T", "API", Priority::Medium);
        target.linked_requirements = vec!["REQ-1".to_string()];

        let mut peers = vec![target.clone()];
        for i in 0..6 {
            let mut peer = case(&format!("P{i}"), "API", Priority::High);
            peer.linked_requirements = vec!["REQ-1".to_string()];
            peers.push(peer);
        }
        // 0.4 (capped) + 0.3 (capped) + 0.3 (capped) = 1.0
        assert!(close(related_impact_factor(&target, &peers, &cfg), 1.0));

        let lone = vec![target.clone(), case("X", "Mobile", Priority::Low)];
        assert!(close(related_impact_factor(&target, &lone, &cfg), 0.0));

        let one_peer = vec![target.clone(), case("Y", "API", Priority::Low)];
        assert!(close(related_impact_factor(&target, &one_peer, &cfg), 0.1));
    }

    #[test]
    fn environment_factor_scans_recent_notes() {
        let cfg = EngineConfig::default();
        let mut tc = case("TC-1", "Functional", Priority::Low);
        assert!(close(environment_factor(&tc, &cfg), 0.3));

        tc.execution_history = vec![run(ExecutionStatus::Pass, 1, "all good")];
        assert!(close(environment_factor(&tc, &cfg), 0.1));

        tc.execution_history = vec![
            run(ExecutionStatus::Fail, 1, "Connection reset by server"),
            run(ExecutionStatus::Fail, 2, "gateway timeout"),
        ];
        // connection + server + timeout = 3 matches, capped at 0.8
        assert!(close(environment_factor(&tc, &cfg), 0.8));

        tc.execution_history = vec![
            run(ExecutionStatus::Fail, 1, "network blip"),
            run(ExecutionStatus::Pass, 2, ""),
            run(ExecutionStatus::Pass, 3, ""),
            run(ExecutionStatus::Pass, 4, ""),
            run(ExecutionStatus::Pass, 5, ""),
            run(ExecutionStatus::Fail, 6, "server down, timeout, environment broken"),
        ];
        assert!(close(environment_factor(&tc, &cfg), 0.3));
    }

    #[test]
    fn confidence_accumulates_and_caps() {
        let cfg = EngineConfig::default();
        let none = FactorBreakdown::default();
        assert!(close(confidence_score(&none, &cfg), 0.5 + 0.1 + 0.05 + 0.1));

        let strong = FactorBreakdown {
            history: 0.9,
            recency: 0.8,
            category: 1.0,
            related_impact: 0.2,
            environment: 0.1,
        };
        assert!(close(confidence_score(&strong, &cfg), 1.0));
    }

    #[test]
    fn risk_level_boundaries_are_inclusive() {
        let t = RiskThresholds::default();
        assert_eq!(classify_risk_level(0.8, Priority::High, &t), RiskLevel::Critical);
        assert_eq!(classify_risk_level(0.79, Priority::High, &t), RiskLevel::High);
        assert_eq!(classify_risk_level(0.6, Priority::Critical, &t), RiskLevel::Critical);
        assert_eq!(classify_risk_level(0.6, Priority::Medium, &t), RiskLevel::High);
        assert_eq!(classify_risk_level(0.4, Priority::High, &t), RiskLevel::High);
        assert_eq!(classify_risk_level(0.4, Priority::Low, &t), RiskLevel::Medium);
        assert_eq!(classify_risk_level(0.39, Priority::Critical, &t), RiskLevel::Low);
    }

    #[test]
    fn critical_priority_below_its_floor_still_gets_the_high_floor() {
        let t = RiskThresholds::default();
        assert_eq!(classify_risk_level(0.5, Priority::Critical, &t), RiskLevel::High);
        assert_eq!(classify_risk_level(0.5, Priority::High, &t), RiskLevel::High);
        assert_eq!(classify_risk_level(0.5, Priority::Medium, &t), RiskLevel::Medium);
    }

    #[test]
    fn score_is_clamped_and_carries_reason() {
        let cfg = EngineConfig::default();
        let mut tc = case("SEC-1", "Security", Priority::Critical);
        tc.execution_history = (0..5)
            .map(|d| run(ExecutionStatus::Fail, d, "server timeout on network"))
            .collect();
        tc.last_execution = Some(LastExecution {
            date: days_ago(0),
            status: ExecutionStatus::Fail,
            ..LastExecution::default()
        });
        let score = score_test_case(&tc, std::slice::from_ref(&tc), &cfg, now());
        assert!(score.failure_probability <= 1.0);
        assert!(score.confidence_score <= 1.0);
        assert_eq!(score.risk_level, RiskLevel::Critical);
        assert!(score.priority_reason.starts_with("Execute immediately"));
        assert!(score.insights.contains(&"high failure rate".to_string()));
        assert_eq!(
            score.insights.last().map(String::as_str),
            Some("Strategic: schedule in the first execution batch")
        );
        assert_eq!(score.recommended_order, 0);
    }
}
