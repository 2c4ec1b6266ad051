use crate::types::{CategoryTag, ImpactCategory, RiskLevel, TestCategory};

const CRITICAL_ACTIONS: &[&str] = &[
    "Escalate to the development lead immediately",
    "Halt the release pipeline until the root cause is fixed",
    "Notify stakeholders of the critical failure and its blast radius",
];

const HIGH_ACTIONS: &[&str] = &[
    "Prioritize root-cause investigation in the current sprint",
    "Re-run the related test cases once a fix is available",
];

const GENERIC_ACTIONS: &[&str] = &[
    "Document the failure with screenshots, logs, and exact reproduction steps",
    "Schedule a re-test once the fix is deployed",
    "Add this scenario to the regression suite",
    "Add preventive test cases for similar failure modes",
];

fn category_checklist(category: ImpactCategory) -> &'static [&'static str] {
    match category {
        ImpactCategory::Authentication => &[
            "Verify credentials, token issuance, and session expiry settings",
            "Check role and permission mappings for the affected user",
            "Review recent changes to the identity provider configuration",
        ],
        ImpactCategory::ApiService => &[
            "Inspect API request and response payloads for the failing call",
            "Check service health, logs, and recent deployments",
            "Validate the API contract against the client expectations",
            "Confirm dependent downstream services are reachable",
        ],
        ImpactCategory::DatabaseData => &[
            "Check database connectivity and connection pool usage",
            "Validate the test data and seed scripts",
            "Review recent schema migrations and query changes",
        ],
        ImpactCategory::UserInterface => &[
            "Reproduce across supported browsers and screen sizes",
            "Check the browser console for script errors",
            "Compare against the latest approved UI design",
        ],
        ImpactCategory::Performance => &[
            "Profile response times under the same load",
            "Check server CPU, memory, and database query times",
            "Compare against the performance baseline of the last release",
        ],
        ImpactCategory::Security => &[
            "Engage the security team for an impact assessment",
            "Check certificates, TLS settings, and security headers",
            "Review audit logs for signs of exploitation",
            "Restrict exposure of the affected feature until patched",
        ],
        ImpactCategory::NetworkInfrastructure => &[
            "Check network connectivity, DNS, and proxy configuration",
            "Verify the test environment infrastructure is healthy",
            "Retry from a different network segment to rule out local issues",
        ],
        ImpactCategory::General => &[
            "Reproduce the failure and capture the exact conditions",
            "Collect application logs from the time of failure",
            "Compare behavior against the last passing build",
        ],
    }
}

/// Risk-tier actions (critical/high only), then the bucket checklist, then the QA basics.
pub fn suggested_actions(level: RiskLevel, category: ImpactCategory) -> Vec<String> {
    let tier: &[&str] = match level {
        RiskLevel::Critical => CRITICAL_ACTIONS,
        RiskLevel::High => HIGH_ACTIONS,
        RiskLevel::Medium | RiskLevel::Low => &[],
    };
    tier.iter()
        .chain(category_checklist(category))
        .chain(GENERIC_ACTIONS)
        .map(|action| action.to_string())
        .collect()
}

fn with_related(base: &str, related_count: usize) -> String {
    if related_count > 0 {
        format!("{base}; {related_count} related test cases may be affected")
    } else {
        base.to_string()
    }
}

/// Picks the narrative from the first matching symptom, then falls back to the test category.
/// Server errors are checked before slowness, which is checked before missing resources.
pub fn testing_impact(description: &str, category: &TestCategory, related_count: usize) -> String {
    let text = description.to_lowercase();
    let has_any = |needles: &[&str]| needles.iter().any(|needle| text.contains(needle));

    let base = if has_any(&["500", "server error"]) {
        "Server-side failure blocks every flow that depends on this component".to_string()
    } else if has_any(&["timeout", "slow"]) {
        "Performance degradation risks timeouts and a poor user experience under load".to_string()
    } else if has_any(&["404", "not found"]) {
        "A required resource is unavailable, so dependent pages and calls cannot complete"
            .to_string()
    } else if has_any(&["auth", "permission", "unauthorized"]) {
        "Access control failure may lock users out or expose restricted functionality".to_string()
    } else if has_any(&["validation", "invalid"]) {
        "Input validation failure may let bad data through or reject valid input".to_string()
    } else if category.is(CategoryTag::Security) {
        "Security failure may expose the system to exploitation".to_string()
    } else if category.is(CategoryTag::UiUx) {
        "User interface failure degrades usability and may block user journeys".to_string()
    } else {
        let area = if category.label().is_empty() {
            "general"
        } else {
            category.label()
        };
        format!("Failure in the {area} area may affect dependent functionality")
    };
    with_related(&base, related_count)
}
