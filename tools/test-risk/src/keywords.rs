//! Keyword extraction and impact-category classification for free-text failure reports.

use crate::types::ImpactCategory;

const TECHNICAL_GROUPS: [&[&str]; 10] = [
    &["database", "sql"],
    &["api", "endpoint", "service"],
    &["auth", "login", "session"],
    &["permission", "authorization"],
    &["network", "timeout"],
    &["ui", "frontend", "button", "form"],
    &["backend", "server", "5xx"],
    &["validation", "exception"],
    &["performance", "slow", "loading"],
    &["security", "ssl", "certificate"],
];

const PRODUCT_AREAS: &[&str] = &[
    "login",
    "dashboard",
    "profile",
    "settings",
    "search",
    "cart",
    "checkout",
    "payment",
    "upload",
    "download",
];

/// Checked top to bottom; the first bucket with a hit wins.
const IMPACT_RULES: &[(ImpactCategory, &[&str])] = &[
    (
        ImpactCategory::Authentication,
        &[
            "auth",
            "login",
            "logout",
            "session",
            "permission",
            "unauthorized",
            "forbidden",
            "credential",
            "password",
        ],
    ),
    (
        ImpactCategory::ApiService,
        &["api", "endpoint", "service", "request", "response"],
    ),
    (
        ImpactCategory::DatabaseData,
        &["database", "sql", "query", "db", "data", "record"],
    ),
    (
        ImpactCategory::UserInterface,
        &[
            "ui", "frontend", "button", "form", "display", "layout", "render", "page", "screen",
            "modal",
        ],
    ),
    (
        ImpactCategory::Performance,
        &[
            "performance",
            "slow",
            "timeout",
            "timed",
            "latency",
            "loading",
            "lag",
            "memory",
        ],
    ),
    (
        ImpactCategory::Security,
        &[
            "security",
            "ssl",
            "tls",
            "certificate",
            "xss",
            "csrf",
            "injection",
            "encryption",
            "vulnerab",
        ],
    ),
    (
        ImpactCategory::NetworkInfrastructure,
        &[
            "network",
            "connection",
            "dns",
            "offline",
            "proxy",
            "gateway",
            "server",
            "infrastructure",
        ],
    ),
];

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Any three-digit 5NN status code counts as part of the backend group.
fn is_server_status(token: &str) -> bool {
    token.len() == 3 && token.starts_with('5') && token.bytes().all(|b| b.is_ascii_digit())
}

/// Matched tokens in the order they first appear in `description`, without duplicates.
pub fn extract_keywords(description: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in tokenize(description) {
        let known = PRODUCT_AREAS.contains(&token.as_str())
            || is_server_status(&token)
            || TECHNICAL_GROUPS
                .iter()
                .any(|group| group.contains(&token.as_str()));
        if known && !keywords.contains(&token) {
            keywords.push(token);
        }
    }
    keywords
}

/// Plain substring search over the lower-cased text, so "auth" also hits "oauth" and "ui" hits
/// "build". The first bucket with a hit wins.
pub fn categorize_failure(description: &str) -> ImpactCategory {
    let text = description.to_lowercase();
    IMPACT_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| text.contains(needle)))
        .map_or(ImpactCategory::General, |(category, _)| *category)
}

#[cfg(test)]
mod tests {
    use super::{categorize_failure, extract_keywords};
    use crate::types::ImpactCategory;

    #[test]
    fn extracts_technical_terms_and_product_areas_once() {
        let keywords =
            extract_keywords("Login API timeout on Checkout; login retried, API still slow");
        assert_eq!(
            keywords,
            vec!["login", "api", "timeout", "checkout", "slow"]
        );
    }

    #[test]
    fn extraction_ignores_partial_words() {
        assert!(extract_keywords("the uid formatting changed").is_empty());
        assert_eq!(extract_keywords("HTTP 503 from backend"), vec!["503", "backend"]);
    }

    #[test]
    fn extraction_only_knows_the_fixed_vocabulary() {
        assert!(
            extract_keywords("Required field missing on page, token refused, access denied")
                .is_empty()
        );
        assert!(extract_keywords("query latency and dns lag, tls encryption modal").is_empty());
    }

    #[test]
    fn any_5nn_status_code_is_a_backend_keyword() {
        assert_eq!(
            extract_keywords("got 501 then 599, never 600 or 5000"),
            vec!["501", "599"]
        );
        assert_eq!(extract_keywords("5xx burst"), vec!["5xx"]);
    }

    #[test]
    fn categories_follow_first_match_order() {
        assert_eq!(
            categorize_failure("API returned 500 error, timeout after 30s"),
            ImpactCategory::ApiService
        );
        assert_eq!(
            categorize_failure("Session expired while calling the payments API"),
            ImpactCategory::Authentication
        );
        assert_eq!(
            categorize_failure("SQL constraint violation"),
            ImpactCategory::DatabaseData
        );
        assert_eq!(
            categorize_failure("Submit button misaligned"),
            ImpactCategory::UserInterface
        );
        assert_eq!(
            categorize_failure("Report generation is slow"),
            ImpactCategory::Performance
        );
        assert_eq!(
            categorize_failure("Expired SSL certificate"),
            ImpactCategory::Security
        );
        assert_eq!(
            categorize_failure("DNS resolution flaky"),
            ImpactCategory::NetworkInfrastructure
        );
        assert_eq!(
            categorize_failure("Totals are off by one"),
            ImpactCategory::General
        );
    }

    #[test]
    fn categories_match_inside_words() {
        assert_eq!(
            categorize_failure("OAuth callback rejected"),
            ImpactCategory::Authentication
        );
        assert_eq!(
            categorize_failure("Build of report crashed"),
            ImpactCategory::UserInterface
        );
        // "form" sits inside "performance", and User Interface is checked first.
        assert_eq!(
            categorize_failure("Performance degraded"),
            ImpactCategory::UserInterface
        );
    }
}
