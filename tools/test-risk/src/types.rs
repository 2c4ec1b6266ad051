use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Priority {
    #[serde(alias = "critical", alias = "CRITICAL")]
    Critical,
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Unspecified => "Unspecified",
        }
    }

    /// Higher is more urgent. Used as the final sort key when ranking.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Unspecified => 0,
        }
    }

    pub fn is_elevated(self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    #[serde(alias = "pass", alias = "PASS", alias = "Passed")]
    Pass,
    #[serde(alias = "fail", alias = "FAIL", alias = "Failed")]
    Fail,
    #[serde(alias = "blocked", alias = "BLOCKED")]
    Blocked,
    #[serde(rename = "Not Executed", alias = "NotExecuted", alias = "not_executed")]
    NotExecuted,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Fail | Self::Blocked)
    }
}

/// Test categories that carry their own scoring weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryTag {
    Security,
    Authentication,
    #[serde(rename = "API")]
    Api,
    Integration,
    Performance,
    Mobile,
    #[serde(rename = "UI/UX")]
    UiUx,
    Functional,
    Database,
}

impl CategoryTag {
    pub const fn all() -> &'static [Self] {
        &[
            Self::Security,
            Self::Authentication,
            Self::Api,
            Self::Integration,
            Self::Performance,
            Self::Mobile,
            Self::UiUx,
            Self::Functional,
            Self::Database,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Security => "Security",
            Self::Authentication => "Authentication",
            Self::Api => "API",
            Self::Integration => "Integration",
            Self::Performance => "Performance",
            Self::Mobile => "Mobile",
            Self::UiUx => "UI/UX",
            Self::Functional => "Functional",
            Self::Database => "Database",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|tag| tag.label().eq_ignore_ascii_case(trimmed))
    }
}

/// A test case's category: one of the weighted tags, or any other free-form name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TestCategory {
    Known(CategoryTag),
    Other(String),
}

impl TestCategory {
    pub fn tag(&self) -> Option<CategoryTag> {
        match self {
            Self::Known(tag) => Some(*tag),
            Self::Other(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Known(tag) => tag.label(),
            Self::Other(raw) => raw.as_str(),
        }
    }

    pub fn is(&self, tag: CategoryTag) -> bool {
        self.tag() == Some(tag)
    }
}

impl Default for TestCategory {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for TestCategory {
    fn from(value: String) -> Self {
        match CategoryTag::parse(&value) {
            Some(tag) => Self::Known(tag),
            None => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<&str> for TestCategory {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TestCategory> for String {
    fn from(value: TestCategory) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for TestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    #[serde(default)]
    pub step_number: u32,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub expected: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastExecution {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub tester: String,
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    #[serde(default)]
    pub execution_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub tester: String,
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ticket: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: TestCategory,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub current_status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub linked_requirements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub steps: Vec<TestStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_execution: Option<LastExecution>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub execution_history: Vec<ExecutionRecord>,
}

impl TestCase {
    pub fn has_identity(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn never_executed(&self) -> bool {
        self.last_execution.is_none() && self.execution_history.is_empty()
    }

    pub fn shares_requirement_with(&self, other: &TestCase) -> bool {
        self.linked_requirements
            .iter()
            .any(|req| other.linked_requirements.contains(req))
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }

    pub fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Coarse technical bucket a failure description is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactCategory {
    #[serde(rename = "Authentication/Authorization")]
    Authentication,
    #[serde(rename = "API/Service")]
    ApiService,
    #[serde(rename = "Database/Data")]
    DatabaseData,
    #[serde(rename = "User Interface")]
    UserInterface,
    Performance,
    Security,
    #[serde(rename = "Network/Infrastructure")]
    NetworkInfrastructure,
    General,
}

impl ImpactCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Authentication => "Authentication/Authorization",
            Self::ApiService => "API/Service",
            Self::DatabaseData => "Database/Data",
            Self::UserInterface => "User Interface",
            Self::Performance => "Performance",
            Self::Security => "Security",
            Self::NetworkInfrastructure => "Network/Infrastructure",
            Self::General => "General",
        }
    }
}

impl fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorBreakdown {
    pub history: f64,
    pub recency: f64,
    pub category: f64,
    pub related_impact: f64,
    pub environment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiScore {
    pub failure_probability: f64,
    pub risk_level: RiskLevel,
    pub confidence_score: f64,
    pub priority_reason: String,
    /// Dense 1-based rank; zero until the ranker assigns it.
    pub recommended_order: usize,
    pub insights: Vec<String>,
    pub factors: FactorBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredTestCase {
    #[serde(flatten)]
    pub test_case: TestCase,
    pub ai_score: AiScore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInsights {
    pub summary: Vec<String>,
    pub patterns: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationAnalysis {
    pub total_tests: usize,
    pub high_risk_tests: usize,
    pub critical_risk_tests: usize,
    pub recommended_execution_order: Vec<String>,
    pub insights: AnalysisInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationResult {
    pub test_cases: Vec<ScoredTestCase>,
    pub analysis: PrioritizationAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTestCase {
    pub id: String,
    pub title: String,
    pub category: TestCategory,
    pub priority: Priority,
    pub relevance_score: f64,
    pub match_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingRecommendation {
    pub should_block: bool,
    pub reason: String,
    pub test_cases_to_block: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureAnalysis {
    pub failed_test_case_id: String,
    pub keywords: Vec<String>,
    pub related_test_cases: Vec<RelatedTestCase>,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub impact_category: ImpactCategory,
    pub blocking_recommendation: BlockingRecommendation,
    pub suggested_actions: Vec<String>,
    pub testing_impact: String,
}
