use crate::errors::RiskEngineError;
use crate::logging::{append_run_log, LogLevel};
use crate::runtime::FileSystem;
use crate::types::{CategoryTag, Priority, TestCategory};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub run_log: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub path: Option<PathBuf>,
    pub level: LogLevel,
    pub max_payload_bytes: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: None,
            level: LogLevel::Info,
            max_payload_bytes: 4096,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Every weight and threshold the scoring, ranking and failure-analysis code reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub factor_weights: FactorWeights,
    pub history: HistoryConfig,
    pub recency: RecencyConfig,
    #[serde(deserialize_with = "category_table")]
    pub category_weights: BTreeMap<CategoryTag, f64>,
    pub default_category_weight: f64,
    pub priority_weights: PriorityWeights,
    pub related_impact: RelatedImpactConfig,
    pub environment: EnvironmentConfig,
    pub confidence: ConfidenceConfig,
    pub risk_thresholds: RiskThresholds,
    pub analysis: AnalysisConfig,
    pub relevance: RelevanceConfig,
    pub assessment: AssessmentConfig,
    pub blocking: BlockingConfig,
}

/// Note the defaults sum to 1.10; the combined probability is clamped afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FactorWeights {
    pub history: f64,
    pub recency: f64,
    pub category: f64,
    pub related_impact: f64,
    pub environment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub window: usize,
    pub recent_window: usize,
    pub recent_failure_bonus: f64,
    pub never_executed: f64,
    pub executed_without_history: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecencyConfig {
    pub never_executed: f64,
    pub recent_failure_days: f64,
    pub recent_failure: f64,
    pub recent_blocked_days: f64,
    pub recent_blocked: f64,
    pub stale_after_days: f64,
    pub stale: f64,
    pub recent_pass_days: f64,
    pub recent_pass: f64,
    pub fallback: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PriorityWeights {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub unspecified: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelatedImpactConfig {
    pub same_category: f64,
    pub same_category_cap: f64,
    pub shared_requirement: f64,
    pub shared_requirement_cap: f64,
    pub elevated_peer: f64,
    pub elevated_peer_cap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub window: usize,
    pub keywords: Vec<String>,
    pub per_match: f64,
    pub cap: f64,
    pub stable: f64,
    pub no_history: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub base: f64,
    pub history_signal: f64,
    pub history_fallback: f64,
    pub recency_threshold: f64,
    pub recency_signal: f64,
    pub recency_fallback: f64,
    pub baseline: f64,
    pub related_signal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskThresholds {
    pub critical: f64,
    pub critical_priority_floor: f64,
    pub high: f64,
    pub high_priority_floor: f64,
    pub medium: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub recommended_order_len: usize,
    pub unstable_share: f64,
    pub front_load_share: f64,
    pub risky_category_sum: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelevanceConfig {
    pub same_category: f64,
    pub shared_requirement: f64,
    pub keyword_match: f64,
    pub step_similarity: f64,
    pub min_score: f64,
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AssessmentConfig {
    pub critical_priority: u32,
    pub high_priority: u32,
    pub medium_priority: u32,
    pub low_priority: u32,
    pub unspecified_priority: u32,
    pub per_related: u32,
    pub related_cap: u32,
    pub severe_symptom: u32,
    pub moderate_symptom: u32,
    pub minor_symptom: u32,
    pub auth_security_category: u32,
    pub api_database_category: u32,
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlockingConfig {
    pub critical_limit: usize,
    pub high_limit: usize,
    pub related_count_threshold: usize,
    pub related_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            factor_weights: FactorWeights::default(),
            history: HistoryConfig::default(),
            recency: RecencyConfig::default(),
            category_weights: default_category_weights(),
            default_category_weight: 0.4,
            priority_weights: PriorityWeights::default(),
            related_impact: RelatedImpactConfig::default(),
            environment: EnvironmentConfig::default(),
            confidence: ConfidenceConfig::default(),
            risk_thresholds: RiskThresholds::default(),
            analysis: AnalysisConfig::default(),
            relevance: RelevanceConfig::default(),
            assessment: AssessmentConfig::default(),
            blocking: BlockingConfig::default(),
        }
    }
}

fn default_category_weights() -> BTreeMap<CategoryTag, f64> {
    BTreeMap::from([
        (CategoryTag::Security, 0.8),
        (CategoryTag::Authentication, 0.7),
        (CategoryTag::Api, 0.6),
        (CategoryTag::Integration, 0.6),
        (CategoryTag::Performance, 0.5),
        (CategoryTag::Mobile, 0.5),
        (CategoryTag::UiUx, 0.4),
        (CategoryTag::Functional, 0.3),
        (CategoryTag::Database, 0.4),
    ])
}

fn category_table<'de, D>(deserializer: D) -> Result<BTreeMap<CategoryTag, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, f64>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, weight)| {
            CategoryTag::parse(&key)
                .map(|tag| (tag, weight))
                .ok_or_else(|| {
                    serde::de::Error::custom(format!("unknown category `{key}` in category_weights"))
                })
        })
        .collect()
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            history: 0.40,
            recency: 0.25,
            category: 0.20,
            related_impact: 0.15,
            environment: 0.10,
        }
    }
}

impl FactorWeights {
    pub fn total(&self) -> f64 {
        self.history + self.recency + self.category + self.related_impact + self.environment
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window: 10,
            recent_window: 3,
            recent_failure_bonus: 0.3,
            never_executed: 0.4,
            executed_without_history: 0.2,
        }
    }
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            never_executed: 0.6,
            recent_failure_days: 7.0,
            recent_failure: 0.8,
            recent_blocked_days: 14.0,
            recent_blocked: 0.7,
            stale_after_days: 30.0,
            stale: 0.5,
            recent_pass_days: 7.0,
            recent_pass: 0.1,
            fallback: 0.3,
        }
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            critical: 0.8,
            high: 0.6,
            medium: 0.4,
            low: 0.2,
            unspecified: 0.4,
        }
    }
}

impl PriorityWeights {
    pub fn weight(&self, priority: Priority) -> f64 {
        match priority {
            Priority::Critical => self.critical,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
            Priority::Unspecified => self.unspecified,
        }
    }
}

impl Default for RelatedImpactConfig {
    fn default() -> Self {
        Self {
            same_category: 0.1,
            same_category_cap: 0.4,
            shared_requirement: 0.15,
            shared_requirement_cap: 0.3,
            elevated_peer: 0.2,
            elevated_peer_cap: 0.3,
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            window: 5,
            keywords: ["timeout", "connection", "server", "network", "environment"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            per_match: 0.3,
            cap: 0.8,
            stable: 0.1,
            no_history: 0.3,
        }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 0.5,
            history_signal: 0.2,
            history_fallback: 0.1,
            recency_threshold: 0.5,
            recency_signal: 0.15,
            recency_fallback: 0.05,
            baseline: 0.1,
            related_signal: 0.1,
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 0.8,
            critical_priority_floor: 0.6,
            high: 0.6,
            high_priority_floor: 0.4,
            medium: 0.4,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            recommended_order_len: 10,
            unstable_share: 0.3,
            front_load_share: 0.2,
            risky_category_sum: 0.5,
        }
    }
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            same_category: 30.0,
            shared_requirement: 25.0,
            keyword_match: 15.0,
            step_similarity: 10.0,
            min_score: 20.0,
            max_results: 10,
        }
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            critical_priority: 40,
            high_priority: 30,
            medium_priority: 20,
            low_priority: 10,
            unspecified_priority: 10,
            per_related: 5,
            related_cap: 30,
            severe_symptom: 30,
            moderate_symptom: 20,
            minor_symptom: 10,
            auth_security_category: 25,
            api_database_category: 20,
            critical: 80,
            high: 60,
            medium: 40,
        }
    }
}

impl AssessmentConfig {
    pub fn priority_points(&self, priority: Priority) -> u32 {
        match priority {
            Priority::Critical => self.critical_priority,
            Priority::High => self.high_priority,
            Priority::Medium => self.medium_priority,
            Priority::Low => self.low_priority,
            Priority::Unspecified => self.unspecified_priority,
        }
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            critical_limit: 8,
            high_limit: 5,
            related_count_threshold: 5,
            related_limit: 3,
        }
    }
}

impl EngineConfig {
    /// Lookup only; the table is guaranteed complete once `validate_engine_config` has passed.
    pub fn category_weight(&self, category: &TestCategory) -> f64 {
        category
            .tag()
            .and_then(|tag| self.category_weights.get(&tag).copied())
            .unwrap_or(self.default_category_weight)
    }

    pub fn validated(self) -> Result<Self, RiskEngineError> {
        validate_engine_config(&self)?;
        Ok(self)
    }
}

pub fn load_config(
    overrides: &CliOverrides,
    fs: &dyn FileSystem,
) -> Result<AppConfig, RiskEngineError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        cfg = parse_config_file(fs, path)?;
    }

    apply_cli_overrides(&mut cfg, overrides);
    validate_config(&cfg)?;

    append_run_log(
        "debug",
        "config.loaded",
        json!({
            "config_path": overrides.config_path.as_ref().map(|p| p.display().to_string()),
            "factor_weight_total": cfg.engine.factor_weights.total(),
            "format": cfg.output.format,
        }),
    );
    Ok(cfg)
}

fn parse_config_file(fs: &dyn FileSystem, path: &Path) -> Result<AppConfig, RiskEngineError> {
    let file_contents = fs.read_to_string(path)?;
    toml::from_str(&file_contents).map_err(|e| RiskEngineError::ConfigParse(e.to_string()))
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(format) = overrides.format {
        cfg.output.format = format;
    }
    if let Some(path) = &overrides.run_log {
        cfg.logging.path = Some(path.clone());
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), RiskEngineError> {
    if cfg.logging.max_payload_bytes < 16 {
        return Err(RiskEngineError::InvalidConfig(
            "logging.max_payload_bytes must be at least 16".to_string(),
        ));
    }
    validate_engine_config(&cfg.engine)
}

pub fn validate_engine_config(cfg: &EngineConfig) -> Result<(), RiskEngineError> {
    for tag in CategoryTag::all() {
        if !cfg.category_weights.contains_key(tag) {
            return Err(RiskEngineError::InvalidConfig(format!(
                "category_weights is missing an entry for {}",
                tag.label()
            )));
        }
    }

    let w = &cfg.factor_weights;
    let h = &cfg.history;
    let r = &cfg.recency;
    let p = &cfg.priority_weights;
    let ri = &cfg.related_impact;
    let e = &cfg.environment;
    let c = &cfg.confidence;
    let t = &cfg.risk_thresholds;
    let a = &cfg.analysis;
    let rel = &cfg.relevance;

    let mut unit_values = vec![
        ("history.recent_failure_bonus", h.recent_failure_bonus),
        ("history.never_executed", h.never_executed),
        ("history.executed_without_history", h.executed_without_history),
        ("recency.never_executed", r.never_executed),
        ("recency.recent_failure", r.recent_failure),
        ("recency.recent_blocked", r.recent_blocked),
        ("recency.stale", r.stale),
        ("recency.recent_pass", r.recent_pass),
        ("recency.fallback", r.fallback),
        ("default_category_weight", cfg.default_category_weight),
        ("priority_weights.critical", p.critical),
        ("priority_weights.high", p.high),
        ("priority_weights.medium", p.medium),
        ("priority_weights.low", p.low),
        ("priority_weights.unspecified", p.unspecified),
        ("related_impact.same_category", ri.same_category),
        ("related_impact.same_category_cap", ri.same_category_cap),
        ("related_impact.shared_requirement", ri.shared_requirement),
        ("related_impact.shared_requirement_cap", ri.shared_requirement_cap),
        ("related_impact.elevated_peer", ri.elevated_peer),
        ("related_impact.elevated_peer_cap", ri.elevated_peer_cap),
        ("environment.per_match", e.per_match),
        ("environment.cap", e.cap),
        ("environment.stable", e.stable),
        ("environment.no_history", e.no_history),
        ("confidence.base", c.base),
        ("confidence.history_signal", c.history_signal),
        ("confidence.history_fallback", c.history_fallback),
        ("confidence.recency_threshold", c.recency_threshold),
        ("confidence.recency_signal", c.recency_signal),
        ("confidence.recency_fallback", c.recency_fallback),
        ("confidence.baseline", c.baseline),
        ("confidence.related_signal", c.related_signal),
        ("risk_thresholds.critical", t.critical),
        ("risk_thresholds.critical_priority_floor", t.critical_priority_floor),
        ("risk_thresholds.high", t.high),
        ("risk_thresholds.high_priority_floor", t.high_priority_floor),
        ("risk_thresholds.medium", t.medium),
        ("analysis.unstable_share", a.unstable_share),
        ("analysis.front_load_share", a.front_load_share),
    ];
    for (tag, weight) in &cfg.category_weights {
        unit_values.push((tag.label(), *weight));
    }
    for (name, value) in unit_values {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(RiskEngineError::InvalidConfig(format!(
                "{name} must be within [0, 1], got {value}"
            )));
        }
    }

    let non_negative = [
        ("factor_weights.history", w.history),
        ("factor_weights.recency", w.recency),
        ("factor_weights.category", w.category),
        ("factor_weights.related_impact", w.related_impact),
        ("factor_weights.environment", w.environment),
        ("recency.recent_failure_days", r.recent_failure_days),
        ("recency.recent_blocked_days", r.recent_blocked_days),
        ("recency.stale_after_days", r.stale_after_days),
        ("recency.recent_pass_days", r.recent_pass_days),
        ("analysis.risky_category_sum", a.risky_category_sum),
        ("relevance.same_category", rel.same_category),
        ("relevance.shared_requirement", rel.shared_requirement),
        ("relevance.keyword_match", rel.keyword_match),
        ("relevance.step_similarity", rel.step_similarity),
        ("relevance.min_score", rel.min_score),
    ];
    for (name, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(RiskEngineError::InvalidConfig(format!(
                "{name} must be a finite non-negative number, got {value}"
            )));
        }
    }

    let windows = [
        ("history.window", h.window),
        ("history.recent_window", h.recent_window),
        ("environment.window", e.window),
        ("analysis.recommended_order_len", a.recommended_order_len),
        ("relevance.max_results", rel.max_results),
    ];
    for (name, value) in windows {
        if value == 0 {
            return Err(RiskEngineError::InvalidConfig(format!(
                "{name} must be greater than zero"
            )));
        }
    }

    if e.keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(RiskEngineError::InvalidConfig(
            "environment.keywords must contain at least one keyword".to_string(),
        ));
    }

    if !(t.critical >= t.high && t.high >= t.medium) {
        return Err(RiskEngineError::InvalidConfig(
            "risk_thresholds must satisfy critical >= high >= medium".to_string(),
        ));
    }
    let s = &cfg.assessment;
    if !(s.critical >= s.high && s.high >= s.medium) {
        return Err(RiskEngineError::InvalidConfig(
            "assessment thresholds must satisfy critical >= high >= medium".to_string(),
        ));
    }

    let b = &cfg.blocking;
    if b.related_limit > b.high_limit || b.high_limit > b.critical_limit {
        return Err(RiskEngineError::InvalidConfig(
            "blocking limits must satisfy related_limit <= high_limit <= critical_limit"
                .to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, CliOverrides, EngineConfig, OutputFormat};
    use crate::errors::RiskEngineError;
    use crate::logging::LogLevel;
    use crate::runtime::FakeFileSystem;
    use crate::types::{CategoryTag, Priority, TestCategory};
    use std::path::PathBuf;

    fn overrides_for(path: &str) -> CliOverrides {
        CliOverrides {
            config_path: Some(PathBuf::from(path)),
            ..CliOverrides::default()
        }
    }

    #[test]
    fn default_weight_tables_match_fixture() {
        let cfg = EngineConfig::default();
        let expected = [
            (CategoryTag::Security, 0.8),
            (CategoryTag::Authentication, 0.7),
            (CategoryTag::Api, 0.6),
            (CategoryTag::Integration, 0.6),
            (CategoryTag::Performance, 0.5),
            (CategoryTag::Mobile, 0.5),
            (CategoryTag::UiUx, 0.4),
            (CategoryTag::Functional, 0.3),
        ];
        for (tag, weight) in expected {
            assert_eq!(cfg.category_weight(&TestCategory::Known(tag)), weight);
        }
        assert_eq!(
            cfg.category_weight(&TestCategory::Other("Exploratory".to_string())),
            0.4
        );
        assert_eq!(cfg.priority_weights.weight(Priority::Critical), 0.8);
        assert_eq!(cfg.priority_weights.weight(Priority::High), 0.6);
        assert_eq!(cfg.priority_weights.weight(Priority::Medium), 0.4);
        assert_eq!(cfg.priority_weights.weight(Priority::Low), 0.2);
        assert_eq!(cfg.priority_weights.weight(Priority::Unspecified), 0.4);
    }

    #[test]
    fn default_factor_weights_keep_the_historic_overshoot() {
        let total = EngineConfig::default().factor_weights.total();
        assert!((total - 1.10).abs() < 1e-9);
        assert!(EngineConfig::default().validated().is_ok());
    }

    #[test]
    fn partial_toml_overlays_defaults() {
        let fs = FakeFileSystem::with_file(
            "/cfg.toml",
            r#"
[engine.recency]
recent_failure = 0.9

[engine.blocking]
critical_limit = 10

[logging]
level = "debug"

[output]
format = "markdown"
"#,
        );
        let cfg = load_config(&overrides_for("/cfg.toml"), &fs).expect("config");
        assert_eq!(cfg.engine.recency.recent_failure, 0.9);
        assert_eq!(cfg.engine.recency.recent_blocked, 0.7);
        assert_eq!(cfg.engine.blocking.critical_limit, 10);
        assert_eq!(cfg.engine.blocking.high_limit, 5);
        assert_eq!(cfg.logging.level, LogLevel::Debug);
        assert_eq!(cfg.output.format, OutputFormat::Markdown);
    }

    #[test]
    fn cli_overrides_win_over_file() {
        let fs = FakeFileSystem::with_file("/cfg.toml", "[output]\nformat = \"markdown\"\n");
        let overrides = CliOverrides {
            config_path: Some(PathBuf::from("/cfg.toml")),
            format: Some(OutputFormat::Json),
            run_log: Some(PathBuf::from("/tmp/run.jsonl")),
        };
        let cfg = load_config(&overrides, &fs).expect("config");
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert_eq!(cfg.logging.path, Some(PathBuf::from("/tmp/run.jsonl")));
    }

    #[test]
    fn incomplete_category_table_is_rejected() {
        let fs = FakeFileSystem::with_file(
            "/cfg.toml",
            "[engine.category_weights]\nSecurity = 0.9\n",
        );
        let err = load_config(&overrides_for("/cfg.toml"), &fs).expect_err("must fail");
        assert!(matches!(err, RiskEngineError::InvalidConfig(msg) if msg.contains("Authentication")));
    }

    #[test]
    fn unknown_category_key_is_a_parse_error() {
        let fs = FakeFileSystem::with_file(
            "/cfg.toml",
            "[engine.category_weights]\nBlockchain = 0.9\n",
        );
        let err = load_config(&overrides_for("/cfg.toml"), &fs).expect_err("must fail");
        assert!(matches!(err, RiskEngineError::ConfigParse(_)));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.priority_weights.high = 1.5;
        assert!(matches!(
            cfg.validated(),
            Err(RiskEngineError::InvalidConfig(msg)) if msg.contains("priority_weights.high")
        ));

        let mut cfg = EngineConfig::default();
        cfg.risk_thresholds.high = 0.9;
        assert!(cfg.validated().is_err());

        let mut cfg = EngineConfig::default();
        cfg.history.window = 0;
        assert!(cfg.validated().is_err());
    }

    #[test]
    fn missing_config_file_surfaces_io_error() {
        let fs = FakeFileSystem::default();
        let err = load_config(&overrides_for("/missing.toml"), &fs).expect_err("must fail");
        assert!(matches!(err, RiskEngineError::Io(_)));
    }
}
