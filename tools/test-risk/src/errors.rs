use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskEngineError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("output envelope error: {0}")]
    OutputEnvelope(String),
}
