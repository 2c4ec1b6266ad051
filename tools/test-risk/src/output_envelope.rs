use crate::errors::RiskEngineError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Prioritization,
    FailureAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEnvelope {
    pub schema_version: u32,
    pub kind: ReportKind,
    pub input_fingerprint: String,
    pub payload: serde_json::Value,
}

/// SHA-256 over the compact JSON rendering of `inputs`, hex encoded.
pub fn input_fingerprint(inputs: &serde_json::Value) -> Result<String, RiskEngineError> {
    let canonical =
        serde_json::to_string(inputs).map_err(|e| RiskEngineError::Serialization(e.to_string()))?;
    let mut digest = Sha256::new();
    digest.update(canonical.as_bytes());
    let bytes = digest.finalize();
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    Ok(out)
}

pub fn build_envelope<T: Serialize>(
    kind: ReportKind,
    input_fingerprint: String,
    payload: &T,
) -> Result<OutputEnvelope, RiskEngineError> {
    let payload = serde_json::to_value(payload)
        .map_err(|e| RiskEngineError::Serialization(e.to_string()))?;
    Ok(OutputEnvelope {
        schema_version: SCHEMA_VERSION,
        kind,
        input_fingerprint,
        payload,
    })
}

pub fn parse_envelope(
    raw_text: &str,
    expected_kind: ReportKind,
) -> Result<OutputEnvelope, RiskEngineError> {
    let envelope: OutputEnvelope = serde_json::from_str(raw_text.trim())
        .map_err(|e| RiskEngineError::OutputEnvelope(format!("invalid json: {e}")))?;

    if envelope.schema_version != SCHEMA_VERSION {
        return Err(RiskEngineError::OutputEnvelope(format!(
            "schema_version must be {SCHEMA_VERSION}"
        )));
    }

    if envelope.kind != expected_kind {
        return Err(RiskEngineError::OutputEnvelope(format!(
            "kind mismatch: expected {:?}, got {:?}",
            expected_kind, envelope.kind
        )));
    }

    Ok(envelope)
}
