use crate::types::ExecutionRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC), or a bare `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Fractional days between `raw` and `now`; `None` when the date cannot be read.
pub fn elapsed_days(now: DateTime<Utc>, raw: &str) -> Option<f64> {
    let then = parse_timestamp(raw)?;
    Some((now - then).num_seconds() as f64 / SECONDS_PER_DAY)
}

/// Newest-first view over an unordered history. Undated records sort after every dated one and
/// keep their relative input order.
pub fn most_recent(history: &[ExecutionRecord], limit: usize) -> Vec<&ExecutionRecord> {
    let mut dated = history
        .iter()
        .map(|record| (parse_timestamp(&record.date), record))
        .collect::<Vec<_>>();
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated
        .into_iter()
        .take(limit)
        .map(|(_, record)| record)
        .collect()
}
