//! Locates the artifact map inside a generate report.
//!
//! Candidates are gathered from `artifacts`, `result.artifacts` and JSON
//! fragments embedded in `result.logs`, in that order. The last candidate
//! found is the one returned; candidates are never merged.

use crate::report::{field, field_path, is_present, log_entries, ArtifactMap, LogEntry};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No artifact map found in generate output.")]
    NotFound,
    #[error("artifact map from {from:?} is not an object (got {kind})")]
    NotAMap {
        from: CandidateSource,
        kind: &'static str,
    },
}

/// Where a candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateSource {
    Artifacts,
    ResultArtifacts,
    Log { index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub artifacts: ArtifactMap,
    pub source: CandidateSource,
    /// Number of candidates seen, including the chosen one.
    pub candidates: usize,
}

pub fn extract(report: &Value) -> Result<ArtifactMap, ExtractError> {
    extract_with_source(report).map(|e| e.artifacts)
}

pub fn extract_with_source(report: &Value) -> Result<Extracted, ExtractError> {
    let mut candidates: Vec<(CandidateSource, Value)> = Vec::new();

    if let Some(v) = field(report, "artifacts") {
        candidates.push((CandidateSource::Artifacts, v.clone()));
    }
    if let Some(v) = field_path(report, &["result", "artifacts"]) {
        candidates.push((CandidateSource::ResultArtifacts, v.clone()));
    }
    candidates.extend(
        log_candidates(log_entries(report)).map(|(index, v)| (CandidateSource::Log { index }, v)),
    );

    let total = candidates.len();
    let (source, winner) = candidates.pop().ok_or(ExtractError::NotFound)?;
    debug!(?source, candidates = total, "artifact map selected");

    // The winner is never swapped for an earlier candidate, even when it
    // cannot be used as a path map.
    match winner {
        Value::Object(obj) => Ok(Extracted {
            artifacts: ArtifactMap::from_object(obj),
            source,
            candidates: total,
        }),
        other => Err(ExtractError::NotAMap {
            from: source,
            kind: crate::report::kind(&other),
        }),
    }
}

/// Lazily yields `(entry index, artifacts value)` for every log entry whose
/// text embeds a JSON fragment with a present `artifacts` field.
fn log_candidates(logs: &[Value]) -> impl Iterator<Item = (usize, Value)> + '_ {
    logs.iter().enumerate().filter_map(|(index, entry)| {
        let msg = LogEntry::from_value(entry).message()?;
        let fragment = match parse_fragment(msg)? {
            Ok(v) => v,
            Err(err) => {
                debug!(index, "skipping unparseable log fragment: {err}");
                return None;
            }
        };
        match fragment {
            Value::Object(mut obj) => obj
                .remove("artifacts")
                .filter(is_present)
                .map(|v| (index, v)),
            _ => None,
        }
    })
}

/// Parses the JSON value that starts at the first `{` in `msg`.
///
/// Returns `None` when there is no brace at all. Text after the first
/// complete value is not inspected.
fn parse_fragment(msg: &str) -> Option<Result<Value, serde_json::Error>> {
    let start = msg.find('{')?;
    serde_json::Deserializer::from_str(&msg[start..])
        .into_iter::<Value>()
        .next()
}
