//! Resolution trace recording.
//!
//! A [`DiagnosticsRecorder`] is owned by one resolution pass. It only ever
//! sees source identifiers, never candidate values, so its snapshot is safe
//! to log even when sensitive fields were resolved.

use crate::source::SourceTag;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// One recorded event. The `type` field discriminates the variants when
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiagnosticEvent {
    /// Which config file path was picked, among which candidates.
    #[serde(rename_all = "camelCase")]
    ConfigPath {
        picked: Option<String>,
        candidates: Vec<String>,
        reason: String,
    },
    /// A file-format loader was used or rejected.
    #[serde(rename_all = "camelCase")]
    Loader {
        format: String,
        used: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// The winning source for one field, plus every source attempted.
    #[serde(rename_all = "camelCase")]
    SourceDecision {
        path: String,
        source: SourceTag,
        tried: Vec<SourceTag>,
    },
    /// Free-form note.
    Note {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        meta: Option<Value>,
    },
}

/// Append-only event log for a single resolution pass.
#[derive(Debug, Default)]
pub struct DiagnosticsRecorder {
    events: Vec<DiagnosticEvent>,
}

impl DiagnosticsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_config_path_choice(
        &mut self,
        picked: Option<&str>,
        candidates: &[String],
        reason: &str,
    ) {
        debug!(picked = ?picked, candidates = candidates.len(), reason, "config path selected");
        self.events.push(DiagnosticEvent::ConfigPath {
            picked: picked.map(str::to_string),
            candidates: candidates.to_vec(),
            reason: reason.to_string(),
        });
    }

    pub fn record_loader_choice(&mut self, format: &str, used: bool, reason: Option<&str>) {
        debug!(format, used, reason = ?reason, "loader considered");
        self.events.push(DiagnosticEvent::Loader {
            format: format.to_string(),
            used,
            reason: reason.map(str::to_string),
        });
    }

    /// `tried` lists the attempted sources in priority order, ending with
    /// the winner.
    pub fn record_source_decision(&mut self, path: &str, source: SourceTag, tried: Vec<SourceTag>) {
        debug_assert!(
            tried.windows(2).all(|w| w[0].rank() < w[1].rank()),
            "tried sources for {} out of priority order",
            path
        );
        debug_assert_eq!(tried.last(), Some(&source), "winner of {} not last tried", path);
        debug!(path, source = %source, tried = tried.len(), "source decided");
        self.events
            .push(DiagnosticEvent::SourceDecision { path: path.to_string(), source, tried });
    }

    pub fn record_note(&mut self, message: impl Into<String>, meta: Option<Value>) {
        let message = message.into();
        debug!(note = %message);
        self.events.push(DiagnosticEvent::Note { message, meta });
    }

    /// Copy of every event in recording order.
    pub fn snapshot(&self) -> Vec<DiagnosticEvent> {
        self.events.clone()
    }

    /// Consume the recorder, yielding its events.
    pub fn into_events(self) -> Vec<DiagnosticEvent> {
        self.events
    }
}
