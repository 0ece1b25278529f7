use serde::{Deserialize, Serialize};

// ── Expression type ──────────────────────────────────────────────────────

/// TIMEX3 expression type of a candidate span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimexKind {
    Date,
    Time,
    Duration,
    Set,
}

// ── Candidate span ───────────────────────────────────────────────────────

/// A contiguous run of characters already identified as a candidate
/// temporal expression. `begin`/`end` are character indices within the
/// owning sentence (half-open).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpan {
    pub text: String,
    pub begin: usize,
    pub end: usize,
    pub kind: TimexKind,
}

// ── Document ─────────────────────────────────────────────────────────────

/// One segmented sentence with its candidate spans, in reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    #[serde(default)]
    pub spans: Vec<CandidateSpan>,
}

/// A whole document: the document creation time (`YYYY-MM-DD` or
/// `YYYY-MM-DDTHH:MM:SS`) plus ordered sentences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub dct: String,
    pub sentences: Vec<Sentence>,
}

// ── Normalization output ─────────────────────────────────────────────────

/// Normalized values for one candidate span.
///
/// `surface` is the value derivable from the span text alone; it may
/// contain `X` unknown-digit markers or a leading `Q` relative prefix.
/// `value` is the fully resolved form after reference lookup and calendar
/// arithmetic. Both are empty when no rule matched the span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimexValue {
    pub text: String,
    pub kind: TimexKind,
    pub surface: String,
    pub value: String,
}
