use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::output::formatters;

pub mod normalize;

/// One timed caption or utterance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Segment text (may be empty)
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// End time in seconds, derived from `start + duration` when not reported
    pub end: f64,

    /// Length in seconds, derived from `end - start` when not reported
    pub duration: f64,

    /// Per-word records, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Value>>,
}

impl Segment {
    /// Start time as `MM:SS`
    pub fn start_formatted(&self) -> String {
        formatters::format_mmss(self.start)
    }

    /// Start time as `HH:MM:SS`
    pub fn start_hms(&self) -> String {
        formatters::format_hms(self.start)
    }
}

/// Transcript of a single video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub status: String,
    pub request_id: String,

    /// Segments in chronological order
    pub segments: Vec<Segment>,

    /// Full transcript text
    pub text: String,

    /// Original response payload
    #[serde(skip)]
    pub raw: Value,
}

impl Transcript {
    /// Number of whitespace-separated words in the full text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// End time of the last segment, in seconds
    pub fn duration(&self) -> f64 {
        match self.segments.last() {
            Some(last) if last.end > 0.0 => last.end,
            Some(last) => last.start + last.duration,
            None => 0.0,
        }
    }

    pub fn to_plain_text(&self) -> String {
        formatters::to_plain_text(&self.segments)
    }

    pub fn to_timestamped_text(&self) -> String {
        formatters::to_timestamped_text(&self.segments)
    }

    pub fn to_srt(&self) -> String {
        formatters::to_srt(&self.segments)
    }

    pub fn to_vtt(&self) -> String {
        formatters::to_vtt(&self.segments)
    }

    /// Case-insensitive substring search over segment text.
    ///
    /// An empty query matches every segment.
    pub fn search(&self, query: &str) -> Vec<&Segment> {
        formatters::search(&self.segments, query)
    }
}

/// Lifecycle state of an ASR job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Unknown,
}

impl JobStatus {
    pub fn parse(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "queued" => JobStatus::Queued,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Unknown => "unknown",
        }
    }

    /// `completed` and `failed` end a poll loop
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle for an asynchronous speech-recognition job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptJob {
    pub job_id: String,
    pub status: JobStatus,
    pub video_id: String,

    /// Only present once the job has completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Transcript>,

    #[serde(skip)]
    pub raw: Value,
}

impl TranscriptJob {
    pub fn is_complete(&self) -> bool {
        self.status == JobStatus::Completed
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.status, JobStatus::Processing | JobStatus::Queued)
    }

    pub fn is_failed(&self) -> bool {
        self.status == JobStatus::Failed
    }

    /// The `error` reported alongside a failed job, or `"unknown"`
    pub fn error_message(&self) -> String {
        match self.raw.get("error") {
            Some(Value::String(message)) if !message.is_empty() => message.clone(),
            Some(Value::Null) | None => "unknown".to_string(),
            Some(Value::String(_)) => "unknown".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// Outcome of a multi-video request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub batch_id: String,
    pub status: String,
    pub completed: Vec<Transcript>,

    /// Per-item failure records, as reported
    pub failed: Vec<Value>,
}

/// Credits and plan snapshot for the account
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountStats {
    pub credits_remaining: f64,
    pub credits_used: f64,
    pub transcripts_created: u64,
    pub plan: String,
}
