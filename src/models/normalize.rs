//! Conversion of API payloads into the canonical model.
//!
//! The API has wrapped its payloads differently over time (a `data`
//! envelope or none, `transcript` as an object or a bare list, flat
//! `segments`). Each lookup below is an ordered list of probes; the first
//! probe that finds something wins, and nothing here ever fails.

use serde_json::Value;

use super::{AccountStats, BatchResult, JobStatus, Segment, Transcript, TranscriptJob};
use crate::error::lenient_f64;

static NULL: Value = Value::Null;

type SegmentProbe = fn(&Value) -> Option<&Vec<Value>>;

/// Where segment lists may live inside the inner payload, in priority order
const SEGMENT_PROBES: &[SegmentProbe] = &[
    transcript_object_segments,
    transcript_as_list,
    flat_segments,
];

fn transcript_object_segments(inner: &Value) -> Option<&Vec<Value>> {
    inner.get("transcript")?.get("segments")?.as_array()
}

fn transcript_as_list(inner: &Value) -> Option<&Vec<Value>> {
    inner.get("transcript")?.as_array()
}

fn flat_segments(inner: &Value) -> Option<&Vec<Value>> {
    inner.get("segments")?.as_array()
}

/// The `data` object if the payload is enveloped, otherwise the payload itself
fn inner_payload(payload: &Value) -> &Value {
    match payload.get("data") {
        Some(data) if data.is_object() => data,
        _ => payload,
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// First non-empty string found under `key` across `sources`
fn first_str(sources: &[&Value], key: &str) -> String {
    sources
        .iter()
        .find_map(|source| non_empty_str(source, key))
        .unwrap_or_default()
        .to_string()
}

fn number(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(lenient_f64)
}

impl Segment {
    /// Build a segment from one API record, resolving `end`/`duration`
    /// from each other when only one is reported.
    pub fn from_json(record: &Value) -> Self {
        let start = number(record, "start").unwrap_or(0.0);
        let given_end = number(record, "end").unwrap_or(0.0);
        let given_duration = number(record, "duration").unwrap_or(0.0);

        let end = if given_end > 0.0 {
            given_end
        } else if given_duration > 0.0 {
            start + given_duration
        } else {
            0.0
        };

        let duration = if given_duration > 0.0 {
            given_duration
        } else if end > start {
            end - start
        } else {
            0.0
        };

        Self {
            text: non_empty_str(record, "text").unwrap_or_default().to_string(),
            start,
            end,
            duration,
            words: record.get("words").and_then(Value::as_array).cloned(),
        }
    }
}

impl Transcript {
    /// Normalize a transcript envelope of any known shape.
    pub fn from_json(payload: &Value) -> Self {
        let inner = inner_payload(payload);

        let segments: Vec<Segment> = SEGMENT_PROBES
            .iter()
            .filter_map(|probe| probe(inner))
            .find(|records| !records.is_empty())
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.is_object())
                    .map(Segment::from_json)
                    .collect()
            })
            .unwrap_or_default();

        let text = inner
            .get("transcript")
            .filter(|t| t.is_object())
            .and_then(|t| non_empty_str(t, "text"))
            .map(str::to_string)
            .unwrap_or_else(|| {
                segments
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            });

        Self {
            video_id: first_str(&[inner, payload], "video_id"),
            language: first_str(&[inner, payload], "language"),
            status: non_empty_str(payload, "status")
                .unwrap_or("completed")
                .to_string(),
            request_id: first_str(&[payload], "request_id"),
            segments,
            text,
            raw: payload.clone(),
        }
    }
}

impl TranscriptJob {
    /// Normalize a job envelope; completed jobs double as transcript envelopes.
    pub fn from_json(payload: &Value) -> Self {
        let status = non_empty_str(payload, "status")
            .map(JobStatus::parse)
            .unwrap_or(JobStatus::Unknown);

        let transcript = (status == JobStatus::Completed).then(|| Transcript::from_json(payload));

        let data = payload.get("data").unwrap_or(&NULL);

        Self {
            job_id: ["job_id", "request_id"]
                .iter()
                .find_map(|key| non_empty_str(payload, key))
                .unwrap_or_default()
                .to_string(),
            status,
            video_id: first_str(&[payload, data], "video_id"),
            transcript,
            raw: payload.clone(),
        }
    }
}

impl BatchResult {
    pub fn from_json(payload: &Value) -> Self {
        let completed = ["completed", "data"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_array))
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(Transcript::from_json)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            batch_id: first_str(&[payload], "batch_id"),
            status: first_str(&[payload], "status"),
            completed,
            failed: payload
                .get("failed")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

impl AccountStats {
    pub fn from_json(payload: &Value) -> Self {
        let inner = inner_payload(payload);
        let sources = [inner, payload];

        let find_number = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| sources.iter().find_map(|source| number(source, key)))
                .unwrap_or(0.0)
        };

        Self {
            credits_remaining: find_number(&["credits_remaining", "credits_left"]),
            credits_used: find_number(&["credits_used"]),
            transcripts_created: find_number(&["transcripts_created"]).max(0.0) as u64,
            plan: first_str(&sources, "plan"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_segment_end_derived_from_duration() {
        let seg = Segment::from_json(&json!({"text": "hi", "start": 3.0, "duration": 2.5}));
        assert_eq!(seg.end, 5.5);
        assert_eq!(seg.duration, 2.5);

        let seg = Segment::from_json(&json!({"start": 3.0, "end": 0, "duration": 1.0}));
        assert_eq!(seg.end, 4.0);
    }

    #[test]
    fn test_segment_duration_derived_from_end() {
        let seg = Segment::from_json(&json!({"text": "hi", "start": 1.5, "end": 4.0}));
        assert_eq!(seg.end, 4.0);
        assert_eq!(seg.duration, 2.5);
    }

    #[test]
    fn test_segment_defaults() {
        let seg = Segment::from_json(&json!({"start": "not a number"}));
        assert_eq!(seg.start, 0.0);
        assert_eq!(seg.end, 0.0);
        assert_eq!(seg.duration, 0.0);
        assert_eq!(seg.text, "");
        assert!(seg.words.is_none());

        let seg = Segment::from_json(&json!({"start": "2.5", "end": "3"}));
        assert_eq!(seg.start, 2.5);
        assert_eq!(seg.duration, 0.5);
    }

    #[test]
    fn test_segment_words_pass_through() {
        let seg = Segment::from_json(&json!({
            "text": "hi there",
            "start": 0,
            "end": 1,
            "words": [{"word": "hi", "start": 0.0}, {"word": "there", "start": 0.5}]
        }));
        let words = seg.words.unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[1]["word"], "there");
    }

    #[test]
    fn test_transcript_shapes_are_equivalent() {
        let records = json!([
            {"text": "Hello", "start": 0.0, "end": 1.0},
            {"text": "world", "start": 1.0, "duration": 1.5}
        ]);

        let nested = Transcript::from_json(&json!({
            "data": {"video_id": "abc", "transcript": {"segments": records.clone()}}
        }));
        let as_list = Transcript::from_json(&json!({
            "data": {"video_id": "abc", "transcript": records.clone()}
        }));
        let flat = Transcript::from_json(&json!({
            "data": {"video_id": "abc", "segments": records.clone()}
        }));
        let bare = Transcript::from_json(&json!({
            "video_id": "abc", "segments": records
        }));

        assert_eq!(nested.segments.len(), 2);
        assert_eq!(nested.segments, as_list.segments);
        assert_eq!(nested.segments, flat.segments);
        assert_eq!(nested.segments, bare.segments);
        assert_eq!(nested.segments[1].end, 2.5);

        for t in [&nested, &as_list, &flat, &bare] {
            assert_eq!(t.text, "Hello world");
            assert_eq!(t.video_id, "abc");
        }
    }

    #[test]
    fn test_transcript_prefers_reported_text() {
        let t = Transcript::from_json(&json!({
            "data": {"transcript": {"text": "Full text.", "segments": [{"text": "Full"}]}}
        }));
        assert_eq!(t.text, "Full text.");

        let t = Transcript::from_json(&json!({
            "data": {"transcript": {"text": "", "segments": [{"text": "a"}, {"text": "b"}]}}
        }));
        assert_eq!(t.text, "a b");
    }

    #[test]
    fn test_transcript_empty_nested_falls_back_to_flat() {
        let t = Transcript::from_json(&json!({
            "data": {
                "transcript": {"segments": []},
                "segments": [{"text": "fallback", "start": 0, "end": 1}]
            }
        }));
        assert_eq!(t.segments.len(), 1);
        assert_eq!(t.text, "fallback");
    }

    #[test]
    fn test_transcript_metadata_resolution() {
        let payload = json!({
            "status": "completed",
            "request_id": "req-9",
            "video_id": "outer",
            "language": "de",
            "data": {"video_id": "inner", "segments": []}
        });
        let t = Transcript::from_json(&payload);

        assert_eq!(t.video_id, "inner");
        assert_eq!(t.language, "de");
        assert_eq!(t.status, "completed");
        assert_eq!(t.request_id, "req-9");
        assert_eq!(t.raw, payload);
        assert!(t.segments.is_empty());
        assert_eq!(t.text, "");
    }

    #[test]
    fn test_transcript_status_read_from_top_level_only() {
        let t = Transcript::from_json(&json!({"data": {"status": "processing"}}));
        assert_eq!(t.status, "completed");
    }

    #[test]
    fn test_non_object_segments_are_skipped() {
        let t = Transcript::from_json(&json!({
            "segments": ["junk", {"text": "kept", "start": 1, "end": 2}, 42]
        }));
        assert_eq!(t.segments.len(), 1);
        assert_eq!(t.segments[0].text, "kept");
    }

    #[test]
    fn test_job_completed_embeds_transcript() {
        let job = TranscriptJob::from_json(&json!({
            "job_id": "job-42",
            "status": "completed",
            "data": {
                "video_id": "vid",
                "transcript": {"segments": [{"text": "done", "start": 0, "duration": 2}]}
            }
        }));

        assert!(job.is_complete());
        assert_eq!(job.job_id, "job-42");
        assert_eq!(job.video_id, "vid");
        let transcript = job.transcript.expect("completed job carries a transcript");
        assert_eq!(transcript.segments[0].end, 2.0);
        assert_eq!(transcript.text, "done");
    }

    #[test]
    fn test_job_processing_has_no_transcript() {
        let job = TranscriptJob::from_json(&json!({
            "request_id": "req-1",
            "status": "processing",
            "video_id": "vid"
        }));

        assert!(job.is_processing());
        assert!(job.transcript.is_none());
        assert_eq!(job.job_id, "req-1");
        assert_eq!(job.video_id, "vid");
    }

    #[test]
    fn test_job_without_status_is_unknown() {
        let job = TranscriptJob::from_json(&json!({"job_id": "j"}));
        assert_eq!(job.status, JobStatus::Unknown);
        assert!(!job.is_processing());
    }

    #[test]
    fn test_batch_normalization() {
        let batch = BatchResult::from_json(&json!({
            "batch_id": "b-1",
            "status": "completed",
            "completed": [
                {"video_id": "one", "segments": [{"text": "a"}]},
                "not an object",
                {"video_id": "two", "transcript": [{"text": "b"}]}
            ],
            "failed": [{"video_id": "three", "error": "no captions"}]
        }));

        assert_eq!(batch.batch_id, "b-1");
        assert_eq!(batch.completed.len(), 2);
        assert_eq!(batch.completed[1].video_id, "two");
        assert_eq!(batch.failed.len(), 1);
        assert_eq!(batch.failed[0]["error"], "no captions");
    }

    #[test]
    fn test_batch_falls_back_to_data_list() {
        let batch = BatchResult::from_json(&json!({
            "batch_id": "b-2",
            "data": [{"video_id": "one", "segments": []}]
        }));
        assert_eq!(batch.completed.len(), 1);
        assert!(batch.failed.is_empty());
        assert_eq!(batch.status, "");
    }

    #[test]
    fn test_account_stats_aliases_and_defaults() {
        let stats = AccountStats::from_json(&json!({
            "credits_left": 120,
            "credits_used": 30,
            "transcripts_created": 12,
            "plan": "pro"
        }));
        assert_eq!(stats.credits_remaining, 120.0);
        assert_eq!(stats.credits_used, 30.0);
        assert_eq!(stats.transcripts_created, 12);
        assert_eq!(stats.plan, "pro");

        let preferred = AccountStats::from_json(&json!({"credits_remaining": 5, "credits_left": 9}));
        assert_eq!(preferred.credits_remaining, 5.0);

        assert_eq!(AccountStats::from_json(&json!({})), AccountStats::default());

        let enveloped = AccountStats::from_json(&json!({"data": {"credits_remaining": 7}}));
        assert_eq!(enveloped.credits_remaining, 7.0);
    }
}
