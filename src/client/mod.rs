use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::models::{AccountStats, BatchResult, Transcript, TranscriptJob};
use crate::transport::{HttpMethod, HttpTransport, ReqwestTransport};

pub mod poller;
mod request;

pub use poller::PollOptions;

/// Largest batch the API accepts
pub const MAX_BATCH_SIZE: usize = 100;

/// Options for caption-based transcription
#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    pub language: Option<String>,

    /// Caption source preference (for example `auto`, `manual`, `asr`)
    pub source: Option<String>,

    /// Format flags forwarded verbatim
    pub format: Option<Value>,
}

/// Options for an ASR job submission
#[derive(Debug, Clone, Default)]
pub struct AsrOptions {
    pub language: Option<String>,

    /// Endpoint notified by the API when the job finishes
    pub webhook_url: Option<String>,
}

/// Filters for the transcript history listing
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    pub limit: u32,
    pub page: u32,
    pub search: Option<String>,
    pub language: Option<String>,
    pub status: Option<String>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            page: 1,
            search: None,
            language: None,
            status: None,
        }
    }
}

/// Options for fetching a stored transcript
#[derive(Debug, Clone)]
pub struct GetTranscriptOptions {
    pub include_timestamps: bool,
    pub language: Option<String>,
    pub source: Option<String>,
}

impl Default for GetTranscriptOptions {
    fn default() -> Self {
        Self {
            include_timestamps: true,
            language: None,
            source: None,
        }
    }
}

/// Client for the transcript API.
///
/// Holds only read-only state after construction, so a single instance can be
/// shared (behind an `Arc`) across concurrent tasks.
pub struct TranscriptClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    owns_transport: bool,
}

impl fmt::Debug for TranscriptClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptClient")
            .field("config", &self.config)
            .field("owns_transport", &self.owns_transport)
            .finish()
    }
}

impl TranscriptClient {
    /// Create a client with its own HTTP transport, released by [`close`](Self::close).
    pub fn new(config: ClientConfig) -> Result<Self> {
        let config = config.validated()?;
        let transport = ReqwestTransport::new().map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::from_parts(config, Arc::new(transport), true))
    }

    /// Create a client on a caller-supplied transport; the client never closes it.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let config = config.validated()?;
        Ok(Self::from_parts(config, transport, false))
    }

    pub(crate) fn from_parts(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        owns_transport: bool,
    ) -> Self {
        Self {
            config,
            transport,
            owns_transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn owns_transport(&self) -> bool {
        self.owns_transport
    }

    /// Transcribe a video from its existing captions
    pub async fn transcribe(&self, video: &str, options: TranscribeOptions) -> Result<Transcript> {
        let mut body = Map::new();
        body.insert("video".to_string(), json!(video));
        insert_opt(&mut body, "language", options.language);
        insert_opt(&mut body, "source", options.source);
        if let Some(format) = options.format {
            body.insert("format".to_string(), format);
        }

        let payload = self
            .request(HttpMethod::Post, "/v2/transcribe", &[], Some(&Value::Object(body)))
            .await?;
        Ok(Transcript::from_json(&payload))
    }

    /// Submit an audio speech-recognition job
    pub async fn transcribe_asr(&self, video: &str, options: AsrOptions) -> Result<TranscriptJob> {
        let mut body = Map::new();
        body.insert("video".to_string(), json!(video));
        body.insert("source".to_string(), json!("asr"));
        body.insert(
            "format".to_string(),
            json!({"timestamp": true, "paragraphs": true, "words": true}),
        );
        insert_opt(&mut body, "language", options.language);
        insert_opt(&mut body, "webhook_url", options.webhook_url);

        let payload = self
            .request(HttpMethod::Post, "/v2/transcribe", &[], Some(&Value::Object(body)))
            .await?;
        let job = TranscriptJob::from_json(&payload);
        tracing::info!(job_id = %job.job_id, status = %job.status, "ASR job submitted");
        Ok(job)
    }

    /// Fetch the current state of an ASR job
    pub async fn get_job(&self, job_id: &str) -> Result<TranscriptJob> {
        let path = format!("/v2/jobs/{}", urlencoding::encode(job_id));
        let query = [
            ("include_segments", "true".to_string()),
            ("include_paragraphs", "true".to_string()),
            ("include_words", "true".to_string()),
        ];

        let payload = self.request(HttpMethod::Get, &path, &query, None).await?;
        Ok(TranscriptJob::from_json(&payload))
    }

    /// Submit an ASR job and poll it to completion.
    ///
    /// A submission that already came back completed is returned without polling.
    pub async fn transcribe_asr_and_wait(
        &self,
        video: &str,
        options: AsrOptions,
        poll: PollOptions,
    ) -> Result<Transcript> {
        let job = self.transcribe_asr(video, options).await?;

        if job.is_failed() {
            return Err(ApiError::JobFailed {
                reason: job.error_message(),
                job_id: job.job_id,
            });
        }
        if let Some(transcript) = job.transcript {
            return Ok(transcript);
        }
        if job.job_id.is_empty() {
            return Err(ApiError::Api {
                status: None,
                message: "ASR submission response did not include a job id".to_string(),
            });
        }

        self.wait_for_job(&job.job_id, poll).await
    }

    /// Request transcripts for up to 100 videos at once
    pub async fn batch(&self, video_ids: &[String], language: Option<&str>) -> Result<BatchResult> {
        if video_ids.is_empty() {
            return Err(ApiError::Validation(
                "Batch requires at least one video id".to_string(),
            ));
        }
        if video_ids.len() > MAX_BATCH_SIZE {
            return Err(ApiError::Validation(format!(
                "Batch accepts at most {} video ids, got {}",
                MAX_BATCH_SIZE,
                video_ids.len()
            )));
        }

        let mut body = Map::new();
        body.insert("video_ids".to_string(), json!(video_ids));
        insert_opt(&mut body, "language", language.map(str::to_string));

        let payload = self
            .request(HttpMethod::Post, "/v2/batch", &[], Some(&Value::Object(body)))
            .await?;
        Ok(BatchResult::from_json(&payload))
    }

    pub async fn get_batch(&self, batch_id: &str) -> Result<BatchResult> {
        let path = format!("/v2/batch/{}", urlencoding::encode(batch_id));
        let payload = self.request(HttpMethod::Get, &path, &[], None).await?;
        Ok(BatchResult::from_json(&payload))
    }

    /// Transcript history, returned as the API sends it
    pub async fn history(&self, query: HistoryQuery) -> Result<Value> {
        let mut params = vec![
            ("limit", query.limit.to_string()),
            ("page", query.page.to_string()),
        ];
        push_opt(&mut params, "search", query.search);
        push_opt(&mut params, "language", query.language);
        push_opt(&mut params, "status", query.status);

        self.request(HttpMethod::Get, "/v1/history", &params, None).await
    }

    /// Fetch a previously created transcript
    pub async fn get_transcript(
        &self,
        video_id: &str,
        options: GetTranscriptOptions,
    ) -> Result<Transcript> {
        let path = format!("/v1/transcripts/{}", urlencoding::encode(video_id));
        let mut params = vec![("include_timestamps", options.include_timestamps.to_string())];
        push_opt(&mut params, "language", options.language);
        push_opt(&mut params, "source", options.source);

        let payload = self.request(HttpMethod::Get, &path, &params, None).await?;
        Ok(Transcript::from_json(&payload))
    }

    pub async fn stats(&self) -> Result<AccountStats> {
        let payload = self.request(HttpMethod::Get, "/v1/stats", &[], None).await?;
        Ok(AccountStats::from_json(&payload))
    }

    /// Delete stored transcripts by video id and/or transcript ids
    pub async fn delete_transcripts(
        &self,
        video_id: Option<&str>,
        ids: Option<&[String]>,
    ) -> Result<Value> {
        if video_id.is_none() && ids.map_or(true, |ids| ids.is_empty()) {
            return Err(ApiError::Validation(
                "Provide a video id or at least one transcript id to delete".to_string(),
            ));
        }

        let mut body = Map::new();
        if let Some(video_id) = video_id {
            body.insert("video_id".to_string(), json!(video_id));
        }
        if let Some(ids) = ids.filter(|ids| !ids.is_empty()) {
            body.insert("ids".to_string(), json!(ids));
        }

        self.request(
            HttpMethod::Post,
            "/v1/transcripts/bulk-delete",
            &[],
            Some(&Value::Object(body)),
        )
        .await
    }

    /// Shut the client down, releasing the transport only if the client created it.
    pub async fn close(self) {
        if self.owns_transport {
            self.transport.close().await;
            tracing::debug!("Closed owned transport");
        } else {
            tracing::debug!("Leaving caller-supplied transport open");
        }
    }
}

fn insert_opt(body: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        body.insert(key.to_string(), Value::String(value));
    }
}

fn push_opt(params: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.push((key, value));
    }
}
