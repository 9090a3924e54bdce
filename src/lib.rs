//! YT Transcript Client - typed access to a YouTube transcript extraction API
//!
//! This library fetches transcripts from existing captions, runs and polls
//! speech-recognition jobs, processes batches of videos, and exports the
//! results as plain text, SRT or WebVTT.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod transport;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use client::{
    AsrOptions, GetTranscriptOptions, HistoryQuery, PollOptions, TranscribeOptions,
    TranscriptClient,
};
pub use config::{ClientConfig, Config, PollingConfig};
pub use error::{ApiError, Result};
pub use models::{AccountStats, BatchResult, JobStatus, Segment, Transcript, TranscriptJob};
pub use output::ExportFormat;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
