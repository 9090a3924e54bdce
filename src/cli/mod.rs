use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::ExportFormat;

#[derive(Parser)]
#[command(
    name = "yttranscript",
    about = "Fetch YouTube transcripts from captions or speech recognition",
    version,
    long_about = "A CLI for the transcript extraction API. Fetches transcripts from existing captions, runs ASR jobs for videos without captions, processes batches, and exports to text, SRT or WebVTT."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API key (overrides the config file)
    #[arg(long, global = true, env = "YT_TRANSCRIPT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL (overrides the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Where and how to write a transcript
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output file path (prints to console if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only print segments containing this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe a video from its existing captions
    Transcribe {
        /// YouTube URL or video id
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Language code
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Caption source preference
        #[arg(long)]
        source: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Submit a speech-recognition job for a video without captions
    Asr {
        /// YouTube URL or video id
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Language code
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// URL notified when the job finishes
        #[arg(long, value_name = "URL")]
        webhook_url: Option<String>,

        /// Wait for the job and print the transcript
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the status of an ASR job
    Job {
        job_id: String,
    },

    /// Wait for an ASR job to finish and print its transcript
    Wait {
        job_id: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Request transcripts for up to 100 videos
    Batch {
        /// YouTube URLs or video ids
        #[arg(value_name = "VIDEO", required = true, num_args = 1..)]
        videos: Vec<String>,

        /// Language code
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Show the status of a batch
    BatchStatus {
        batch_id: String,
    },

    /// Fetch a previously created transcript
    Get {
        /// YouTube URL or video id
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Language code
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Transcript source
        #[arg(long)]
        source: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List previously created transcripts
    History {
        #[arg(long, default_value = "20")]
        limit: u32,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long)]
        search: Option<String>,

        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Show account credits and plan
    Stats,

    /// Delete stored transcripts
    Delete {
        /// Delete every transcript of this video
        #[arg(long, value_name = "VIDEO")]
        video: Option<String>,

        /// Transcript ids to delete
        #[arg(long = "id", value_name = "ID")]
        ids: Vec<String>,
    },

    /// Show or initialise the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// One `[MM:SS] text` line per segment
    Timestamped,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
    /// JSON with segments
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ExportFormat::Text,
            OutputFormat::Timestamped => ExportFormat::Timestamped,
            OutputFormat::Srt => ExportFormat::Srt,
            OutputFormat::Vtt => ExportFormat::Vtt,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}
