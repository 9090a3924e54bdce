use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_transcript_client::cli::{Cli, Commands, OutputArgs};
use yt_transcript_client::client::{
    AsrOptions, GetTranscriptOptions, HistoryQuery, PollOptions, TranscribeOptions,
    TranscriptClient,
};
use yt_transcript_client::models::{BatchResult, Transcript, TranscriptJob};
use yt_transcript_client::{output, utils, ApiError, Config};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "yt_transcript_client=debug,yttranscript=debug"
    } else {
        "yt_transcript_client=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(cli).await {
        report_error(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().await?;
    config.apply_overrides(cli.api_key.clone(), cli.base_url.clone());

    match cli.command {
        Commands::Config { show: true } => {
            config.display();
            Ok(())
        }
        Commands::Config { show: false } => init_config_file(&config).await,
        command => {
            let client = TranscriptClient::new(config.client.clone())?;
            let poll = PollOptions::from(&config.polling);

            let result = execute(&client, command, poll, cli.quiet).await;
            client.close().await;
            result
        }
    }
}

async fn execute(
    client: &TranscriptClient,
    command: Commands,
    poll: PollOptions,
    quiet: bool,
) -> Result<()> {
    match command {
        Commands::Transcribe {
            video,
            language,
            source,
            output,
        } => {
            tracing::info!("Fetching caption transcript for: {}", video);
            let transcript = client
                .transcribe(
                    &video,
                    TranscribeOptions {
                        language,
                        source,
                        format: None,
                    },
                )
                .await?;
            emit_transcript(&transcript, &output)?;
        }
        Commands::Asr {
            video,
            language,
            webhook_url,
            wait,
            output,
        } => {
            let job = client
                .transcribe_asr(&video, AsrOptions { language, webhook_url })
                .await?;

            if job.is_failed() {
                return Err(ApiError::JobFailed {
                    reason: job.error_message(),
                    job_id: job.job_id,
                }
                .into());
            }

            match (job.transcript.as_ref(), wait) {
                (Some(transcript), _) => emit_transcript(transcript, &output)?,
                (None, true) => {
                    let transcript = wait_with_spinner(client, &job.job_id, poll, quiet).await?;
                    emit_transcript(&transcript, &output)?;
                }
                (None, false) => {
                    print_job(&job);
                    println!(
                        "Check progress with: yttranscript wait {}",
                        style(&job.job_id).cyan()
                    );
                }
            }
        }
        Commands::Job { job_id } => {
            let job = client.get_job(&job_id).await?;
            print_job(&job);
        }
        Commands::Wait { job_id, output } => {
            let transcript = wait_with_spinner(client, &job_id, poll, quiet).await?;
            emit_transcript(&transcript, &output)?;
        }
        Commands::Batch { videos, language } => {
            let ids: Vec<String> = videos.iter().map(|v| resolve_video_id(v)).collect();
            let batch = client.batch(&ids, language.as_deref()).await?;
            print_batch(&batch);
        }
        Commands::BatchStatus { batch_id } => {
            let batch = client.get_batch(&batch_id).await?;
            print_batch(&batch);
        }
        Commands::Get {
            video,
            language,
            source,
            output,
        } => {
            let video_id = resolve_video_id(&video);
            let transcript = client
                .get_transcript(
                    &video_id,
                    GetTranscriptOptions {
                        include_timestamps: true,
                        language,
                        source,
                    },
                )
                .await?;
            emit_transcript(&transcript, &output)?;
        }
        Commands::History {
            limit,
            page,
            search,
            language,
            status,
        } => {
            let history = client
                .history(HistoryQuery {
                    limit,
                    page,
                    search,
                    language,
                    status,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        Commands::Stats => {
            let stats = client.stats().await?;
            println!("Account:");
            println!("  Plan: {}", if stats.plan.is_empty() { "-" } else { stats.plan.as_str() });
            println!("  Credits Remaining: {}", stats.credits_remaining);
            println!("  Credits Used: {}", stats.credits_used);
            println!("  Transcripts Created: {}", stats.transcripts_created);
        }
        Commands::Delete { video, ids } => {
            let video_id = video.as_deref().map(resolve_video_id);
            let result = client
                .delete_transcripts(video_id.as_deref(), Some(ids.as_slice()))
                .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Config { .. } => anyhow::bail!("`config` does not talk to the API"),
    }

    Ok(())
}

/// Accept URLs as well as bare ids; unknown input is passed through as-is
fn resolve_video_id(input: &str) -> String {
    utils::extract_video_id(input).unwrap_or_else(|| input.trim().to_string())
}

async fn wait_with_spinner(
    client: &TranscriptClient,
    job_id: &str,
    poll: PollOptions,
    quiet: bool,
) -> Result<Transcript> {
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message(format!("Waiting for job {}...", job_id));
    progress.enable_steady_tick(Duration::from_millis(120));

    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let result = client.wait_for_job_until(job_id, poll, cancel).await;

    match &result {
        Ok(_) => progress.finish_with_message("Transcription completed!"),
        Err(_) => progress.abandon_with_message("Transcription did not complete"),
    }

    Ok(result?)
}

fn emit_transcript(transcript: &Transcript, args: &OutputArgs) -> Result<()> {
    tracing::info!(
        video_id = %transcript.video_id,
        segments = transcript.segments.len(),
        words = transcript.word_count(),
        "Transcript ready ({})",
        utils::format_duration(transcript.duration())
    );

    let filtered;
    let transcript = match &args.search {
        Some(query) => {
            let hits: Vec<_> = transcript.search(query).into_iter().cloned().collect();
            filtered = Transcript {
                text: output::to_plain_text(&hits),
                segments: hits,
                ..transcript.clone()
            };
            &filtered
        }
        None => transcript,
    };

    match &args.output {
        Some(path) => {
            output::save_to_file(transcript, path, args.format.into())?;
            println!("Transcript saved to: {}", path.display());
        }
        None => output::print_to_console(transcript, args.format.into())?,
    }

    Ok(())
}

fn print_job(job: &TranscriptJob) {
    println!("Job: {}", job.job_id);
    println!("  Status: {}", job.status);
    if !job.video_id.is_empty() {
        println!("  Video: {}", job.video_id);
    }
    if job.is_failed() {
        println!("  Error: {}", job.error_message());
    }
    if let Some(transcript) = &job.transcript {
        println!(
            "  Transcript: {} words, {}",
            transcript.word_count(),
            utils::format_duration(transcript.duration())
        );
    }
}

fn print_batch(batch: &BatchResult) {
    println!("Batch: {}", batch.batch_id);
    println!("  Status: {}", batch.status);
    println!("  Completed: {}", batch.completed.len());
    for transcript in &batch.completed {
        println!(
            "    • {} ({} words)",
            transcript.video_id,
            transcript.word_count()
        );
    }
    println!("  Failed: {}", batch.failed.len());
    for failure in &batch.failed {
        let video = failure.get("video_id").and_then(|v| v.as_str()).unwrap_or("?");
        let reason = failure
            .get("error")
            .or_else(|| failure.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        println!("    • {}: {}", video, reason);
    }
}

async fn init_config_file(config: &Config) -> Result<()> {
    match Config::config_path() {
        Some(path) if path.exists() => {
            println!("Configuration already exists. Edit it manually:");
            println!("  {}", path.display());
        }
        _ => {
            // Keys passed by flag or environment stay out of the file
            let path = config.without_api_key().save().await?;
            println!("Configuration written to: {}", path.display());
        }
    }
    Ok(())
}

fn report_error(err: &anyhow::Error) {
    eprintln!("{} {}", style("Error:").red().bold(), err);

    let hint = match err.downcast_ref::<ApiError>() {
        Some(ApiError::NoCaptions { .. }) => Some(
            "This video has no captions; try speech recognition: yttranscript asr <VIDEO> --wait"
                .to_string(),
        ),
        Some(ApiError::Authentication { .. }) => Some(
            "Check your API key (--api-key or YT_TRANSCRIPT_API_KEY)".to_string(),
        ),
        Some(ApiError::InsufficientCredits { .. }) => {
            Some("Out of credits; `yttranscript stats` shows your balance".to_string())
        }
        Some(ApiError::RateLimit {
            retry_after: Some(secs),
            ..
        }) => Some(format!("Rate limited; retry in {:.0}s", secs)),
        Some(ApiError::RateLimit { .. }) => Some("Rate limited; retry later".to_string()),
        _ => None,
    };

    if let Some(hint) = hint {
        eprintln!("  {}", style(hint).dim());
    }
}
