use crate::models::Segment;

/// Caption length used when a segment reports neither end nor duration
const DEFAULT_CAPTION_SECONDS: f64 = 2.0;

/// `MM:SS`, truncating fractional seconds
pub fn format_mmss(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// `HH:MM:SS`, truncating fractional seconds
pub fn format_hms(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// `HH:MM:SS<sep>mmm` with milliseconds rounded from the fractional part
pub fn format_timestamp_ms(seconds: f64, separator: char) -> String {
    let seconds = seconds.max(0.0);
    let mut whole = seconds.trunc() as u64;
    let mut millis = ((seconds - seconds.trunc()) * 1000.0).round() as u64;
    if millis >= 1000 {
        whole += 1;
        millis -= 1000;
    }

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        whole / 3600,
        (whole % 3600) / 60,
        whole % 60,
        separator,
        millis
    )
}

/// End time for a subtitle cue, falling back to a fixed caption length
fn cue_end(segment: &Segment) -> f64 {
    if segment.end > 0.0 {
        segment.end
    } else if segment.duration > 0.0 {
        segment.start + segment.duration
    } else {
        segment.start + DEFAULT_CAPTION_SECONDS
    }
}

pub fn to_plain_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One `[MM:SS] text` line per segment
pub fn to_timestamped_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| format!("[{}] {}", format_mmss(s.start), s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered SRT cues, each terminated by a blank line
pub fn to_srt(segments: &[Segment]) -> String {
    let mut srt = String::new();

    for (i, segment) in segments.iter().enumerate() {
        srt.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp_ms(segment.start, ','),
            format_timestamp_ms(cue_end(segment), ','),
            segment.text
        ));
    }

    srt
}

pub fn to_vtt(segments: &[Segment]) -> String {
    let mut vtt = String::from("WEBVTT\n\n");

    for segment in segments {
        vtt.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_timestamp_ms(segment.start, '.'),
            format_timestamp_ms(cue_end(segment), '.'),
            segment.text
        ));
    }

    vtt
}

/// Segments whose text contains `query`, ignoring case, in original order
pub fn search<'a>(segments: &'a [Segment], query: &str) -> Vec<&'a Segment> {
    let needle = query.to_lowercase();
    segments
        .iter()
        .filter(|s| s.text.to_lowercase().contains(&needle))
        .collect()
}
