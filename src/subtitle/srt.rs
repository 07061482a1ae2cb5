//! SubRip (`.srt`) rendering.

use std::fmt::Write as _;
use std::path::Path;

use super::api::Segment;

/// Formats seconds as `HH:MM:SS,mmm`, rounded to the millisecond.
pub fn format_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Renders numbered cues, one per non-empty segment.
pub fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    let cues = segments
        .iter()
        .map(|segment| (segment, segment.text.trim()))
        .filter(|(_, text)| !text.is_empty());

    for (index, (segment, text)) in cues.enumerate() {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_time(segment.start),
            format_time(segment.end),
            text
        );
    }
    out
}

/// Writes the rendered cues to `path`.
///
/// # Errors
/// - If the file cannot be written
pub fn write_srt(path: &Path, segments: &[Segment]) -> anyhow::Result<()> {
    std::fs::write(path, render(segments))
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str) -> Segment {
        Segment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00:00,000");
        assert_eq!(format_time(1.5), "00:00:01,500");
        assert_eq!(format_time(61.0), "00:01:01,000");
        assert_eq!(format_time(3725.042), "01:02:05,042");
        assert_eq!(format_time(59.9996), "00:01:00,000");
        assert_eq!(format_time(-1.0), "00:00:00,000");
    }

    #[test]
    fn render_numbers_cues_and_skips_blank_segments() {
        let srt = render(&[
            segment(0.0, 2.5, " Hello there. "),
            segment(2.5, 3.0, "   "),
            segment(3.0, 4.25, "General Kenobi."),
        ]);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:02,500\nHello there.\n\n\
             2\n00:00:03,000 --> 00:00:04,250\nGeneral Kenobi.\n\n"
        );
    }

    #[test]
    fn write_srt_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.srt");
        write_srt(&path, &[segment(0.0, 1.0, "hi")]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1\n00:00:00,000 --> 00:00:01,000\nhi\n\n"
        );
    }
}
