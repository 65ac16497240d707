// SRT export
use super::{format_timestamp, TranscriptRenderer};
use crate::transcript::Transcript;

pub struct SrtRenderer;

impl TranscriptRenderer for SrtRenderer {
    fn render(&self, transcript: &Transcript) -> String {
        transcript
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                format!(
                    "{}\n{} --> {}\n{}\n",
                    i + 1,
                    format_timestamp(segment.start_duration(), ','),
                    format_timestamp(segment.end_duration(), ','),
                    segment.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Segment;

    #[test]
    fn test_srt_render() {
        let transcript = Transcript::from_segments(vec![
            Segment::new(1.5, 4.0, "Hello, world!").unwrap(),
            Segment::new(4.5, 7.0, "This is a test.").unwrap(),
        ]);

        let output = SrtRenderer.render(&transcript);

        assert!(output.contains("1\n00:00:01,500 --> 00:00:04,000\nHello, world!"));
        assert!(output.contains("2\n00:00:04,500 --> 00:00:07,000\nThis is a test."));
    }

    #[test]
    fn test_srt_render_huge_times() {
        let transcript =
            Transcript::from_segments(vec![Segment::new(1e300, 1e301, "Far away").unwrap()]);

        let output = SrtRenderer.render(&transcript);

        assert!(output.starts_with("1\n"));
        assert!(output.ends_with("Far away\n"));
    }
}
