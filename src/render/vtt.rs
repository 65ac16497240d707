// WebVTT export
use super::{format_timestamp, TranscriptRenderer};
use crate::transcript::Transcript;

pub struct VttRenderer;

impl TranscriptRenderer for VttRenderer {
    fn render(&self, transcript: &Transcript) -> String {
        let mut output = String::from("WEBVTT\n\n");

        for segment in transcript {
            output.push_str(&format!(
                "{} --> {}\n{}\n\n",
                format_timestamp(segment.start_duration(), '.'),
                format_timestamp(segment.end_duration(), '.'),
                segment.text
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Segment;

    #[test]
    fn test_vtt_render() {
        let transcript =
            Transcript::from_segments(vec![Segment::new(1.5, 4.0, "Hello, world!").unwrap()]);

        let output = VttRenderer.render(&transcript);

        assert!(output.starts_with("WEBVTT\n\n"));
        assert!(output.contains("00:00:01.500 --> 00:00:04.000\nHello, world!"));
    }

    #[test]
    fn test_vtt_render_huge_times() {
        let transcript =
            Transcript::from_segments(vec![Segment::new(1e300, 1e301, "Far away").unwrap()]);

        let output = VttRenderer.render(&transcript);

        assert!(output.starts_with("WEBVTT\n\n"));
        assert!(output.contains("Far away"));
    }
}
