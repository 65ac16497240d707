// JSON export
use super::{format_timestamp, TranscriptRenderer};
use crate::transcript::Transcript;
use serde::Serialize;

#[derive(Default)]
pub struct JsonRenderer {
    pub book_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    metadata: JsonMetadata<'a>,
    segments: Vec<JsonSegment<'a>>,
}

#[derive(Serialize)]
struct JsonMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    book_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    segment_count: usize,
}

#[derive(Serialize)]
struct JsonSegment<'a> {
    index: usize,
    start: f64,
    end: f64,
    start_formatted: String,
    end_formatted: String,
    text: &'a str,
}

impl TranscriptRenderer for JsonRenderer {
    fn render(&self, transcript: &Transcript) -> String {
        let output = JsonOutput {
            metadata: JsonMetadata {
                book_id: self.book_id.as_deref(),
                title: self.title.as_deref(),
                segment_count: transcript.len(),
            },
            segments: transcript
                .iter()
                .enumerate()
                .map(|(index, s)| JsonSegment {
                    index,
                    start: s.start,
                    end: s.end,
                    start_formatted: format_timestamp(s.start_duration(), '.'),
                    end_formatted: format_timestamp(s.end_duration(), '.'),
                    text: &s.text,
                })
                .collect(),
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Segment;

    #[test]
    fn test_json_render() {
        let transcript =
            Transcript::from_segments(vec![Segment::new(1.5, 4.0, "Hello, world!").unwrap()]);
        let renderer = JsonRenderer {
            book_id: Some("1".to_string()),
            title: None,
        };

        let output = renderer.render(&transcript);

        assert!(output.contains("\"segment_count\": 1"));
        assert!(output.contains("\"book_id\": \"1\""));
        assert!(!output.contains("\"title\""));
        assert!(output.contains("\"text\": \"Hello, world!\""));
        assert!(output.contains("\"start\": 1.5"));
    }

    #[test]
    fn test_json_render_huge_times() {
        let transcript =
            Transcript::from_segments(vec![Segment::new(1e300, 1e301, "Far away").unwrap()]);

        let output = JsonRenderer::default().render(&transcript);

        assert!(output.contains("\"segment_count\": 1"));
        assert!(output.contains("\"text\": \"Far away\""));
    }
}
