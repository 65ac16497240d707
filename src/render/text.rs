// Plain text listing for terminals
use super::TranscriptRenderer;
use crate::player::format_time;
use crate::transcript::Transcript;

pub struct TextRenderer;

impl TranscriptRenderer for TextRenderer {
    fn render(&self, transcript: &Transcript) -> String {
        transcript
            .iter()
            .map(|segment| format!("[{}] {}\n", format_time(segment.start), segment.text))
            .collect()
    }
}
