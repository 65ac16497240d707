pub mod html;
pub mod json;
pub mod srt;
pub mod text;
pub mod vtt;

use crate::config::OutputFormat;
use crate::transcript::Transcript;

pub trait TranscriptRenderer {
    fn render(&self, transcript: &Transcript) -> String;
}

pub fn create_renderer(format: OutputFormat) -> Box<dyn TranscriptRenderer> {
    match format {
        OutputFormat::Text => Box::new(text::TextRenderer),
        OutputFormat::Html => Box::new(html::HtmlRenderer),
        OutputFormat::Srt => Box::new(srt::SrtRenderer),
        OutputFormat::Vtt => Box::new(vtt::VttRenderer),
        OutputFormat::Json => Box::new(json::JsonRenderer::default()),
    }
}

/// `HH:MM:SS` followed by `separator` and milliseconds.
pub(crate) fn format_timestamp(d: std::time::Duration, separator: char) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, seconds, separator, millis
    )
}
