// Transcript paragraphs for the web player. Each paragraph carries its time
// range so the page script can toggle the `highlight` class.
use super::TranscriptRenderer;
use crate::transcript::Transcript;

pub struct HtmlRenderer;

impl TranscriptRenderer for HtmlRenderer {
    fn render(&self, transcript: &Transcript) -> String {
        transcript
            .iter()
            .map(|segment| {
                format!(
                    "<p class=\"transcript-sentence\" data-start=\"{}\" data-end=\"{}\">{}</p>",
                    segment.start,
                    segment.end,
                    escape(&segment.text)
                )
            })
            .collect()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
