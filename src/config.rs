use crate::error::{ReadalongError, Result};
use crate::locator::LocatorConfig;
use crate::transcript::normalize::{CorrectionTable, Identity, TextNormalizer};
use crate::transcript::ParseOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// How the text fetched from a transcript location is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Header line followed by `start,end,text` rows.
    Delimited,
    /// Detect delimited rows or paired timestamp lines from the content.
    #[default]
    Auto,
    /// `{"text": [{"start", "end", "content"}]}` documents.
    Json,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Delimited => write!(f, "delimited"),
            SourceFormat::Auto => write!(f, "auto"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delimited" | "csv" => Ok(SourceFormat::Delimited),
            "auto" | "txt" => Ok(SourceFormat::Auto),
            "json" => Ok(SourceFormat::Json),
            _ => Err(format!(
                "Unknown source format: {}. Use 'delimited', 'auto', or 'json'",
                s
            )),
        }
    }
}

impl SourceFormat {
    /// Guess the format of an explicit transcript reference from its extension.
    pub fn from_reference(reference: &str) -> Self {
        let path = reference.split(['?', '#']).next().unwrap_or(reference);
        match Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => SourceFormat::Delimited,
            Some("json") => SourceFormat::Json,
            _ => SourceFormat::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
    Srt,
    Vtt,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Vtt => write!(f, "vtt"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "html" => Ok(OutputFormat::Html),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" => Ok(OutputFormat::Vtt),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Use 'text', 'html', 'srt', 'vtt', or 'json'",
                s
            )),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Html => "html",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
            OutputFormat::Json => "json",
        }
    }
}

/// One place a transcript may live. `{id}` in the path is replaced by the book id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLocation {
    pub path: String,
    pub format: SourceFormat,
}

impl TranscriptLocation {
    pub fn new(path: impl Into<String>, format: SourceFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Expand the path template for one book.
    pub fn resolve(&self, book_id: &str) -> String {
        self.path.replace("{id}", book_id)
    }
}

/// Default lookup order: the delimited export first, then the plain text file.
pub fn default_locations() -> Vec<TranscriptLocation> {
    vec![
        TranscriptLocation::new("transcripts/{id}.csv", SourceFormat::Delimited),
        TranscriptLocation::new("data/transcripts/{id}.txt", SourceFormat::Auto),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL (`http://` / `https://`) or directory holding the catalog and transcripts.
    pub source: String,
    pub catalog_path: String,
    pub transcript_locations: Vec<TranscriptLocation>,
    /// TOML file with `[[corrections]]` find/replace pairs.
    pub corrections_file: Option<PathBuf>,
    /// Reading-speed estimate used to close the last timestamped segment.
    pub seconds_per_char: f64,
    pub locator: LocatorConfig,
    pub default_format: OutputFormat,
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            catalog_path: "audiobooks.json".to_string(),
            transcript_locations: default_locations(),
            corrections_file: None,
            seconds_per_char: ParseOptions::default().seconds_per_char,
            locator: LocatorConfig::default(),
            default_format: OutputFormat::default(),
            concurrency: 4,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::read_file(&path)?,
            _ => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// A file that cannot be read is an error. Malformed TOML falls back to defaults.
    fn read_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        match toml::from_str::<Config>(&contents) {
            Ok(config) => {
                debug!("Loaded config from {:?}", path);
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring malformed config file {:?}: {}", path, e);
                Ok(Self::default())
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(source) = std::env::var("READALONG_SOURCE") {
            self.source = source;
        }
        if let Ok(path) = std::env::var("READALONG_CORRECTIONS") {
            self.corrections_file = Some(PathBuf::from(path));
        }
        if let Ok(format) = std::env::var("READALONG_DEFAULT_FORMAT") {
            if let Ok(f) = format.parse() {
                self.default_format = f;
            }
        }
        if let Ok(concurrency) = std::env::var("READALONG_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(ReadalongError::Config(
                "Source must be a base URL or a directory".to_string(),
            ));
        }

        if self.transcript_locations.is_empty() {
            return Err(ReadalongError::Config(
                "At least one transcript location is required".to_string(),
            ));
        }

        if self.concurrency == 0 {
            return Err(ReadalongError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        if !(self.seconds_per_char.is_finite() && self.seconds_per_char > 0.0) {
            return Err(ReadalongError::Config(
                "seconds_per_char must be a positive number".to_string(),
            ));
        }

        self.locator.validate()
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            seconds_per_char: self.seconds_per_char,
            ..ParseOptions::default()
        }
    }

    /// Build the text normalizer from the configured correction table, if any.
    pub fn text_normalizer(&self) -> Result<Arc<dyn TextNormalizer>> {
        match &self.corrections_file {
            Some(path) => Ok(Arc::new(CorrectionTable::from_file(path)?)),
            None => Ok(Arc::new(Identity)),
        }
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("readalong").join("config.toml"))
    }
}
