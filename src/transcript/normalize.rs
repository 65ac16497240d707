// Text normalization applied to every parsed segment.
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// A `text -> text` hook run on segment text before validation.
pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl TextNormalizer for Identity {
    fn normalize(&self, text: &str) -> String {
        text.to_string()
    }
}

impl<F> TextNormalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, text: &str) -> String {
        self(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Correction {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
struct CorrectionFile {
    #[serde(default)]
    corrections: Vec<Correction>,
}

/// Ordered literal find/replace pairs for known transcription errors.
///
/// Replacements run in table order, each over the output of the previous one,
/// so a later entry may rewrite text produced by an earlier entry.
#[derive(Debug, Clone, Default)]
pub struct CorrectionTable {
    corrections: Vec<Correction>,
}

impl CorrectionTable {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self {
            corrections: pairs
                .into_iter()
                .filter(|(from, _)| !from.is_empty())
                .map(|(from, to)| Correction { from, to })
                .collect(),
        }
    }

    /// Parse a table from TOML with `[[corrections]]` entries holding `from` and `to`.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: CorrectionFile = toml::from_str(contents)?;
        Ok(Self::new(
            file.corrections
                .into_iter()
                .map(|c| (c.from, c.to))
                .collect(),
        ))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&contents)?;
        debug!("Loaded {} corrections from {:?}", table.len(), path);
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}

impl TextNormalizer for CorrectionTable {
    fn normalize(&self, text: &str) -> String {
        self.corrections
            .iter()
            .fold(text.to_string(), |acc, c| {
                if acc.contains(c.from.as_str()) {
                    acc.replace(c.from.as_str(), &c.to)
                } else {
                    acc
                }
            })
    }
}
