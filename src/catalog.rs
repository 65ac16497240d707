use crate::error::{ReadalongError, Result};
use crate::source::AssetSource;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

/// One entry of the audiobook catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audiobook {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    /// Explicit transcript reference; when absent the id-based path convention applies.
    #[serde(default)]
    pub transcript: Option<String>,
    /// Display label such as "12:30".
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

// Catalogs written by hand mix `"id": 1` and `"id": "1"`.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

/// The list of audiobooks available to the player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    books: Vec<Audiobook>,
}

impl Catalog {
    pub fn new(books: Vec<Audiobook>) -> Self {
        Self { books }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let books: Vec<Audiobook> = serde_json::from_str(json)?;
        Ok(Self::new(books))
    }

    pub async fn load(source: &dyn AssetSource, path: &str) -> Result<Self> {
        let json = source.fetch(path).await?;
        let catalog = Self::from_json(&json)?;
        info!("Loaded {} audiobooks from {}", catalog.len(), path);
        Ok(catalog)
    }

    pub fn books(&self) -> &[Audiobook] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Audiobook> {
        self.books.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Audiobook> {
        self.books.iter()
    }

    /// Position of the book with this id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }

    /// Resolve a user-supplied key: an exact id first, then a case-insensitive title.
    pub fn resolve(&self, key: &str) -> Result<usize> {
        self.position(key)
            .or_else(|| {
                self.books
                    .iter()
                    .position(|b| b.title.eq_ignore_ascii_case(key))
            })
            .ok_or_else(|| ReadalongError::UnknownBook(key.to_string()))
    }
}
