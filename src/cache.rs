use crate::catalog::Audiobook;
use crate::config::{default_locations, Config, SourceFormat, TranscriptLocation};
use crate::error::{ReadalongError, Result};
use crate::source::AssetSource;
use crate::transcript::normalize::{Identity, TextNormalizer};
use crate::transcript::{parse_source, ParseOptions, Transcript};
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, info, warn};

/// Outcome of warming the cache for a set of books.
#[derive(Debug, Clone, Default)]
pub struct PrefetchStats {
    pub total: usize,
    pub loaded: usize,
    pub failed: usize,
    pub segments: usize,
    pub total_time: Duration,
}

/// Session-scoped store of parsed transcripts keyed by book id.
///
/// Entries are never evicted. Two concurrent misses for the same id may both
/// fetch and parse; the first stored result wins and both callers get it.
pub struct TranscriptCache {
    source: Arc<dyn AssetSource>,
    locations: Vec<TranscriptLocation>,
    normalizer: Arc<dyn TextNormalizer>,
    options: ParseOptions,
    entries: RwLock<HashMap<String, Arc<Transcript>>>,
}

impl TranscriptCache {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            locations: default_locations(),
            normalizer: Arc::new(Identity),
            options: ParseOptions::default(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config, source: Arc<dyn AssetSource>) -> Result<Self> {
        Ok(Self::new(source)
            .with_locations(config.transcript_locations.clone())
            .with_normalizer(config.text_normalizer()?)
            .with_parse_options(config.parse_options()))
    }

    /// Locations tried in order on a miss, each at most once.
    pub fn with_locations(mut self, locations: Vec<TranscriptLocation>) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn TextNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Transcript for a book id. Never fails: when no location yields content the
    /// failure is logged and an empty transcript is returned (and not cached).
    pub async fn get_transcript(&self, book_id: &str) -> Arc<Transcript> {
        self.or_empty(book_id, self.load(book_id, None).await)
    }

    /// Like [`get_transcript`](Self::get_transcript), trying the book's explicit
    /// transcript reference before the id-based locations.
    pub async fn get_book_transcript(&self, book: &Audiobook) -> Arc<Transcript> {
        self.or_empty(
            &book.id,
            self.load(&book.id, book.transcript.as_deref()).await,
        )
    }

    fn or_empty(&self, book_id: &str, result: Result<Arc<Transcript>>) -> Arc<Transcript> {
        result.unwrap_or_else(|e| {
            warn!("No transcript for book {}: {}", book_id, e);
            Arc::new(Transcript::empty())
        })
    }

    /// Transcript for a book, surfacing the error when every location fails.
    pub async fn load(&self, book_id: &str, explicit: Option<&str>) -> Result<Arc<Transcript>> {
        if let Some(transcript) = self.cached(book_id).await {
            debug!("Transcript cache hit for {}", book_id);
            return Ok(transcript);
        }

        let mut last_error = None;

        for location in self.plan(book_id, explicit) {
            let path = location.resolve(book_id);
            match self.source.fetch(&path).await {
                Ok(raw) => {
                    let transcript =
                        parse_source(&raw, location.format, self.normalizer.as_ref(), &self.options);
                    info!(
                        "Loaded transcript for {} from {} ({} segments)",
                        book_id,
                        path,
                        transcript.len()
                    );
                    return Ok(self.store(book_id, transcript).await);
                }
                Err(e) => {
                    debug!("Transcript location {} failed: {}", path, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ReadalongError::NotFound(format!("no transcript locations for {}", book_id))
        }))
    }

    fn plan(&self, book_id: &str, explicit: Option<&str>) -> Vec<TranscriptLocation> {
        let mut plan: Vec<TranscriptLocation> = explicit
            .filter(|r| !r.trim().is_empty())
            .map(|r| TranscriptLocation::new(r, SourceFormat::from_reference(r)))
            .into_iter()
            .collect();

        for location in &self.locations {
            if !plan.iter().any(|p| p.resolve(book_id) == location.resolve(book_id)) {
                plan.push(location.clone());
            }
        }

        plan
    }

    async fn store(&self, book_id: &str, transcript: Transcript) -> Arc<Transcript> {
        let mut entries = self.entries.write().await;
        entries
            .entry(book_id.to_string())
            .or_insert_with(|| Arc::new(transcript))
            .clone()
    }

    pub async fn cached(&self, book_id: &str) -> Option<Arc<Transcript>> {
        self.entries.read().await.get(book_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Load transcripts for many books with at most `concurrency` fetches in flight.
    pub async fn prefetch(
        &self,
        books: &[Audiobook],
        concurrency: usize,
        show_progress: bool,
    ) -> PrefetchStats {
        let start_time = Instant::now();
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

        let progress_bar = if show_progress {
            let pb = ProgressBar::new(books.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} transcripts")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut futures = FuturesUnordered::new();
        for book in books {
            let sem = semaphore.clone();
            let pb = progress_bar.clone();
            futures.push(async move {
                let _permit = sem.acquire().await.ok();
                let result = self.load(&book.id, book.transcript.as_deref()).await;
                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
                (book.id.as_str(), result)
            });
        }

        let mut stats = PrefetchStats {
            total: books.len(),
            ..PrefetchStats::default()
        };

        while let Some((book_id, result)) = futures.next().await {
            match result {
                Ok(transcript) => {
                    stats.loaded += 1;
                    stats.segments += transcript.len();
                }
                Err(e) => {
                    warn!("Prefetch failed for {}: {}", book_id, e);
                    stats.failed += 1;
                }
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_and_clear();
        }

        stats.total_time = start_time.elapsed();
        info!(
            "Prefetched {}/{} transcripts in {:.2}s",
            stats.loaded,
            stats.total,
            stats.total_time.as_secs_f64()
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory source that counts fetches.
    struct MemorySource {
        files: HashMap<String, String>,
        fetches: AtomicUsize,
        requested: Mutex<Vec<String>>,
    }

    impl MemorySource {
        fn new(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.to_string()))
                    .collect(),
                fetches: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AssetSource for MemorySource {
        async fn fetch(&self, path: &str) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(path.to_string());
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| ReadalongError::NotFound(path.to_string()))
        }

        fn name(&self) -> &'static str {
            "memory"
        }
    }

    const CSV: &str = "Waktu Mulai (detik),Waktu Akhir,Teks\n0,2.5,Hello\n2.5,5,World\n";
    const TXT: &str = "0:05\nHello there\n0:10\nGeneral Kenobi";

    #[test]
    fn test_second_request_is_cached() {
        tokio_test::block_on(async {
            let source = Arc::new(MemorySource::new(&[("transcripts/1.csv", CSV)]));
            let cache = TranscriptCache::new(source.clone());

            let first = cache.get_transcript("1").await;
            let second = cache.get_transcript("1").await;

            assert_eq!(first.len(), 2);
            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn test_falls_back_to_text_location() {
        tokio_test::block_on(async {
            let source = Arc::new(MemorySource::new(&[("data/transcripts/7.txt", TXT)]));
            let cache = TranscriptCache::new(source.clone());

            let transcript = cache.get_transcript("7").await;

            assert_eq!(transcript.len(), 2);
            assert_eq!(transcript[0].start, 5.0);
            assert_eq!(
                *source.requested.lock().unwrap(),
                vec!["transcripts/7.csv", "data/transcripts/7.txt"]
            );
        });
    }

    #[test]
    fn test_all_locations_fail() {
        tokio_test::block_on(async {
            let source = Arc::new(MemorySource::new(&[]));
            let cache = TranscriptCache::new(source.clone());

            assert!(cache.load("9", None).await.is_err());
            assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

            let transcript = cache.get_transcript("9").await;
            assert!(transcript.is_empty());
            assert_eq!(source.fetches.load(Ordering::SeqCst), 4);
            assert!(cache.is_empty().await);
        });
    }

    #[test]
    fn test_explicit_reference_first() {
        tokio_test::block_on(async {
            let json = r#"{"text": [{"start": 0, "end": 1, "content": "From JSON"}]}"#;
            let source = Arc::new(MemorySource::new(&[
                ("custom/book.json", json),
                ("transcripts/b.csv", CSV),
            ]));
            let cache = TranscriptCache::new(source.clone());
            let book = Audiobook {
                id: "b".to_string(),
                title: "B".to_string(),
                author: String::new(),
                cover: None,
                audio: None,
                transcript: Some("custom/book.json".to_string()),
                duration: None,
            };

            let transcript = cache.get_book_transcript(&book).await;

            assert_eq!(transcript[0].text, "From JSON");
            assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn test_explicit_reference_not_repeated() {
        let cache = TranscriptCache::new(Arc::new(MemorySource::new(&[])));
        let plan = cache.plan("3", Some("transcripts/3.csv"));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].resolve("3"), "transcripts/3.csv");
        assert_eq!(plan[1].resolve("3"), "data/transcripts/3.txt");
    }

    #[test]
    fn test_normalizer_applied() {
        tokio_test::block_on(async {
            let source = Arc::new(MemorySource::new(&[("data/transcripts/1.txt", TXT)]));
            let cache = TranscriptCache::new(source)
                .with_normalizer(Arc::new(|s: &str| s.replace("Kenobi", "Grievous")));

            let transcript = cache.get_transcript("1").await;
            assert_eq!(transcript[1].text, "General Grievous");
        });
    }

    #[tokio::test]
    async fn test_prefetch_counts() {
        let source = Arc::new(MemorySource::new(&[
            ("transcripts/a.csv", CSV),
            ("data/transcripts/b.txt", TXT),
        ]));
        let cache = TranscriptCache::new(source);
        let books: Vec<Audiobook> = ["a", "b", "c"]
            .iter()
            .map(|id| Audiobook {
                id: id.to_string(),
                title: id.to_uppercase(),
                author: String::new(),
                cover: None,
                audio: None,
                transcript: None,
                duration: None,
            })
            .collect();

        let stats = cache.prefetch(&books, 2, false).await;

        assert_eq!(stats.total, 3);
        assert_eq!(stats.loaded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.segments, 4);
        assert_eq!(cache.len().await, 2);
    }
}
