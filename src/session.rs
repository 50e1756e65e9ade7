//! Search orchestration
//!
//! Loads each selected source, runs the batch engine over it and aggregates
//! the results into a [`SearchRun`]. A failing source is recorded in the
//! status map and the run carries on with the rest.

use crate::aggregate::{aggregate, AggregateOptions, DedupStats, Match};
use crate::constraints::LetterConstraints;
use crate::engine::{BatchSearch, CancelToken};
use crate::error::{Result, SearchError};
use crate::loader::{BuiltinSource, Source, TextFetcher, WordCollection, WordlistLoader};
use crate::template::TemplateMatcher;

use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Status of one built-in source within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Pending,
    Loading,
    Success { count: usize },
    Error { message: String },
}

impl SourceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SourceStatus::Success { .. } | SourceStatus::Error { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatusUpdate {
    pub source_key: String,
    pub status: SourceStatus,
}

/// Events emitted during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Status(String),
    Source(SourceStatusUpdate),
    Progress {
        source: String,
        chunk: usize,
        total: usize,
    },
}

/// Receives progress while a run is in flight
pub trait SearchObserver {
    /// Coarse human-readable status line
    fn on_status(&self, _message: &str) {}

    fn on_source_status(&self, _update: &SourceStatusUpdate) {}

    fn on_progress(&self, _source: &str, _chunk: usize, _total: usize) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Forward events to another thread. A dropped receiver is not an error:
/// the run still completes.
impl SearchObserver for Sender<SearchEvent> {
    fn on_status(&self, message: &str) {
        let _ = self.send(SearchEvent::Status(message.to_string()));
    }

    fn on_source_status(&self, update: &SourceStatusUpdate) {
        let _ = self.send(SearchEvent::Source(update.clone()));
    }

    fn on_progress(&self, source: &str, chunk: usize, total: usize) {
        let _ = self.send(SearchEvent::Progress {
            source: source.to_string(),
            chunk,
            total,
        });
    }
}

/// Run options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Remove duplicate words, merging their sources
    pub unique: bool,
    pub sort: bool,
    /// Anchor the template at both ends
    pub whole_word: bool,
    /// Fetch built-in sources concurrently before searching them
    pub parallel_fetch: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            unique: true,
            sort: true,
            whole_word: true,
            parallel_fetch: true,
        }
    }
}

/// Everything a run needs
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub pattern: String,
    pub sources: Vec<BuiltinSource>,
    /// Collections loaded ahead of time (downloads, local files)
    pub custom: Vec<WordCollection>,
    /// Pasted text, searched as its own collection
    pub paste: Option<String>,
    pub constraints: Option<LetterConstraints>,
    pub options: SearchOptions,
}

impl SearchRequest {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    fn has_paste(&self) -> bool {
        self.paste.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    /// Reject requests that cannot start
    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(SearchError::MissingPattern);
        }
        if self.sources.is_empty() && self.custom.is_empty() && !self.has_paste() {
            return Err(SearchError::NoSourceSelected);
        }
        Ok(())
    }
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRun {
    /// Words scanned across all sources; failed sources count as zero
    pub total_words: usize,
    /// Matches after deduplication when enabled, raw count otherwise
    pub match_count: usize,
    pub elapsed: Duration,
    /// Per built-in source status, in request order
    pub source_status: Vec<(String, SourceStatus)>,
    /// Raw matches seen and how many were merged into earlier ones
    pub dedup: DedupStats,
    pub matches: Vec<Match>,
}

impl SearchRun {
    pub fn status(&self, source_key: &str) -> Option<&SourceStatus> {
        self.source_status
            .iter()
            .find(|(key, _)| key == source_key)
            .map(|(_, status)| status)
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = (&str, &str)> {
        self.source_status.iter().filter_map(|(key, status)| match status {
            SourceStatus::Error { message } => Some((key.as_str(), message.as_str())),
            _ => None,
        })
    }
}

/// Clears the busy flag when a run ends, however it ends
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SearchError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs searches, one at a time
pub struct Searcher<F: TextFetcher> {
    loader: WordlistLoader<F>,
    busy: AtomicBool,
    cancel: CancelToken,
    batch_size: usize,
}

impl<F: TextFetcher> Searcher<F> {
    pub fn new(loader: WordlistLoader<F>) -> Self {
        Self {
            loader,
            busy: AtomicBool::new(false),
            cancel: CancelToken::new(),
            batch_size: crate::engine::BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn loader(&self) -> &WordlistLoader<F> {
        &self.loader
    }

    /// Token that stops the current run at the next chunk or source boundary
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Execute a search
    pub fn run(&self, request: &SearchRequest, observer: &dyn SearchObserver) -> Result<SearchRun> {
        request.validate()?;
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.cancel.reset();

        let start = Instant::now();
        let options = request.options;
        observer.on_status("Starting search...");

        let matcher = TemplateMatcher::folded(&request.pattern, options.whole_word)?;
        let search = BatchSearch::new(&matcher)
            .with_constraints(request.constraints.as_ref())
            .with_batch_size(self.batch_size)
            .with_cancel(&self.cancel);

        log::info!(
            "Searching '{}' ({}) in {} built-in and {} custom sources",
            request.pattern,
            matcher.regex_str(),
            request.sources.len(),
            request.custom.len() + usize::from(request.has_paste()),
        );

        let mut source_status: Vec<(String, SourceStatus)> = request
            .sources
            .iter()
            .map(|s| (s.key().to_string(), SourceStatus::Pending))
            .collect();
        let mut all_matches = Vec::new();
        let mut total_words = 0usize;

        let mut prefetched = self.prefetch(request, observer).map(Vec::into_iter);

        for (i, builtin) in request.sources.iter().enumerate() {
            self.check_cancelled()?;

            let key = builtin.key();
            let loaded = match prefetched.as_mut().and_then(Iterator::next) {
                Some(loaded) => loaded,
                None => {
                    report(observer, &mut source_status[i], SourceStatus::Loading);
                    observer.on_status(&format!("Loading {}...", key));
                    self.loader.load(&Source::Builtin(*builtin))
                }
            };

            let words = match loaded {
                Ok(words) => words,
                Err(e) if !e.is_source_local() => return Err(e),
                Err(e) => {
                    log::warn!("Failed to load {}: {}", key, e);
                    report(
                        observer,
                        &mut source_status[i],
                        SourceStatus::Error {
                            message: e.to_string(),
                        },
                    );
                    continue;
                }
            };

            observer.on_status(&format!("Searching {}...", key));
            let matches = search.run(&words, builtin.display_name(), |chunk, total| {
                observer.on_progress(key, chunk, total);
                observer.on_status(&format!("Searching {} (part {}/{})...", key, chunk, total));
            })?;

            log::debug!("{}: {} words, {} matches", key, words.len(), matches.len());
            total_words += words.len();
            all_matches.extend(matches);
            report(
                observer,
                &mut source_status[i],
                SourceStatus::Success { count: words.len() },
            );
        }

        let pasted = match request.paste.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                Some(self.loader.load_collection(&Source::Pasted(text.to_string()))?)
            }
            _ => None,
        };

        for collection in request.custom.iter().chain(pasted.as_ref()) {
            self.check_cancelled()?;
            observer.on_status(&format!("Searching {}...", collection.name));

            let matches = search.run(&collection.words, &collection.name, |chunk, total| {
                observer.on_progress(&collection.name, chunk, total);
            })?;

            total_words += collection.len();
            all_matches.extend(matches);
        }

        let aggregate_options = AggregateOptions {
            unique: options.unique,
            sort: options.sort,
        };
        if options.unique {
            observer.on_status("Removing duplicates...");
        }
        if options.sort {
            observer.on_status("Sorting results...");
        }
        let (matches, dedup) = aggregate(all_matches, aggregate_options);

        let run = SearchRun {
            total_words,
            match_count: matches.len(),
            elapsed: start.elapsed(),
            source_status,
            dedup,
            matches,
        };

        log::info!(
            "Scanned {} words, {} matches in {:?}",
            run.total_words,
            run.match_count,
            run.elapsed
        );
        observer.on_status("Done.");
        Ok(run)
    }

    /// Fetch every built-in source up front on the rayon pool. Results keep
    /// request order; each failure stays with its own source. Fetches that
    /// have not started when the run is cancelled are skipped.
    fn prefetch(
        &self,
        request: &SearchRequest,
        observer: &dyn SearchObserver,
    ) -> Option<Vec<Result<Vec<String>>>> {
        if !request.options.parallel_fetch || request.sources.len() < 2 {
            return None;
        }

        for builtin in &request.sources {
            observer.on_source_status(&SourceStatusUpdate {
                source_key: builtin.key().to_string(),
                status: SourceStatus::Loading,
            });
        }
        observer.on_status("Loading sources...");

        Some(
            request
                .sources
                .par_iter()
                .map(|b| {
                    self.check_cancelled()?;
                    self.loader.load(&Source::Builtin(*b))
                })
                .collect(),
        )
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        Ok(())
    }
}

fn report(observer: &dyn SearchObserver, entry: &mut (String, SourceStatus), status: SourceStatus) {
    entry.1 = status;
    observer.on_source_status(&SourceStatusUpdate {
        source_key: entry.0.clone(),
        status: entry.1.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoaderOptions;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    struct MapFetcher(HashMap<&'static str, &'static str>);

    impl TextFetcher for MapFetcher {
        fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
            self.0
                .get(locator)
                .map(|t| t.as_bytes().to_vec())
                .ok_or_else(|| SearchError::SourceLoad {
                    locator: locator.to_string(),
                    status: "404 Not Found".to_string(),
                })
        }
    }

    fn searcher(entries: &[(&'static str, &'static str)]) -> Searcher<MapFetcher> {
        let fetcher = MapFetcher(entries.iter().copied().collect());
        Searcher::new(WordlistLoader::new(fetcher, LoaderOptions::default()))
    }

    #[derive(Default)]
    struct Recorder {
        statuses: RefCell<Vec<String>>,
        sources: RefCell<Vec<SourceStatusUpdate>>,
    }

    impl SearchObserver for Recorder {
        fn on_status(&self, message: &str) {
            self.statuses.borrow_mut().push(message.to_string());
        }

        fn on_source_status(&self, update: &SourceStatusUpdate) {
            self.sources.borrow_mut().push(update.clone());
        }
    }

    #[test]
    fn test_missing_pattern() {
        let s = searcher(&[]);
        let mut request = SearchRequest::new("  ");
        request.sources = vec![BuiltinSource::Nouns];

        assert!(matches!(s.run(&request, &NoopObserver), Err(SearchError::MissingPattern)));
    }

    #[test]
    fn test_no_source_selected() {
        let s = searcher(&[]);
        let mut request = SearchRequest::new("???");
        request.paste = Some("   \n".to_string());

        assert!(matches!(s.run(&request, &NoopObserver), Err(SearchError::NoSourceSelected)));
    }

    #[test]
    fn test_sequential_status_updates() {
        let s = searcher(&[("nouns.txt", "בית\nספר\n")]);
        let mut request = SearchRequest::new("???");
        request.sources = vec![BuiltinSource::Nouns, BuiltinSource::Verbs];
        request.options.parallel_fetch = false;
        let recorder = Recorder::default();

        let run = s.run(&request, &recorder).unwrap();

        let updates = recorder.sources.borrow();
        let statuses: Vec<_> = updates.iter().map(|u| (u.source_key.as_str(), &u.status)).collect();
        assert_eq!(
            statuses,
            vec![
                ("nouns", &SourceStatus::Loading),
                ("nouns", &SourceStatus::Success { count: 2 }),
                ("verbs", &SourceStatus::Loading),
                ("verbs", &SourceStatus::Error {
                    message: "failed to load verbs_no_fatverb.txt: 404 Not Found".to_string()
                }),
            ]
        );
        assert_eq!(run.total_words, 2);
        assert!(run.source_status.iter().all(|(_, st)| st.is_terminal()));
        assert_eq!(recorder.statuses.borrow().last().unwrap(), "Done.");
    }

    #[test]
    fn test_paste_is_searched() {
        let s = searcher(&[]);
        let mut request = SearchRequest::new("אהב?");
        request.paste = Some("אהבה\nשָׁלוֹם\nאהבים\n".to_string());

        let run = s.run(&request, &NoopObserver).unwrap();

        assert_eq!(run.total_words, 3);
        assert_eq!(run.matches, vec![Match::new("אהבה", "pasted")]);
    }

    #[test]
    fn test_busy_guard_rejects_nested_run() {
        struct Reentrant<'a> {
            searcher: &'a Searcher<MapFetcher>,
            nested: RefCell<Option<bool>>,
        }

        impl SearchObserver for Reentrant<'_> {
            fn on_status(&self, _message: &str) {
                if self.nested.borrow().is_some() {
                    return;
                }
                let mut request = SearchRequest::new("?");
                request.paste = Some("א".to_string());
                let busy = matches!(self.searcher.run(&request, &NoopObserver), Err(SearchError::Busy));
                *self.nested.borrow_mut() = Some(busy);
            }
        }

        let s = searcher(&[]);
        let observer = Reentrant {
            searcher: &s,
            nested: RefCell::new(None),
        };
        let mut request = SearchRequest::new("?");
        request.paste = Some("א".to_string());

        s.run(&request, &observer).unwrap();

        assert_eq!(*observer.nested.borrow(), Some(true));
        assert!(!s.is_busy());
    }

    #[test]
    fn test_cancelled_run() {
        struct CancelOnProgress(CancelToken);

        impl SearchObserver for CancelOnProgress {
            fn on_progress(&self, _source: &str, _chunk: usize, _total: usize) {
                self.0.cancel();
            }
        }

        let s = searcher(&[]).with_batch_size(1);
        let observer = CancelOnProgress(s.cancel_token());
        let mut request = SearchRequest::new("?");
        request.custom = vec![WordCollection::new("list", vec!["א".into(), "ב".into(), "ג".into()])];

        assert!(matches!(s.run(&request, &observer), Err(SearchError::Cancelled)));
        assert!(!s.is_busy());
    }

    #[test]
    fn test_cancel_while_loading_skips_fetches() {
        struct CountingFetcher(AtomicUsize);

        impl TextFetcher for CountingFetcher {
            fn fetch(&self, _locator: &str) -> Result<Vec<u8>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok("בית\n".as_bytes().to_vec())
            }
        }

        struct CancelOnLoading(CancelToken);

        impl SearchObserver for CancelOnLoading {
            fn on_source_status(&self, update: &SourceStatusUpdate) {
                if update.status == SourceStatus::Loading {
                    self.0.cancel();
                }
            }
        }

        let s = Searcher::new(WordlistLoader::new(
            CountingFetcher(AtomicUsize::new(0)),
            LoaderOptions::default(),
        ));
        let observer = CancelOnLoading(s.cancel_token());
        let mut request = SearchRequest::new("???");
        request.sources = BuiltinSource::ALL.to_vec();

        assert!(matches!(s.run(&request, &observer), Err(SearchError::Cancelled)));
        assert_eq!(s.loader().fetcher().0.load(Ordering::SeqCst), 0);
        assert!(!s.is_busy());
    }

    #[test]
    fn test_channel_observer() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let s = searcher(&[("adjectives.txt", "גדול\n")]);
        let mut request = SearchRequest::new("????");
        request.sources = vec![BuiltinSource::Adjectives];

        s.run(&request, &tx).unwrap();
        drop(tx);

        let events: Vec<SearchEvent> = rx.iter().collect();
        assert!(events.contains(&SearchEvent::Source(SourceStatusUpdate {
            source_key: "adjectives".to_string(),
            status: SourceStatus::Success { count: 1 },
        })));
        assert_eq!(events.last(), Some(&SearchEvent::Status("Done.".to_string())));
    }
}
