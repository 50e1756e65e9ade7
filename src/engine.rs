//! Batch search engine
//!
//! Applies a compiled template and optional letter constraints to a word
//! collection. Large collections are scanned in fixed-size chunks with a
//! progress report and a yield between chunks, so a caller driving a UI on
//! another thread keeps getting scheduled.

use crate::aggregate::Match;
use crate::constraints::LetterConstraints;
use crate::error::{Result, SearchError};
use crate::normalize::fold_finals;
use crate::template::TemplateMatcher;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Collections up to this size are scanned in one pass; larger ones are
/// split into chunks of this size
pub const BATCH_SIZE: usize = 10_000;

/// Shared flag used to stop a running search between chunks
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// One search over word collections
///
/// The matcher is expected to be built with [`TemplateMatcher::folded`],
/// since candidates are tested after final-letter folding.
pub struct BatchSearch<'a> {
    matcher: &'a TemplateMatcher,
    constraints: Option<&'a LetterConstraints>,
    batch_size: usize,
    cancel: Option<&'a CancelToken>,
}

impl<'a> BatchSearch<'a> {
    pub fn new(matcher: &'a TemplateMatcher) -> Self {
        Self {
            matcher,
            constraints: None,
            batch_size: BATCH_SIZE,
            cancel: None,
        }
    }

    pub fn with_constraints(mut self, constraints: Option<&'a LetterConstraints>) -> Self {
        self.constraints = constraints.filter(|c| !c.is_empty());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Test a single stored word
    #[inline]
    pub fn is_match(&self, word: &str) -> bool {
        let folded = fold_finals(word);
        if !self.matcher.is_match(&folded) {
            return false;
        }
        self.constraints.map_or(true, |c| c.accepts(&folded))
    }

    /// Scan a slice in one pass, preserving order
    pub fn scan<'w>(&self, words: &'w [String]) -> Vec<&'w str> {
        words
            .iter()
            .filter(|w| self.is_match(w))
            .map(String::as_str)
            .collect()
    }

    /// Scan a collection and tag every match with `source`.
    ///
    /// `on_progress` receives `(chunk, total_chunks)` after each chunk,
    /// 1-based. It is not called for collections that fit in one batch.
    pub fn run<P>(&self, words: &[String], source: &str, mut on_progress: P) -> Result<Vec<Match>>
    where
        P: FnMut(usize, usize),
    {
        if words.len() <= self.batch_size {
            return Ok(tag(self.scan(words), source));
        }

        let total_chunks = words.len().div_ceil(self.batch_size);
        let mut matches = Vec::new();

        for (index, chunk) in words.chunks(self.batch_size).enumerate() {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                log::debug!("Search in {} cancelled at chunk {}/{}", source, index, total_chunks);
                return Err(SearchError::Cancelled);
            }

            matches.extend(tag(self.scan(chunk), source));
            on_progress(index + 1, total_chunks);

            std::thread::yield_now();
        }

        log::debug!("{}: {} matches in {} chunks", source, matches.len(), total_chunks);
        Ok(matches)
    }
}

fn tag(hits: Vec<&str>, source: &str) -> Vec<Match> {
    hits.into_iter().map(|w| Match::new(w, source)).collect()
}
