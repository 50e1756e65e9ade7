//! Result aggregation
//!
//! Merges matches found in several sources. With deduplication on, every
//! word appears once and carries the sources it was found in, in first-seen
//! order. Sorting is independent and runs after deduplication.

use crate::normalize::collation_key;

use ahash::RandomState;
use hashbrown::HashMap;
use std::fmt;

/// A matched word and the sources it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub word: String,
    pub sources: Vec<String>,
}

impl Match {
    pub fn new(word: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            sources: vec![source.into()],
        }
    }

    /// Add a source unless it is already listed
    pub fn add_source(&mut self, source: &str) {
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
    }
}

/// `word (source, source)` as written to the results file
impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sources.is_empty() {
            f.write_str(&self.word)
        } else {
            write!(f, "{} ({})", self.word, self.sources.join(", "))
        }
    }
}

/// Statistics for deduplication
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupStats {
    pub total_processed: usize,
    pub unique_count: usize,
    pub duplicate_count: usize,
}

/// Merges matches by word, keeping first-seen order
pub struct ProvenanceMerger {
    index: HashMap<String, usize, RandomState>,
    merged: Vec<Match>,
    stats: DedupStats,
}

impl ProvenanceMerger {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            merged: Vec::with_capacity(capacity),
            stats: DedupStats::default(),
        }
    }

    /// Insert a match. Returns true if the word was not seen before.
    pub fn insert(&mut self, m: Match) -> bool {
        self.stats.total_processed += 1;

        if let Some(&pos) = self.index.get(&m.word) {
            let existing = &mut self.merged[pos];
            for source in &m.sources {
                existing.add_source(source);
            }
            self.stats.duplicate_count += 1;
            return false;
        }

        self.index.insert(m.word.clone(), self.merged.len());
        self.merged.push(m);
        self.stats.unique_count += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    pub fn stats(&self) -> DedupStats {
        self.stats
    }

    pub fn into_matches(self) -> Vec<Match> {
        self.merged
    }
}

impl Default for ProvenanceMerger {
    fn default() -> Self {
        Self::new()
    }
}

fn merge(matches: Vec<Match>) -> ProvenanceMerger {
    let mut merger = ProvenanceMerger::with_capacity(matches.len());
    for m in matches {
        merger.insert(m);
    }
    merger
}

/// Merge duplicate words, combining their sources
pub fn deduplicate(matches: Vec<Match>) -> Vec<Match> {
    merge(matches).into_matches()
}

/// Sort matches by word, niqqud-insensitive first
pub fn sort_matches(matches: &mut [Match]) {
    matches.sort_by_cached_key(|m| collation_key(&m.word));
}

/// Aggregation toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    pub unique: bool,
    pub sort: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            unique: true,
            sort: true,
        }
    }
}

/// Deduplicate then sort, as requested. Without deduplication the stats
/// only count the matches seen.
pub fn aggregate(matches: Vec<Match>, options: AggregateOptions) -> (Vec<Match>, DedupStats) {
    let (mut matches, stats) = if options.unique {
        let merger = merge(matches);
        let stats = merger.stats();
        (merger.into_matches(), stats)
    } else {
        let stats = DedupStats {
            total_processed: matches.len(),
            ..DedupStats::default()
        };
        (matches, stats)
    };

    if options.sort {
        sort_matches(&mut matches);
    }

    (matches, stats)
}
