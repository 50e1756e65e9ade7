//! # Hebrew Pattern Matcher
//!
//! Template search over Hebrew word lists.
//!
//! ## Features
//!
//! - **Templates**: `?` matches any single Hebrew letter, `[...]` is a character
//!   class, everything else is literal
//! - **Final letters**: `ך ן ם ף ץ` fold to their base forms for matching
//! - **Niqqud**: optionally stripped from loaded lists
//! - **Letter constraints**: required letters with minimum counts, forbidden letters
//! - **Multiple sources**: built-in lists, URLs, pasted text and local files,
//!   with per-source status and provenance on every match
//! - **Chunked scanning**: large lists are searched in batches with progress
//!   reports between them
//!
//! ## Usage
//!
//! ```bash
//! # Five-letter words shaped ר?וא?
//! hebrew-matcher -p 'ר?וא?'
//!
//! # Nouns and verbs with two alefs and no tav
//! hebrew-matcher -p '?????' -s nouns,verbs --require 'א:2' --forbid ת
//! ```
//!
//! ## Example
//!
//! ```rust
//! use hebrew_pattern_matcher::loader::{LoaderOptions, LocatorFetcher, WordlistLoader};
//! use hebrew_pattern_matcher::session::{NoopObserver, SearchRequest, Searcher};
//!
//! let loader = WordlistLoader::new(LocatorFetcher::new(), LoaderOptions::default());
//! let searcher = Searcher::new(loader);
//!
//! let mut request = SearchRequest::new("אהב?");
//! request.paste = Some("אהבה\nאהבים\nשלום".to_string());
//!
//! let run = searcher.run(&request, &NoopObserver).unwrap();
//! assert_eq!(run.matches.len(), 1);
//! assert_eq!(run.matches[0].word, "אהבה");
//! ```

pub mod aggregate;
pub mod cli;
pub mod constraints;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod progress;
pub mod session;
pub mod template;

pub use aggregate::Match;
pub use cli::{Args, SearchConfig};
pub use error::{Result, SearchError};
pub use session::{SearchRequest, SearchRun, Searcher};
pub use template::TemplateMatcher;
