//! Wordlist loading
//!
//! Resolves a [`Source`] to raw text through a [`TextFetcher`], then keeps
//! only valid candidates: single tokens containing at least one character of
//! the Hebrew block.

use crate::encoding::decode_text;
use crate::error::{Result, SearchError};
use crate::normalize::{is_hebrew, strip_niqqud_all};

use bytesize::ByteSize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

/// Upstream location of the bundled lists
pub const REMOTE_BASE: &str = "https://raw.githubusercontent.com/eyaler/hebrew_wordlists/main/";

/// Name given to a collection made from pasted text
pub const PASTED_NAME: &str = "pasted";

/// Built-in word lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinSource {
    Adjectives,
    Nouns,
    Verbs,
}

impl BuiltinSource {
    pub const ALL: [BuiltinSource; 3] = [Self::Adjectives, Self::Nouns, Self::Verbs];

    /// Identifier used on the command line and in status maps
    pub fn key(&self) -> &'static str {
        match self {
            Self::Adjectives => "adjectives",
            Self::Nouns => "nouns",
            Self::Verbs => "verbs",
        }
    }

    /// Name shown next to each match
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Adjectives => "תארים",
            Self::Nouns => "שמות עצם",
            Self::Verbs => "פעלים",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Adjectives => "adjectives.txt",
            Self::Nouns => "nouns.txt",
            Self::Verbs => "verbs_no_fatverb.txt",
        }
    }
}

impl fmt::Display for BuiltinSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BuiltinSource {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SearchError::UnknownSource(s.to_string()))
    }
}

/// Where a word collection comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Builtin(BuiltinSource),
    Url(String),
    Pasted(String),
    File(PathBuf),
}

impl Source {
    /// Resolve the "custom" source: pasted text wins over a URL, and at least
    /// one of the two must be non-blank.
    pub fn custom(pasted: Option<&str>, url: Option<&str>) -> Result<Self> {
        if let Some(text) = pasted.filter(|t| !t.trim().is_empty()) {
            return Ok(Source::Pasted(text.to_string()));
        }
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            return Ok(Source::Url(url.to_string()));
        }
        Err(SearchError::MissingSource)
    }

    /// Display name used for provenance
    pub fn name(&self) -> String {
        match self {
            Source::Builtin(b) => b.display_name().to_string(),
            Source::Url(url) => name_from_locator(url),
            Source::Pasted(_) => PASTED_NAME.to_string(),
            Source::File(path) => name_from_locator(&path.to_string_lossy()),
        }
    }
}

/// A loaded, filtered list of words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCollection {
    pub name: String,
    pub words: Vec<String>,
}

impl WordCollection {
    pub fn new(name: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            name: name.into(),
            words,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Fetch raw bytes by locator
pub trait TextFetcher: Send + Sync {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>>;
}

impl<T: TextFetcher + ?Sized> TextFetcher for &T {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        (**self).fetch(locator)
    }
}

/// Reads local files. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl TextFetcher for FileFetcher {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        let path = Path::new(locator.strip_prefix("file://").unwrap_or(locator));
        let file = File::open(path).map_err(|e| SearchError::SourceLoad {
            locator: path.display().to_string(),
            status: e.to_string(),
        })?;

        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }

        // SAFETY: the map is read once and copied out before the file is dropped
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Ok(mmap.to_vec())
    }
}

/// Fetches `http://` and `https://` locators
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher;

#[cfg(feature = "http")]
impl TextFetcher for HttpFetcher {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        use std::io::Read;

        let response = ureq::get(locator)
            .set("Cache-Control", "no-store")
            .call()
            .map_err(|e| SearchError::SourceLoad {
                locator: locator.to_string(),
                status: match e {
                    ureq::Error::Status(code, resp) => format!("{} {}", code, resp.status_text()),
                    ureq::Error::Transport(t) => t.to_string(),
                },
            })?;

        let mut body = Vec::new();
        response.into_reader().read_to_end(&mut body)?;
        Ok(body)
    }
}

/// Dispatches on the locator scheme: URLs go over HTTP, anything else is a
/// file path
#[derive(Debug, Clone, Default)]
pub struct LocatorFetcher {
    files: FileFetcher,
    #[cfg(feature = "http")]
    http: HttpFetcher,
}

impl LocatorFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextFetcher for LocatorFetcher {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        if is_url(locator) {
            #[cfg(feature = "http")]
            return self.http.fetch(locator);

            #[cfg(not(feature = "http"))]
            return Err(SearchError::SourceLoad {
                locator: locator.to_string(),
                status: "built without http support".to_string(),
            });
        }
        self.files.fetch(locator)
    }
}

/// Loader configuration
#[derive(Debug, Clone, Copy)]
pub struct LoaderOptions {
    /// Remove niqqud from every loaded word
    pub strip_niqqud: bool,
    /// Fetch built-in lists from upstream instead of the data directory
    pub remote_builtins: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            strip_niqqud: true,
            remote_builtins: false,
        }
    }
}

/// Loads and filters word collections
pub struct WordlistLoader<F: TextFetcher> {
    fetcher: F,
    options: LoaderOptions,
    data_dir: PathBuf,
}

impl<F: TextFetcher> WordlistLoader<F> {
    pub fn new(fetcher: F, options: LoaderOptions) -> Self {
        Self {
            fetcher,
            options,
            data_dir: PathBuf::new(),
        }
    }

    /// Directory holding the bundled lists. Only built-in sources are
    /// looked up here; other paths are used as given.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Locator a source is fetched from, if it needs fetching
    pub fn locator(&self, source: &Source) -> Option<String> {
        match source {
            Source::Builtin(b) if self.options.remote_builtins => {
                Some(format!("{}{}", REMOTE_BASE, b.file_name()))
            }
            Source::Builtin(b) => Some(
                self.data_dir
                    .join(b.file_name())
                    .to_string_lossy()
                    .into_owned(),
            ),
            Source::Url(url) => Some(url.clone()),
            Source::File(path) => Some(path.to_string_lossy().into_owned()),
            Source::Pasted(_) => None,
        }
    }

    /// Load a source and return its valid words
    pub fn load(&self, source: &Source) -> Result<Vec<String>> {
        let text = match (source, self.locator(source)) {
            (Source::Pasted(text), _) => text.clone(),
            (_, Some(locator)) => {
                let bytes = self.fetcher.fetch(&locator)?;
                log::debug!("Fetched {} ({})", locator, ByteSize(bytes.len() as u64));
                let (text, info) = decode_text(&bytes);
                if info.encoding != encoding_rs::UTF_8 {
                    log::info!("{} decoded as {}", locator, info.name);
                }
                text
            }
            (_, None) => return Err(SearchError::MissingSource),
        };

        Ok(self.prepare(parse_wordlist(&text)))
    }

    /// Load a source into a named collection
    pub fn load_collection(&self, source: &Source) -> Result<WordCollection> {
        let words = self.load(source)?;
        Ok(WordCollection::new(source.name(), words))
    }

    /// Fetch a URL once and keep it as a custom collection.
    ///
    /// Unlike [`load`](Self::load), a list without a single valid word is an
    /// error here.
    pub fn download(&self, url: &str) -> Result<WordCollection> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SearchError::MissingSource);
        }

        let collection = self.load_collection(&Source::Url(url.to_string()))?;
        if collection.is_empty() {
            return Err(SearchError::EmptyWordlist {
                locator: url.to_string(),
            });
        }

        log::info!("Downloaded {} words from {}", collection.len(), collection.name);
        Ok(collection)
    }

    fn prepare(&self, words: Vec<String>) -> Vec<String> {
        if self.options.strip_niqqud {
            strip_niqqud_all(words)
        } else {
            words
        }
    }
}

/// A word is a candidate when it is a single token with at least one
/// character of the Hebrew block
#[inline]
pub fn is_valid_candidate(word: &str) -> bool {
    !word.chars().any(char::is_whitespace) && word.chars().any(is_hebrew)
}

/// Split text into lines and keep the valid candidates
pub fn parse_wordlist(text: &str) -> Vec<String> {
    let estimated = memchr::memchr_iter(b'\n', text.as_bytes()).count() + 1;
    let mut words = Vec::with_capacity(estimated);

    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() && is_valid_candidate(line) {
            words.push(line.to_string());
        }
    }

    words
}

/// Collection name for a URL or path: its last segment, or a placeholder
/// when that segment is empty
pub fn name_from_locator(locator: &str) -> String {
    locator
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("custom_wordlist")
        .to_string()
}

pub fn is_url(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Collect wordlist files under a directory
pub fn collect_wordlist_files(
    dir: &Path,
    recursive: bool,
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SearchError::SourceLoad {
            locator: dir.display().to_string(),
            status: "not a directory".to_string(),
        });
    }

    let walker = if recursive {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext.to_lowercase()))
        })
        .map(|e| e.into_path())
        .collect();

    files.sort();
    Ok(files)
}
