//! Command-line interface definition for hebrew-matcher
//!
//! Provides argument parsing and conversion into a [`SearchConfig`].

use crate::constraints::LetterConstraints;
use crate::loader::{BuiltinSource, LoaderOptions};
use crate::output::OutputFormat;
use crate::session::SearchOptions;

use clap::Parser;
use std::path::PathBuf;

/// Search Hebrew word lists by template
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hebrew-matcher",
    author = "m0h1nd4",
    version,
    about = "Search Hebrew word lists by template",
    long_about = r#"
Search Hebrew word lists with a simple template language:

    ?        any single Hebrew letter
    [אי]     one of the listed characters
    other    matched literally

Final letters are folded for matching (ם matches מ), niqqud is stripped from
the lists by default and results are deduplicated and sorted.

EXAMPLES:
    # Five-letter words shaped ר?וא?
    hebrew-matcher -p 'ר?וא?'

    # Search nouns and verbs, at least two alefs, no tav
    hebrew-matcher -p '?????' -s nouns,verbs --require 'א:2' --forbid ת

    # Substring search in a downloaded list, save to matches.txt
    hebrew-matcher -p 'אהב' --substring --url https://example.org/words.txt -o matches.txt
"#
)]
pub struct Args {
    /// Template to search for
    #[arg(short, long, value_name = "TEMPLATE")]
    pub pattern: String,

    /// Built-in sources: adjectives, nouns, verbs (comma separated)
    #[arg(short, long, value_name = "SOURCES", default_value = "adjectives")]
    pub source: String,

    /// Directory holding the bundled word lists
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Fetch built-in lists from the upstream repository
    #[arg(long, default_value_t = false)]
    pub remote: bool,

    /// Download a word list and search it (repeatable)
    #[arg(long, value_name = "URL")]
    pub url: Vec<String>,

    /// Pasted word list, one word per line
    #[arg(long, value_name = "TEXT", conflicts_with = "paste_file")]
    pub paste: Option<String>,

    /// Read the pasted word list from a file ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub paste_file: Option<PathBuf>,

    /// Local word list file (repeatable)
    #[arg(short, long, value_name = "PATH")]
    pub wordlist: Vec<PathBuf>,

    /// Search every word list in a directory
    #[arg(long, value_name = "DIR")]
    pub wordlist_dir: Option<PathBuf>,

    /// Walk --wordlist-dir recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// File extensions picked up from --wordlist-dir
    #[arg(long, value_name = "EXT", default_value = "txt")]
    pub extensions: String,

    /// Required letters with optional minimum count, e.g. "א:2,ב"
    #[arg(long, value_name = "LETTERS", default_value = "")]
    pub require: String,

    /// Forbidden letters, e.g. "ת,ש"
    #[arg(long, value_name = "LETTERS", default_value = "")]
    pub forbid: String,

    /// Keep niqqud in loaded words
    #[arg(long, default_value_t = false)]
    pub keep_niqqud: bool,

    /// Keep duplicate words
    #[arg(long, default_value_t = false)]
    pub no_dedup: bool,

    /// Keep results in source order
    #[arg(long, default_value_t = false)]
    pub no_sort: bool,

    /// Match the template anywhere in a word
    #[arg(long, default_value_t = false)]
    pub substring: bool,

    /// Fetch built-in sources one at a time
    #[arg(long, default_value_t = false)]
    pub sequential_fetch: bool,

    /// Number of fetch threads (default: auto-detect)
    #[arg(short = 't', long, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Write results to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Result line format
    #[arg(long, value_enum, default_value_t = OutputFormat::Sources)]
    pub format: OutputFormat,

    /// Quiet mode - results only
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Parse the built-in source list
    pub fn parse_sources(&self) -> anyhow::Result<Vec<BuiltinSource>> {
        let mut sources = Vec::new();

        for part in self.source.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let source: BuiltinSource = part.parse()?;
            if !sources.contains(&source) {
                sources.push(source);
            }
        }

        Ok(sources)
    }

    /// Parse file extensions to pick up
    pub fn get_extensions(&self) -> Vec<String> {
        self.extensions
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Validated configuration built from [`Args`]
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub pattern: String,
    pub sources: Vec<BuiltinSource>,
    pub data_dir: PathBuf,
    pub urls: Vec<String>,
    pub paste: Option<String>,
    pub wordlists: Vec<PathBuf>,
    pub constraints: Option<LetterConstraints>,
    pub loader: LoaderOptions,
    pub search: SearchOptions,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
}

impl SearchConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let constraints = LetterConstraints::parse(&args.require, &args.forbid)?;

        let paste = match (&args.paste, &args.paste_file) {
            (Some(text), _) => Some(text.clone()),
            (None, Some(path)) if path.as_os_str() == "-" => {
                Some(std::io::read_to_string(std::io::stdin())?)
            }
            (None, Some(path)) => Some(std::fs::read_to_string(path)?),
            (None, None) => None,
        };

        let mut wordlists = args.wordlist.clone();
        if let Some(ref dir) = args.wordlist_dir {
            wordlists.extend(crate::loader::collect_wordlist_files(
                dir,
                args.recursive,
                &args.get_extensions(),
            )?);
        }

        Ok(Self {
            pattern: args.pattern.clone(),
            sources: args.parse_sources()?,
            data_dir: args.data_dir.clone(),
            urls: args.url.clone(),
            paste,
            wordlists,
            constraints: (!constraints.is_empty()).then_some(constraints),
            loader: LoaderOptions {
                strip_niqqud: !args.keep_niqqud,
                remote_builtins: args.remote,
            },
            search: SearchOptions {
                unique: !args.no_dedup,
                sort: !args.no_sort,
                whole_word: !args.substring,
                parallel_fetch: !args.sequential_fetch,
            },
            output: args.output.clone(),
            format: args.format,
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }
}
