// End-to-end search runs over in-memory word lists

use hebrew_pattern_matcher::constraints::LetterConstraints;
use hebrew_pattern_matcher::loader::{
    BuiltinSource, LoaderOptions, TextFetcher, WordCollection, WordlistLoader,
};
use hebrew_pattern_matcher::output::{render_matches, OutputFormat};
use hebrew_pattern_matcher::session::{NoopObserver, SearchRequest, Searcher, SourceStatus};
use hebrew_pattern_matcher::{Match, SearchError};

use std::collections::HashMap;

struct MemoryFetcher {
    files: HashMap<String, String>,
}

impl MemoryFetcher {
    fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl TextFetcher for MemoryFetcher {
    fn fetch(&self, locator: &str) -> hebrew_pattern_matcher::Result<Vec<u8>> {
        self.files
            .get(locator)
            .map(|t| t.as_bytes().to_vec())
            .ok_or_else(|| SearchError::SourceLoad {
                locator: locator.to_string(),
                status: "404 Not Found".to_string(),
            })
    }
}

const ADJECTIVES: &str = "גדול\nקטן\nשָׁלֵם\nיפה\n";
const NOUNS: &str = "שלום\nאהבה\nבית\nשלם\nאבא\n";

fn searcher(files: &[(&str, &str)]) -> Searcher<MemoryFetcher> {
    Searcher::new(WordlistLoader::new(
        MemoryFetcher::new(files),
        LoaderOptions::default(),
    ))
}

fn words(run: &hebrew_pattern_matcher::SearchRun) -> Vec<&str> {
    run.matches.iter().map(|m| m.word.as_str()).collect()
}

#[test]
fn end_to_end_whole_word() {
    let s = searcher(&[]);
    let mut request = SearchRequest::new("אהב?");
    request.custom = vec![WordCollection::new(
        "fixture",
        vec!["אהבה".into(), "אהבים".into(), "שלום".into()],
    )];

    let run = s.run(&request, &NoopObserver).unwrap();

    assert_eq!(words(&run), vec!["אהבה"]);
    assert_eq!(run.total_words, 3);
    assert_eq!(run.match_count, 1);
}

#[test]
fn substring_mode_finds_infixes() {
    let s = searcher(&[]);
    let mut request = SearchRequest::new("הב");
    request.options.whole_word = false;
    request.custom = vec![WordCollection::new(
        "fixture",
        vec!["אהבה".into(), "אהבים".into(), "שלום".into()],
    )];

    let run = s.run(&request, &NoopObserver).unwrap();

    assert_eq!(words(&run), vec!["אהבה", "אהבים"]);
}

#[test]
fn partial_failure_keeps_other_sources() {
    let s = searcher(&[("adjectives.txt", ADJECTIVES), ("nouns.txt", NOUNS)]);
    let mut request = SearchRequest::new("???");
    request.sources = vec![
        BuiltinSource::Adjectives,
        BuiltinSource::Verbs,
        BuiltinSource::Nouns,
    ];

    let run = s.run(&request, &NoopObserver).unwrap();

    assert_eq!(run.status("adjectives"), Some(&SourceStatus::Success { count: 4 }));
    assert_eq!(run.status("nouns"), Some(&SourceStatus::Success { count: 5 }));
    assert!(matches!(run.status("verbs"), Some(SourceStatus::Error { .. })));
    assert_eq!(run.failed_sources().count(), 1);

    assert_eq!(run.total_words, 9);
    assert_eq!(words(&run), vec!["אבא", "בית", "יפה", "קטן", "שלם"]);
}

#[test]
fn sequential_and_parallel_fetch_agree() {
    let files = [("adjectives.txt", ADJECTIVES), ("nouns.txt", NOUNS)];
    let mut request = SearchRequest::new("???");
    request.sources = vec![BuiltinSource::Adjectives, BuiltinSource::Nouns];

    let parallel = searcher(&files).run(&request, &NoopObserver).unwrap();
    request.options.parallel_fetch = false;
    let sequential = searcher(&files).run(&request, &NoopObserver).unwrap();

    assert_eq!(parallel.matches, sequential.matches);
    assert_eq!(parallel.source_status, sequential.source_status);
}

#[test]
fn dedup_merges_provenance() {
    let s = searcher(&[("adjectives.txt", ADJECTIVES), ("nouns.txt", NOUNS)]);
    let mut request = SearchRequest::new("של?");
    request.sources = vec![BuiltinSource::Adjectives, BuiltinSource::Nouns];

    let run = s.run(&request, &NoopObserver).unwrap();

    // שָׁלֵם is stripped to שלם and meets the noun entry
    assert_eq!(
        run.matches,
        vec![Match {
            word: "שלם".to_string(),
            sources: vec!["תארים".to_string(), "שמות עצם".to_string()],
        }]
    );
    assert_eq!(
        render_matches(&run.matches, OutputFormat::Sources),
        "שלם (תארים, שמות עצם)"
    );
    assert_eq!(run.dedup.total_processed, 2);
    assert_eq!(run.dedup.duplicate_count, 1);
}

#[test]
fn no_dedup_keeps_raw_matches() {
    let s = searcher(&[("adjectives.txt", ADJECTIVES), ("nouns.txt", NOUNS)]);
    let mut request = SearchRequest::new("של?");
    request.sources = vec![BuiltinSource::Adjectives, BuiltinSource::Nouns];
    request.options.unique = false;

    let run = s.run(&request, &NoopObserver).unwrap();

    assert_eq!(run.match_count, 2);
    assert_eq!(run.matches[0], Match::new("שלם", "תארים"));
    assert_eq!(run.matches[1], Match::new("שלם", "שמות עצם"));
}

#[test]
fn kept_niqqud_changes_dedup_key() {
    let loader = WordlistLoader::new(
        MemoryFetcher::new(&[("adjectives.txt", ADJECTIVES), ("nouns.txt", NOUNS)]),
        LoaderOptions {
            strip_niqqud: false,
            ..LoaderOptions::default()
        },
    );
    let s = Searcher::new(loader);
    let mut request = SearchRequest::new("של?");
    request.sources = vec![BuiltinSource::Adjectives, BuiltinSource::Nouns];

    let run = s.run(&request, &NoopObserver).unwrap();

    // the pointed adjective no longer fits three letters
    assert_eq!(run.matches, vec![Match::new("שלם", "שמות עצם")]);
}

#[test]
fn final_letters_match_base_forms() {
    let s = searcher(&[("nouns.txt", NOUNS)]);
    let mut request = SearchRequest::new("שלומ");
    request.sources = vec![BuiltinSource::Nouns];

    let run = s.run(&request, &NoopObserver).unwrap();

    assert_eq!(words(&run), vec!["שלום"]);
}

#[test]
fn letter_constraints_filter_matches() {
    let s = searcher(&[]);
    let mut request = SearchRequest::new("?????");
    request.constraints = Some(LetterConstraints::parse("א:2", "ת").unwrap());
    request.custom = vec![WordCollection::new(
        "fixture",
        vec!["אבגדה".into(), "אבאדה".into(), "אתאבג".into()],
    )];

    let run = s.run(&request, &NoopObserver).unwrap();

    assert_eq!(words(&run), vec!["אבאדה"]);
}

#[test]
fn large_collection_is_chunked() {
    let s = searcher(&[]);
    let mut request = SearchRequest::new("ר?וא?");
    request.options.unique = false;
    request.options.sort = false;
    let list: Vec<String> = (0..23_456)
        .map(|i| if i % 3 == 0 { "ראואב".to_string() } else { "בית".to_string() })
        .collect();
    request.custom = vec![WordCollection::new("big", list)];

    let run = s.run(&request, &NoopObserver).unwrap();

    assert_eq!(run.total_words, 23_456);
    assert_eq!(run.match_count, 7_819);
}

#[test]
fn invalid_template_aborts() {
    let s = searcher(&[]);
    let mut request = SearchRequest::new("א[ב");
    request.paste = Some("אב".to_string());

    assert!(matches!(
        s.run(&request, &NoopObserver),
        Err(SearchError::UnclosedClass { .. })
    ));
    assert!(!s.is_busy());
}
