//! Text normalization
//!
//! Niqqud stripping and final-letter folding. Both are pure and total.
//! Folding is a matching-time transform only: stored words and dedup keys
//! keep their final forms.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Number of words handled per stripping pass
pub const STRIP_BATCH_SIZE: usize = 10_000;

/// Final letter forms and their non-final counterparts
pub const FINAL_FORMS: [(char, char); 5] = [
    ('ך', 'כ'),
    ('ן', 'נ'),
    ('ם', 'מ'),
    ('ף', 'פ'),
    ('ץ', 'צ'),
];

/// First and last codepoint of the Hebrew block
pub const HEBREW_BLOCK: (char, char) = ('\u{0590}', '\u{05FF}');

#[inline]
pub fn is_hebrew(ch: char) -> bool {
    (HEBREW_BLOCK.0..=HEBREW_BLOCK.1).contains(&ch)
}

/// Map a final letter form to its base form, leaving everything else alone
#[inline]
pub fn fold_final_char(ch: char) -> char {
    FINAL_FORMS
        .iter()
        .find(|(final_form, _)| *final_form == ch)
        .map(|(_, base)| *base)
        .unwrap_or(ch)
}

/// Fold the five final letter forms to their non-final counterparts
pub fn fold_finals(s: &str) -> String {
    s.chars().map(fold_final_char).collect()
}

/// Remove niqqud and other combining marks.
///
/// The word is compatibility-decomposed (NFKD) and every mark codepoint is
/// dropped. No recomposition happens afterwards.
pub fn strip_niqqud(s: &str) -> String {
    s.nfkd().filter(|ch| !is_combining_mark(*ch)).collect()
}

/// Strip niqqud from a whole collection, one batch at a time
pub fn strip_niqqud_all(words: Vec<String>) -> Vec<String> {
    let mut stripped = Vec::with_capacity(words.len());
    for batch in words.chunks(STRIP_BATCH_SIZE) {
        stripped.extend(batch.iter().map(|w| strip_niqqud(w)));
    }
    stripped
}

/// Hebrew punctuation and the ASCII character it collates as
const PUNCTUATION_KEYS: [(char, char); 5] = [
    ('\u{05BE}', '-'),  // maqaf
    ('\u{05C0}', '|'),  // paseq
    ('\u{05C3}', ':'),  // sof pasuq
    ('\u{05F3}', '\''), // geresh
    ('\u{05F4}', '"'),  // gershayim
];

fn primary_key(s: &str) -> String {
    strip_niqqud(s)
        .chars()
        .map(|ch| {
            PUNCTUATION_KEYS
                .iter()
                .find(|(p, _)| *p == ch)
                .map_or(ch, |(_, key)| *key)
        })
        .collect()
}

/// Ordering used when sorting results.
///
/// Words compare on their mark-free form first so that pointed and unpointed
/// spellings sit together; ties fall back to the raw codepoint order. Hebrew
/// punctuation collates as its ASCII counterpart, below every letter.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = primary_key(a).cmp(&primary_key(b));
    primary.then_with(|| a.cmp(b))
}

/// Sort key equivalent to [`collate`], for `sort_by_cached_key`
pub fn collation_key(s: &str) -> (String, String) {
    (primary_key(s), s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_niqqud() {
        // shalom with holam and qamats
        assert_eq!(strip_niqqud("שָׁלוֹם"), "שלום");
        assert_eq!(strip_niqqud("שלום"), "שלום");
    }

    #[test]
    fn test_strip_niqqud_idempotent() {
        let words = ["בְּרֵאשִׁית", "אָהַב", "ﬠ", "abc"];
        for w in words {
            let once = strip_niqqud(w);
            assert_eq!(strip_niqqud(&once), once);
        }
    }

    #[test]
    fn test_strip_presentation_forms() {
        // shin with shin dot, precomposed presentation form
        assert_eq!(strip_niqqud("\u{FB2A}"), "ש");
    }

    #[test]
    fn test_fold_finals() {
        assert_eq!(fold_finals("שלום"), "שלומ");
        assert_eq!(fold_finals("ךןםףץ"), "כנמפצ");
        assert_eq!(fold_finals("אבג"), "אבג");
    }

    #[test]
    fn test_fold_finals_noop_on_folded() {
        let folded = fold_finals("מלך ארץ");
        assert_eq!(fold_finals(&folded), folded);
    }

    #[test]
    fn test_strip_all_preserves_order() {
        let words: Vec<String> = (0..25_000)
            .map(|i| if i % 2 == 0 { "שָׁלוֹם".to_string() } else { "אָב".to_string() })
            .collect();
        let stripped = strip_niqqud_all(words);
        assert_eq!(stripped.len(), 25_000);
        assert_eq!(stripped[0], "שלום");
        assert_eq!(stripped[24_999], "אב");
    }

    #[test]
    fn test_collate_groups_pointed_spellings() {
        let mut words = vec!["בית", "אָב", "אב", "גן"];
        words.sort_by(|a, b| collate(a, b));
        // qamats (U+05B8) sorts below bet (U+05D1) on the tie-break
        assert_eq!(words, vec!["אָב", "אב", "בית", "גן"]);
    }

    #[test]
    fn test_collate_punctuation_before_letters() {
        let mut words = vec!["צב", "צ\u{05F3}יפס", "צה\u{05BE}ל", "צה"];
        words.sort_by_cached_key(|w| collation_key(w));
        assert_eq!(words, vec!["צ\u{05F3}יפס", "צב", "צה", "צה\u{05BE}ל"]);
        assert_eq!(collate("צ\u{05F4}ב", "צב"), Ordering::Less);
    }

    #[test]
    fn test_is_hebrew() {
        assert!(is_hebrew('א'));
        assert!(is_hebrew('\u{05B8}'));
        assert!(!is_hebrew('a'));
    }
}
