//! Template compilation
//!
//! Turns a user template into a regex. `?` stands for one letter of the
//! Hebrew block, `[...]` is passed through as a character class and every
//! other character is matched literally.

use crate::error::{Result, SearchError};
use crate::normalize::fold_finals;
use regex::Regex;

/// Regex class for a single character of the Hebrew block
pub const HEBREW_LETTER_CLASS: &str = r"[\x{0590}-\x{05FF}]";

/// A compiled template
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    template: String,
    whole_word: bool,
    regex: Regex,
}

impl TemplateMatcher {
    /// Compile a template as typed by the user
    pub fn new(template: &str, whole_word: bool) -> Result<Self> {
        let source = template_to_regex(template, whole_word)?;
        let regex = Regex::new(&source).map_err(|e| SearchError::InvalidPattern {
            pattern: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            template: template.to_string(),
            whole_word,
            regex,
        })
    }

    /// Compile a template with its final letters folded, for use against
    /// folded candidate words
    pub fn folded(template: &str, whole_word: bool) -> Result<Self> {
        let mut matcher = Self::new(&fold_finals(template), whole_word)?;
        matcher.template = template.to_string();
        Ok(matcher)
    }

    #[inline]
    pub fn is_match(&self, word: &str) -> bool {
        self.regex.is_match(word)
    }

    /// The template this matcher was built from
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn whole_word(&self) -> bool {
        self.whole_word
    }

    /// The generated regex source
    pub fn regex_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Translate a template into regex source.
///
/// A single flag tracks whether the scan is inside a class; classes do not
/// nest, so a `[` inside a class is escaped.
pub fn template_to_regex(template: &str, whole_word: bool) -> Result<String> {
    let mut out = String::with_capacity(template.len() * 2);
    let mut in_class = false;

    if whole_word {
        out.push('^');
    }

    for ch in template.chars() {
        match ch {
            '[' if !in_class => {
                in_class = true;
                out.push('[');
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            '[' => out.push_str(r"\["),
            _ if in_class => out.push(ch),
            '?' => out.push_str(HEBREW_LETTER_CLASS),
            _ => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
            }
        }
    }

    if in_class {
        return Err(SearchError::UnclosedClass {
            pattern: template.to_string(),
        });
    }

    if whole_word {
        out.push('$');
    }

    Ok(out)
}

/// Helper to validate a template before use
pub fn validate_template(template: &str) -> Result<()> {
    TemplateMatcher::new(template, true).map(|_| ())
}
