//! Letter constraints
//!
//! Each of the 22 letters is unconstrained, required (with a minimum count)
//! or forbidden. Final forms fold onto their base letter, so `ם` and `מ` are
//! the same key.

use crate::error::{Result, SearchError};
use crate::normalize::fold_final_char;
use std::collections::BTreeMap;

/// The 22 base letters, final forms excluded
pub const ALPHABET: [char; 22] = [
    'א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט', 'י', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ',
    'ק', 'ר', 'ש', 'ת',
];

/// State of a single letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LetterState {
    #[default]
    Unconstrained,
    /// Must occur at least this many times (>= 1)
    Required(u32),
    Forbidden,
}

impl LetterState {
    /// Next state when the letter is clicked:
    /// unconstrained -> required(1) -> forbidden -> unconstrained
    pub fn cycle(self) -> Self {
        match self {
            LetterState::Unconstrained => LetterState::Required(1),
            LetterState::Required(_) => LetterState::Forbidden,
            LetterState::Forbidden => LetterState::Unconstrained,
        }
    }
}

/// Fold a letter to its base form and check it belongs to the alphabet
pub fn base_letter(ch: char) -> Result<char> {
    let base = fold_final_char(ch);
    if ALPHABET.contains(&base) {
        Ok(base)
    } else {
        Err(SearchError::InvalidLetter(ch.to_string()))
    }
}

/// Per-letter selection, one active state per letter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterBoard {
    states: BTreeMap<char, LetterState>,
}

impl LetterBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, letter: char) -> LetterState {
        base_letter(letter)
            .ok()
            .and_then(|l| self.states.get(&l).copied())
            .unwrap_or_default()
    }

    /// Advance a letter to its next state and return it
    pub fn cycle(&mut self, letter: char) -> Result<LetterState> {
        let letter = base_letter(letter)?;
        let next = self.state(letter).cycle();
        self.set(letter, next)?;
        Ok(next)
    }

    pub fn set(&mut self, letter: char, state: LetterState) -> Result<()> {
        let letter = base_letter(letter)?;
        match state {
            LetterState::Unconstrained => {
                self.states.remove(&letter);
            }
            LetterState::Required(0) => {
                return Err(SearchError::InvalidLetter(format!(
                    "{}: required count must be at least 1",
                    letter
                )));
            }
            _ => {
                self.states.insert(letter, state);
            }
        }
        Ok(())
    }

    pub fn require(&mut self, letter: char, min_count: u32) -> Result<()> {
        self.set(letter, LetterState::Required(min_count))
    }

    pub fn forbid(&mut self, letter: char) -> Result<()> {
        self.set(letter, LetterState::Forbidden)
    }

    /// Change the minimum count of a required letter; no-op otherwise
    pub fn set_count(&mut self, letter: char, min_count: u32) -> Result<()> {
        if let LetterState::Required(_) = self.state(letter) {
            self.require(letter, min_count)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Constraint set for the search engine, `None` when nothing is selected
    pub fn to_constraints(&self) -> Option<LetterConstraints> {
        if self.is_empty() {
            return None;
        }

        let mut constraints = LetterConstraints::default();
        for (&letter, &state) in &self.states {
            match state {
                LetterState::Required(n) => constraints.required.push((letter, n)),
                LetterState::Forbidden => constraints.forbidden.push(letter),
                LetterState::Unconstrained => {}
            }
        }
        Some(constraints)
    }
}

/// Required and forbidden letters, disjoint, base forms only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterConstraints {
    required: Vec<(char, u32)>,
    forbidden: Vec<char>,
}

impl LetterConstraints {
    /// Build from `--require` / `--forbid` style specs.
    ///
    /// Required entries are `letter` or `letter:count`, comma separated.
    /// Forbidden entries are single letters.
    pub fn parse(required: &str, forbidden: &str) -> Result<Self> {
        let mut board = LetterBoard::new();

        for item in required.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (letter, count) = match item.split_once(':') {
                Some((l, c)) => {
                    let count: u32 = c.trim().parse().map_err(|_| {
                        SearchError::InvalidLetter(format!("invalid count in '{}'", item))
                    })?;
                    (l.trim(), count)
                }
                None => (item, 1),
            };
            board.require(single_char(letter)?, count)?;
        }

        for item in forbidden.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let letter = base_letter(single_char(item)?)?;
            if let LetterState::Required(_) = board.state(letter) {
                return Err(SearchError::InvalidLetter(format!(
                    "{} is both required and forbidden",
                    letter
                )));
            }
            board.forbid(letter)?;
        }

        Ok(board.to_constraints().unwrap_or_default())
    }

    pub fn required(&self) -> &[(char, u32)] {
        &self.required
    }

    pub fn forbidden(&self) -> &[char] {
        &self.forbidden
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.forbidden.is_empty()
    }

    /// Check a word whose final letters are already folded
    #[inline]
    pub fn accepts(&self, folded_word: &str) -> bool {
        if self.forbidden.iter().any(|&l| folded_word.contains(l)) {
            return false;
        }

        self.required
            .iter()
            .all(|&(l, min)| folded_word.matches(l).count() >= min as usize)
    }
}

fn single_char(s: &str) -> Result<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(SearchError::InvalidLetter(s.to_string())),
    }
}
