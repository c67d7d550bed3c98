use crate::error::{ListgenError, Result};
use crate::types::Word;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Session languages with a bundled word pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "EN")]
    English,
    #[serde(rename = "SP")]
    Spanish,
}

impl Language {
    /// Two-letter code used in experiment configs
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Spanish => "SP",
        }
    }

    /// Parse a language code, case-insensitively.
    /// Anything other than EN or SP is rejected before a pool is touched.
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim().to_uppercase().as_str() {
            "EN" => Ok(Language::English),
            "SP" => Ok(Language::Spanish),
            _ => Err(ListgenError::LanguageNotSupported(code.to_string())),
        }
    }

    fn wordpool_text(&self) -> &'static str {
        match self {
            Language::English => include_str!("../data/ram_wordpool_en.txt"),
            Language::Spanish => include_str!("../data/ram_wordpool_sp.txt"),
        }
    }

    fn practice_text(&self) -> &'static str {
        match self {
            Language::English => include_str!("../data/practice_en.txt"),
            Language::Spanish => include_str!("../data/practice_sp.txt"),
        }
    }
}

impl FromStr for Language {
    type Err = ListgenError;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Ordered, duplicate-free word sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: Vec<Word>,
}

impl Vocabulary {
    /// Build a vocabulary, rejecting repeated words
    pub fn new(words: Vec<Word>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(words.len());
        for word in &words {
            if !seen.insert(word.as_str()) {
                return Err(ListgenError::DuplicateWord(word.clone()));
            }
        }
        Ok(Self { words })
    }

    /// Parse one word per line. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let words = text
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.to_string())
            .collect();
        Self::new(words)
    }

    /// Bundled task word pool for a language
    pub fn wordpool(language: Language) -> Result<Self> {
        Self::parse(language.wordpool_text())
    }

    /// Bundled practice words for a language (disjoint from the task pool)
    pub fn practice(language: Language) -> Result<Self> {
        Self::parse(language.practice_text())
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// Words present in both vocabularies
    pub fn overlap(&self, other: &Vocabulary) -> Vec<&str> {
        let other_words: HashSet<&str> = other.words.iter().map(|w| w.as_str()).collect();
        self.words
            .iter()
            .map(|w| w.as_str())
            .filter(|w| other_words.contains(w))
            .collect()
    }
}
