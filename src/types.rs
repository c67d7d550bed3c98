use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A single vocabulary token.
pub type Word = String;

/// Which member of a pair is shown as the retrieval cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CuePosition {
    #[serde(rename = "word1")]
    Word1,
    #[serde(rename = "word2")]
    Word2,
}

impl CuePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CuePosition::Word1 => "word1",
            CuePosition::Word2 => "word2",
        }
    }
}

impl fmt::Display for CuePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Experimental condition attached to a whole list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ListType {
    #[serde(rename = "PRACTICE")]
    Practice,
    #[serde(rename = "BASELINE")]
    Baseline,
    #[serde(rename = "PS")]
    Ps,
    #[serde(rename = "STIM")]
    Stim,
    #[serde(rename = "NON-STIM")]
    NonStim,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Practice => "PRACTICE",
            ListType::Baseline => "BASELINE",
            ListType::Ps => "PS",
            ListType::Stim => "STIM",
            ListType::NonStim => "NON-STIM",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two words studied together.
///
/// Pairs are compared by their unordered word set: `(A, B)` and `(B, A)`
/// count as the same pair when checking for repeats across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub word1: Word,
    pub word2: Word,
}

impl Pair {
    pub fn new(word1: impl Into<Word>, word2: impl Into<Word>) -> Self {
        Self {
            word1: word1.into(),
            word2: word2.into(),
        }
    }

    pub fn reversed(&self) -> Pair {
        Pair {
            word1: self.word2.clone(),
            word2: self.word1.clone(),
        }
    }

    /// Orientation-independent key, smaller word first
    pub fn key(&self) -> (&str, &str) {
        if self.word1 <= self.word2 {
            (&self.word1, &self.word2)
        } else {
            (&self.word2, &self.word1)
        }
    }

    /// True if both pairs hold the same two words in either orientation
    pub fn same_words(&self, other: &Pair) -> bool {
        (self.word1 == other.word1 && self.word2 == other.word2)
            || (self.word1 == other.word2 && self.word2 == other.word1)
    }
}

/// Row-level access shared by every pool table
pub trait PoolRow: Clone {
    fn listno(&self) -> usize;

    fn list_type(&self) -> Option<ListType>;

    /// Copy of this row carrying a new list type
    fn with_list_type(&self, list_type: ListType) -> Self;

    fn is_practice(&self) -> bool {
        self.list_type() == Some(ListType::Practice)
    }
}

/// One paired-associate row of a session pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRow {
    pub word1: Word,
    pub word2: Word,
    /// Unset for task lists until a list-type assigner runs
    #[serde(rename = "type")]
    pub list_type: Option<ListType>,
    pub listno: usize,
    pub cue_pos: CuePosition,
}

impl PairRow {
    pub fn pair(&self) -> Pair {
        Pair::new(self.word1.clone(), self.word2.clone())
    }

    pub fn cue(&self) -> &str {
        match self.cue_pos {
            CuePosition::Word1 => &self.word1,
            CuePosition::Word2 => &self.word2,
        }
    }

    pub fn target(&self) -> &str {
        match self.cue_pos {
            CuePosition::Word1 => &self.word2,
            CuePosition::Word2 => &self.word1,
        }
    }
}

impl PoolRow for PairRow {
    fn listno(&self) -> usize {
        self.listno
    }

    fn list_type(&self) -> Option<ListType> {
        self.list_type
    }

    fn with_list_type(&self, list_type: ListType) -> Self {
        Self {
            list_type: Some(list_type),
            ..self.clone()
        }
    }
}

/// One free-recall row of a session pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRow {
    pub word: Word,
    #[serde(rename = "type")]
    pub list_type: Option<ListType>,
    pub listno: usize,
}

impl PoolRow for WordRow {
    fn listno(&self) -> usize {
        self.listno
    }

    fn list_type(&self) -> Option<ListType> {
        self.list_type
    }

    fn with_list_type(&self, list_type: ListType) -> Self {
        Self {
            list_type: Some(list_type),
            ..self.clone()
        }
    }
}

/// One categorized free-recall row of a session pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatWordRow {
    pub word: Word,
    pub category: String,
    #[serde(rename = "type")]
    pub list_type: Option<ListType>,
    pub listno: usize,
}

impl PoolRow for CatWordRow {
    fn listno(&self) -> usize {
        self.listno
    }

    fn list_type(&self) -> Option<ListType> {
        self.list_type
    }

    fn with_list_type(&self, list_type: ListType) -> Self {
        Self {
            list_type: Some(list_type),
            ..self.clone()
        }
    }
}

/// Ordered table of rows for one session.
///
/// Pools are never patched in place: every assignment step builds a new
/// `Pool` from the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pool<R> {
    rows: Vec<R>,
}

/// Paired-associate session pool
pub type SessionPool = Pool<PairRow>;

/// Free-recall session pool
pub type FrSessionPool = Pool<WordRow>;

/// Categorized free-recall session pool
pub type CatFrSessionPool = Pool<CatWordRow>;

impl<R> Pool<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl<R: PoolRow> Pool<R> {
    /// Sorted distinct list numbers, practice included
    pub fn list_numbers(&self) -> Vec<usize> {
        self.rows
            .iter()
            .map(|row| row.listno())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct list numbers of the non-practice rows
    pub fn task_list_numbers(&self) -> Vec<usize> {
        self.task_rows()
            .map(|row| row.listno())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Group-by index: list number to its rows, in table order
    pub fn group_by_list(&self) -> BTreeMap<usize, Vec<&R>> {
        let mut groups: BTreeMap<usize, Vec<&R>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(row.listno()).or_default().push(row);
        }
        groups
    }

    pub fn list(&self, listno: usize) -> Vec<&R> {
        self.rows.iter().filter(|row| row.listno() == listno).collect()
    }

    pub fn practice_rows(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().filter(|row| row.is_practice())
    }

    pub fn task_rows(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().filter(|row| !row.is_practice())
    }

    /// Number of rows labeled with `list_type`
    pub fn count_type(&self, list_type: ListType) -> usize {
        self.rows
            .iter()
            .filter(|row| row.list_type() == Some(list_type))
            .count()
    }

    /// Relabel whole lists; rows whose list is absent from `plan` are kept as-is
    pub fn with_list_types(&self, plan: &BTreeMap<usize, ListType>) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| match plan.get(&row.listno()) {
                Some(list_type) => row.with_list_type(*list_type),
                None => row.clone(),
            })
            .collect();
        Self { rows }
    }
}

impl Pool<PairRow> {
    /// Pairs outside the practice list, in table order
    pub fn task_pairs(&self) -> Vec<Pair> {
        self.task_rows().map(PairRow::pair).collect()
    }

    pub fn practice_pairs(&self) -> Vec<Pair> {
        self.practice_rows().map(PairRow::pair).collect()
    }
}

impl Pool<WordRow> {
    pub fn words(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.word.as_str()).collect()
    }
}

impl Pool<CatWordRow> {
    pub fn words(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.word.as_str()).collect()
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|row| row.category.as_str()).collect()
    }
}

impl<'a, R> IntoIterator for &'a Pool<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
