//! Categorized free-recall (catFR) session pools.
//!
//! The task vocabulary holds the same number of words in every category.
//! Each category is cut into runs of [`CATEGORY_RUN`] words and every list
//! takes one run from each of several distinct categories. Within a list,
//! words are presented in same-category pairs and adjacent pairs never share
//! a category.

use crate::error::{ListgenError, Result};
use crate::types::{CatFrSessionPool, CatWordRow, ListType, Word};
use log::{debug, info};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Words of one category placed together in a list
pub const CATEGORY_RUN: usize = 4;

/// Layout draws tried before accepting one where two categories meet twice
const LAYOUT_ATTEMPTS: usize = 100;

/// A word and its category label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategorizedWord {
    pub word: Word,
    pub category: String,
}

impl CategorizedWord {
    pub fn new(word: impl Into<Word>, category: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            category: category.into(),
        }
    }
}

/// Ordered, duplicate-free words with one category label each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedVocabulary {
    entries: Vec<CategorizedWord>,
}

impl CategorizedVocabulary {
    /// Build a vocabulary, rejecting repeated words
    pub fn new(entries: Vec<CategorizedWord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.word.as_str()) {
                return Err(ListgenError::DuplicateWord(entry.word.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CategorizedWord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted distinct category labels
    pub fn categories(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Words present in both vocabularies
    pub fn overlap(&self, other: &CategorizedVocabulary) -> Vec<&str> {
        let other_words: HashSet<&str> = other.entries.iter().map(|e| e.word.as_str()).collect();
        self.entries
            .iter()
            .map(|e| e.word.as_str())
            .filter(|w| other_words.contains(w))
            .collect()
    }
}

/// A task word numbered by category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedWord {
    pub word: Word,
    pub category: String,
    /// Index of the category among the sorted category labels
    pub category_num: usize,
    /// Index of the word within its category, in vocabulary order
    pub wordno: usize,
}

/// Number the categories and the words within each category.
///
/// Fails unless every category has the same number of words.
pub fn assign_word_numbers(vocabulary: &CategorizedVocabulary) -> Result<Vec<NumberedWord>> {
    let mut sizes: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in vocabulary.entries() {
        *sizes.entry(entry.category.as_str()).or_default() += 1;
    }
    let distinct_sizes: BTreeSet<usize> = sizes.values().copied().collect();
    if distinct_sizes.len() > 1 {
        return Err(ListgenError::config_mismatch(format!(
            "categories are not balanced: {:?}",
            sizes
        )));
    }

    let category_nums: BTreeMap<&str, usize> =
        sizes.keys().enumerate().map(|(num, category)| (*category, num)).collect();
    let mut next_wordno: BTreeMap<&str, usize> = BTreeMap::new();
    let mut numbered = Vec::with_capacity(vocabulary.len());
    for entry in vocabulary.entries() {
        let category = entry.category.as_str();
        let wordno = next_wordno.entry(category).or_default();
        numbered.push(NumberedWord {
            word: entry.word.clone(),
            category: entry.category.clone(),
            category_num: category_nums.get(category).copied().unwrap_or_default(),
            wordno: *wordno,
        });
        *wordno += 1;
    }
    Ok(numbered)
}

/// Shape of a catFR session, fixed by the task vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatFrLayout {
    pub n_categories: usize,
    pub category_size: usize,
    /// Categories per list, which is also runs per category
    pub categories_per_list: usize,
}

impl CatFrLayout {
    /// One list per category
    pub fn n_lists(&self) -> usize {
        self.n_categories
    }

    pub fn words_per_list(&self) -> usize {
        self.category_size
    }

    fn from_categories(categories: &[Vec<&NumberedWord>]) -> Result<Self> {
        let n_categories = categories.len();
        let category_size = categories.first().map_or(0, Vec::len);
        if categories.iter().any(|members| members.len() != category_size) {
            return Err(ListgenError::config_mismatch(
                "categories are not balanced; assign word numbers first",
            ));
        }
        if category_size == 0 || category_size % CATEGORY_RUN != 0 {
            return Err(ListgenError::config_mismatch(format!(
                "category size {} is not a positive multiple of {}",
                category_size, CATEGORY_RUN
            )));
        }
        let categories_per_list = category_size / CATEGORY_RUN;
        if categories_per_list < 2 || categories_per_list > n_categories {
            return Err(ListgenError::config_mismatch(format!(
                "{} runs per category cannot fill lists from {} categories",
                categories_per_list, n_categories
            )));
        }
        Ok(Self {
            n_categories,
            category_size,
            categories_per_list,
        })
    }
}

fn group_by_category(words: &[NumberedWord]) -> Vec<Vec<&NumberedWord>> {
    let mut groups: BTreeMap<usize, Vec<&NumberedWord>> = BTreeMap::new();
    for word in words {
        groups.entry(word.category_num).or_default().push(word);
    }
    groups.into_values().collect()
}

/// Assign every word to a list.
///
/// Each category is shuffled and split into runs of [`CATEGORY_RUN`] words.
/// List `i` takes one run from each of `categories_per_list` distinct
/// categories, so there is one list per category and each list has as many
/// words as a category. Rows come out grouped by list.
pub fn assign_list_numbers(rng: &mut impl Rng, words: &[NumberedWord]) -> Result<Vec<CatWordRow>> {
    let mut categories = group_by_category(words);
    let layout = CatFrLayout::from_categories(&categories)?;
    let n = layout.n_categories;

    for members in &mut categories {
        members.shuffle(rng);
    }
    let shifts = draw_shifts(rng, n, layout.categories_per_list);
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    debug!("catFR list shifts {:?} over {} categories", shifts, n);

    let mut rows = Vec::with_capacity(words.len());
    for list in 0..n {
        for (run, shift) in shifts.iter().enumerate() {
            let members = &categories[order[(list + shift) % n]];
            let start = run * CATEGORY_RUN;
            rows.extend(members[start..start + CATEGORY_RUN].iter().map(|word| CatWordRow {
                word: word.word.clone(),
                category: word.category.clone(),
                list_type: None,
                listno: list + 1,
            }));
        }
    }
    Ok(rows)
}

/// `k` distinct offsets into the category order, the first one 0.
///
/// List `i` uses categories `order[i + shift]`. When all pairwise
/// differences of the shifts are distinct mod `n`, two categories share at
/// most one list; such shifts are preferred.
fn draw_shifts(rng: &mut impl Rng, n: usize, k: usize) -> Vec<usize> {
    let mut shifts = Vec::new();
    for _ in 0..LAYOUT_ATTEMPTS {
        shifts = std::iter::once(0)
            .chain(index::sample(&mut *rng, n - 1, k - 1).into_iter().map(|s| s + 1))
            .collect();
        if differences_distinct(&shifts, n) {
            break;
        }
    }
    shifts
}

fn differences_distinct(shifts: &[usize], n: usize) -> bool {
    let mut seen = HashSet::new();
    for (a, &from) in shifts.iter().enumerate() {
        for (b, &to) in shifts.iter().enumerate() {
            if a != b && !seen.insert((n + to - from) % n) {
                return false;
            }
        }
    }
    true
}

/// Reorder every list so words come in same-category pairs and adjacent
/// pairs never share a category.
///
/// Each list needs at least two categories with the same even number of
/// words each. Lists come out in list-number order.
pub fn sort_pairs(rng: &mut impl Rng, rows: &[CatWordRow]) -> Result<Vec<CatWordRow>> {
    let mut lists: BTreeMap<usize, Vec<&CatWordRow>> = BTreeMap::new();
    for row in rows {
        lists.entry(row.listno).or_default().push(row);
    }

    let mut sorted = Vec::with_capacity(rows.len());
    for (listno, list) in lists {
        sorted.extend(sort_list_pairs(rng, listno, &list)?);
    }
    Ok(sorted)
}

fn sort_list_pairs(rng: &mut impl Rng, listno: usize, list: &[&CatWordRow]) -> Result<Vec<CatWordRow>> {
    let mut by_category: BTreeMap<&str, Vec<&CatWordRow>> = BTreeMap::new();
    for &row in list {
        by_category.entry(row.category.as_str()).or_default().push(row);
    }
    let sizes: BTreeSet<usize> = by_category.values().map(Vec::len).collect();
    let per_category = sizes.iter().next().copied().unwrap_or(0);
    if by_category.len() < 2 || sizes.len() != 1 || per_category % 2 != 0 {
        return Err(ListgenError::config_mismatch(format!(
            "list {} cannot be ordered into alternating category pairs",
            listno
        )));
    }

    let mut members: Vec<Vec<&CatWordRow>> = by_category.into_values().collect();
    for category in &mut members {
        category.shuffle(rng);
    }

    // one pair per category per round
    let mut sorted = Vec::with_capacity(list.len());
    let mut previous: Option<usize> = None;
    for round in 0..per_category / 2 {
        let mut order: Vec<usize> = (0..members.len()).collect();
        order.shuffle(rng);
        if previous == order.first().copied() {
            order.rotate_left(1);
        }
        for &category in &order {
            sorted.push(members[category][2 * round].clone());
            sorted.push(members[category][2 * round + 1].clone());
        }
        previous = order.last().copied();
    }
    Ok(sorted)
}

/// Builds catFR session pools from a categorized task vocabulary and a
/// categorized practice list
#[derive(Debug, Clone)]
pub struct CatFrGenerator {
    words: Vec<NumberedWord>,
    layout: CatFrLayout,
    practice: CategorizedVocabulary,
}

impl CatFrGenerator {
    /// Validates category balance and that the practice list is one list
    /// long and shares no words with the task vocabulary.
    pub fn new(vocabulary: &CategorizedVocabulary, practice: CategorizedVocabulary) -> Result<Self> {
        let words = assign_word_numbers(vocabulary)?;
        let layout = CatFrLayout::from_categories(&group_by_category(&words))?;
        if practice.len() != layout.words_per_list() {
            return Err(ListgenError::config_mismatch(format!(
                "practice list has {} words but lists hold {}",
                practice.len(),
                layout.words_per_list()
            )));
        }
        let shared = vocabulary.overlap(&practice);
        if !shared.is_empty() {
            return Err(ListgenError::config_mismatch(format!(
                "practice words also in task vocabulary: {}",
                shared.join(", ")
            )));
        }
        Ok(Self {
            words,
            layout,
            practice,
        })
    }

    pub fn layout(&self) -> CatFrLayout {
        self.layout
    }

    /// Shuffled practice list (listno 0) followed by the pair-sorted task lists
    pub fn generate_session_pool(&self, rng: &mut impl Rng) -> Result<CatFrSessionPool> {
        let mut practice: Vec<&CategorizedWord> = self.practice.entries().iter().collect();
        practice.shuffle(rng);
        let mut rows: Vec<CatWordRow> = practice
            .into_iter()
            .map(|entry| CatWordRow {
                word: entry.word.clone(),
                category: entry.category.clone(),
                list_type: Some(ListType::Practice),
                listno: 0,
            })
            .collect();

        let task_rows = assign_list_numbers(rng, &self.words)?;
        rows.extend(sort_pairs(rng, &task_rows)?);

        info!(
            "Generated catFR session of {} lists x {} words",
            self.layout.n_lists(),
            self.layout.words_per_list()
        );
        Ok(CatFrSessionPool::new(rows))
    }
}
