use crate::catfr::{CategorizedVocabulary, CategorizedWord};
use crate::types::Word;
use crate::vocabulary::Vocabulary;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Fixed seed for reproducible tests
pub const TEST_SEED: u64 = 42;

/// StdRng seeded with [`TEST_SEED`]
pub fn seeded_rng() -> StdRng {
    rng_with_seed(TEST_SEED)
}

pub fn rng_with_seed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `count` distinct words: `{prefix}0`, `{prefix}1`, ...
pub fn synthetic_words(prefix: &str, count: usize) -> Vec<Word> {
    (0..count).map(|i| format!("{}{}", prefix, i)).collect()
}

/// Vocabulary of [`synthetic_words`]
pub fn synthetic_vocabulary(prefix: &str, count: usize) -> Vocabulary {
    // synthetic words are distinct by construction
    Vocabulary::new(synthetic_words(prefix, count)).unwrap_or_else(|e| {
        panic!("synthetic vocabulary {}x{}: {}", prefix, count, e)
    })
}

/// `n_categories` categories `{prefix}CAT{c}` of `per_category` words `{prefix}{c}_{i}`
pub fn synthetic_categorized(prefix: &str, n_categories: usize, per_category: usize) -> CategorizedVocabulary {
    let entries = (0..n_categories)
        .flat_map(|c| {
            (0..per_category).map(move |i| {
                CategorizedWord::new(format!("{}{}_{}", prefix, c, i), format!("{}CAT{}", prefix, c))
            })
        })
        .collect();
    CategorizedVocabulary::new(entries).unwrap_or_else(|e| {
        panic!("synthetic categories {}x{}: {}", n_categories, per_category, e)
    })
}
