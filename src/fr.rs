//! Free-recall (FR) session pools: a shuffled practice list followed by
//! `num_lists` lists of single words.

use crate::error::{ListgenError, Result};
use crate::types::{FrSessionPool, ListType, Word, WordRow};
use crate::vocabulary::{Language, Vocabulary};
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_WORDS_PER_LIST: usize = 12;

#[derive(Debug, Clone)]
pub struct FrGenerator {
    words_per_list: usize,
    num_lists: usize,
    vocabulary: Vocabulary,
    practice: Vocabulary,
}

impl FrGenerator {
    pub fn new(words_per_list: usize, num_lists: usize, language: Language) -> Result<Self> {
        Self::with_vocabulary(
            words_per_list,
            num_lists,
            Vocabulary::wordpool(language)?,
            Vocabulary::practice(language)?,
        )
    }

    pub fn with_vocabulary(
        words_per_list: usize,
        num_lists: usize,
        vocabulary: Vocabulary,
        practice: Vocabulary,
    ) -> Result<Self> {
        if words_per_list == 0 || num_lists == 0 {
            return Err(ListgenError::config_mismatch(format!(
                "need at least one list and one word per list (got {} x {})",
                num_lists, words_per_list
            )));
        }
        if words_per_list.checked_mul(num_lists) != Some(vocabulary.len()) {
            return Err(ListgenError::config_mismatch(format!(
                "{} lists x {} words != {} words",
                num_lists,
                words_per_list,
                vocabulary.len()
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
            words_per_list,
            num_lists,
            vocabulary,
            practice,
        })
    }

    /// Shuffle both vocabularies and number the task words into lists
    pub fn generate_session_pool(&self, rng: &mut impl Rng) -> Result<FrSessionPool> {
        let mut practice: Vec<Word> = self.practice.words().to_vec();
        practice.shuffle(rng);
        let mut words: Vec<Word> = self.vocabulary.words().to_vec();
        words.shuffle(rng);

        let practice_rows = practice.into_iter().map(|word| WordRow {
            word,
            list_type: Some(ListType::Practice),
            listno: 0,
        });
        let task_rows = words.into_iter().enumerate().map(|(i, word)| WordRow {
            word,
            list_type: None,
            listno: i / self.words_per_list + 1,
        });

        let pool = FrSessionPool::new(practice_rows.chain(task_rows).collect());
        info!(
            "Generated FR session of {} lists x {} words",
            self.num_lists, self.words_per_list
        );
        Ok(pool)
    }
}

/// Generate one FR session pool for a language code using the thread RNG
pub fn generate_session_pool(
    words_per_list: usize,
    num_lists: usize,
    language: &str,
) -> Result<FrSessionPool> {
    generate_session_pool_with_rng(&mut rand::thread_rng(), words_per_list, num_lists, language)
}

/// Generate one FR session pool for a language code (with injected RNG)
pub fn generate_session_pool_with_rng(
    rng: &mut impl Rng,
    words_per_list: usize,
    num_lists: usize,
    language: &str,
) -> Result<FrSessionPool> {
    let language = Language::from_code(language)?;
    FrGenerator::new(words_per_list, num_lists, language)?.generate_session_pool(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seeded_rng;
    use std::collections::HashSet;

    #[test]
    fn test_generate_session_pool() {
        let mut rng = seeded_rng();
        for language in ["EN", "SP"] {
            let session = generate_session_pool_with_rng(&mut rng, 12, 25, language).unwrap();
            assert_eq!(session.len(), 26 * 12);

            for (_, rows) in session.group_by_list() {
                assert_eq!(rows.len(), 12);
            }
            let unique: HashSet<&str> = session.words().into_iter().collect();
            assert_eq!(unique.len(), 26 * 12);
            assert_eq!(session.count_type(ListType::Practice), 12);
        }
    }

    #[test]
    fn test_bad_configuration() {
        let mut rng = seeded_rng();
        assert!(matches!(
            generate_session_pool_with_rng(&mut rng, 13, 25, "EN"),
            Err(ListgenError::ConfigMismatch { .. })
        ));
        assert!(matches!(
            generate_session_pool_with_rng(&mut rng, 12, 24, "EN"),
            Err(ListgenError::ConfigMismatch { .. })
        ));
        assert!(matches!(
            generate_session_pool_with_rng(&mut rng, 12, 25, "DA"),
            Err(ListgenError::LanguageNotSupported(_))
        ));
    }

    #[test]
    fn test_degenerate_shapes() {
        let empty = || Vocabulary::new(Vec::new()).unwrap();
        assert!(matches!(
            FrGenerator::with_vocabulary(0, 25, empty(), Vocabulary::new(Vec::new()).unwrap()),
            Err(ListgenError::ConfigMismatch { .. })
        ));
        // wraps to 300 with unchecked arithmetic
        let num_lists = usize::MAX / 4 + 1 + 75;
        let wordpool = Vocabulary::wordpool(Language::English).unwrap();
        assert!(matches!(
            FrGenerator::with_vocabulary(4, num_lists, wordpool, empty()),
            Err(ListgenError::ConfigMismatch { .. })
        ));
    }

    #[test]
    fn test_sessions_are_shuffled() {
        let mut rng = seeded_rng();
        let session1 = generate_session_pool_with_rng(&mut rng, 12, 25, "EN").unwrap();
        let session2 = generate_session_pool_with_rng(&mut rng, 12, 25, "EN").unwrap();

        // practice lists should be shuffled, too
        for listno in session1.list_numbers() {
            let first: Vec<&str> = session1.list(listno).iter().map(|r| r.word.as_str()).collect();
            let second: Vec<&str> = session2.list(listno).iter().map(|r| r.word.as_str()).collect();
            assert_ne!(first, second);
        }
    }
}
