//! Paired-associate learning (PAL) session pools.
//!
//! A session pool holds a practice list (listno 0, drawn from the practice
//! vocabulary) followed by `n_lists` task lists of `n_pairs` pairs each.
//! Every task word is used exactly once per session, and each list has a
//! balanced set of cue positions.

use crate::error::{ListgenError, Result};
use crate::pairs::{
    check_pair_capacity, draw_offsets, partition_pairs, shuffle_and_pair, RotatingSequence,
};
use crate::types::{CuePosition, ListType, Pair, PairRow, SessionPool};
use crate::vocabulary::{Language, Vocabulary};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_N_LISTS: usize = 25;
pub const DEFAULT_N_PAIRS: usize = 6;

/// Shape of a PAL session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PalConfig {
    pub n_lists: usize,
    pub n_pairs: usize,
    pub language: Language,
}

impl Default for PalConfig {
    fn default() -> Self {
        Self {
            n_lists: DEFAULT_N_LISTS,
            n_pairs: DEFAULT_N_PAIRS,
            language: Language::English,
        }
    }
}

/// Cue labels for one list: alternating by position, then shuffled.
///
/// Exactly half of the labels are `word1` when the list length is even.
pub fn assign_cues<T>(rng: &mut impl Rng, list: &[T]) -> Vec<CuePosition> {
    let mut cues: Vec<CuePosition> = (0..list.len())
        .map(|i| {
            if i % 2 == 1 {
                CuePosition::Word1
            } else {
                CuePosition::Word2
            }
        })
        .collect();
    cues.shuffle(rng);
    cues
}

/// Builds PAL session pools from a task vocabulary and a practice vocabulary
#[derive(Debug, Clone)]
pub struct PalGenerator {
    n_lists: usize,
    n_pairs: usize,
    vocabulary: Vocabulary,
    practice: Vocabulary,
}

impl PalGenerator {
    /// Generator over the bundled word pools for `config.language`
    pub fn new(config: &PalConfig) -> Result<Self> {
        let vocabulary = Vocabulary::wordpool(config.language)?;
        let practice = Vocabulary::practice(config.language)?;
        Self::with_vocabulary(config.n_lists, config.n_pairs, vocabulary, practice)
    }

    /// Generator over caller-supplied vocabularies.
    ///
    /// Validates the size invariant, even list sizes (for cue balance) and
    /// that practice words never appear among the task words.
    pub fn with_vocabulary(
        n_lists: usize,
        n_pairs: usize,
        vocabulary: Vocabulary,
        practice: Vocabulary,
    ) -> Result<Self> {
        if n_lists == 0 || n_pairs == 0 {
            return Err(ListgenError::config_mismatch(format!(
                "need at least one list and one pair per list (got {} x {})",
                n_lists, n_pairs
            )));
        }
        check_pair_capacity(n_lists, n_pairs, vocabulary.len())?;
        if n_pairs % 2 != 0 {
            return Err(ListgenError::config_mismatch(format!(
                "{} pairs per list cannot be cue-balanced",
                n_pairs
            )));
        }
        if practice.is_empty() || practice.len() % 4 != 0 {
            return Err(ListgenError::config_mismatch(format!(
                "practice vocabulary of {} words does not form an even number of pairs",
                practice.len()
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
            n_lists,
            n_pairs,
            vocabulary,
            practice,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Assemble one session pool.
    ///
    /// With `pairs == None` the task vocabulary is shuffled and partitioned
    /// here; otherwise `pairs` must hold exactly `n_lists * n_pairs` pairs.
    /// Task rows are left without a list type.
    pub fn build_session_pool(
        &self,
        rng: &mut impl Rng,
        pairs: Option<Vec<Pair>>,
    ) -> Result<SessionPool> {
        let task_pairs = match pairs {
            Some(pairs) => {
                if pairs.len() != self.n_lists * self.n_pairs {
                    return Err(ListgenError::config_mismatch(format!(
                        "expected {} pairs ({} lists x {}), got {}",
                        self.n_lists * self.n_pairs,
                        self.n_lists,
                        self.n_pairs,
                        pairs.len()
                    )));
                }
                pairs
            }
            None => shuffle_and_pair(rng, self.vocabulary.words(), self.n_lists, self.n_pairs)?,
        };

        let mut practice_words = self.practice.words().to_vec();
        practice_words.shuffle(rng);
        let practice_pairs = partition_pairs(&practice_words)?;

        let mut rows = Vec::with_capacity(practice_pairs.len() + task_pairs.len());
        rows.extend(list_rows(rng, &practice_pairs, 0, Some(ListType::Practice)));
        for (i, list_pairs) in task_pairs.chunks(self.n_pairs).enumerate() {
            rows.extend(list_rows(rng, list_pairs, i + 1, None));
        }
        Ok(SessionPool::new(rows))
    }

    /// Generate `n_sessions` pools from one shuffle of the task vocabulary
    pub fn generate_n_session_pairs(
        &self,
        rng: &mut impl Rng,
        n_sessions: usize,
    ) -> Result<Vec<SessionPool>> {
        self.check_session_count(n_sessions)?;
        let sequence = RotatingSequence::shuffled(rng, self.vocabulary.words());
        self.generate_from_sequence(rng, &sequence, n_sessions)
    }

    /// Generate `n_sessions` pools, each partitioning `sequence` read at its
    /// own rotation offset. `sequence` is only borrowed, so every session
    /// starts from the same base order.
    pub fn generate_from_sequence(
        &self,
        rng: &mut impl Rng,
        sequence: &RotatingSequence,
        n_sessions: usize,
    ) -> Result<Vec<SessionPool>> {
        check_pair_capacity(self.n_lists, self.n_pairs, sequence.len())?;
        let offsets = draw_offsets(rng, sequence.len(), n_sessions)?;

        let mut pools = Vec::with_capacity(n_sessions);
        for (session, offset) in offsets.into_iter().enumerate() {
            let pairs = sequence.pairs_at(offset)?;
            debug!("Session {}: {} pairs at offset {}", session, pairs.len(), offset);
            pools.push(self.build_session_pool(rng, Some(pairs))?);
        }
        info!(
            "Generated {} PAL session(s) of {} lists x {} pairs",
            pools.len(),
            self.n_lists,
            self.n_pairs
        );
        Ok(pools)
    }

    fn check_session_count(&self, n_sessions: usize) -> Result<()> {
        let max_sessions = self.vocabulary.len() / 2;
        if n_sessions > max_sessions {
            return Err(ListgenError::config_mismatch(format!(
                "{} sessions requested but only {} distinct pairings are available",
                n_sessions, max_sessions
            )));
        }
        Ok(())
    }
}

fn list_rows(
    rng: &mut impl Rng,
    pairs: &[Pair],
    listno: usize,
    list_type: Option<ListType>,
) -> Vec<PairRow> {
    let cues = assign_cues(rng, pairs);
    pairs
        .iter()
        .zip(cues)
        .map(|(pair, cue_pos)| PairRow {
            word1: pair.word1.clone(),
            word2: pair.word2.clone(),
            list_type,
            listno,
            cue_pos,
        })
        .collect()
}

/// Generate PAL session pools for a language code using the thread RNG
pub fn generate_n_session_pairs(
    n_sessions: usize,
    n_lists: usize,
    n_pairs: usize,
    language: &str,
) -> Result<Vec<SessionPool>> {
    generate_n_session_pairs_with_rng(&mut rand::thread_rng(), n_sessions, n_lists, n_pairs, language)
}

/// Generate PAL session pools for a language code (with injected RNG)
pub fn generate_n_session_pairs_with_rng(
    rng: &mut impl Rng,
    n_sessions: usize,
    n_lists: usize,
    n_pairs: usize,
    language: &str,
) -> Result<Vec<SessionPool>> {
    let language = Language::from_code(language)?;
    let generator = PalGenerator::new(&PalConfig {
        n_lists,
        n_pairs,
        language,
    })?;
    generator.generate_n_session_pairs(rng, n_sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{rng_with_seed, seeded_rng, synthetic_vocabulary};
    use std::collections::HashSet;

    fn small_generator() -> PalGenerator {
        PalGenerator::with_vocabulary(
            5,
            4,
            synthetic_vocabulary("TASK", 40),
            synthetic_vocabulary("PRAC", 8),
        )
        .unwrap()
    }

    #[test]
    fn test_assign_cues_balanced() {
        let mut rng = seeded_rng();
        for len in [2, 6, 12, 40] {
            let list = vec![(); len];
            let cues = assign_cues(&mut rng, &list);
            assert_eq!(cues.len(), len);
            let word1 = cues.iter().filter(|c| **c == CuePosition::Word1).count();
            assert_eq!(word1, len / 2);
        }
    }

    #[test]
    fn test_assign_cues_shuffles() {
        let mut rng = seeded_rng();
        let list = vec![(); 12];
        let first = assign_cues(&mut rng, &list);
        let differs = (0..20).any(|_| assign_cues(&mut rng, &list) != first);
        assert!(differs);
    }

    #[test]
    fn test_session_pool_structure() {
        let generator = PalGenerator::new(&PalConfig::default()).unwrap();
        let pool = generator.build_session_pool(&mut seeded_rng(), None).unwrap();

        assert_eq!(pool.len(), 6 + 150);
        assert!(pool.practice_rows().all(|row| row.listno == 0));
        assert_eq!(pool.task_list_numbers(), (1..=25).collect::<Vec<_>>());
        for (_, rows) in pool.group_by_list() {
            assert_eq!(rows.len(), 6);
            let word1 = rows.iter().filter(|r| r.cue_pos == CuePosition::Word1).count();
            assert_eq!(word1, 3);
        }

        let words: HashSet<&str> = pool
            .iter()
            .flat_map(|r| [r.word1.as_str(), r.word2.as_str()])
            .collect();
        assert_eq!(words.len(), pool.len() * 2);
        assert!(pool.task_rows().all(|r| r.list_type.is_none()));
    }

    #[test]
    fn test_build_with_given_pairs() {
        let generator = small_generator();
        let pairs: Vec<Pair> = (0..20)
            .map(|i| Pair::new(format!("TASK{}", 2 * i), format!("TASK{}", 2 * i + 1)))
            .collect();

        let pool = generator
            .build_session_pool(&mut seeded_rng(), Some(pairs.clone()))
            .unwrap();

        assert_eq!(pool.task_pairs(), pairs);
        assert_eq!(pool.list(1).len(), 4);
        assert_eq!(pool.list(5).len(), 4);
        assert!(pool.list(6).is_empty());

        assert!(matches!(
            generator.build_session_pool(&mut seeded_rng(), Some(pairs[..10].to_vec())),
            Err(ListgenError::ConfigMismatch { .. })
        ));
    }

    #[test]
    fn test_generator_validation() {
        let task = || synthetic_vocabulary("TASK", 40);

        // size invariant
        assert!(PalGenerator::with_vocabulary(5, 6, task(), synthetic_vocabulary("P", 8)).is_err());
        // odd list size
        let odd = PalGenerator::with_vocabulary(4, 5, task(), synthetic_vocabulary("P", 8));
        assert!(matches!(odd, Err(ListgenError::ConfigMismatch { .. })));
        // practice overlapping task words
        let overlap = PalGenerator::with_vocabulary(5, 4, task(), synthetic_vocabulary("TASK", 8));
        assert!(matches!(overlap, Err(ListgenError::ConfigMismatch { .. })));
        // practice that pairs into an odd-length list
        let practice = PalGenerator::with_vocabulary(5, 4, task(), synthetic_vocabulary("P", 6));
        assert!(matches!(practice, Err(ListgenError::ConfigMismatch { .. })));
    }

    #[test]
    fn test_empty_lists_rejected() {
        let empty = || Vocabulary::new(Vec::new()).unwrap();
        for (n_lists, n_pairs) in [(25, 0), (0, 6), (0, 0)] {
            assert!(matches!(
                PalGenerator::with_vocabulary(n_lists, n_pairs, empty(), synthetic_vocabulary("P", 4)),
                Err(ListgenError::ConfigMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_generate_from_sequence_keeps_base_order() {
        let generator = small_generator();
        let mut rng = rng_with_seed(7);
        let sequence = RotatingSequence::shuffled(&mut rng, generator.vocabulary().words());
        let before = sequence.clone();

        let pools = generator.generate_from_sequence(&mut rng, &sequence, 10).unwrap();

        assert_eq!(pools.len(), 10);
        assert_eq!(sequence, before);
    }

    #[test]
    fn test_too_many_sessions() {
        let generator = small_generator();
        assert!(matches!(
            generator.generate_n_session_pairs(&mut seeded_rng(), 21),
            Err(ListgenError::ConfigMismatch { .. })
        ));
        assert_eq!(
            generator.generate_n_session_pairs(&mut seeded_rng(), 20).unwrap().len(),
            20
        );
    }

    #[test]
    fn test_wrapper_validates_language_and_shape() {
        let mut rng = seeded_rng();
        assert!(matches!(
            generate_n_session_pairs_with_rng(&mut rng, 1, 25, 6, "HE"),
            Err(ListgenError::LanguageNotSupported(_))
        ));
        assert!(matches!(
            generate_n_session_pairs_with_rng(&mut rng, 1, 25, 8, "EN"),
            Err(ListgenError::ConfigMismatch { .. })
        ));
        assert!(matches!(
            generate_n_session_pairs_with_rng(&mut rng, 1, 20, 6, "EN"),
            Err(ListgenError::ConfigMismatch { .. })
        ));
        assert_eq!(
            generate_n_session_pairs_with_rng(&mut rng, 2, 25, 6, "SP").unwrap().len(),
            2
        );
    }
}
