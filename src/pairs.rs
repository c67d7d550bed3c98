//! Splitting a word sequence into unique pairs.
//!
//! The partition is a split-and-reverse: the first half of the sequence is
//! paired position by position with the reversed second half. Reading the
//! same circular sequence from different rotation offsets gives different,
//! still-valid partitions, which is how several sessions are derived from a
//! single shuffle.

use crate::error::{ListgenError, Result};
use crate::types::{Pair, Word};
use log::debug;
use rand::seq::{index, SliceRandom};
use rand::Rng;

/// Pair `words[i]` with `words[n - 1 - i]` for every `i` in the first half.
///
/// Every word lands in exactly one pair. Fails on an odd word count.
pub fn partition_pairs(words: &[Word]) -> Result<Vec<Pair>> {
    if words.len() % 2 != 0 {
        return Err(ListgenError::config_mismatch(format!(
            "cannot pair an odd number of words ({})",
            words.len()
        )));
    }
    let n = words.len();
    Ok((0..n / 2)
        .map(|i| Pair::new(words[i].clone(), words[n - 1 - i].clone()))
        .collect())
}

/// Check `n_lists * n_pairs * 2 == n_words`
pub fn check_pair_capacity(n_lists: usize, n_pairs: usize, n_words: usize) -> Result<()> {
    let needed = n_lists
        .checked_mul(n_pairs)
        .and_then(|pairs| pairs.checked_mul(2));
    if needed != Some(n_words) {
        return Err(ListgenError::config_mismatch(format!(
            "{} lists x {} pairs x 2 != {} words",
            n_lists, n_pairs, n_words
        )));
    }
    Ok(())
}

/// Shuffle the words and partition them into `n_lists * n_pairs` pairs.
///
/// The size invariant is checked before the shuffle.
pub fn shuffle_and_pair(
    rng: &mut impl Rng,
    words: &[Word],
    n_lists: usize,
    n_pairs: usize,
) -> Result<Vec<Pair>> {
    check_pair_capacity(n_lists, n_pairs, words.len())?;
    let mut shuffled = words.to_vec();
    shuffled.shuffle(rng);
    partition_pairs(&shuffled)
}

/// A fixed circular word sequence read through rotation offsets.
///
/// The base order never changes; `view(offset)` gives the order a deque
/// would have after rotating right by `offset`, without touching the
/// underlying storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatingSequence {
    words: Vec<Word>,
}

impl RotatingSequence {
    pub fn from_words(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Shuffle a copy of `words` once into a new base order
    pub fn shuffled(rng: &mut impl Rng, words: &[Word]) -> Self {
        let mut words = words.to_vec();
        words.shuffle(rng);
        Self { words }
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

    pub fn view(&self, offset: usize) -> RotatedView<'_> {
        let n = self.words.len();
        RotatedView {
            words: &self.words,
            shift: if n == 0 { 0 } else { offset % n },
        }
    }

    /// Split-and-reverse partition of the sequence rotated by `offset`
    pub fn pairs_at(&self, offset: usize) -> Result<Vec<Pair>> {
        let view = self.view(offset);
        let n = view.len();
        if n % 2 != 0 {
            return Err(ListgenError::config_mismatch(format!(
                "cannot pair an odd number of words ({})",
                n
            )));
        }
        Ok((0..n / 2)
            .map(|i| Pair::new(view.get(i).clone(), view.get(n - 1 - i).clone()))
            .collect())
    }
}

/// Read-only rotated window over a [`RotatingSequence`]
#[derive(Debug, Clone, Copy)]
pub struct RotatedView<'a> {
    words: &'a [Word],
    shift: usize,
}

impl<'a> RotatedView<'a> {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word at position `k` after rotating right by the view's offset
    pub fn get(&self, k: usize) -> &'a Word {
        let n = self.words.len();
        &self.words[(k + n - self.shift) % n]
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Word> + '_ {
        (0..self.words.len()).map(move |k| self.get(k))
    }
}

/// Draw one rotation offset per session.
///
/// Offsets are distinct values in `[0, n_words)`. Offsets `r` and `r + n/2`
/// yield the same partition, so residues modulo `n_words / 2` are drawn
/// without replacement and each is lifted by `n/2` at random. Sessions built
/// from these offsets never share a pair.
pub fn draw_offsets(rng: &mut impl Rng, n_words: usize, n_sessions: usize) -> Result<Vec<usize>> {
    let half = n_words / 2;
    if n_sessions > half {
        return Err(ListgenError::config_mismatch(format!(
            "{} sessions requested but {} words only allow {} distinct pairings",
            n_sessions, n_words, half
        )));
    }
    let residues = index::sample(&mut *rng, half, n_sessions).into_vec();
    let offsets: Vec<usize> = residues
        .into_iter()
        .map(|r| if rng.gen_bool(0.5) { r + half } else { r })
        .collect();
    debug!("Drew rotation offsets {:?} over {} words", offsets, n_words);
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seeded_rng, synthetic_words};
    use std::collections::HashSet;

    #[test]
    fn test_partition_uses_every_word_once() {
        let words = synthetic_words("W", 300);
        let pairs = partition_pairs(&words).unwrap();

        assert_eq!(pairs.len(), 150);
        let used: HashSet<&str> = pairs
            .iter()
            .flat_map(|p| [p.word1.as_str(), p.word2.as_str()])
            .collect();
        assert_eq!(used.len(), 300);
    }

    #[test]
    fn test_partition_split_and_reverse() {
        let words: Vec<Word> = ["A", "B", "C", "D"].iter().map(|w| w.to_string()).collect();
        let pairs = partition_pairs(&words).unwrap();
        assert_eq!(pairs, vec![Pair::new("A", "D"), Pair::new("B", "C")]);
    }

    #[test]
    fn test_partition_odd_fails() {
        let words = synthetic_words("W", 7);
        assert!(matches!(
            partition_pairs(&words),
            Err(ListgenError::ConfigMismatch { .. })
        ));
    }

    #[test]
    fn test_shuffle_and_pair_checks_capacity() {
        let mut rng = seeded_rng();
        let words = synthetic_words("W", 300);

        assert_eq!(shuffle_and_pair(&mut rng, &words, 25, 6).unwrap().len(), 150);
        assert!(matches!(
            shuffle_and_pair(&mut rng, &words, 25, 8),
            Err(ListgenError::ConfigMismatch { .. })
        ));
        assert!(matches!(
            shuffle_and_pair(&mut rng, &words, 20, 6),
            Err(ListgenError::ConfigMismatch { .. })
        ));
    }

    #[test]
    fn test_pair_capacity_overflow() {
        // wraps to 300 with unchecked arithmetic
        let n_lists = usize::MAX / 2 + 1 + 150;
        assert!(matches!(
            check_pair_capacity(n_lists, 1, 300),
            Err(ListgenError::ConfigMismatch { .. })
        ));
        assert!(matches!(
            check_pair_capacity(usize::MAX, usize::MAX, 300),
            Err(ListgenError::ConfigMismatch { .. })
        ));
        assert!(check_pair_capacity(25, 6, 300).is_ok());
    }

    #[test]
    fn test_view_matches_deque_rotation() {
        let seq = RotatingSequence::from_words(
            ["1", "2", "3", "4"].iter().map(|w| w.to_string()).collect(),
        );
        let rotated: Vec<&str> = seq.view(1).iter().map(|w| w.as_str()).collect();
        assert_eq!(rotated, vec!["4", "1", "2", "3"]);

        let full_turn: Vec<&str> = seq.view(4).iter().map(|w| w.as_str()).collect();
        assert_eq!(full_turn, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_pairs_at_leaves_sequence_untouched() {
        let mut rng = seeded_rng();
        let seq = RotatingSequence::shuffled(&mut rng, &synthetic_words("W", 20));
        let before = seq.clone();

        for offset in 0..20 {
            let pairs = seq.pairs_at(offset).unwrap();
            assert_eq!(pairs.len(), 10);
        }
        assert_eq!(seq, before);
    }

    #[test]
    fn test_offsets_half_apart_give_same_partition() {
        let seq = RotatingSequence::from_words(synthetic_words("W", 12));
        let a: HashSet<(String, String)> = seq
            .pairs_at(2)
            .unwrap()
            .iter()
            .map(|p| (p.key().0.to_string(), p.key().1.to_string()))
            .collect();
        let b: HashSet<(String, String)> = seq
            .pairs_at(8)
            .unwrap()
            .iter()
            .map(|p| (p.key().0.to_string(), p.key().1.to_string()))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_offsets_distinct_residues() {
        let mut rng = seeded_rng();
        for _ in 0..50 {
            let offsets = draw_offsets(&mut rng, 300, 10).unwrap();
            assert_eq!(offsets.len(), 10);
            assert!(offsets.iter().all(|&o| o < 300));
            let residues: HashSet<usize> = offsets.iter().map(|o| o % 150).collect();
            assert_eq!(residues.len(), 10);
        }
    }

    #[test]
    fn test_draw_offsets_too_many_sessions() {
        let mut rng = seeded_rng();
        assert!(draw_offsets(&mut rng, 12, 6).is_ok());
        assert!(matches!(
            draw_offsets(&mut rng, 12, 7),
            Err(ListgenError::ConfigMismatch { .. })
        ));
    }
}
