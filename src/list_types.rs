//! Labeling task lists with experimental conditions.
//!
//! Lists `1..=n_baseline` are BASELINE, the next `n_ps` are PS, and the
//! rest are split between STIM and NON-STIM. The practice list keeps its
//! PRACTICE label.

use crate::error::{ListgenError, Result};
use crate::types::{ListType, Pool, PoolRow};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How many task lists get each condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListTypeCounts {
    pub n_baseline: usize,
    pub n_nonstim: usize,
    pub n_stim: usize,
    pub n_ps: usize,
}

impl ListTypeCounts {
    pub fn new(n_baseline: usize, n_nonstim: usize, n_stim: usize, n_ps: usize) -> Self {
        Self {
            n_baseline,
            n_nonstim,
            n_stim,
            n_ps,
        }
    }

    pub fn total(&self) -> usize {
        self.n_baseline + self.n_nonstim + self.n_stim + self.n_ps
    }

    /// Length of the STIM/NON-STIM span
    pub fn stim_period(&self) -> usize {
        self.n_stim + self.n_nonstim
    }
}

/// Groups used by [`assign_list_types`]: the two halves of the stim period
pub const STIM_HALVES: usize = 2;

/// Assign list types with STIM and NON-STIM balanced across the two halves
/// of the stim period.
///
/// Each half gets STIM lists in proportion to its length, so STIM and
/// NON-STIM counts within a half differ by at most one list when the totals
/// are equal. Order is shuffled within each half.
pub fn assign_list_types<R: PoolRow>(
    rng: &mut impl Rng,
    pool: &Pool<R>,
    counts: ListTypeCounts,
) -> Result<Pool<R>> {
    let task_lists = checked_task_lists(pool, counts)?;
    let n_groups = STIM_HALVES.min(counts.stim_period()).max(1);
    let stim_period = grouped_stim_period(rng, counts, n_groups);
    let plan = plan_list_types(&task_lists, counts, stim_period);
    Ok(pool.with_list_types(&plan))
}

/// Assign list types with STIM and NON-STIM in a fully random order.
///
/// No balance between the halves of the stim period is enforced.
pub fn assign_shuffled_list_types<R: PoolRow>(
    rng: &mut impl Rng,
    pool: &Pool<R>,
    counts: ListTypeCounts,
) -> Result<Pool<R>> {
    let task_lists = checked_task_lists(pool, counts)?;

    let mut stim_period = vec![ListType::Stim; counts.n_stim];
    stim_period.extend(vec![ListType::NonStim; counts.n_nonstim]);
    stim_period.shuffle(rng);

    let plan = plan_list_types(&task_lists, counts, stim_period);
    Ok(pool.with_list_types(&plan))
}

/// Assign list types with STIM and NON-STIM balanced across `n_groups`
/// consecutive groups of the stim period.
///
/// Each group receives STIM lists in proportion to its length; order is
/// shuffled within a group only.
pub fn assign_balanced_list_types<R: PoolRow>(
    rng: &mut impl Rng,
    pool: &Pool<R>,
    counts: ListTypeCounts,
    n_groups: usize,
) -> Result<Pool<R>> {
    let task_lists = checked_task_lists(pool, counts)?;
    check_group_count(counts, n_groups)?;
    let stim_period = grouped_stim_period(rng, counts, n_groups);
    let plan = plan_list_types(&task_lists, counts, stim_period);
    Ok(pool.with_list_types(&plan))
}

/// Fail unless `n_groups` can split the stim period of `counts`
pub fn check_group_count(counts: ListTypeCounts, n_groups: usize) -> Result<()> {
    let span = counts.stim_period();
    if n_groups == 0 || (span > 0 && n_groups > span) {
        return Err(ListgenError::config_mismatch(format!(
            "cannot balance {} stim-period lists over {} groups",
            span, n_groups
        )));
    }
    Ok(())
}

fn grouped_stim_period(rng: &mut impl Rng, counts: ListTypeCounts, n_groups: usize) -> Vec<ListType> {
    let span = counts.stim_period();
    let mut stim_period = Vec::with_capacity(span);
    for (start, end) in group_bounds(span, n_groups) {
        let n_stim = stim_quota(end, span, counts.n_stim) - stim_quota(start, span, counts.n_stim);
        let mut group = vec![ListType::Stim; n_stim];
        group.extend(vec![ListType::NonStim; end - start - n_stim]);
        group.shuffle(rng);
        debug!("Stim group {}..{}: {} STIM", start, end, n_stim);
        stim_period.extend(group);
    }
    stim_period
}

/// Task list numbers, verified to be exactly `1..=counts.total()`
fn checked_task_lists<R: PoolRow>(pool: &Pool<R>, counts: ListTypeCounts) -> Result<Vec<usize>> {
    let task_lists = pool.task_list_numbers();
    if counts.total() != task_lists.len() {
        return Err(ListgenError::config_mismatch(format!(
            "list type counts sum to {} but the pool has {} task lists",
            counts.total(),
            task_lists.len()
        )));
    }
    let contiguous = task_lists.iter().enumerate().all(|(i, &listno)| listno == i + 1);
    if !contiguous {
        return Err(ListgenError::config_mismatch(
            "task list numbers are not contiguous from 1",
        ));
    }
    Ok(task_lists)
}

fn plan_list_types(
    task_lists: &[usize],
    counts: ListTypeCounts,
    stim_period: Vec<ListType>,
) -> BTreeMap<usize, ListType> {
    let prefix = std::iter::repeat(ListType::Baseline)
        .take(counts.n_baseline)
        .chain(std::iter::repeat(ListType::Ps).take(counts.n_ps));
    task_lists
        .iter()
        .copied()
        .zip(prefix.chain(stim_period))
        .collect()
}

/// Near-equal contiguous `[start, end)` groups covering `0..span`
fn group_bounds(span: usize, n_groups: usize) -> Vec<(usize, usize)> {
    let base = span / n_groups;
    let extra = span % n_groups;
    let mut bounds = Vec::with_capacity(n_groups);
    let mut start = 0;
    for g in 0..n_groups {
        let len = base + usize::from(g < extra);
        bounds.push((start, start + len));
        start += len;
    }
    bounds
}

/// STIM lists among the first `k` of `span` lists: round(k * n_stim / span)
fn stim_quota(k: usize, span: usize, n_stim: usize) -> usize {
    if span == 0 {
        return 0;
    }
    (2 * k * n_stim + span) / (2 * span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fr::generate_session_pool_with_rng;
    use crate::pal::generate_n_session_pairs_with_rng;
    use crate::test_utils::{rng_with_seed, seeded_rng};
    use crate::types::SessionPool;

    #[test]
    fn test_assign_list_types() {
        let mut rng = seeded_rng();
        let session = generate_session_pool_with_rng(&mut rng, 12, 25, "EN").unwrap();
        let session = assign_list_types(&mut rng, &session, ListTypeCounts::new(3, 7, 11, 4)).unwrap();
        let words_per_list = 12;

        assert_eq!(session.count_type(ListType::Practice), words_per_list);
        assert_eq!(session.count_type(ListType::Baseline), 3 * words_per_list);
        assert_eq!(session.count_type(ListType::NonStim), 7 * words_per_list);
        assert_eq!(session.count_type(ListType::Stim), 11 * words_per_list);
        assert_eq!(session.count_type(ListType::Ps), 4 * words_per_list);

        for row in &session {
            let expected = match row.listno {
                0 => vec![ListType::Practice],
                1..=3 => vec![ListType::Baseline],
                4..=7 => vec![ListType::Ps],
                _ => vec![ListType::Stim, ListType::NonStim],
            };
            assert!(row.list_type.is_some_and(|t| expected.contains(&t)));
        }
    }

    /// Absolute STIM/NON-STIM row difference in each half of the stim period
    fn half_differences(pool: &SessionPool) -> Vec<usize> {
        let stim_period: Vec<_> = pool
            .iter()
            .filter(|r| matches!(r.list_type, Some(ListType::Stim | ListType::NonStim)))
            .collect();
        let (first_half, second_half) = stim_period.split_at(stim_period.len() / 2);
        [first_half, second_half]
            .iter()
            .map(|half| {
                let stim = half.iter().filter(|r| r.list_type == Some(ListType::Stim)).count();
                stim.abs_diff(half.len() - stim)
            })
            .collect()
    }

    #[test]
    fn test_default_assigner_balances_halves() {
        let counts = ListTypeCounts::new(3, 11, 11, 0);
        for seed in 0..200 {
            let mut rng = rng_with_seed(seed);
            let pool = generate_n_session_pairs_with_rng(&mut rng, 1, 25, 6, "EN")
                .unwrap()
                .remove(0);
            let pool = assign_list_types(&mut rng, &pool, counts).unwrap();

            assert_eq!(pool.count_type(ListType::Stim), 11 * 6);
            for diff in half_differences(&pool) {
                assert!(diff < 2 * 6, "seed {}: half differs by {} rows", seed, diff);
            }
        }
    }

    #[test]
    fn test_shuffled_assigner_keeps_counts() {
        let mut rng = seeded_rng();
        let session = generate_session_pool_with_rng(&mut rng, 12, 25, "EN").unwrap();
        let session =
            assign_shuffled_list_types(&mut rng, &session, ListTypeCounts::new(3, 7, 11, 4)).unwrap();
        assert_eq!(session.count_type(ListType::Stim), 11 * 12);
        assert_eq!(session.count_type(ListType::NonStim), 7 * 12);
        assert!(session.list(8).iter().all(|r| r.list_type.is_some()));
    }

    #[test]
    fn test_short_stim_period() {
        let mut rng = seeded_rng();
        let session = generate_session_pool_with_rng(&mut rng, 12, 25, "EN").unwrap();
        let session = assign_list_types(&mut rng, &session, ListTypeCounts::new(24, 0, 1, 0)).unwrap();
        assert_eq!(session.list(25)[0].list_type, Some(ListType::Stim));
    }

    #[test]
    fn test_counts_must_match_list_count() {
        let mut rng = seeded_rng();
        let session = generate_session_pool_with_rng(&mut rng, 12, 25, "EN").unwrap();

        for counts in [ListTypeCounts::new(3, 7, 11, 3), ListTypeCounts::new(3, 7, 11, 5)] {
            assert!(matches!(
                assign_list_types(&mut rng, &session, counts),
                Err(ListgenError::ConfigMismatch { .. })
            ));
            assert!(matches!(
                assign_balanced_list_types(&mut rng, &session, counts, 2),
                Err(ListgenError::ConfigMismatch { .. })
            ));
            assert!(matches!(
                assign_shuffled_list_types(&mut rng, &session, counts),
                Err(ListgenError::ConfigMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_assign_balanced_list_types() {
        let mut rng = seeded_rng();
        for _ in 0..20 {
            let pool = generate_n_session_pairs_with_rng(&mut rng, 1, 25, 6, "EN")
                .unwrap()
                .remove(0);
            let pool = assign_balanced_list_types(&mut rng, &pool, ListTypeCounts::new(3, 11, 11, 0), 2)
                .unwrap();

            for diff in half_differences(&pool) {
                assert!(diff < 2 * 6);
            }
        }
    }

    #[test]
    fn test_balanced_group_quotas() {
        // 18 lists, 11 STIM over 3 groups of 6: 4 + 3 + 4
        let quotas: Vec<usize> = group_bounds(18, 3)
            .into_iter()
            .map(|(s, e)| stim_quota(e, 18, 11) - stim_quota(s, 18, 11))
            .collect();
        assert_eq!(quotas.iter().sum::<usize>(), 11);
        assert!(quotas.iter().all(|&q| q == 3 || q == 4));

        assert_eq!(group_bounds(7, 2), vec![(0, 4), (4, 7)]);
        assert_eq!(stim_quota(0, 0, 0), 0);
    }

    #[test]
    fn test_balanced_bad_group_count() {
        let mut rng = seeded_rng();
        let session = generate_session_pool_with_rng(&mut rng, 12, 25, "EN").unwrap();
        let counts = ListTypeCounts::new(3, 7, 11, 4);
        assert!(assign_balanced_list_types(&mut rng, &session, counts, 0).is_err());
        assert!(assign_balanced_list_types(&mut rng, &session, counts, 19).is_err());
        assert!(assign_balanced_list_types(&mut rng, &session, counts, 18).is_ok());
    }

    #[test]
    fn test_all_baseline() {
        let mut rng = seeded_rng();
        let session = generate_session_pool_with_rng(&mut rng, 12, 25, "EN").unwrap();
        let counts = ListTypeCounts::new(25, 0, 0, 0);
        let assigned = assign_balanced_list_types(&mut rng, &session, counts, 2).unwrap();
        assert_eq!(assigned.count_type(ListType::Baseline), 25 * 12);
    }
}
