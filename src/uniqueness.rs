//! Cross-session pair uniqueness.
//!
//! Two pairs are equal when they hold the same two words in either
//! orientation. No task pair of a session may equal a task pair of any
//! other session generated for the same experiment. The check here is
//! verification only: colliding sessions are reported, never repaired.

use crate::error::{ListgenError, Result};
use crate::types::{Pair, SessionPool};
use log::{info, warn};
use serde::Serialize;
use std::collections::HashSet;

/// One task row of `session` whose pair also occurs in `other_session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub session: usize,
    pub other_session: usize,
    /// Index into the session's task pairs
    pub row: usize,
    pub pair: Pair,
}

/// For every pair in `a`, whether `b` holds an equal pair
pub fn equal_pairs(a: &[Pair], b: &[Pair]) -> Vec<bool> {
    let keys: HashSet<(&str, &str)> = b.iter().map(Pair::key).collect();
    a.iter().map(|pair| keys.contains(&pair.key())).collect()
}

/// Result of checking a sequence of sessions against each other
#[derive(Debug, Clone, Default)]
pub struct UniquenessReport {
    /// Per session, OR of `equal_pairs` against every earlier session
    pub masks: Vec<Vec<bool>>,
    pub collisions: Vec<Collision>,
}

impl UniquenessReport {
    pub fn is_unique(&self) -> bool {
        self.collisions.is_empty()
    }

    /// Number of task rows equal to a row of some earlier session
    pub fn overlap_count(&self) -> usize {
        self.masks
            .iter()
            .map(|mask| mask.iter().filter(|&&hit| hit).count())
            .sum()
    }
}

/// Compare the task pairs of every session `i` with every session `j < i`
pub fn check_sessions(pools: &[SessionPool]) -> UniquenessReport {
    let task_pairs: Vec<Vec<Pair>> = pools.iter().map(SessionPool::task_pairs).collect();
    check_pair_sets(&task_pairs)
}

/// Same as [`check_sessions`] for bare pair lists
pub fn check_pair_sets(sessions: &[Vec<Pair>]) -> UniquenessReport {
    let mut report = UniquenessReport::default();
    for (i, current) in sessions.iter().enumerate() {
        let mut overlap = vec![false; current.len()];
        for (j, previous) in sessions[..i].iter().enumerate() {
            for (row, hit) in equal_pairs(current, previous).into_iter().enumerate() {
                if hit {
                    report.collisions.push(Collision {
                        session: i,
                        other_session: j,
                        row,
                        pair: current[row].clone(),
                    });
                    overlap[row] = true;
                }
            }
        }
        report.masks.push(overlap);
    }

    if report.is_unique() {
        info!("{} session(s) share no pairs", sessions.len());
    } else {
        warn!(
            "{} overlapping pair(s) across {} sessions",
            report.overlap_count(),
            sessions.len()
        );
    }
    report
}

/// Fail with `UnresolvedCollision` if any pair repeats across sessions
pub fn ensure_unique(pools: &[SessionPool]) -> Result<()> {
    let report = check_sessions(pools);
    if report.is_unique() {
        Ok(())
    } else {
        Err(ListgenError::UnresolvedCollision {
            collisions: report.collisions,
        })
    }
}
