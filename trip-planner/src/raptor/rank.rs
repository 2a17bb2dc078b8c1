//! Path ranking for search results.
//!
//! The router returns a Pareto set, which has no natural order. Paths are
//! sorted so that the most useful options come first.

use std::cmp::Ordering;

use crate::domain::Path;

/// Rank paths by preference.
///
/// Paths are ranked by:
/// 1. Arrival time (earlier is better)
/// 2. Number of transfers (fewer is better)
/// 3. c1 (lower is better)
/// 4. Departure time (later is better)
///
/// Returns paths sorted best-first.
pub fn rank_paths(mut paths: Vec<Path>) -> Vec<Path> {
    paths.sort_by(compare);
    paths
}

fn compare(a: &Path, b: &Path) -> Ordering {
    a.end_time()
        .cmp(&b.end_time())
        .then_with(|| a.number_of_transfers().cmp(&b.number_of_transfers()))
        .then_with(|| a.c1().cmp(&b.c1()))
        .then_with(|| b.start_time().cmp(&a.start_time()))
}

/// Drop paths identical to one already kept.
///
/// Keeps the first of each group, so ranked input stays ranked.
pub fn deduplicate(paths: Vec<Path>) -> Vec<Path> {
    if paths.len() <= 1 {
        return paths;
    }

    let mut result: Vec<Path> = Vec::with_capacity(paths.len());
    for path in paths {
        if !result.contains(&path) {
            result.push(path);
        }
    }
    result
}
