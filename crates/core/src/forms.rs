//! In-memory form-state synchronization.
//!
//! Keeps a scalar cardinality field (the series' `totalTemporadas`) in step
//! with its ordered child list while the operator edits either one. Pure
//! functions, safe to call on every keystroke.

use crate::entity::Season;

/// Reconcile an ordered child list against a newly entered count.
///
/// - `None` or a negative count leaves the list unchanged (no implicit
///   clearing while the field is mid-edit).
/// - A larger count appends freshly built defaults; existing records are
///   never touched or renumbered.
/// - A smaller count truncates from the tail, by index only.
pub fn reconcile_count<T: Clone>(
    current: &[T],
    new_count: Option<i64>,
    make_default: impl Fn(usize) -> T,
) -> Vec<T> {
    let Some(count) = new_count else {
        return current.to_vec();
    };
    if count < 0 {
        return current.to_vec();
    }
    let count = count as usize;

    let mut out = current.to_vec();
    if count > out.len() {
        for index in out.len()..count {
            out.push(make_default(index));
        }
    } else {
        out.truncate(count);
    }
    out
}

/// Default season for slot `index` (zero-based); season numbers are 1-based
/// and contiguous from the current tail.
pub fn default_season(index: usize) -> Season {
    Season {
        id: None,
        numero_temporada: index as i32 + 1,
        episodios: Vec::new(),
    }
}

/// Number the next manually appended season gets, identical to what the
/// count field would assign.
pub fn next_season_number(current: &[Season]) -> i32 {
    current.len() as i32 + 1
}
