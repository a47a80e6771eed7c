//! Asof matching between the primary timestamp column and one secondary
//! stream.
//!
//! Both sides must already be sorted ascending by timestamp (the reader
//! guarantees this). The sweep advances a single cursor over the right side
//! as it walks the left keys, so a full match pass is linear in the combined
//! row counts; the cursor never moves backward.
//!
//! All joins in the pipeline key off the same left column — the primary
//! telemetry timestamp — so each secondary match is specified against the
//! original sample moment, not against an intermediate match's own time.

use crate::model::Timestamped;
use chrono::{DateTime, Duration, Utc};

/// Which right-side rows are eligible for a left row at time `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDirection {
    /// Closest row in either temporal direction.
    Nearest,
    /// Greatest timestamp at-or-before `t` — state in effect at that moment.
    Backward,
}

/// Direction plus the maximum allowed time distance. A candidate farther
/// than the tolerance becomes a null match, never an error. The tolerance
/// boundary is inclusive.
#[derive(Debug, Clone, Copy)]
pub struct JoinSpec {
    pub direction: JoinDirection,
    pub tolerance: Duration,
}

impl JoinSpec {
    pub fn nearest(tolerance: Duration) -> Self {
        Self {
            direction: JoinDirection::Nearest,
            tolerance,
        }
    }

    pub fn backward(tolerance: Duration) -> Self {
        Self {
            direction: JoinDirection::Backward,
            tolerance,
        }
    }
}

/// For each left key, the index of the best-matching right row, or `None`
/// when nothing qualifies within tolerance.
///
/// Ties: for `Backward`, equal right timestamps resolve to the last such
/// row in the given ordering; for `Nearest`, an exact distance tie between
/// the at-or-before candidate and the following row resolves to the
/// at-or-before row. Both rules are deterministic for a fixed input
/// ordering. An empty right side yields all `None`.
pub fn match_asof<R: Timestamped>(
    left: &[DateTime<Utc>],
    right: &[R],
    spec: &JoinSpec,
) -> Vec<Option<usize>> {
    debug_assert!(is_ascending(left.iter().copied()));
    debug_assert!(is_ascending(right.iter().map(|r| r.timestamp())));

    let mut matches = Vec::with_capacity(left.len());
    // Number of right rows with timestamp <= current left key. Monotone in
    // the left key, which is what makes the sweep linear.
    let mut cursor = 0usize;

    for &t in left {
        while cursor < right.len() && right[cursor].timestamp() <= t {
            cursor += 1;
        }

        // Advancing through equal timestamps lands the at-or-before
        // candidate on the last of them, which is the backward tie rule.
        let below = cursor.checked_sub(1);
        let above = if cursor < right.len() {
            Some(cursor)
        } else {
            None
        };

        let candidate = match spec.direction {
            JoinDirection::Backward => below,
            JoinDirection::Nearest => match (below, above) {
                (Some(b), Some(a)) => {
                    let below_dist = t - right[b].timestamp();
                    let above_dist = right[a].timestamp() - t;
                    // Exact tie goes to the at-or-before row.
                    if above_dist < below_dist {
                        Some(a)
                    } else {
                        Some(b)
                    }
                }
                (Some(b), None) => Some(b),
                (None, Some(a)) => Some(a),
                (None, None) => None,
            },
        };

        matches.push(candidate.filter(|&idx| {
            let distance = (t - right[idx].timestamp()).abs();
            distance <= spec.tolerance
        }));
    }

    matches
}

fn is_ascending(mut timestamps: impl Iterator<Item = DateTime<Utc>>) -> bool {
    let mut prev = match timestamps.next() {
        Some(first) => first,
        None => return true,
    };
    for ts in timestamps {
        if ts < prev {
            return false;
        }
        prev = ts;
    }
    true
}
