//! Static range partitioning of a work domain.

use std::num::NonZeroUsize;
use std::ops::Range;

/// Split `[0, n)` into `t` contiguous ranges.
///
/// The first `t - 1` ranges have `n / t` elements and the last one absorbs
/// the remainder. When `n < t` the leading ranges are empty.
#[must_use]
pub fn partition(n: usize, t: NonZeroUsize) -> Vec<Range<usize>> {
    let t = t.get();
    let base = n / t;
    (0..t)
        .map(|i| {
            let start = i * base;
            let end = if i + 1 == t { n } else { start + base };
            start..end
        })
        .collect()
}
