// Anti-diagonal wavefront evaluation of the similarity matrix.
//
// The full `(s+1) x (l+1)` DP matrix is never materialized; three
// diagonal buffers of `s+1` cells rotate through the `previous /
// current / next` roles while the wavefront sweeps the `s + l + 1`
// anti-diagonals in three phases: the growing upper-left triangle, the
// constant-width band, and the shrinking lower-right triangle.  A
// reversed copy of the shorter input keeps both sequences forward-indexed
// along every diagonal.
//
// In the band and the lower triangle each finished diagonal is one cell
// "to the right" of its predecessor, so the buffer that becomes
// `previous` is shifted left by one cell after every rotation.

use super::SubstitutionMatrix;

/// Cell type of the Levenshtein wavefront, selected per call from the
/// longer input length so the diagonals stay as narrow as possible.
pub(crate) trait DiagonalCell: Copy + Ord {
    fn from_index(value: usize) -> Self;
    fn index(self) -> usize;
}

impl DiagonalCell for u8 {
    #[inline(always)]
    fn from_index(value: usize) -> Self {
        debug_assert!(value <= u8::MAX as usize);
        value as u8
    }
    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl DiagonalCell for u16 {
    #[inline(always)]
    fn from_index(value: usize) -> Self {
        debug_assert!(value <= u16::MAX as usize);
        value as u16
    }
    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl DiagonalCell for usize {
    #[inline(always)]
    fn from_index(value: usize) -> Self {
        value
    }
    #[inline(always)]
    fn index(self) -> usize {
        self
    }
}

/// Advance the three-buffer rotation: the current diagonal becomes the
/// previous one, the freshly computed diagonal becomes current, and the
/// retired buffer is reused for the next diagonal.
#[inline(always)]
fn rotate<'b, C>(prev: &mut &'b mut [C], cur: &mut &'b mut [C], next: &mut &'b mut [C]) {
    std::mem::swap(prev, cur);
    std::mem::swap(cur, next);
}

// ---------------------------------------------------------------------------
// Levenshtein (uniform costs, minimizing)
// ---------------------------------------------------------------------------

/// Edit distance between the shorter input (provided reversed) and the
/// longer one.  All three buffers must hold `rev_shorter.len() + 1`
/// cells; the caller guarantees every distance fits in `C`.
pub(crate) fn levenshtein_kernel<'buf, T: Copy + Eq, C: DiagonalCell>(
    rev_shorter: &[T],
    longer: &[T],
    mut prev: &'buf mut [C],
    mut cur: &'buf mut [C],
    mut next: &'buf mut [C],
) -> usize {
    let s = rev_shorter.len();
    let l = longer.len();
    let cap_s = s + 1;
    let cap_l = l + 1;
    debug_assert!(s >= 1 && s <= l);
    debug_assert!(prev.len() == cap_s && cur.len() == cap_s && next.len() == cap_s);

    prev[0] = C::from_index(0);
    cur[0] = C::from_index(1);
    cur[1] = C::from_index(1);

    // Upper-left triangle: diagonals grow by one cell each.
    for d in 2..cap_s {
        next[0] = C::from_index(d);
        next[d] = C::from_index(d);
        for i in 1..d {
            let sub = usize::from(rev_shorter[s - d + i] != longer[i - 1]);
            let through = prev[i - 1].index() + sub;
            let around = cur[i - 1].min(cur[i]).index() + 1;
            next[i] = C::from_index(through.min(around));
        }
        rotate(&mut prev, &mut cur, &mut next);
    }

    // Band: every diagonal spans the full shorter length.
    for d in cap_s..cap_l {
        for i in 0..cap_s - 1 {
            let sub = usize::from(rev_shorter[i] != longer[d - cap_s + i]);
            let through = prev[i].index() + sub;
            let around = cur[i].min(cur[i + 1]).index() + 1;
            next[i] = C::from_index(through.min(around));
        }
        next[cap_s - 1] = C::from_index(d);
        rotate(&mut prev, &mut cur, &mut next);
        prev.copy_within(1..cap_s, 0);
    }

    // Lower-right triangle: diagonals shrink back to a single cell.
    for d in cap_l..cap_s + cap_l - 1 {
        let diag_len = cap_s + cap_l - 1 - d;
        for i in 0..diag_len {
            let sub = usize::from(rev_shorter[i] != longer[d - cap_s + i]);
            let through = prev[i].index() + sub;
            let around = cur[i].min(cur[i + 1]).index() + 1;
            next[i] = C::from_index(through.min(around));
        }
        rotate(&mut prev, &mut cur, &mut next);
        prev.copy_within(1..cap_s, 0);
    }

    // The last diagonal held exactly the bottom-right cell.
    cur[0].index()
}

// ---------------------------------------------------------------------------
// Alignment (substitution matrix, signed scores)
// ---------------------------------------------------------------------------

/// Alignment score over the same wavefront.  `LOCAL = false` minimizes a
/// global cost with `d * gap` boundary cells; `LOCAL = true` maximizes a
/// local score with zero boundaries, a zero floor per cell, and a running
/// maximum as the result.
pub(crate) fn alignment_kernel<'buf, const LOCAL: bool>(
    rev_shorter: &[u8],
    longer: &[u8],
    subs: &SubstitutionMatrix,
    gap: isize,
    mut prev: &'buf mut [isize],
    mut cur: &'buf mut [isize],
    mut next: &'buf mut [isize],
) -> isize {
    let s = rev_shorter.len();
    let l = longer.len();
    let cap_s = s + 1;
    let cap_l = l + 1;
    debug_assert!(s >= 1 && s <= l);
    debug_assert!(prev.len() == cap_s && cur.len() == cap_s && next.len() == cap_s);

    let edge = |d: usize| if LOCAL { 0 } else { d as isize * gap };
    let mut best: isize = 0;

    prev[0] = 0;
    cur[0] = edge(1);
    cur[1] = edge(1);

    for d in 2..cap_s {
        next[0] = edge(d);
        next[d] = edge(d);
        for i in 1..d {
            let sub = subs.get(rev_shorter[s - d + i], longer[i - 1]) as isize;
            let through = prev[i - 1] + sub;
            let cell = if LOCAL {
                let around = cur[i - 1].max(cur[i]) + gap;
                let cell = through.max(around).max(0);
                best = best.max(cell);
                cell
            } else {
                through.min(cur[i - 1].min(cur[i]) + gap)
            };
            next[i] = cell;
        }
        rotate(&mut prev, &mut cur, &mut next);
    }

    for d in cap_s..cap_l {
        for i in 0..cap_s - 1 {
            let sub = subs.get(rev_shorter[i], longer[d - cap_s + i]) as isize;
            let through = prev[i] + sub;
            let cell = if LOCAL {
                let around = cur[i].max(cur[i + 1]) + gap;
                let cell = through.max(around).max(0);
                best = best.max(cell);
                cell
            } else {
                through.min(cur[i].min(cur[i + 1]) + gap)
            };
            next[i] = cell;
        }
        next[cap_s - 1] = edge(d);
        rotate(&mut prev, &mut cur, &mut next);
        prev.copy_within(1..cap_s, 0);
    }

    for d in cap_l..cap_s + cap_l - 1 {
        let diag_len = cap_s + cap_l - 1 - d;
        for i in 0..diag_len {
            let sub = subs.get(rev_shorter[i], longer[d - cap_s + i]) as isize;
            let through = prev[i] + sub;
            let cell = if LOCAL {
                let around = cur[i].max(cur[i + 1]) + gap;
                let cell = through.max(around).max(0);
                best = best.max(cell);
                cell
            } else {
                through.min(cur[i].min(cur[i + 1]) + gap)
            };
            next[i] = cell;
        }
        rotate(&mut prev, &mut cur, &mut next);
        prev.copy_within(1..cap_s, 0);
    }

    if LOCAL { best } else { cur[0] }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
