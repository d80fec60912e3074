// Pairwise similarity scoring: Levenshtein edit distance over bytes or
// UTF-8 runes, and alignment scores under a substitution matrix
// (Needleman-Wunsch global, Smith-Waterman local).
//
// All entry points share the wavefront engine in `diagonal` and perform
// exactly one scratch allocation through the caller's allocator, released
// on every exit path.

pub mod alloc;
mod diagonal;
mod utf8;

pub use alloc::{FixedArena, ScratchAllocator, SystemAllocator};

use alloc::{SCRATCH_ALIGN, Scratch};
use diagonal::DiagonalCell;

use crate::byteset::ByteSet;
use crate::search::set::find_byteset;

/// Failures a similarity call can report.
///
/// Search and compare primitives are infallible; only the similarity
/// engine allocates or parses, so only it carries an error surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimilarityError {
    /// The caller's allocator returned null; no partial state is left
    /// behind.
    #[error("scratch allocation failed")]
    BadAlloc,
    /// An input is not valid UTF-8; detected before any DP work.
    #[error("input is not valid UTF-8")]
    InvalidUtf8,
}

// ---------------------------------------------------------------------------
// Substitution matrix
// ---------------------------------------------------------------------------

/// 256x256 signed substitution matrix for alignment scoring.
///
/// Entry `(a, b)` is the cost (global alignment) or score (local
/// alignment) of substituting byte `a` with byte `b`.  The engine indexes
/// it as `(shorter_byte, longer_byte)`, so asymmetric matrices should be
/// avoided.
pub struct SubstitutionMatrix {
    rows: Vec<[i8; 256]>,
}

impl SubstitutionMatrix {
    /// Build a matrix from a cost function.
    pub fn from_fn(mut cost: impl FnMut(u8, u8) -> i8) -> Self {
        let mut rows = vec![[0i8; 256]; 256];
        for (a, row) in rows.iter_mut().enumerate() {
            for (b, entry) in row.iter_mut().enumerate() {
                *entry = cost(a as u8, b as u8);
            }
        }
        Self { rows }
    }

    /// Matrix with one value on the diagonal and another off it.
    ///
    /// `uniform(0, 1)` with gap cost `1` makes the global alignment
    /// reproduce Levenshtein distance exactly.
    pub fn uniform(matching: i8, mismatching: i8) -> Self {
        Self::from_fn(|a, b| if a == b { matching } else { mismatching })
    }

    /// Cost of substituting `a` with `b`.
    #[inline(always)]
    pub fn get(&self, a: u8, b: u8) -> i8 {
        self.rows[a as usize][b as usize]
    }
}

// ---------------------------------------------------------------------------
// Levenshtein distance
// ---------------------------------------------------------------------------

/// Levenshtein edit distance between two byte spans.
///
/// ```
/// use oxistr::similarity::{SystemAllocator, levenshtein};
///
/// let distance = levenshtein(b"kitten", b"sitting", &SystemAllocator).unwrap();
/// assert_eq!(distance, 3);
/// ```
pub fn levenshtein<A: ScratchAllocator + ?Sized>(
    a: &[u8],
    b: &[u8],
    alloc: &A,
) -> Result<usize, SimilarityError> {
    if a.is_empty() {
        return Ok(b.len());
    }
    if b.is_empty() {
        return Ok(a.len());
    }
    // Narrowest cell that can hold every distance, picked before any
    // allocation.
    let bound = a.len().max(b.len()) + 1;
    if bound < 1 << 8 {
        byte_distance::<u8, A>(a, b, alloc)
    } else if bound < 1 << 16 {
        byte_distance::<u16, A>(a, b, alloc)
    } else {
        byte_distance::<usize, A>(a, b, alloc)
    }
}

/// Levenshtein edit distance in runes over UTF-8 inputs.
///
/// Pure-ASCII inputs take the byte-level path unchanged; anything else is
/// transcoded to UTF-32 inside the scratch allocation and scored over
/// 32-bit runes.  Invalid UTF-8 fails before any DP work.
pub fn levenshtein_utf8<A: ScratchAllocator + ?Sized>(
    a: &[u8],
    b: &[u8],
    alloc: &A,
) -> Result<usize, SimilarityError> {
    if is_ascii(a) && is_ascii(b) {
        return levenshtein(a, b, alloc);
    }
    let runes_a = utf8::rune_count(a).ok_or(SimilarityError::InvalidUtf8)?;
    let runes_b = utf8::rune_count(b).ok_or(SimilarityError::InvalidUtf8)?;
    if runes_a == 0 {
        return Ok(runes_b);
    }
    if runes_b == 0 {
        return Ok(runes_a);
    }
    let bound = runes_a.max(runes_b) + 1;
    if bound < 1 << 8 {
        rune_distance::<u8, A>(a, b, runes_a, runes_b, alloc)
    } else if bound < 1 << 16 {
        rune_distance::<u16, A>(a, b, runes_a, runes_b, alloc)
    } else {
        rune_distance::<usize, A>(a, b, runes_a, runes_b, alloc)
    }
}

/// Both inputs non-empty; cell width already selected.
fn byte_distance<C: DiagonalCell, A: ScratchAllocator + ?Sized>(
    a: &[u8],
    b: &[u8],
    alloc: &A,
) -> Result<usize, SimilarityError> {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let s = shorter.len();
    let cap_s = s + 1;

    let rev_bytes = round_up(s);
    let diag_bytes = round_up(cap_s * size_of::<C>());
    let scratch = Scratch::new(alloc, rev_bytes + 3 * diag_bytes)?;

    // Safety: the block is 8-aligned and zero-initialized; the carved
    // regions are disjoint by construction and sized exactly as computed
    // above.
    unsafe {
        let base = scratch.as_ptr();
        let rev = std::slice::from_raw_parts_mut(base, s);
        for (slot, &byte) in rev.iter_mut().zip(shorter.iter().rev()) {
            *slot = byte;
        }
        let prev = std::slice::from_raw_parts_mut(base.add(rev_bytes) as *mut C, cap_s);
        let cur = std::slice::from_raw_parts_mut(base.add(rev_bytes + diag_bytes) as *mut C, cap_s);
        let next =
            std::slice::from_raw_parts_mut(base.add(rev_bytes + 2 * diag_bytes) as *mut C, cap_s);
        Ok(diagonal::levenshtein_kernel(rev, longer, prev, cur, next))
    }
}

/// Rune-level distance: transcode buffers and diagonal buffers share one
/// scratch block.
fn rune_distance<C: DiagonalCell, A: ScratchAllocator + ?Sized>(
    a: &[u8],
    b: &[u8],
    runes_a: usize,
    runes_b: usize,
    alloc: &A,
) -> Result<usize, SimilarityError> {
    let s = runes_a.min(runes_b);
    let cap_s = s + 1;

    let a_bytes = round_up(runes_a * size_of::<u32>());
    let b_bytes = round_up(runes_b * size_of::<u32>());
    let rev_bytes = round_up(s * size_of::<u32>());
    let diag_bytes = round_up(cap_s * size_of::<C>());
    let scratch = Scratch::new(alloc, a_bytes + b_bytes + rev_bytes + 3 * diag_bytes)?;

    // Safety: same carving discipline as `byte_distance`; both inputs
    // were validated by `rune_count`.
    unsafe {
        let base = scratch.as_ptr();
        let decoded_a = std::slice::from_raw_parts_mut(base as *mut u32, runes_a);
        let decoded_b = std::slice::from_raw_parts_mut(base.add(a_bytes) as *mut u32, runes_b);
        utf8::transcode(a, decoded_a);
        utf8::transcode(b, decoded_b);
        let (shorter, longer) = if runes_a <= runes_b {
            (&*decoded_a, &*decoded_b)
        } else {
            (&*decoded_b, &*decoded_a)
        };

        let rev_base = base.add(a_bytes + b_bytes);
        let rev = std::slice::from_raw_parts_mut(rev_base as *mut u32, s);
        for (slot, &rune) in rev.iter_mut().zip(shorter.iter().rev()) {
            *slot = rune;
        }
        let diag_base = base.add(a_bytes + b_bytes + rev_bytes);
        let prev = std::slice::from_raw_parts_mut(diag_base as *mut C, cap_s);
        let cur = std::slice::from_raw_parts_mut(diag_base.add(diag_bytes) as *mut C, cap_s);
        let next = std::slice::from_raw_parts_mut(diag_base.add(2 * diag_bytes) as *mut C, cap_s);
        Ok(diagonal::levenshtein_kernel(rev, longer, prev, cur, next))
    }
}

// ---------------------------------------------------------------------------
// Alignment scores
// ---------------------------------------------------------------------------

/// Global (Needleman-Wunsch style) alignment cost.
///
/// Minimizes the summed substitution and gap costs over a full alignment
/// of both spans.  With `SubstitutionMatrix::uniform(0, 1)` and `gap = 1`
/// the result equals [`levenshtein`].  An empty input costs the other's
/// length times `gap`.
pub fn needleman_wunsch<A: ScratchAllocator + ?Sized>(
    a: &[u8],
    b: &[u8],
    subs: &SubstitutionMatrix,
    gap: i8,
    alloc: &A,
) -> Result<isize, SimilarityError> {
    if a.is_empty() || b.is_empty() {
        return Ok(a.len().max(b.len()) as isize * gap as isize);
    }
    alignment::<false, A>(a, b, subs, gap, alloc)
}

/// Local (Smith-Waterman style) alignment score.
///
/// Maximizes the score of the best-scoring pair of substrings; cells are
/// floored at zero, so two unrelated inputs score `0`.  Matches should
/// score positive and mismatches/gaps negative for the maximum to be
/// meaningful.
pub fn smith_waterman<A: ScratchAllocator + ?Sized>(
    a: &[u8],
    b: &[u8],
    subs: &SubstitutionMatrix,
    gap: i8,
    alloc: &A,
) -> Result<isize, SimilarityError> {
    if a.is_empty() || b.is_empty() {
        return Ok(0);
    }
    alignment::<true, A>(a, b, subs, gap, alloc)
}

fn alignment<const LOCAL: bool, A: ScratchAllocator + ?Sized>(
    a: &[u8],
    b: &[u8],
    subs: &SubstitutionMatrix,
    gap: i8,
    alloc: &A,
) -> Result<isize, SimilarityError> {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let s = shorter.len();
    let cap_s = s + 1;

    let rev_bytes = round_up(s);
    let diag_bytes = round_up(cap_s * size_of::<isize>());
    let scratch = Scratch::new(alloc, rev_bytes + 3 * diag_bytes)?;

    // Safety: same carving discipline as `byte_distance`.
    unsafe {
        let base = scratch.as_ptr();
        let rev = std::slice::from_raw_parts_mut(base, s);
        for (slot, &byte) in rev.iter_mut().zip(shorter.iter().rev()) {
            *slot = byte;
        }
        let prev = std::slice::from_raw_parts_mut(base.add(rev_bytes) as *mut isize, cap_s);
        let cur =
            std::slice::from_raw_parts_mut(base.add(rev_bytes + diag_bytes) as *mut isize, cap_s);
        let next = std::slice::from_raw_parts_mut(
            base.add(rev_bytes + 2 * diag_bytes) as *mut isize,
            cap_s,
        );
        Ok(diagonal::alignment_kernel::<LOCAL>(
            rev,
            longer,
            subs,
            gap as isize,
            prev,
            cur,
            next,
        ))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[inline(always)]
fn round_up(bytes: usize) -> usize {
    (bytes + SCRATCH_ALIGN - 1) & !(SCRATCH_ALIGN - 1)
}

/// Whether the span is pure 7-bit ASCII, via the dispatched byte-set
/// scan.
fn is_ascii(data: &[u8]) -> bool {
    let mut non_ascii = ByteSet::ascii();
    non_ascii.invert();
    find_byteset(data, &non_ascii).is_none()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
