// Substring search, forward and reverse.
//
// The scalar forward path picks an algorithm by needle length:
//
//   1        -> single-byte search
//   2..=4    -> SWAR multi-lane scan (little-endian only)
//   5..=8    -> SWAR scan on the 4-byte prefix + suffix verification
//   9..=256  -> Horspool with a Raita 4-byte packed prefilter
//   > 256    -> Horspool on the 256-byte prefix + full verification
//
// When a vector backend is bound, the whole ladder is replaced by a
// three-anchor prefilter: the bytes at the Raita anomaly offsets are
// broadcast into three registers and candidate windows surviving the
// AND of the three equality masks are verified individually.
//
// Reverse search mirrors Horspool with the shift table keyed on the first
// byte of the window; single-byte needles use the vector byte search.

use std::sync::OnceLock;

use crate::capability::{Capability, capabilities};
use crate::compare::equal_serial;
use crate::search::byte::{find_byte, find_byte_serial, rfind_byte, rfind_byte_serial};
use crate::swar;

type FindFn = fn(&[u8], &[u8]) -> Option<usize>;

/// Offset of the first occurrence of `needle` in `haystack`.
///
/// An empty needle never matches.  A needle longer than the haystack
/// returns `None` without reading the haystack.
#[inline]
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    if needle.len() == 1 {
        return find_byte(haystack, needle[0]);
    }
    find_dispatch()(haystack, needle)
}

/// Offset of the last occurrence of `needle` in `haystack`.
///
/// Same edge-case contract as [`find`].
#[inline]
pub fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    if needle.len() == 1 {
        return rfind_byte(haystack, needle[0]);
    }
    rfind_horspool(haystack, needle)
}

#[inline]
fn find_dispatch() -> FindFn {
    static DISPATCH: OnceLock<FindFn> = OnceLock::new();
    *DISPATCH.get_or_init(|| {
        let caps = capabilities();
        #[cfg(target_arch = "x86_64")]
        {
            if caps.contains(Capability::SKYLAKE) {
                return find_avx512_call;
            }
            if caps.contains(Capability::HASWELL) {
                return find_avx2_call;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if caps.contains(Capability::NEON) {
                return find_neon_call;
            }
        }
        let _ = caps;
        find_serial_inner
    })
}

// ---------------------------------------------------------------------------
// Scalar ladder
// ---------------------------------------------------------------------------

/// Scalar reference implementation of [`find`].
pub fn find_serial(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    if needle.len() == 1 {
        return find_byte_serial(haystack, needle[0]);
    }
    find_serial_inner(haystack, needle)
}

/// Scalar reference implementation of [`rfind`].
pub fn rfind_serial(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    if needle.len() == 1 {
        return rfind_byte_serial(haystack, needle[0]);
    }
    rfind_horspool(haystack, needle)
}

fn find_serial_inner(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    debug_assert!(needle.len() >= 2 && needle.len() <= haystack.len());
    match needle.len() {
        #[cfg(target_endian = "little")]
        2..=4 => find_swar_scan(haystack, needle),
        #[cfg(target_endian = "little")]
        5..=8 => find_swar_prefilter(haystack, needle),
        n if n <= 256 => find_horspool(haystack, needle),
        _ => find_long(haystack, needle),
    }
}

/// SWAR scan for needles of 2 to 4 bytes: the needle is broadcast across
/// a 64-bit pattern word at its natural lane stride and four shifted views
/// of the haystack are lane-compared against it, covering eight candidate
/// positions per iteration.
#[cfg(target_endian = "little")]
fn find_swar_scan(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let n = needle.len();
    let len = haystack.len();
    debug_assert!((2..=4).contains(&n));

    let mut i = 0;
    match n {
        2 => {
            let pattern = (swar::load_u16(needle) as u64).wrapping_mul(0x0001_0001_0001_0001);
            while i + 9 <= len {
                let even = swar::each_2byte_equal(swar::load_u64(&haystack[i..]), pattern);
                let odd = swar::each_2byte_equal(swar::load_u64(&haystack[i + 1..]), pattern);
                if even | odd != 0 {
                    let pe = if even != 0 {
                        (even.trailing_zeros() / 16) as usize * 2
                    } else {
                        usize::MAX
                    };
                    let po = if odd != 0 {
                        (odd.trailing_zeros() / 16) as usize * 2 + 1
                    } else {
                        usize::MAX
                    };
                    return Some(i + pe.min(po));
                }
                i += 8;
            }
        }
        3 | 4 => {
            let lane_mask: u64 = if n == 3 {
                0x00FF_FFFF_00FF_FFFF
            } else {
                !0
            };
            let seed = if n == 3 {
                swar::load_u32(&[needle[0], needle[1], needle[2], 0]) as u64
            } else {
                swar::load_u32(needle) as u64
            };
            let pattern = seed.wrapping_mul(0x0000_0001_0000_0001);
            while i + 11 <= len {
                let mut candidates = 0u32;
                for view in 0..4usize {
                    let word = swar::load_u64(&haystack[i + view..]) & lane_mask;
                    let mask = swar::each_4byte_equal(word, pattern);
                    if mask & 0x8000_0000 != 0 {
                        candidates |= 1 << view;
                    }
                    if mask & 0x8000_0000_0000_0000 != 0 {
                        candidates |= 1 << (view + 4);
                    }
                }
                if candidates != 0 {
                    return Some(i + candidates.trailing_zeros() as usize);
                }
                i += 8;
            }
        }
        _ => unreachable!(),
    }

    // Tail positions, one at a time.
    while i + n <= len {
        if equal_serial(&haystack[i..i + n], needle) {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// SWAR scan for needles of 5 to 8 bytes: the 4-byte prefix runs the lane
/// scan above and surviving candidates verify the suffix.
#[cfg(target_endian = "little")]
fn find_swar_prefilter(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let n = needle.len();
    let len = haystack.len();
    debug_assert!((5..=8).contains(&n));

    let pattern = (swar::load_u32(needle) as u64).wrapping_mul(0x0000_0001_0000_0001);
    let limit = 7 + n; // worst candidate in a window is i+7
    let mut i = 0;

    while i + limit <= len {
        let mut candidates = 0u32;
        for view in 0..4usize {
            let mask = swar::each_4byte_equal(swar::load_u64(&haystack[i + view..]), pattern);
            if mask & 0x8000_0000 != 0 {
                candidates |= 1 << view;
            }
            if mask & 0x8000_0000_0000_0000 != 0 {
                candidates |= 1 << (view + 4);
            }
        }
        while candidates != 0 {
            let pos = i + candidates.trailing_zeros() as usize;
            if equal_serial(&haystack[pos + 4..pos + n], &needle[4..]) {
                return Some(pos);
            }
            candidates &= candidates - 1;
        }
        i += 8;
    }

    while i + n <= len {
        if equal_serial(&haystack[i..i + n], needle) {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Needles beyond 256 bytes: locate the 256-byte prefix with Horspool,
/// then verify the remainder.
fn find_long(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let n = needle.len();
    let len = haystack.len();
    debug_assert!(n > 256 && n <= len);

    let prefix = &needle[..256];
    // Any viable position leaves room for the whole needle.
    let region = &haystack[..len - n + 256];
    let mut base = 0;

    while base + 256 <= region.len() {
        let pos = base + find_horspool(&region[base..], prefix)?;
        if equal_serial(&haystack[pos + 256..pos + n], &needle[256..]) {
            return Some(pos);
        }
        base = pos + 1;
    }
    None
}

// ---------------------------------------------------------------------------
// Horspool
// ---------------------------------------------------------------------------

/// Bad-character shift table for forward scans: how far the window may
/// skip when a given byte is observed under its trailing edge.
fn build_forward_table(needle: &[u8]) -> [u8; 256] {
    let n = needle.len();
    debug_assert!(n >= 2 && n <= 256);

    let mut table = [0u8; 256];
    let fill = swar::broadcast(n.min(255) as u8);
    for chunk in table.chunks_exact_mut(8) {
        chunk.copy_from_slice(&fill.to_ne_bytes());
    }
    for (i, &byte) in needle[..n - 1].iter().enumerate() {
        table[byte as usize] = (n - i - 1) as u8;
    }
    table
}

/// Reverse-scan shift table: for each byte, the smallest positive needle
/// index holding it.  Needles beyond 256 bytes key on their prefix; the
/// capped default shift stays conservative.
fn build_reverse_table(needle: &[u8]) -> [u8; 256] {
    let scope = &needle[..needle.len().min(256)];
    let n = scope.len();

    let mut table = [0u8; 256];
    let fill = swar::broadcast(n.min(255) as u8);
    for chunk in table.chunks_exact_mut(8) {
        chunk.copy_from_slice(&fill.to_ne_bytes());
    }
    for i in (1..n).rev() {
        table[scope[i] as usize] = i as u8;
    }
    table
}

/// Horspool forward scan with the Raita prefilter: only the bytes at
/// `first`, `first+1`, `mid` and `last` are compared (as one packed u32)
/// before a full verification is attempted.
fn find_horspool(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let n = needle.len();
    let len = haystack.len();
    debug_assert!(n >= 2 && n <= 256 && n <= len);

    let table = build_forward_table(needle);
    let (first, mid, last) = anomaly_offsets(needle);
    let probe = u32::from_ne_bytes([needle[first], needle[first + 1], needle[mid], needle[last]]);

    let mut pos = 0;
    while pos + n <= len {
        let window = &haystack[pos..];
        let sample = u32::from_ne_bytes([
            window[first],
            window[first + 1],
            window[mid],
            window[last],
        ]);
        if sample == probe && equal_serial(&window[..n], needle) {
            return Some(pos);
        }
        pos += table[window[n - 1] as usize] as usize;
    }
    None
}

/// Horspool mirrored for reverse scans: windows walk from the end and the
/// shift is keyed on the first byte of the window.
fn rfind_horspool(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let n = needle.len();
    let len = haystack.len();
    debug_assert!(n >= 2 && n <= len);

    let table = build_reverse_table(needle);
    let (first, mid, last) = anomaly_offsets(needle);
    let probe = u32::from_ne_bytes([needle[first], needle[first + 1], needle[mid], needle[last]]);

    let mut pos = len - n;
    loop {
        let window = &haystack[pos..];
        let sample = u32::from_ne_bytes([
            window[first],
            window[first + 1],
            window[mid],
            window[last],
        ]);
        if sample == probe && equal_serial(&window[..n], needle) {
            return Some(pos);
        }
        let shift = table[window[0] as usize] as usize;
        if pos < shift {
            return None;
        }
        pos -= shift;
    }
}

// ---------------------------------------------------------------------------
// Anomaly selection
// ---------------------------------------------------------------------------

/// Pick the three needle offsets compared before full verification.
///
/// Starting from `(0, n/2, n-1)`, duplicate anchor bytes are pushed apart
/// so a random window fails the probe as early as possible; for longer
/// needles the first two anchors additionally avoid UTF-8 lead bytes
/// (values >= 192), which concentrate on far fewer distinct values than
/// ASCII or continuation bytes.
fn anomaly_offsets(needle: &[u8]) -> (usize, usize, usize) {
    let n = needle.len();
    let mut first = 0usize;
    let mut mid = n / 2;
    let mut last = n - 1;

    if n > 3 {
        while mid + 1 < last && needle[mid] == needle[first] {
            mid += 1;
        }
        while last > mid + 1 && (needle[last] == needle[first] || needle[last] == needle[mid]) {
            last -= 1;
        }
    }
    if n > 8 {
        while first + 1 < mid && needle[first] >= 192 {
            first += 1;
        }
        while mid + 1 < last && needle[mid] >= 192 {
            mid += 1;
        }
    }
    (first, mid, last)
}

// ---------------------------------------------------------------------------
// AVX2 prefilter
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
#[inline]
fn find_avx2_call(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { find_avx2(haystack, needle) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn find_avx2(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    use std::arch::x86_64::*;
    let n = needle.len();
    let len = haystack.len();
    debug_assert!(n >= 2 && n <= len);

    let (first, mid, last) = anomaly_offsets(needle);
    let mut i = 0;

    unsafe {
        let vf = _mm256_set1_epi8(needle[first] as i8);
        let vm = _mm256_set1_epi8(needle[mid] as i8);
        let vl = _mm256_set1_epi8(needle[last] as i8);

        while i + n + 31 <= len {
            let cf = _mm256_loadu_si256(haystack.as_ptr().add(i + first) as *const __m256i);
            let cm = _mm256_loadu_si256(haystack.as_ptr().add(i + mid) as *const __m256i);
            let cl = _mm256_loadu_si256(haystack.as_ptr().add(i + last) as *const __m256i);
            let eq = _mm256_and_si256(
                _mm256_and_si256(_mm256_cmpeq_epi8(cf, vf), _mm256_cmpeq_epi8(cm, vm)),
                _mm256_cmpeq_epi8(cl, vl),
            );
            let mut mask = _mm256_movemask_epi8(eq) as u32;
            while mask != 0 {
                let pos = i + mask.trailing_zeros() as usize;
                if equal_serial(&haystack[pos..pos + n], needle) {
                    return Some(pos);
                }
                mask &= mask - 1;
            }
            i += 32;
        }
    }
    find_serial_tail(haystack, needle, i)
}

// ---------------------------------------------------------------------------
// AVX-512 prefilter
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
#[inline]
fn find_avx512_call(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { find_avx512(haystack, needle) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw,avx512vl")]
unsafe fn find_avx512(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    use std::arch::x86_64::*;
    let n = needle.len();
    let len = haystack.len();
    debug_assert!(n >= 2 && n <= len);

    let (first, mid, last) = anomaly_offsets(needle);
    let candidates_total = len - n + 1;

    unsafe {
        let vf = _mm512_set1_epi8(needle[first] as i8);
        let vm = _mm512_set1_epi8(needle[mid] as i8);
        let vl = _mm512_set1_epi8(needle[last] as i8);

        // Short needles verify with a single masked compare against a
        // preloaded needle register.
        let needle_mask: __mmask64 = if n >= 64 { !0 } else { (1u64 << n) - 1 };
        let needle_vec = if n <= 64 {
            _mm512_maskz_loadu_epi8(needle_mask, needle.as_ptr() as *const i8)
        } else {
            _mm512_setzero_si512()
        };

        let mut i = 0;
        while i < candidates_total {
            let rem = candidates_total - i;
            let load = if rem >= 64 { !0u64 } else { (1u64 << rem) - 1 };
            let cf = _mm512_maskz_loadu_epi8(load, haystack.as_ptr().add(i + first) as *const i8);
            let cm = _mm512_maskz_loadu_epi8(load, haystack.as_ptr().add(i + mid) as *const i8);
            let cl = _mm512_maskz_loadu_epi8(load, haystack.as_ptr().add(i + last) as *const i8);

            let mut mask = _mm512_cmpeq_epi8_mask(cf, vf)
                & _mm512_cmpeq_epi8_mask(cm, vm)
                & _mm512_cmpeq_epi8_mask(cl, vl)
                & load;
            while mask != 0 {
                let pos = i + mask.trailing_zeros() as usize;
                if n <= 3 {
                    // The three anchors cover the whole needle.
                    return Some(pos);
                }
                if n <= 64 {
                    let cand = _mm512_maskz_loadu_epi8(
                        needle_mask,
                        haystack.as_ptr().add(pos) as *const i8,
                    );
                    if _mm512_mask_cmpneq_epi8_mask(needle_mask, cand, needle_vec) == 0 {
                        return Some(pos);
                    }
                } else if equal_serial(&haystack[pos..pos + n], needle) {
                    return Some(pos);
                }
                mask &= mask - 1;
            }
            i += 64;
        }
    }
    None
}

// ---------------------------------------------------------------------------
// NEON prefilter
// ---------------------------------------------------------------------------

#[cfg(target_arch = "aarch64")]
#[inline]
fn find_neon_call(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    // Safety: NEON is mandatory on aarch64.
    unsafe { find_neon(haystack, needle) }
}

#[cfg(target_arch = "aarch64")]
unsafe fn find_neon(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    use std::arch::aarch64::*;

    use super::byte::neon_nibble_mask;

    let n = needle.len();
    let len = haystack.len();
    debug_assert!(n >= 2 && n <= len);

    let (first, mid, last) = anomaly_offsets(needle);
    let mut i = 0;

    unsafe {
        let vf = vdupq_n_u8(needle[first]);
        let vm = vdupq_n_u8(needle[mid]);
        let vl = vdupq_n_u8(needle[last]);

        while i + n + 15 <= len {
            let cf = vld1q_u8(haystack.as_ptr().add(i + first));
            let cm = vld1q_u8(haystack.as_ptr().add(i + mid));
            let cl = vld1q_u8(haystack.as_ptr().add(i + last));
            let eq = vandq_u8(vandq_u8(vceqq_u8(cf, vf), vceqq_u8(cm, vm)), vceqq_u8(cl, vl));
            let mut mask = neon_nibble_mask(eq);
            while mask != 0 {
                let pos = i + (mask.trailing_zeros() / 4) as usize;
                if equal_serial(&haystack[pos..pos + n], needle) {
                    return Some(pos);
                }
                mask &= mask - 1;
            }
            i += 16;
        }
    }
    find_serial_tail(haystack, needle, i)
}

/// Finish a vector scan: candidates from `from` onwards run the scalar
/// ladder on the remaining suffix.
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
fn find_serial_tail(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    find_serial(&haystack[from..], needle).map(|p| from + p)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_needle_never_matches() {
        assert_eq!(find(b"abc", b""), None);
        assert_eq!(rfind(b"abc", b""), None);
        assert_eq!(find(b"", b""), None);
        assert_eq!(find_serial(b"abc", b""), None);
    }

    #[test]
    fn needle_longer_than_haystack() {
        assert_eq!(find(b"ab", b"abc"), None);
        assert_eq!(rfind(b"ab", b"abc"), None);
    }

    #[test]
    fn needle_equals_haystack() {
        let data = b"exact match of the whole buffer";
        assert_eq!(find(data, data), Some(0));
        assert_eq!(rfind(data, data), Some(0));
    }

    #[test]
    fn scenario_offsets() {
        assert_eq!(find(b"abcdefghij", b"def"), Some(3));
        assert_eq!(rfind(b"abcdefghij", b"def"), Some(3));
        assert_eq!(find(b"aXbXcXdXeXfXgXhXiXj", b"X"), Some(1));
        assert_eq!(rfind(b"aXbXcXdXeXfXgXhXiXj", b"X"), Some(17));
    }

    #[test]
    fn match_at_both_extremes() {
        for n in [2usize, 3, 4, 6, 8, 12, 40] {
            let needle: Vec<u8> = (1..=n as u8).collect();
            let mut hay = vec![0u8; 120];
            hay[..n].copy_from_slice(&needle);
            assert_eq!(find(&hay, &needle), Some(0), "head, n={n}");
            assert_eq!(find_serial(&hay, &needle), Some(0), "serial head, n={n}");

            let mut hay = vec![0u8; 120];
            let at = hay.len() - n;
            hay[at..].copy_from_slice(&needle);
            assert_eq!(find(&hay, &needle), Some(at), "tail, n={n}");
            assert_eq!(rfind(&hay, &needle), Some(at), "rfind tail, n={n}");
            assert_eq!(find_serial(&hay, &needle), Some(at), "serial tail, n={n}");
        }
    }

    #[test]
    fn overlapping_period_needle() {
        assert_eq!(find(b"aaaaaab", b"aaab"), Some(3));
        assert_eq!(rfind(b"aaaaaab", b"aaab"), Some(3));
        assert_eq!(find(b"aaaa", b"aa"), Some(0));
        assert_eq!(rfind(b"aaaa", b"aa"), Some(2));
        assert_eq!(find_serial(b"aaaa", b"aa"), Some(0));
        assert_eq!(rfind_serial(b"aaaa", b"aa"), Some(2));
    }

    #[test]
    fn uniform_byte_needle() {
        let hay = b"xxxxxxaaaaaxxxxxx";
        assert_eq!(find(hay, b"aaaaa"), Some(6));
        assert_eq!(rfind(hay, b"aaaaa"), Some(6));
        assert_eq!(find(hay, b"aaaaaa"), None);
    }

    #[test]
    fn every_length_class_and_position() {
        // A distinct-byte needle planted at every position, for a needle
        // in each length class of the scalar ladder.
        for n in [2usize, 3, 4, 5, 7, 8, 9, 16, 63, 100] {
            let needle: Vec<u8> = (0..n).map(|k| 0x80u8.wrapping_add(k as u8)).collect();
            let hay_len = n + 90;
            for pos in 0..=hay_len - n {
                let mut hay = vec![b'.'; hay_len];
                hay[pos..pos + n].copy_from_slice(&needle);
                assert_eq!(find(&hay, &needle), Some(pos), "n={n} pos={pos}");
                assert_eq!(find_serial(&hay, &needle), Some(pos), "serial n={n} pos={pos}");
                assert_eq!(rfind(&hay, &needle), Some(pos), "rfind n={n} pos={pos}");
            }
        }
    }

    #[test]
    fn long_needle_past_prefix_length() {
        // Needle longer than 256 bytes with a decoy sharing the prefix.
        let mut needle: Vec<u8> = (0..300).map(|k| (k % 251) as u8).collect();
        needle[299] = 0xFE;
        let mut hay = vec![0u8; 1000];
        // Decoy: matching 256-byte prefix, diverging afterwards.
        hay[100..400].copy_from_slice(&needle);
        hay[399] = 0x00;
        // Real match further on.
        hay[500..800].copy_from_slice(&needle);
        assert_eq!(find(&hay, &needle), Some(500));
        assert_eq!(find_serial(&hay, &needle), Some(500));
        assert_eq!(rfind(&hay, &needle), Some(500));
    }

    #[test]
    fn first_and_last_occurrence_of_repeated_pattern() {
        let hay = b"__lorem_ipsum__lorem_ipsum__lorem__";
        assert_eq!(find(hay, b"lorem"), Some(2));
        assert_eq!(rfind(hay, b"lorem"), Some(28));
        assert_eq!(find(hay, b"ipsum"), Some(8));
        assert_eq!(rfind(hay, b"ipsum"), Some(21));
    }

    #[test]
    fn anomaly_offsets_are_ordered_and_distinct_where_possible() {
        let (f, m, l) = anomaly_offsets(b"abcdefgh");
        assert!(f < m && m < l);

        // Repeated head byte pushes mid off the duplicate.
        let needle = b"aaaaaaaaaaaab";
        let (f, m, l) = anomaly_offsets(needle);
        assert!(f < m && m <= l);
        assert_eq!(l, needle.len() - 1);

        // UTF-8 lead bytes are avoided for the first two anchors when
        // alternatives exist.
        let needle = "ééééabcdef".as_bytes();
        let (f, m, _) = anomaly_offsets(needle);
        assert!(needle[f] < 192 || f + 1 >= m);
        assert!(needle[m] < 192 || m + 1 >= needle.len() - 1);
    }

    #[test]
    fn utf8_needles() {
        let hay = "caffè macchiato, caffè latte".as_bytes();
        let needle = "caffè".as_bytes();
        assert_eq!(find(hay, needle), Some(0));
        assert_eq!(rfind(hay, needle), Some(17));
    }

    #[test]
    fn serial_agrees_with_dispatch_on_random_data() {
        let mut state = 0x0BAD_CAFE_u64;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 33) as u8 & 0x03
        };
        let hay: Vec<u8> = (0..4096).map(|_| next()).collect();
        for n in [2usize, 3, 4, 5, 8, 9, 13, 32, 64, 257] {
            for start in [0usize, 17, 1000, 3000] {
                let needle = &hay[start..start + n];
                assert_eq!(
                    find(&hay, needle),
                    find_serial(&hay, needle),
                    "find n={n} start={start}"
                );
                assert_eq!(
                    rfind(&hay, needle),
                    rfind_serial(&hay, needle),
                    "rfind n={n} start={start}"
                );
            }
        }
    }
}
