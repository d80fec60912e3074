// Single-byte search, forward and reverse.
//
// Scalar path broadcasts the needle across a 64-bit word and inspects
// eight bytes per step; vector paths widen that to 32 (AVX2), 64
// (AVX-512, masked tail folded into the loop) or 16 bytes (NEON, where a
// shift-narrow stands in for the missing movemask).

use std::sync::OnceLock;

use crate::capability::{Capability, capabilities};
use crate::swar;

type FindByteFn = fn(&[u8], u8) -> Option<usize>;

/// Offset of the first occurrence of `byte` in `haystack`.
#[inline]
pub fn find_byte(haystack: &[u8], byte: u8) -> Option<usize> {
    find_byte_dispatch()(haystack, byte)
}

/// Offset of the last occurrence of `byte` in `haystack`.
#[inline]
pub fn rfind_byte(haystack: &[u8], byte: u8) -> Option<usize> {
    rfind_byte_dispatch()(haystack, byte)
}

#[inline]
fn find_byte_dispatch() -> FindByteFn {
    static DISPATCH: OnceLock<FindByteFn> = OnceLock::new();
    *DISPATCH.get_or_init(|| {
        let caps = capabilities();
        #[cfg(target_arch = "x86_64")]
        {
            if caps.contains(Capability::SKYLAKE) {
                return find_byte_avx512_call;
            }
            if caps.contains(Capability::HASWELL) {
                return find_byte_avx2_call;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if caps.contains(Capability::NEON) {
                return find_byte_neon_call;
            }
        }
        let _ = caps;
        find_byte_serial
    })
}

#[inline]
fn rfind_byte_dispatch() -> FindByteFn {
    static DISPATCH: OnceLock<FindByteFn> = OnceLock::new();
    *DISPATCH.get_or_init(|| {
        let caps = capabilities();
        #[cfg(target_arch = "x86_64")]
        {
            if caps.contains(Capability::SKYLAKE) {
                return rfind_byte_avx512_call;
            }
            if caps.contains(Capability::HASWELL) {
                return rfind_byte_avx2_call;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if caps.contains(Capability::NEON) {
                return rfind_byte_neon_call;
            }
        }
        let _ = caps;
        rfind_byte_serial
    })
}

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Scalar forward scan, eight bytes per step.
pub fn find_byte_serial(haystack: &[u8], byte: u8) -> Option<usize> {
    let n = haystack.len();
    let pattern = swar::broadcast(byte);
    let mut i = 0;

    while i + 8 <= n {
        let mask = swar::each_byte_equal(swar::load_u64(&haystack[i..]), pattern);
        if mask != 0 {
            return Some(i + swar::first_match_lane(mask));
        }
        i += 8;
    }
    while i < n {
        if haystack[i] == byte {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Scalar reverse scan, eight bytes per step from the end.
pub fn rfind_byte_serial(haystack: &[u8], byte: u8) -> Option<usize> {
    let pattern = swar::broadcast(byte);
    let mut i = haystack.len();

    while i >= 8 {
        let mask = swar::each_byte_equal(swar::load_u64(&haystack[i - 8..]), pattern);
        if mask != 0 {
            return Some(i - 8 + swar::last_match_lane(mask));
        }
        i -= 8;
    }
    while i > 0 {
        i -= 1;
        if haystack[i] == byte {
            return Some(i);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// AVX2
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
#[inline]
fn find_byte_avx2_call(haystack: &[u8], byte: u8) -> Option<usize> {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { find_byte_avx2(haystack, byte) }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn rfind_byte_avx2_call(haystack: &[u8], byte: u8) -> Option<usize> {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { rfind_byte_avx2(haystack, byte) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn find_byte_avx2(haystack: &[u8], byte: u8) -> Option<usize> {
    use std::arch::x86_64::*;
    let n = haystack.len();
    let mut i = 0;

    unsafe {
        let pattern = _mm256_set1_epi8(byte as i8);
        while i + 32 <= n {
            let chunk = _mm256_loadu_si256(haystack.as_ptr().add(i) as *const __m256i);
            let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(chunk, pattern)) as u32;
            if mask != 0 {
                return Some(i + mask.trailing_zeros() as usize);
            }
            i += 32;
        }
    }
    find_byte_serial(&haystack[i..], byte).map(|p| i + p)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn rfind_byte_avx2(haystack: &[u8], byte: u8) -> Option<usize> {
    use std::arch::x86_64::*;
    let mut i = haystack.len();

    unsafe {
        let pattern = _mm256_set1_epi8(byte as i8);
        while i >= 32 {
            let chunk = _mm256_loadu_si256(haystack.as_ptr().add(i - 32) as *const __m256i);
            let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(chunk, pattern)) as u32;
            if mask != 0 {
                return Some(i - 32 + 31 - mask.leading_zeros() as usize);
            }
            i -= 32;
        }
    }
    rfind_byte_serial(&haystack[..i], byte)
}

// ---------------------------------------------------------------------------
// AVX-512
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
#[inline]
fn find_byte_avx512_call(haystack: &[u8], byte: u8) -> Option<usize> {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { find_byte_avx512(haystack, byte) }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn rfind_byte_avx512_call(haystack: &[u8], byte: u8) -> Option<usize> {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { rfind_byte_avx512(haystack, byte) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw,avx512vl")]
unsafe fn find_byte_avx512(haystack: &[u8], byte: u8) -> Option<usize> {
    use std::arch::x86_64::*;
    let n = haystack.len();
    let mut i = 0;

    unsafe {
        let pattern = _mm512_set1_epi8(byte as i8);
        while i < n {
            let rem = n - i;
            let load = if rem >= 64 { !0u64 } else { (1u64 << rem) - 1 };
            let chunk = _mm512_maskz_loadu_epi8(load, haystack.as_ptr().add(i) as *const i8);
            let mask = _mm512_cmpeq_epi8_mask(chunk, pattern) & load;
            if mask != 0 {
                return Some(i + mask.trailing_zeros() as usize);
            }
            i += 64;
        }
    }
    None
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw,avx512vl")]
unsafe fn rfind_byte_avx512(haystack: &[u8], byte: u8) -> Option<usize> {
    use std::arch::x86_64::*;
    let mut end = haystack.len();

    unsafe {
        let pattern = _mm512_set1_epi8(byte as i8);
        while end > 0 {
            let chunk_len = end.min(64);
            let start = end - chunk_len;
            let load = if chunk_len == 64 {
                !0u64
            } else {
                (1u64 << chunk_len) - 1
            };
            let chunk = _mm512_maskz_loadu_epi8(load, haystack.as_ptr().add(start) as *const i8);
            let mask = _mm512_cmpeq_epi8_mask(chunk, pattern) & load;
            if mask != 0 {
                return Some(start + 63 - mask.leading_zeros() as usize);
            }
            end = start;
        }
    }
    None
}

// ---------------------------------------------------------------------------
// NEON
// ---------------------------------------------------------------------------

#[cfg(target_arch = "aarch64")]
#[inline]
fn find_byte_neon_call(haystack: &[u8], byte: u8) -> Option<usize> {
    // Safety: NEON is mandatory on aarch64.
    unsafe { find_byte_neon(haystack, byte) }
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn rfind_byte_neon_call(haystack: &[u8], byte: u8) -> Option<usize> {
    // Safety: NEON is mandatory on aarch64.
    unsafe { rfind_byte_neon(haystack, byte) }
}

/// Compress a byte-equality vector into a 64-bit value with one nibble per
/// lane, bit 3 of each nibble set on a match.  NEON has no movemask; the
/// shift-narrow produces the same information four bits at a time.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
pub(crate) unsafe fn neon_nibble_mask(eq: std::arch::aarch64::uint8x16_t) -> u64 {
    use std::arch::aarch64::*;
    unsafe {
        let narrowed = vshrn_n_u16::<4>(vreinterpretq_u16_u8(eq));
        vget_lane_u64::<0>(vreinterpret_u64_u8(narrowed)) & 0x8888_8888_8888_8888
    }
}

#[cfg(target_arch = "aarch64")]
unsafe fn find_byte_neon(haystack: &[u8], byte: u8) -> Option<usize> {
    use std::arch::aarch64::*;
    let n = haystack.len();
    let mut i = 0;

    unsafe {
        let pattern = vdupq_n_u8(byte);
        while i + 16 <= n {
            let eq = vceqq_u8(vld1q_u8(haystack.as_ptr().add(i)), pattern);
            let mask = neon_nibble_mask(eq);
            if mask != 0 {
                return Some(i + (mask.trailing_zeros() / 4) as usize);
            }
            i += 16;
        }
    }
    find_byte_serial(&haystack[i..], byte).map(|p| i + p)
}

#[cfg(target_arch = "aarch64")]
unsafe fn rfind_byte_neon(haystack: &[u8], byte: u8) -> Option<usize> {
    use std::arch::aarch64::*;
    let mut i = haystack.len();

    unsafe {
        let pattern = vdupq_n_u8(byte);
        while i >= 16 {
            let eq = vceqq_u8(vld1q_u8(haystack.as_ptr().add(i - 16)), pattern);
            let mask = neon_nibble_mask(eq);
            if mask != 0 {
                return Some(i - 16 + ((63 - mask.leading_zeros()) / 4) as usize);
            }
            i -= 16;
        }
    }
    rfind_byte_serial(&haystack[..i], byte)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_haystack() {
        assert_eq!(find_byte(b"", b'x'), None);
        assert_eq!(rfind_byte(b"", b'x'), None);
    }

    #[test]
    fn absent_byte() {
        let hay = b"abcdefghijklmnopqrstuvwxyz";
        assert_eq!(find_byte(hay, b'0'), None);
        assert_eq!(rfind_byte(hay, b'0'), None);
    }

    #[test]
    fn interleaved_occurrences() {
        let hay = b"aXbXcXdXeXfXgXhXiXj";
        assert_eq!(find_byte(hay, b'X'), Some(1));
        assert_eq!(rfind_byte(hay, b'X'), Some(17));
    }

    #[test]
    fn single_match_every_position() {
        for n in 1..=130usize {
            let base = vec![0u8; n];
            for pos in 0..n {
                let mut hay = base.clone();
                hay[pos] = 0xEE;
                assert_eq!(find_byte(&hay, 0xEE), Some(pos), "len {n} pos {pos}");
                assert_eq!(rfind_byte(&hay, 0xEE), Some(pos), "len {n} pos {pos}");
                assert_eq!(find_byte_serial(&hay, 0xEE), Some(pos), "serial len {n}");
                assert_eq!(rfind_byte_serial(&hay, 0xEE), Some(pos), "serial len {n}");
            }
        }
    }

    #[test]
    fn first_and_last_of_many() {
        let mut hay = vec![b'.'; 300];
        for pos in [13, 77, 142, 256] {
            hay[pos] = b'#';
        }
        assert_eq!(find_byte(&hay, b'#'), Some(13));
        assert_eq!(rfind_byte(&hay, b'#'), Some(256));
    }

    #[test]
    fn zero_byte_needle() {
        // Masked vector tails zero-fill; a zero needle must not match the
        // fill lanes.
        let hay = b"abcdefghij";
        assert_eq!(find_byte(hay, 0), None);
        assert_eq!(rfind_byte(hay, 0), None);
        let hay = [1u8, 0, 2, 0, 3];
        assert_eq!(find_byte(&hay, 0), Some(1));
        assert_eq!(rfind_byte(&hay, 0), Some(3));
    }

    #[test]
    fn serial_agrees_with_dispatch() {
        let mut state = 0x1234_5678_u64;
        let mut data = Vec::with_capacity(4096);
        for _ in 0..4096 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((state >> 33) as u8 & 0x0F);
        }
        for byte in 0..16u8 {
            assert_eq!(find_byte(&data, byte), find_byte_serial(&data, byte));
            assert_eq!(rfind_byte(&data, byte), rfind_byte_serial(&data, byte));
        }
    }
}
