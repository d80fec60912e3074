// Byte-set membership search.
//
// The forward SIMD kernels test 16-64 bytes per iteration with no
// branches: each haystack byte is split into nibbles, the high nibble
// selects a byte of the set via a table shuffle, the low nibble selects a
// bit inside it.  The AVX-512 variant needs VBMI2 (`compress_epi8`) to
// split the set, so it binds on Ice Lake hosts only; Skylake falls back
// to AVX2.
//
// Reverse scans run the scalar loop: the shuffle setup amortizes poorly
// against the scan-from-end access pattern and the semantics must stay
// strictly last-match-first.

use std::sync::OnceLock;

use crate::byteset::ByteSet;
use crate::capability::{Capability, capabilities};

type FindSetFn = fn(&[u8], &ByteSet) -> Option<usize>;

/// Bit of the byte selected by a low nibble: `1 << (nibble & 7)`,
/// replicated per 128-bit shuffle lane.
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
const BITMASK_LUT: [u8; 16] = [1, 2, 4, 8, 16, 32, 64, 128, 1, 2, 4, 8, 16, 32, 64, 128];

/// Offset of the first byte of `haystack` that is a member of `set`.
#[inline]
pub fn find_byteset(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    find_byteset_dispatch()(haystack, set)
}

/// Offset of the last byte of `haystack` that is a member of `set`.
#[inline]
pub fn rfind_byteset(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    rfind_byteset_serial(haystack, set)
}

#[inline]
fn find_byteset_dispatch() -> FindSetFn {
    static DISPATCH: OnceLock<FindSetFn> = OnceLock::new();
    *DISPATCH.get_or_init(|| {
        let caps = capabilities();
        #[cfg(target_arch = "x86_64")]
        {
            if caps.contains(Capability::ICE) {
                return find_byteset_avx512_call;
            }
            if caps.contains(Capability::HASWELL) {
                return find_byteset_avx2_call;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if caps.contains(Capability::NEON) {
                return find_byteset_neon_call;
            }
        }
        let _ = caps;
        find_byteset_serial
    })
}

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Scalar forward membership scan.
pub fn find_byteset_serial(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    haystack.iter().position(|&b| set.contains(b))
}

/// Scalar reverse membership scan.
pub fn rfind_byteset_serial(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    haystack.iter().rposition(|&b| set.contains(b))
}

// ---------------------------------------------------------------------------
// AVX2
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
#[inline]
fn find_byteset_avx2_call(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { find_byteset_avx2(haystack, set) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn find_byteset_avx2(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    use std::arch::x86_64::*;
    let n = haystack.len();
    if n < 32 {
        return find_byteset_serial(haystack, set);
    }

    // Split the 32 set bytes into even/odd halves so a 16-lane shuffle
    // indexed by the high nibble can reach all 32 of them.
    let raw = set.as_bytes();
    let mut even = [0u8; 16];
    let mut odd = [0u8; 16];
    for k in 0..16 {
        even[k] = raw[2 * k];
        odd[k] = raw[2 * k + 1];
    }

    let mut i = 0;
    unsafe {
        let even_v =
            _mm256_broadcastsi128_si256(_mm_loadu_si128(even.as_ptr() as *const __m128i));
        let odd_v = _mm256_broadcastsi128_si256(_mm_loadu_si128(odd.as_ptr() as *const __m128i));
        let bitmask_lut =
            _mm256_broadcastsi128_si256(_mm_loadu_si128(BITMASK_LUT.as_ptr() as *const __m128i));
        let nibble = _mm256_set1_epi8(0x0F);
        let seven = _mm256_set1_epi8(7);

        while i + 32 <= n {
            let v = _mm256_loadu_si256(haystack.as_ptr().add(i) as *const __m256i);
            let lo = _mm256_and_si256(v, nibble);
            let hi = _mm256_and_si256(_mm256_srli_epi16::<4>(v), nibble);

            let even_slice = _mm256_shuffle_epi8(even_v, hi);
            let odd_slice = _mm256_shuffle_epi8(odd_v, hi);
            let use_odd = _mm256_cmpgt_epi8(lo, seven);
            let slice = _mm256_blendv_epi8(even_slice, odd_slice, use_odd);

            let bitmask = _mm256_shuffle_epi8(bitmask_lut, lo);
            let non_member =
                _mm256_cmpeq_epi8(_mm256_and_si256(slice, bitmask), _mm256_setzero_si256());
            let mask = !(_mm256_movemask_epi8(non_member) as u32);
            if mask != 0 {
                return Some(i + mask.trailing_zeros() as usize);
            }
            i += 32;
        }
    }
    find_byteset_serial(&haystack[i..], set).map(|p| i + p)
}

// ---------------------------------------------------------------------------
// AVX-512 (Ice Lake: VBMI2 compress)
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
#[inline]
fn find_byteset_avx512_call(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { find_byteset_avx512(haystack, set) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw,avx512vl,avx512vbmi,avx512vbmi2")]
unsafe fn find_byteset_avx512(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    use std::arch::x86_64::*;
    let n = haystack.len();
    let raw = set.as_bytes();
    let mut i = 0;

    unsafe {
        let set_v = _mm512_maskz_loadu_epi8(0xFFFF_FFFF, raw.as_ptr() as *const i8);
        // One compress per half replaces the scalar even/odd split.
        let even_v = _mm512_broadcast_i32x4(_mm512_castsi512_si128(_mm512_maskz_compress_epi8(
            0x5555_5555,
            set_v,
        )));
        let odd_v = _mm512_broadcast_i32x4(_mm512_castsi512_si128(_mm512_maskz_compress_epi8(
            0xAAAA_AAAA,
            set_v,
        )));
        let bitmask_lut =
            _mm512_broadcast_i32x4(_mm_loadu_si128(BITMASK_LUT.as_ptr() as *const __m128i));
        let nibble = _mm512_set1_epi8(0x0F);
        let seven = _mm512_set1_epi8(7);

        while i < n {
            let rem = n - i;
            let load = if rem >= 64 { !0u64 } else { (1u64 << rem) - 1 };
            let v = _mm512_maskz_loadu_epi8(load, haystack.as_ptr().add(i) as *const i8);
            let lo = _mm512_and_si512(v, nibble);
            let hi = _mm512_and_si512(_mm512_srli_epi16::<4>(v), nibble);

            let even_slice = _mm512_shuffle_epi8(even_v, hi);
            let odd_slice = _mm512_shuffle_epi8(odd_v, hi);
            let use_odd = _mm512_cmpgt_epi8_mask(lo, seven);
            let slice = _mm512_mask_blend_epi8(use_odd, even_slice, odd_slice);

            let bitmask = _mm512_shuffle_epi8(bitmask_lut, lo);
            let member = _mm512_mask_test_epi8_mask(load, slice, bitmask);
            if member != 0 {
                return Some(i + member.trailing_zeros() as usize);
            }
            i += 64;
        }
    }
    None
}

// ---------------------------------------------------------------------------
// NEON
// ---------------------------------------------------------------------------

#[cfg(target_arch = "aarch64")]
#[inline]
fn find_byteset_neon_call(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    // Safety: NEON is mandatory on aarch64.
    unsafe { find_byteset_neon(haystack, set) }
}

#[cfg(target_arch = "aarch64")]
unsafe fn find_byteset_neon(haystack: &[u8], set: &ByteSet) -> Option<usize> {
    use std::arch::aarch64::*;

    use super::byte::neon_nibble_mask;

    let n = haystack.len();
    if n < 16 {
        return find_byteset_serial(haystack, set);
    }
    let raw = set.as_bytes();
    let mut i = 0;

    unsafe {
        // Two 16-byte tables cover the 32 set bytes.  Out-of-range `tbl`
        // indices yield zero, so the halves can simply be OR-combined.
        let table_lo = vld1q_u8(raw.as_ptr());
        let table_hi = vld1q_u8(raw.as_ptr().add(16));
        let one = vdupq_n_u8(1);
        let seven = vdupq_n_u8(7);
        let sixteen = vdupq_n_u8(16);

        while i + 16 <= n {
            let v = vld1q_u8(haystack.as_ptr().add(i));
            let idx = vshrq_n_u8::<3>(v);
            let lo_half = vqtbl1q_u8(table_lo, idx);
            let hi_half = vqtbl1q_u8(table_hi, vsubq_u8(idx, sixteen));
            let slice = vorrq_u8(lo_half, hi_half);

            let bit = vshlq_u8(one, vreinterpretq_s8_u8(vandq_u8(v, seven)));
            let member = vtstq_u8(slice, bit);
            let mask = neon_nibble_mask(member);
            if mask != 0 {
                return Some(i + (mask.trailing_zeros() / 4) as usize);
            }
            i += 16;
        }
    }
    find_byteset_serial(&haystack[i..], set).map(|p| i + p)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
