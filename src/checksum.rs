// 64-bit byte-sum checksum.
//
// The vector paths lean on SAD-against-zero, which sums eight byte lanes
// into a 64-bit lane in one instruction.  The AVX-512 path tiers by
// length: one masked load up to 64 bytes, an aligned single-accumulator
// loop for cache-resident buffers, and a bidirectional two-accumulator
// walk above 1 MiB where the buffer will not be L2-resident anyway.

use std::sync::OnceLock;

use crate::capability::{Capability, capabilities};

type ChecksumFn = fn(&[u8]) -> u64;

/// Buffers above this size take the bidirectional AVX-512 walk.
#[cfg(target_arch = "x86_64")]
const BIDIRECTIONAL_THRESHOLD: usize = 1 << 20;

/// Unsigned 64-bit sum of all byte values.
///
/// Invariant under permutation of the input and additive over
/// concatenation.
#[inline]
pub fn checksum(data: &[u8]) -> u64 {
    checksum_dispatch()(data)
}

#[inline]
fn checksum_dispatch() -> ChecksumFn {
    static DISPATCH: OnceLock<ChecksumFn> = OnceLock::new();
    *DISPATCH.get_or_init(|| {
        let caps = capabilities();
        #[cfg(target_arch = "x86_64")]
        {
            if caps.contains(Capability::SKYLAKE) {
                return checksum_avx512_call;
            }
            if caps.contains(Capability::HASWELL) {
                return checksum_avx2_call;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if caps.contains(Capability::NEON) {
                return checksum_neon_call;
            }
        }
        let _ = caps;
        checksum_serial
    })
}

/// Scalar byte sum.
pub fn checksum_serial(data: &[u8]) -> u64 {
    data.iter().map(|&b| b as u64).sum()
}

// ---------------------------------------------------------------------------
// AVX2
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
#[inline]
fn checksum_avx2_call(data: &[u8]) -> u64 {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { checksum_avx2(data) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn checksum_avx2(data: &[u8]) -> u64 {
    use std::arch::x86_64::*;
    let n = data.len();
    let mut i = 0;
    let mut lanes = [0u64; 4];

    unsafe {
        let zero = _mm256_setzero_si256();
        let mut acc = zero;
        while i + 32 <= n {
            let v = _mm256_loadu_si256(data.as_ptr().add(i) as *const __m256i);
            acc = _mm256_add_epi64(acc, _mm256_sad_epu8(v, zero));
            i += 32;
        }
        _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, acc);
    }
    lanes.iter().sum::<u64>() + checksum_serial(&data[i..])
}

// ---------------------------------------------------------------------------
// AVX-512
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
#[inline]
fn checksum_avx512_call(data: &[u8]) -> u64 {
    // Safety: CPU feature is checked once in dispatcher initialization.
    unsafe { checksum_avx512(data) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw,avx512vl")]
unsafe fn checksum_avx512(data: &[u8]) -> u64 {
    use std::arch::x86_64::*;
    let n = data.len();
    if n == 0 {
        return 0;
    }

    unsafe {
        if n <= 16 {
            let load = if n == 16 { !0u16 } else { (1u16 << n) - 1 };
            let v = _mm_maskz_loadu_epi8(load, data.as_ptr() as *const i8);
            let sums = _mm_sad_epu8(v, _mm_setzero_si128());
            let mut lanes = [0u64; 2];
            _mm_storeu_si128(lanes.as_mut_ptr() as *mut __m128i, sums);
            return lanes[0] + lanes[1];
        }
        if n <= 64 {
            let load = if n == 64 { !0u64 } else { (1u64 << n) - 1 };
            let v = _mm512_maskz_loadu_epi8(load, data.as_ptr() as *const i8);
            let sums = _mm512_sad_epu8(v, _mm512_setzero_si512());
            return _mm512_reduce_add_epi64(sums) as u64;
        }
        if n <= BIDIRECTIONAL_THRESHOLD {
            checksum_avx512_resident(data)
        } else {
            checksum_avx512_bidirectional(data)
        }
    }
}

/// Cache-resident body: masked head to a 64-byte boundary, aligned loads,
/// masked tail, one accumulator.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw,avx512vl")]
unsafe fn checksum_avx512_resident(data: &[u8]) -> u64 {
    use std::arch::x86_64::*;
    let n = data.len();
    let addr = data.as_ptr() as usize;
    let head = ((64 - (addr & 63)) & 63).min(n);

    unsafe {
        let zero = _mm512_setzero_si512();
        let mut acc = zero;
        if head > 0 {
            let load = (1u64 << head) - 1;
            let v = _mm512_maskz_loadu_epi8(load, data.as_ptr() as *const i8);
            acc = _mm512_sad_epu8(v, zero);
        }
        let mut i = head;
        while i + 64 <= n {
            let v = _mm512_loadu_epi8(data.as_ptr().add(i) as *const i8);
            acc = _mm512_add_epi64(acc, _mm512_sad_epu8(v, zero));
            i += 64;
        }
        if i < n {
            let load = (1u64 << (n - i)) - 1;
            let v = _mm512_maskz_loadu_epi8(load, data.as_ptr().add(i) as *const i8);
            acc = _mm512_add_epi64(acc, _mm512_sad_epu8(v, zero));
        }
        _mm512_reduce_add_epi64(acc) as u64
    }
}

/// Above 1 MiB: two accumulators, one walking forward from the aligned
/// head and one backward from the aligned tail, halving the dependency
/// chain on loads the cache will not retain.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw,avx512vl")]
unsafe fn checksum_avx512_bidirectional(data: &[u8]) -> u64 {
    use std::arch::x86_64::*;
    let n = data.len();
    let addr = data.as_ptr() as usize;
    let head = (64 - (addr & 63)) & 63;
    let tail = (addr + n) & 63;
    debug_assert!(head + tail < n);

    unsafe {
        let zero = _mm512_setzero_si512();
        let mut front_acc = zero;
        let mut back_acc = zero;

        if head > 0 {
            let load = (1u64 << head) - 1;
            let v = _mm512_maskz_loadu_epi8(load, data.as_ptr() as *const i8);
            front_acc = _mm512_sad_epu8(v, zero);
        }
        if tail > 0 {
            let load = (1u64 << tail) - 1;
            let v = _mm512_maskz_loadu_epi8(load, data.as_ptr().add(n - tail) as *const i8);
            back_acc = _mm512_sad_epu8(v, zero);
        }

        // The span between the two masked edges is 64-byte aligned at
        // both ends.
        let mut front = head;
        let mut back = n - tail;
        while back - front >= 128 {
            let f = _mm512_loadu_epi8(data.as_ptr().add(front) as *const i8);
            let b = _mm512_loadu_epi8(data.as_ptr().add(back - 64) as *const i8);
            front_acc = _mm512_add_epi64(front_acc, _mm512_sad_epu8(f, zero));
            back_acc = _mm512_add_epi64(back_acc, _mm512_sad_epu8(b, zero));
            front += 64;
            back -= 64;
        }
        if back > front {
            let v = _mm512_loadu_epi8(data.as_ptr().add(front) as *const i8);
            front_acc = _mm512_add_epi64(front_acc, _mm512_sad_epu8(v, zero));
        }

        (_mm512_reduce_add_epi64(front_acc) + _mm512_reduce_add_epi64(back_acc)) as u64
    }
}

// ---------------------------------------------------------------------------
// NEON
// ---------------------------------------------------------------------------

#[cfg(target_arch = "aarch64")]
#[inline]
fn checksum_neon_call(data: &[u8]) -> u64 {
    // Safety: NEON is mandatory on aarch64.
    unsafe { checksum_neon(data) }
}

#[cfg(target_arch = "aarch64")]
unsafe fn checksum_neon(data: &[u8]) -> u64 {
    use std::arch::aarch64::*;
    let n = data.len();
    let mut i = 0;
    let mut total;

    unsafe {
        let mut acc = vdupq_n_u64(0);
        while i + 16 <= n {
            let v = vld1q_u8(data.as_ptr().add(i));
            // Pairwise widening: u8 -> u16 -> u32 -> u64.
            acc = vaddq_u64(acc, vpaddlq_u32(vpaddlq_u16(vpaddlq_u8(v))));
            i += 16;
        }
        total = vgetq_lane_u64::<0>(acc) + vgetq_lane_u64::<1>(acc);
    }
    total += checksum_serial(&data[i..]);
    total
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
