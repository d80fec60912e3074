// Host capability detection.
//
// The capability set is resolved exactly once per process and cached; the
// per-operation dispatchers consult it when binding their function
// pointers.  Detection goes through the standard library's feature macros,
// which read CPUID leaves 1/7 on x86 and the AArch64 ID registers (or
// sysctl on Apple hosts) under the hood.  On unknown architectures only
// `SERIAL` is reported.

use std::sync::OnceLock;

use bitflags::bitflags;

bitflags! {
    /// Backend categories executable on the current host.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Capability: u32 {
        /// Portable scalar kernels, always present.
        const SERIAL = 1;
        /// x86_64 AVX2 (Haswell and later).
        const HASWELL = 1 << 1;
        /// x86_64 AVX-512 F+BW+VL with BMI1/BMI2 (Skylake-X and later).
        const SKYLAKE = 1 << 2;
        /// x86_64 AVX-512 VBMI/VBMI2/GFNI/VNNI (Ice Lake and later).
        const ICE = 1 << 3;
        /// AArch64 Advanced SIMD.
        const NEON = 1 << 4;
        /// AArch64 Scalable Vector Extension.
        const SVE = 1 << 5;
        /// AArch64 SVE2.
        const SVE2 = 1 << 6;
    }
}

impl Capability {
    /// Comma-joined names of the active backend categories, in precedence
    /// order, e.g. `"serial,haswell,skylake"`.
    pub fn names(&self) -> String {
        const NAMES: [(Capability, &str); 7] = [
            (Capability::SERIAL, "serial"),
            (Capability::HASWELL, "haswell"),
            (Capability::SKYLAKE, "skylake"),
            (Capability::ICE, "ice"),
            (Capability::NEON, "neon"),
            (Capability::SVE, "sve"),
            (Capability::SVE2, "sve2"),
        ];
        let mut out = String::new();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !out.is_empty() {
                    out.push(',');
                }
                out.push_str(name);
            }
        }
        out
    }
}

/// The capability set of the current host.
///
/// Detected on first call, immutable afterwards; safe to read from any
/// thread without synchronization.
pub fn capabilities() -> Capability {
    static CAPS: OnceLock<Capability> = OnceLock::new();
    *CAPS.get_or_init(detect)
}

fn detect() -> Capability {
    #[allow(unused_mut)]
    let mut caps = Capability::SERIAL;

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            caps |= Capability::HASWELL;
        }
        if is_x86_feature_detected!("avx512f")
            && is_x86_feature_detected!("avx512bw")
            && is_x86_feature_detected!("avx512vl")
            && is_x86_feature_detected!("bmi1")
            && is_x86_feature_detected!("bmi2")
        {
            caps |= Capability::SKYLAKE;
            if is_x86_feature_detected!("avx512vbmi")
                && is_x86_feature_detected!("avx512vbmi2")
                && is_x86_feature_detected!("gfni")
                && is_x86_feature_detected!("avx512vnni")
            {
                caps |= Capability::ICE;
            }
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            caps |= Capability::NEON;
        }
        // SVE kernels are not shipped; the flags are still reported so
        // callers can introspect the host.
        if std::arch::is_aarch64_feature_detected!("sve") {
            caps |= Capability::SVE;
        }
        if std::arch::is_aarch64_feature_detected!("sve2") {
            caps |= Capability::SVE2;
        }
    }

    log::debug!("detected capabilities: {}", caps.names());
    caps
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
