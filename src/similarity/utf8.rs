// Strict UTF-8 rune decoding for the similarity front-end.
//
// The decoder rejects everything the encoding forbids: stray continuation
// bytes, overlong forms, surrogate code points, and values above
// U+10FFFF.  Validation happens before any DP work, so an invalid input
// costs nothing but the scan.

/// Decode one code point from the head of `bytes`.
///
/// Returns the rune and its encoded width, or `None` when the head is not
/// a valid UTF-8 sequence.
pub(crate) fn decode_rune(bytes: &[u8]) -> Option<(u32, usize)> {
    let b0 = *bytes.first()?;
    match b0 {
        0x00..=0x7F => Some((b0 as u32, 1)),
        0xC2..=0xDF => {
            let b1 = continuation(bytes, 1)?;
            Some((((b0 as u32 & 0x1F) << 6) | b1, 2))
        }
        0xE0..=0xEF => {
            let b1 = *bytes.get(1)?;
            let valid = match b0 {
                0xE0 => (0xA0..=0xBF).contains(&b1), // overlong
                0xED => (0x80..=0x9F).contains(&b1), // surrogates
                _ => (0x80..=0xBF).contains(&b1),
            };
            if !valid {
                return None;
            }
            let b2 = continuation(bytes, 2)?;
            Some((((b0 as u32 & 0x0F) << 12) | ((b1 as u32 & 0x3F) << 6) | b2, 3))
        }
        0xF0..=0xF4 => {
            let b1 = *bytes.get(1)?;
            let valid = match b0 {
                0xF0 => (0x90..=0xBF).contains(&b1), // overlong
                0xF4 => (0x80..=0x8F).contains(&b1), // beyond U+10FFFF
                _ => (0x80..=0xBF).contains(&b1),
            };
            if !valid {
                return None;
            }
            let b2 = continuation(bytes, 2)?;
            let b3 = continuation(bytes, 3)?;
            Some((
                ((b0 as u32 & 0x07) << 18) | ((b1 as u32 & 0x3F) << 12) | (b2 << 6) | b3,
                4,
            ))
        }
        _ => None,
    }
}

#[inline(always)]
fn continuation(bytes: &[u8], index: usize) -> Option<u32> {
    let b = *bytes.get(index)?;
    if b & 0xC0 == 0x80 {
        Some((b & 0x3F) as u32)
    } else {
        None
    }
}

/// Number of runes in `bytes`, or `None` when the span is not valid
/// UTF-8.
pub(crate) fn rune_count(bytes: &[u8]) -> Option<usize> {
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        let (_, width) = decode_rune(&bytes[i..])?;
        i += width;
        count += 1;
    }
    Some(count)
}

/// Decode `bytes` into `out`, which must hold exactly `rune_count(bytes)`
/// elements.  The span must already be validated.
pub(crate) fn transcode(bytes: &[u8], out: &mut [u32]) {
    let mut i = 0;
    for slot in out.iter_mut() {
        debug_assert!(i < bytes.len());
        let Some((rune, width)) = decode_rune(&bytes[i..]) else {
            debug_assert!(false, "transcode called on unvalidated input");
            return;
        };
        *slot = rune;
        i += width;
    }
    debug_assert_eq!(i, bytes.len());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
