// End-to-end scenarios over the public surface, including the documented
// boundary cases.

use std::cmp::Ordering;

use oxistr::ByteSet;
use oxistr::similarity::{FixedArena, SystemAllocator};

#[test]
fn search_and_compare_basics() {
    assert_eq!(oxistr::find(b"abcdefghij", b"def"), Some(3));
    assert_eq!(oxistr::rfind(b"abcdefghij", b"def"), Some(3));
    assert_eq!(oxistr::order(b"apple", b"banana"), Ordering::Less);
    assert_eq!(oxistr::order(b"grape", b"grape"), Ordering::Equal);
    assert!(oxistr::equal(b"hello", b"hello"));
    assert!(!oxistr::equal(b"hello", b"world"));
}

#[test]
fn single_byte_needle_both_directions() {
    let hay = b"aXbXcXdXeXfXgXhXiXj";
    assert_eq!(oxistr::find(hay, b"X"), Some(1));
    assert_eq!(oxistr::rfind(hay, b"X"), Some(17));
}

#[test]
fn digit_scans_with_inversion() {
    let digits: ByteSet = (b'0'..=b'9').collect();
    assert_eq!(oxistr::find_byteset(b"price: $42", &digits), Some(8));

    let mut not_digits = digits;
    not_digits.invert();
    assert_eq!(oxistr::find_byteset(b"   \t42", &not_digits), Some(0));
    assert_eq!(oxistr::find_byteset(b"4242", &not_digits), None);
}

#[test]
fn checksum_scenarios() {
    assert_eq!(oxistr::checksum(b"abc"), 294);
    assert_eq!(oxistr::checksum(b""), 0);

    let n = 1_048_577;
    let big = vec![b'A'; n];
    assert_eq!(oxistr::checksum(&big), 65 * n as u64);
}

#[test]
fn edit_distance_scenarios() {
    let alloc = SystemAllocator;
    assert_eq!(oxistr::levenshtein(b"kitten", b"sitting", &alloc), Ok(3));
    assert_eq!(oxistr::levenshtein(b"", b"abc", &alloc), Ok(3));
    assert_eq!(oxistr::levenshtein(b"abc", b"abc", &alloc), Ok(0));
    assert_eq!(
        oxistr::levenshtein_utf8("café".as_bytes(), b"cafe", &alloc),
        Ok(1)
    );
}

#[test]
fn boundary_cases_across_the_surface() {
    // Length zero everywhere.
    assert!(oxistr::equal(b"", b""));
    assert_eq!(oxistr::order(b"", b""), Ordering::Equal);
    assert_eq!(oxistr::find_byte(b"", b'x'), None);
    assert_eq!(oxistr::rfind_byte(b"", b'x'), None);
    assert_eq!(oxistr::find(b"", b"x"), None);
    assert_eq!(oxistr::find(b"abc", b""), None);
    assert_eq!(oxistr::rfind(b"abc", b""), None);
    assert_eq!(oxistr::find_byteset(b"", &ByteSet::ascii()), None);
    assert_eq!(oxistr::checksum(b""), 0);

    // Needle longer than haystack, needle equal to haystack.
    assert_eq!(oxistr::find(b"short", b"longer needle"), None);
    assert_eq!(oxistr::find(b"exact", b"exact"), Some(0));

    // Matches at both ends.
    assert_eq!(oxistr::find(b"needle...haystack", b"needle"), Some(0));
    assert_eq!(oxistr::rfind(b"haystack...needle", b"needle"), Some(11));

    // Overlapping-period and uniform needles.
    assert_eq!(oxistr::find(b"aaaaaab", b"aaab"), Some(3));
    assert_eq!(oxistr::find(b"aaaaaa", b"aaa"), Some(0));
    assert_eq!(oxistr::rfind(b"aaaaaa", b"aaa"), Some(3));
}

#[test]
fn randomized_simd_parity_sweep() {
    use rand::{Rng, SeedableRng};

    // Ten thousand random haystack/needle pairs over a small alphabet;
    // the dispatched kernels must agree with the scalar reference on
    // every one of them.
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED_CAFE);
    for round in 0..10_000 {
        let hay_len = rng.random_range(0..512);
        let hay: Vec<u8> = (0..hay_len).map(|_| rng.random::<u8>() & 3).collect();
        let needle_len = rng.random_range(0..=64.min(hay_len + 1));
        let needle: Vec<u8> = if !hay.is_empty() && rng.random::<bool>() {
            let start = rng.random_range(0..hay.len());
            let end = (start + needle_len).min(hay.len());
            hay[start..end].to_vec()
        } else {
            (0..needle_len).map(|_| rng.random::<u8>() & 3).collect()
        };

        assert_eq!(
            oxistr::find(&hay, &needle),
            oxistr::serial::find(&hay, &needle),
            "find parity, round {round}"
        );
        assert_eq!(
            oxistr::rfind(&hay, &needle),
            oxistr::serial::rfind(&hay, &needle),
            "rfind parity, round {round}"
        );

        let byte = rng.random::<u8>() & 3;
        assert_eq!(
            oxistr::find_byte(&hay, byte),
            oxistr::serial::find_byte(&hay, byte),
            "find_byte parity, round {round}"
        );
        assert_eq!(
            oxistr::checksum(&hay),
            oxistr::serial::checksum(&hay),
            "checksum parity, round {round}"
        );
    }
}

#[test]
fn capability_report_is_usable() {
    let caps = oxistr::capabilities();
    assert!(caps.contains(oxistr::Capability::SERIAL));
    let names = caps.names();
    assert!(names.starts_with("serial"));
}

#[test]
fn arena_backed_similarity_pipeline() {
    // A fixed arena serves several calls without touching the heap.
    let mut backing = vec![0u8; 1 << 16];
    let arena = FixedArena::new(&mut backing);

    assert_eq!(oxistr::levenshtein(b"wavefront", b"waveform", &arena), Ok(3));
    assert_eq!(
        oxistr::levenshtein_utf8("naïve".as_bytes(), b"naive", &arena),
        Ok(1)
    );

    let unit = oxistr::SubstitutionMatrix::uniform(0, 1);
    assert_eq!(
        oxistr::needleman_wunsch(b"wavefront", b"waveform", &unit, 1, &arena),
        Ok(3)
    );
    assert!(arena.consumed() <= arena.capacity());
}
