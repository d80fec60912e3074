#![no_main]
use libfuzzer_sys::fuzz_target;
use oxistr::similarity::SystemAllocator;

fuzz_target!(|data: &[u8]| {
    let split = data.len() / 2;
    let (a, b) = data.split_at(split);
    // Cap the quadratic cost.
    let a = &a[..a.len().min(256)];
    let b = &b[..b.len().min(256)];

    let alloc = SystemAllocator;

    // The engine must never panic and must honor its bounds.
    let d = oxistr::levenshtein(a, b, &alloc).unwrap();
    assert!(d <= a.len().max(b.len()));
    assert!(d >= a.len().abs_diff(b.len()));
    assert_eq!(d, oxistr::levenshtein(b, a, &alloc).unwrap());

    // UTF-8 front-end: arbitrary bytes either score or fail cleanly
    // before any DP work.
    let _ = oxistr::levenshtein_utf8(a, b, &alloc);
});
