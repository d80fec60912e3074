#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the needle length, the next bytes its position.
    let needle_len = (data[0] as usize % 64) + 1;
    let payload = &data[1..];
    if payload.len() < needle_len {
        return;
    }
    let start = (data[0] as usize * 7919) % (payload.len() - needle_len + 1);
    let needle = &payload[start..start + needle_len];

    // Dispatched kernels must agree with the scalar reference.
    assert_eq!(
        oxistr::find(payload, needle),
        oxistr::serial::find(payload, needle)
    );
    assert_eq!(
        oxistr::rfind(payload, needle),
        oxistr::serial::rfind(payload, needle)
    );
    assert_eq!(
        oxistr::find_byte(payload, data[0]),
        oxistr::serial::find_byte(payload, data[0])
    );
    assert_eq!(
        oxistr::rfind_byte(payload, data[0]),
        oxistr::serial::rfind_byte(payload, data[0])
    );
    assert_eq!(oxistr::checksum(payload), oxistr::serial::checksum(payload));

    // A found needle is a real match.
    if let Some(pos) = oxistr::find(payload, needle) {
        assert!(oxistr::equal(&payload[pos..pos + needle_len], needle));
    }
});
