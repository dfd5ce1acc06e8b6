// Kbstats Integration Tests
//
// These tests verify the decoding pipeline end to end:
// raw (type, code) pairs -> symbol tables -> duplicate suppression,
// and that query arguments are rejected before any device I/O.
//
// Run with: cargo test --test integration_test

use kbstats_core::{bitvec, codes, EventDecoder, EventType};

const EV_SYN: u16 = 0x00;
const EV_KEY: u16 = 0x01;

// Feed a recorded-style sequence through the decoder and collect what
// would have been printed.
fn decode_all(records: &[(u16, u16)]) -> Vec<&'static str> {
    let mut decoder = EventDecoder::new();
    records
        .iter()
        .filter_map(|&(kind, code)| decoder.process_event(kind, code))
        .collect()
}

#[test]
fn test_key_press_sequence_prints_each_name_once() {
    // press/repeat/release triples for A then S, with sync markers between
    let printed = decode_all(&[
        (EV_KEY, 30),
        (EV_KEY, 30),
        (EV_SYN, 0),
        (EV_KEY, 30),
        (EV_SYN, 0),
        (EV_KEY, 31),
        (EV_SYN, 0),
        (EV_KEY, 31),
    ]);
    assert_eq!(printed, vec!["KEY_A", "KEY_S"]);
}

#[test]
fn test_alternating_keys_print_every_transition() {
    let printed = decode_all(&[(EV_KEY, 30), (EV_KEY, 31), (EV_KEY, 30), (EV_KEY, 31)]);
    assert_eq!(printed, vec!["KEY_A", "KEY_S", "KEY_A", "KEY_S"]);
}

#[test]
fn test_unknown_and_sync_records_are_invisible() {
    let printed = decode_all(&[
        (EV_SYN, 0),      // end-of-report
        (0x40, 12),       // type outside the closed set
        (EV_KEY, 0x2fe),  // in range but unnamed
        (EV_KEY, 0x300),  // beyond KEY_MAX
        (EV_KEY, 30),
        (0x40, 12),
        (EV_KEY, 30),     // still a duplicate of the last printed name
    ]);
    assert_eq!(printed, vec!["KEY_A"]);
}

#[test]
fn test_query_arguments_resolve_before_io() {
    // a bad key name fails resolution with no device anywhere in sight
    assert!(codes::resolve_code(EventType::Key, "KEY_DOES_NOT_EXIST").is_err());

    // a good one resolves to the code the capability vector is indexed by
    let code = codes::resolve_code(EventType::Key, "KEY_A").unwrap();
    assert_eq!(code, 30);

    let mut state = bitvec::zeroed(EventType::Key.max_code().unwrap() as usize + 1);
    assert!(!bitvec::test_bit(&state, code as usize));
    state[code as usize / bitvec::WORD_BITS] |= 1 << (code as usize % bitvec::WORD_BITS);
    assert!(bitvec::test_bit(&state, code as usize));
}

#[test]
fn test_short_read_terminates_the_stream() {
    use kbstats_core::{DeviceError, EventDevice, RawEvent, EVENT_BATCH};

    // a regular file standing in for a device node: 10 bytes is less than
    // one complete record, which must surface as a fatal ShortRead
    let path = std::env::temp_dir().join("kbstats-short-read-test");
    std::fs::write(&path, [0u8; 10]).unwrap();

    let mut device = EventDevice::open(&path).unwrap();
    let mut events: [RawEvent; EVENT_BATCH] = unsafe { std::mem::zeroed() };
    match device.read_batch(&mut events) {
        Err(DeviceError::ShortRead { got: 10, .. }) => {}
        other => panic!("expected ShortRead, got {other:?}"),
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_batch_read_counts_whole_records() {
    use kbstats_core::{EventDevice, RawEvent, EVENT_BATCH};

    let record = std::mem::size_of::<RawEvent>();
    let path = std::env::temp_dir().join("kbstats-batch-read-test");
    std::fs::write(&path, vec![0u8; record * 2]).unwrap();

    let mut device = EventDevice::open(&path).unwrap();
    let mut events: [RawEvent; EVENT_BATCH] = unsafe { std::mem::zeroed() };
    assert_eq!(device.read_batch(&mut events).unwrap(), 2);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_registry_covers_all_declared_categories() {
    for (raw, name) in [
        (0x00, "EV_SYN"),
        (0x01, "EV_KEY"),
        (0x02, "EV_REL"),
        (0x04, "EV_MSC"),
        (0x05, "EV_SW"),
        (0x11, "EV_LED"),
        (0x12, "EV_SND"),
        (0x14, "EV_REP"),
        (0x15, "EV_FF"),
        (0x16, "EV_PWR"),
        (0x17, "EV_FF_STATUS"),
    ] {
        assert_eq!(codes::event_name(raw), name);
    }
}
