// Kbstats Capture Driver
// Streams decoded event names from a device until stopped or a read fails

use std::sync::atomic::{AtomicBool, Ordering};

use crate::codes::{self, SYN_REPORT, UNKNOWN};
use crate::device::{DeviceResult, EventDevice, RawEvent, EVENT_BATCH};

/// Decodes raw records into printable names, suppressing repeats.
///
/// Holds the capture session's only mutable state: the last name that was
/// printed. Records that decode to the unknown sentinel or carry the
/// end-of-report code are dropped without touching that state.
#[derive(Debug, Default)]
pub struct EventDecoder {
    last_name: Option<&'static str>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one record. Returns the name to print, or None when the
    /// record is dropped or its name repeats the previous printed one.
    pub fn process_event(&mut self, kind: u16, code: u16) -> Option<&'static str> {
        if code == SYN_REPORT {
            return None;
        }
        let name = codes::code_name(kind, code);
        if name == UNKNOWN || self.last_name == Some(name) {
            return None;
        }
        self.last_name = Some(name);
        Some(name)
    }
}

/// Probe for exclusive access on the device.
///
/// A failed probe means another process holds a grab; capture proceeds, but
/// events may never be delivered here. A successful probe is kept only when
/// the caller actually asked to grab, and released otherwise.
fn probe_grab(device: &EventDevice, grab: bool) {
    match device.grab() {
        Ok(()) => {
            if !grab {
                let _ = device.ungrab();
            }
        }
        Err(err) => {
            log::warn!(
                "device is grabbed by another process, events may not be delivered ({err})"
            );
        }
    }
}

/// Stream decoded events from the device until `stop` is set.
///
/// Blocks in the device's readiness wait between batches; the stop flag is
/// checked at the top of every iteration and again after each wakeup, so a
/// signal ends the session at the next loop boundary. A short read is fatal
/// and returned as-is, with no retry.
pub fn run(device: &mut EventDevice, grab: bool, stop: &AtomicBool) -> DeviceResult<()> {
    probe_grab(device, grab);

    let mut decoder = EventDecoder::new();
    let mut events: [RawEvent; EVENT_BATCH] = unsafe { std::mem::zeroed() };

    while !stop.load(Ordering::SeqCst) {
        if !device.wait_readable()? {
            continue;
        }
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let count = device.read_batch(&mut events)?;
        for event in &events[..count] {
            if let Some(name) = decoder.process_event(event.type_, event.code) {
                println!("{name}");
            }
        }
    }

    let _ = device.ungrab();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EV_KEY: u16 = 0x01;
    const EV_SYN: u16 = 0x00;

    #[test]
    fn test_duplicate_names_suppressed() {
        let mut decoder = EventDecoder::new();
        assert_eq!(decoder.process_event(EV_KEY, 30), Some("KEY_A"));
        assert_eq!(decoder.process_event(EV_KEY, 30), None);
        assert_eq!(decoder.process_event(EV_KEY, 30), None);
    }

    #[test]
    fn test_distinct_names_printed_in_order() {
        let mut decoder = EventDecoder::new();
        assert_eq!(decoder.process_event(EV_KEY, 30), Some("KEY_A"));
        assert_eq!(decoder.process_event(EV_KEY, 31), Some("KEY_S"));
        assert_eq!(decoder.process_event(EV_KEY, 30), Some("KEY_A"));
    }

    #[test]
    fn test_end_of_report_never_printed() {
        let mut decoder = EventDecoder::new();
        assert_eq!(decoder.process_event(EV_SYN, SYN_REPORT), None);
        assert_eq!(decoder.process_event(EV_KEY, 30), Some("KEY_A"));
        // a code-0 record of any type is dropped, not just EV_SYN
        assert_eq!(decoder.process_event(EV_KEY, 0), None);
    }

    #[test]
    fn test_unknown_records_dropped_without_state_change() {
        let mut decoder = EventDecoder::new();
        assert_eq!(decoder.process_event(EV_KEY, 30), Some("KEY_A"));
        assert_eq!(decoder.process_event(EV_KEY, 0x2fe), None); // unnamed code
        assert_eq!(decoder.process_event(0x40, 5), None); // unknown type
        // the dropped records did not disturb duplicate suppression
        assert_eq!(decoder.process_event(EV_KEY, 30), None);
    }

    #[test]
    fn test_other_syn_codes_follow_table() {
        let mut decoder = EventDecoder::new();
        assert_eq!(decoder.process_event(EV_SYN, 3), Some("SYN_DROPPED"));
    }
}
