// Kbstats Query Driver
// One-shot point query of a single capability bit

use crate::bitvec;
use crate::codes::EventType;
use crate::device::{DeviceError, DeviceResult, EventDevice};

/// State of a single capability bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitState {
    Set,
    Clear,
}

/// Ask the device whether one capability bit is currently asserted.
///
/// Sizes a zeroed vector for the type's full code range, issues a single
/// state request, and tests the one bit. Fully synchronous, no retry. The
/// caller has already validated `code <= max_code` for the type.
pub fn query(device: &EventDevice, kind: EventType, code: u16) -> DeviceResult<BitState> {
    let max = kind.max_code().ok_or(DeviceError::Unsupported(kind))?;
    let mut state = bitvec::zeroed(max as usize + 1);
    device.state_bits(kind, &mut state)?;
    if bitvec::test_bit(&state, code as usize) {
        Ok(BitState::Set)
    } else {
        Ok(BitState::Clear)
    }
}
