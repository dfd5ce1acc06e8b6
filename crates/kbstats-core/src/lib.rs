// Kbstats Core Library
// Event/capability decoding engine for evdev diagnostics

pub mod bitvec;
pub mod capture;
pub mod codes;
pub mod device;
pub mod info;
pub mod query;

pub use capture::EventDecoder;
pub use codes::{
    code_name, event_name, max_code, resolve_code, EventType, ResolveError, SYN_REPORT, UNKNOWN,
};
pub use device::{DeviceError, DeviceResult, EventDevice, InputId, RawEvent, EVENT_BATCH};
pub use info::print_device_info;
pub use query::{query, BitState};
