// Kbstats Device Report
// Static device information printed before capture starts

use strum::IntoEnumIterator;

use crate::bitvec;
use crate::codes::{self, EventType};
use crate::device::{DeviceResult, EventDevice};

/// Print driver version, identity and the full capability report:
/// every supported event type, and within each type every supported code
/// with its symbolic name.
pub fn print_device_info(device: &EventDevice) -> DeviceResult<()> {
    let (major, minor, patch) = device.driver_version()?;
    println!("Input driver version is {major}.{minor}.{patch}");

    let id = device.device_id()?;
    println!(
        "Input device ID: bus 0x{:x} vendor 0x{:x} product 0x{:x} version 0x{:x}",
        id.bustype, id.vendor, id.product, id.version
    );

    println!("Input device name: \"{}\"", device.name()?);

    let types = device.type_bits()?;
    println!("Supported events:");
    for kind in EventType::iter() {
        if !bitvec::test_bit(&types, kind as usize) {
            continue;
        }
        println!("  Event type {} ({})", kind as u16, kind.name());

        // The type mask itself lives in slot 0; there is no separate code
        // enumeration for EV_SYN, and EV_PWR has no code range at all.
        if kind == EventType::Syn {
            continue;
        }
        let Some(max) = kind.max_code() else {
            continue;
        };
        let words = device.code_bits(kind)?;
        for code in 0..=max {
            if bitvec::test_bit(&words, code as usize) {
                println!(
                    "    Event code {} ({})",
                    code,
                    codes::code_name(kind as u16, code)
                );
            }
        }
    }
    Ok(())
}
