// Kbstats Device Layer
// Raw evdev handle: EVIOC* ioctls, batch event reads, readiness polling

use std::fs::File;
use std::io;
use std::mem;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::bitvec;
use crate::codes::{EventType, EV_MAX};

/// Raw event record as read from the device stream.
pub type RawEvent = libc::input_event;

/// Records fetched per read.
pub const EVENT_BATCH: usize = 64;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors from device operations. All of them are fatal for the current
/// operation; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("truncated read: expected at least {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    #[error("{0} has no capability request")]
    Unsupported(EventType),
}

/// Device identity block returned by EVIOCGID.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputId {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

// ioctl request encoding from asm-generic/ioctl.h: two direction bits,
// a 14-bit payload size, the subsystem magic and a request number.
const IOC_WRITE: libc::c_ulong = 1;
const IOC_READ: libc::c_ulong = 2;
const EVDEV_MAGIC: libc::c_ulong = b'E' as libc::c_ulong;

const fn ioc(dir: libc::c_ulong, nr: libc::c_ulong, size: usize) -> libc::c_ulong {
    dir << 30 | (size as libc::c_ulong) << 16 | EVDEV_MAGIC << 8 | nr
}

const EVIOCGVERSION: libc::c_ulong = ioc(IOC_READ, 0x01, mem::size_of::<libc::c_int>());
const EVIOCGID: libc::c_ulong = ioc(IOC_READ, 0x02, mem::size_of::<InputId>());
const EVIOCGRAB: libc::c_ulong = ioc(IOC_WRITE, 0x90, mem::size_of::<libc::c_int>());

const fn eviocgname(len: usize) -> libc::c_ulong {
    ioc(IOC_READ, 0x06, len)
}

const fn eviocgbit(kind: u16, len: usize) -> libc::c_ulong {
    ioc(IOC_READ, 0x20 + kind as libc::c_ulong, len)
}

/// Current-state request for the given type, if the protocol defines one.
fn state_request(kind: EventType, len: usize) -> Option<libc::c_ulong> {
    let nr = match kind {
        EventType::Key => 0x18,
        EventType::Led => 0x19,
        EventType::Snd => 0x1a,
        EventType::Sw => 0x1b,
        _ => return None,
    };
    Some(ioc(IOC_READ, nr, len))
}

/// Read-only handle on an evdev device node.
///
/// Owns the file descriptor for its whole lifetime; the fd is closed (and
/// any grab released by the kernel) on drop.
pub struct EventDevice {
    file: File,
}

impl EventDevice {
    /// Open a device node for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            file: File::open(path)?,
        })
    }

    fn ioctl(&self, request: libc::c_ulong, ptr: *mut libc::c_void) -> io::Result<()> {
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request, ptr) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Input driver version as (major, minor, patch).
    pub fn driver_version(&self) -> io::Result<(u8, u8, u8)> {
        let mut raw: libc::c_int = 0;
        self.ioctl(EVIOCGVERSION, &mut raw as *mut libc::c_int as *mut libc::c_void)?;
        Ok(((raw >> 16) as u8, (raw >> 8) as u8, raw as u8))
    }

    /// Bus/vendor/product/version identity.
    pub fn device_id(&self) -> io::Result<InputId> {
        let mut id = InputId::default();
        self.ioctl(EVIOCGID, &mut id as *mut InputId as *mut libc::c_void)?;
        Ok(id)
    }

    /// Human-readable device name.
    pub fn name(&self) -> io::Result<String> {
        let mut buf = [0u8; 256];
        self.ioctl(eviocgname(buf.len()), buf.as_mut_ptr() as *mut libc::c_void)?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    /// Supported event types, one bit per type value.
    pub fn type_bits(&self) -> io::Result<Vec<usize>> {
        let mut words = bitvec::zeroed(EV_MAX as usize + 1);
        self.ioctl(
            eviocgbit(0, mem::size_of_val(&words[..])),
            words.as_mut_ptr() as *mut libc::c_void,
        )?;
        Ok(words)
    }

    /// Supported codes for one event type, one bit per code.
    pub fn code_bits(&self, kind: EventType) -> DeviceResult<Vec<usize>> {
        let max = kind.max_code().ok_or(DeviceError::Unsupported(kind))?;
        let mut words = bitvec::zeroed(max as usize + 1);
        self.ioctl(
            eviocgbit(kind as u16, mem::size_of_val(&words[..])),
            words.as_mut_ptr() as *mut libc::c_void,
        )?;
        Ok(words)
    }

    /// Fill a caller-provided vector with the current state bits for one
    /// event type (pressed keys, lit LEDs, closed switches, active sounds).
    pub fn state_bits(&self, kind: EventType, words: &mut [usize]) -> DeviceResult<()> {
        let request = state_request(kind, mem::size_of_val(words))
            .ok_or(DeviceError::Unsupported(kind))?;
        self.ioctl(request, words.as_mut_ptr() as *mut libc::c_void)?;
        Ok(())
    }

    /// Acquire exclusive access; other readers stop receiving events.
    pub fn grab(&self) -> io::Result<()> {
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), EVIOCGRAB, 1 as libc::c_int) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Release exclusive access.
    pub fn ungrab(&self) -> io::Result<()> {
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), EVIOCGRAB, 0 as libc::c_int) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Block until the device has events to read.
    ///
    /// Returns false when the wait was interrupted by a signal without the
    /// device becoming readable, so the caller can re-check its stop flag.
    pub fn wait_readable(&self) -> io::Result<bool> {
        let mut fds = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let rc = unsafe { libc::poll(&mut fds, 1, -1) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }
        Ok(fds.revents & libc::POLLIN != 0)
    }

    /// Read one batch of raw event records.
    ///
    /// Returns the number of complete records read. A read shorter than one
    /// record is a `ShortRead`, treated as fatal exactly like an I/O error.
    pub fn read_batch(&mut self, events: &mut [RawEvent]) -> DeviceResult<usize> {
        let record = mem::size_of::<RawEvent>();
        let rd = unsafe {
            libc::read(
                self.file.as_raw_fd(),
                events.as_mut_ptr() as *mut libc::c_void,
                mem::size_of_val(events),
            )
        };
        if rd < 0 {
            return Err(io::Error::last_os_error().into());
        }
        let rd = rd as usize;
        if rd < record {
            return Err(DeviceError::ShortRead {
                expected: record,
                got: rd,
            });
        }
        Ok(rd / record)
    }
}
