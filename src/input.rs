//! Touch input events
//!
//! Decodes the 16-byte event records produced by the kernel input layer on
//! 32-bit targets and assembles the absolute-axis events of a resistive
//! touch panel into complete touch points. The event device is opened
//! non-blocking; callers poll at their own pace.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::error::{FbError, FbResult};

/// Size of one input event record
pub const EVENT_SIZE: usize = 16;

/// Event types and codes from /usr/include/linux/input-event-codes.h
pub mod codes {
    pub const EV_SYN: u16 = 0x00;
    pub const EV_KEY: u16 = 0x01;
    pub const EV_ABS: u16 = 0x03;

    pub const SYN_REPORT: u16 = 0x00;

    pub const ABS_X: u16 = 0x00;
    pub const ABS_Y: u16 = 0x01;
    pub const ABS_PRESSURE: u16 = 0x18;

    pub const BTN_TOUCH: u16 = 0x14a;
}

/// One kernel input event
///
/// Matches the wire layout on 32-bit targets: two 32-bit timestamp words,
/// type, code, and a signed value, all little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub seconds: u32,
    pub microseconds: u32,
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    /// Decode one event record
    pub fn from_bytes(buf: &[u8; EVENT_SIZE]) -> Self {
        Self {
            seconds: LittleEndian::read_u32(&buf[0..4]),
            microseconds: LittleEndian::read_u32(&buf[4..8]),
            kind: LittleEndian::read_u16(&buf[8..10]),
            code: LittleEndian::read_u16(&buf[10..12]),
            value: LittleEndian::read_i32(&buf[12..16]),
        }
    }
}

/// A complete touch point in device units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Touch {
    pub x: i32,
    pub y: i32,
    pub pressure: i32,
}

/// Reads input events and assembles touch points
pub struct TouchReader<R> {
    source: R,
}

impl TouchReader<File> {
    /// Open an input event device, non-blocking
    pub fn open<P: AsRef<Path>>(path: P) -> FbResult<Self> {
        let path = path.as_ref();
        let source = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| FbError::DeviceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("opened input device {}", path.display());
        Ok(Self { source })
    }
}

impl<R: Read> TouchReader<R> {
    /// Read events from any byte source
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Read the next event, if one is available
    ///
    /// Returns `None` when the source has no event ready (end of stream or
    /// a non-blocking read that would block).
    pub fn read_event(&mut self) -> io::Result<Option<InputEvent>> {
        let mut buf = [0u8; EVENT_SIZE];
        match self.source.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(n) if n == EVENT_SIZE => Ok(Some(InputEvent::from_bytes(&buf))),
            Ok(n) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("short input event: {} bytes", n),
            )),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Assemble the next complete touch point
    ///
    /// Collects absolute-axis events until a sync report closes the point.
    /// A gap in the stream also closes a point once x, y and pressure have
    /// all been seen; with no complete point pending it returns `None`.
    pub fn read_touch(&mut self) -> io::Result<Option<Touch>> {
        let mut x = None;
        let mut y = None;
        let mut pressure = None;

        loop {
            let event = match self.read_event()? {
                Some(event) => event,
                None => {
                    return Ok(match (x, y, pressure) {
                        (Some(x), Some(y), Some(pressure)) => Some(Touch { x, y, pressure }),
                        _ => None,
                    });
                }
            };

            match (event.kind, event.code) {
                (codes::EV_ABS, codes::ABS_X) => x = Some(event.value),
                (codes::EV_ABS, codes::ABS_Y) => y = Some(event.value),
                (codes::EV_ABS, codes::ABS_PRESSURE) => pressure = Some(event.value),
                (codes::EV_SYN, codes::SYN_REPORT) => {
                    if let (Some(x), Some(y), Some(pressure)) = (x, y, pressure) {
                        return Ok(Some(Touch { x, y, pressure }));
                    }
                }
                _ => {}
            }
        }
    }
}
