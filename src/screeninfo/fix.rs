//! Fixed screen information
//!
//! The immutable half of the device state: identifier, memory ranges and
//! the driver's line length. Matches `struct fb_fix_screeninfo` including
//! the C alignment padding around `line_length` and `mmio_start`, which
//! depends on the width of the kernel's unsigned long.

use std::mem;

use byteorder::{ByteOrder, NativeEndian};
use once_cell::sync::Lazy;

use crate::device::Framebuffer;
use crate::error::{FbError, FbResult};
use crate::sys::{self, FbType, FbVisual};

use super::{read_field, write_field, Entry, FieldFormat, FieldValue, RecordLayout};

/// Fields of the fixed screen information, in kernel order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixField {
    Id,
    SmemStart,
    SmemLen,
    Type,
    TypeAux,
    Visual,
    Xpanstep,
    Ypanstep,
    Ywrapstep,
    LineLength,
    MmioStart,
    MmioLen,
    Accel,
}

impl FixField {
    /// Every field, in record order
    pub const ALL: [FixField; 13] = [
        FixField::Id,
        FixField::SmemStart,
        FixField::SmemLen,
        FixField::Type,
        FixField::TypeAux,
        FixField::Visual,
        FixField::Xpanstep,
        FixField::Ypanstep,
        FixField::Ywrapstep,
        FixField::LineLength,
        FixField::MmioStart,
        FixField::MmioLen,
        FixField::Accel,
    ];

    /// Kernel name of the field
    pub fn name(&self) -> &'static str {
        LAYOUT.spans[*self as usize].name
    }

    /// Look a field up by its kernel name
    pub fn from_name(name: &str) -> FbResult<Self> {
        FixField::ALL
            .iter()
            .copied()
            .find(|field| field.name() == name)
            .ok_or_else(|| FbError::InvalidField { name: name.to_string() })
    }
}

fn entries() -> Vec<Entry> {
    let mut entries = vec![
        Entry::Field("id", FieldFormat::Str(16)),
        Entry::Field("smem_start", FieldFormat::ULong),
        Entry::Field("smem_len", FieldFormat::U32),
        Entry::Field("type", FieldFormat::U32),
        Entry::Field("type_aux", FieldFormat::U32),
        Entry::Field("visual", FieldFormat::U32),
        Entry::Field("xpanstep", FieldFormat::U16),
        Entry::Field("ypanstep", FieldFormat::U16),
        Entry::Field("ywrapstep", FieldFormat::U16),
        // alignment of line_length
        Entry::Pad(2),
        Entry::Field("line_length", FieldFormat::U32),
    ];
    if mem::size_of::<libc::c_ulong>() == 8 {
        // alignment of mmio_start
        entries.push(Entry::Pad(4));
    }
    entries.extend([
        Entry::Field("mmio_start", FieldFormat::ULong),
        Entry::Field("mmio_len", FieldFormat::U32),
        Entry::Field("accel", FieldFormat::U32),
        // reserved u16[3] plus tail padding to the struct alignment
        Entry::Pad(8),
    ]);
    entries
}

static LAYOUT: Lazy<RecordLayout> = Lazy::new(|| RecordLayout::build(&entries()));

/// Decoded view of `struct fb_fix_screeninfo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixScreenInfo {
    buf: Vec<u8>,
}

impl FixScreenInfo {
    /// Create a zeroed record, not yet populated from any device
    pub fn new() -> Self {
        Self { buf: vec![0; LAYOUT.byte_len] }
    }

    /// Raw record bytes, kernel layout
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Read a field from the record
    pub fn get(&self, field: FixField) -> FieldValue {
        read_field(&self.buf, &LAYOUT.spans[field as usize])
    }

    /// Write a field into the record without touching the device
    ///
    /// The device itself never sees such writes; fixed info cannot be
    /// committed.
    pub fn set(&mut self, field: FixField, value: FieldValue) -> FbResult<()> {
        write_field(&mut self.buf, &LAYOUT.spans[field as usize], &value)
    }

    /// Re-read the record from the device, discarding local changes
    pub fn refresh(&mut self, fb: &Framebuffer) -> FbResult<()> {
        self.buf.fill(0);
        fb.read_info(sys::FBIOGET_FSCREENINFO, &mut self.buf)
    }

    /// Fixed screen information has no write-back request; this fails
    /// without issuing anything to the device.
    pub fn commit(&mut self, _fb: &Framebuffer) -> FbResult<()> {
        Err(FbError::UnsupportedOperation(
            "fixed screen information is read-only",
        ))
    }

    /// Driver identification string
    pub fn id_str(&self) -> String {
        self.get(FixField::Id).to_string()
    }

    /// Length of a screen line in bytes, as the driver reports it
    pub fn line_length(&self) -> u32 {
        self.read_u32(FixField::LineLength)
    }

    /// Length of the video memory in bytes
    pub fn smem_len(&self) -> u32 {
        self.read_u32(FixField::SmemLen)
    }

    /// Memory layout of the frame buffer
    pub fn fb_type(&self) -> FbType {
        FbType::from(self.read_u32(FixField::Type))
    }

    /// Visual class of the frame buffer
    pub fn visual(&self) -> FbVisual {
        FbVisual::from(self.read_u32(FixField::Visual))
    }

    fn read_u32(&self, field: FixField) -> u32 {
        let span = &LAYOUT.spans[field as usize];
        NativeEndian::read_u32(&self.buf[span.offset..])
    }
}

impl Default for FixScreenInfo {
    fn default() -> Self {
        Self::new()
    }
}
