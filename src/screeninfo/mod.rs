//! # Screen Information Records
//!
//! Decoded views of the two kernel screen info structs, kept as ordered
//! sequences of named fields over a raw byte buffer.
//!
//! ## Layout model
//!
//! Each record kind declares its fields in kernel declaration order; a
//! field's byte offset is the running sum of the widths that precede it.
//! Reserved regions and C struct padding are opaque gap entries: they
//! occupy bytes and keep later offsets correct, but cannot be read or
//! written. The resulting layouts match `struct fb_var_screeninfo` and
//! `struct fb_fix_screeninfo` for the build target bit for bit.
//!
//! ## Operations
//!
//! * `get` / `set` move typed values between caller and buffer without
//!   touching the device.
//! * `refresh` re-reads the record from the device.
//! * `commit` writes the variable record back, then refreshes so the
//!   caller sees what the driver actually accepted. Fixed info is
//!   read-only and refuses `commit` before any request is issued.

pub mod fix;
pub mod var;

pub use fix::{FixField, FixScreenInfo};
pub use var::{VarField, VarScreenInfo};

use std::fmt;
use std::mem;

use byteorder::{ByteOrder, NativeEndian};

use crate::error::{FbError, FbResult};

// ============================================================================
// FIELD FORMATS
// ============================================================================

/// Wire format of a single record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldFormat {
    /// 16-bit unsigned scalar
    U16,
    /// 32-bit unsigned scalar
    U32,
    /// Scalar with the width of the kernel's unsigned long
    ULong,
    /// Fixed-width byte string, zero padded
    Str(usize),
    /// Fixed-arity sequence of 32-bit unsigned scalars
    U32Array(usize),
}

impl FieldFormat {
    pub(crate) fn size(&self) -> usize {
        match self {
            FieldFormat::U16 => 2,
            FieldFormat::U32 => 4,
            FieldFormat::ULong => mem::size_of::<libc::c_ulong>(),
            FieldFormat::Str(len) => *len,
            FieldFormat::U32Array(n) => 4 * n,
        }
    }
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Unsigned scalar, widened to 64 bits
    Scalar(u64),
    /// Raw bytes of a fixed-width string field
    Bytes(Vec<u8>),
    /// Elements of a fixed-arity field
    Array(Vec<u32>),
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<u64> {
        match self {
            FieldValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[u32]> {
        match self {
            FieldValue::Array(vals) => Some(vals),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(v) => write!(f, "{}", v),
            FieldValue::Bytes(bytes) => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                write!(f, "{}", String::from_utf8_lossy(&bytes[..end]))
            }
            FieldValue::Array(vals) => {
                write!(f, "(")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

// ============================================================================
// RECORD LAYOUTS
// ============================================================================

/// One entry of a record definition, in kernel declaration order
#[derive(Debug, Clone, Copy)]
pub(crate) enum Entry {
    /// A named, accessible field
    Field(&'static str, FieldFormat),
    /// An opaque gap: reserved bytes or C struct padding
    Pad(usize),
}

/// A resolved field: name, byte offset and format
#[derive(Debug, Clone, Copy)]
pub(crate) struct Span {
    pub(crate) name: &'static str,
    pub(crate) offset: usize,
    pub(crate) format: FieldFormat,
}

/// A record definition resolved into offsets and a total byte length
#[derive(Debug)]
pub(crate) struct RecordLayout {
    /// Spans indexed by field enum discriminant
    pub(crate) spans: Vec<Span>,
    pub(crate) byte_len: usize,
}

impl RecordLayout {
    pub(crate) fn build(entries: &[Entry]) -> Self {
        let mut spans = Vec::new();
        let mut offset = 0;
        for entry in entries {
            match *entry {
                Entry::Field(name, format) => {
                    spans.push(Span { name, offset, format });
                    offset += format.size();
                }
                Entry::Pad(len) => offset += len,
            }
        }
        Self { spans, byte_len: offset }
    }
}

// ============================================================================
// FIELD CODEC
// ============================================================================

pub(crate) fn read_field(buf: &[u8], span: &Span) -> FieldValue {
    let bytes = &buf[span.offset..span.offset + span.format.size()];
    match span.format {
        FieldFormat::U16 => FieldValue::Scalar(NativeEndian::read_u16(bytes) as u64),
        FieldFormat::U32 => FieldValue::Scalar(NativeEndian::read_u32(bytes) as u64),
        FieldFormat::ULong => {
            if mem::size_of::<libc::c_ulong>() == 8 {
                FieldValue::Scalar(NativeEndian::read_u64(bytes))
            } else {
                FieldValue::Scalar(NativeEndian::read_u32(bytes) as u64)
            }
        }
        FieldFormat::Str(_) => FieldValue::Bytes(bytes.to_vec()),
        FieldFormat::U32Array(n) => {
            let mut vals = Vec::with_capacity(n);
            for i in 0..n {
                vals.push(NativeEndian::read_u32(&bytes[4 * i..]));
            }
            FieldValue::Array(vals)
        }
    }
}

pub(crate) fn write_field(buf: &mut [u8], span: &Span, value: &FieldValue) -> FbResult<()> {
    let size = span.format.size();
    let bytes = &mut buf[span.offset..span.offset + size];
    match (span.format, value) {
        (FieldFormat::U16, FieldValue::Scalar(v)) => {
            if *v > u16::MAX as u64 {
                return Err(out_of_range(span.name, *v, "a 16-bit field"));
            }
            NativeEndian::write_u16(bytes, *v as u16);
        }
        (FieldFormat::U32, FieldValue::Scalar(v)) => {
            if *v > u32::MAX as u64 {
                return Err(out_of_range(span.name, *v, "a 32-bit field"));
            }
            NativeEndian::write_u32(bytes, *v as u32);
        }
        (FieldFormat::ULong, FieldValue::Scalar(v)) => {
            if size == 8 {
                NativeEndian::write_u64(bytes, *v);
            } else {
                if *v > u32::MAX as u64 {
                    return Err(out_of_range(span.name, *v, "a 32-bit field"));
                }
                NativeEndian::write_u32(bytes, *v as u32);
            }
        }
        (FieldFormat::Str(len), FieldValue::Bytes(src)) => {
            if src.len() > len {
                return Err(FbError::InvalidValue {
                    field: span.name.to_string(),
                    reason: format!("at most {} bytes fit, got {}", len, src.len()),
                });
            }
            bytes.fill(0);
            bytes[..src.len()].copy_from_slice(src);
        }
        (FieldFormat::U32Array(n), FieldValue::Array(vals)) => {
            if vals.len() != n {
                return Err(FbError::InvalidValue {
                    field: span.name.to_string(),
                    reason: format!("expected {} elements, got {}", n, vals.len()),
                });
            }
            for (i, v) in vals.iter().enumerate() {
                NativeEndian::write_u32(&mut bytes[4 * i..], *v);
            }
        }
        (_, value) => {
            return Err(FbError::InvalidValue {
                field: span.name.to_string(),
                reason: format!("value shape {:?} does not match the field format", value),
            });
        }
    }
    Ok(())
}

fn out_of_range(field: &str, value: u64, width: &str) -> FbError {
    FbError::InvalidValue {
        field: field.to_string(),
        reason: format!("{} does not fit {}", value, width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(offset: usize, format: FieldFormat) -> Span {
        Span { name: "field", offset, format }
    }

    #[test]
    fn test_layout_offsets_skip_padding() {
        let layout = RecordLayout::build(&[
            Entry::Field("a", FieldFormat::U32),
            Entry::Pad(2),
            Entry::Field("b", FieldFormat::U16),
            Entry::Field("c", FieldFormat::Str(4)),
        ]);

        assert_eq!(layout.spans.len(), 3);
        assert_eq!(layout.spans[0].offset, 0);
        assert_eq!(layout.spans[1].offset, 6);
        assert_eq!(layout.spans[2].offset, 8);
        assert_eq!(layout.byte_len, 12);
    }

    #[test]
    fn test_scalar_round_trip() {
        let mut buf = [0u8; 8];
        let s = span(2, FieldFormat::U32);

        write_field(&mut buf, &s, &FieldValue::Scalar(0xdead_beef)).unwrap();
        assert_eq!(read_field(&buf, &s), FieldValue::Scalar(0xdead_beef));
        // bytes outside the span stay untouched
        assert_eq!(buf[0], 0);
        assert_eq!(buf[1], 0);
        assert_eq!(buf[6], 0);
        assert_eq!(buf[7], 0);
    }

    #[test]
    fn test_scalar_out_of_range() {
        let mut buf = [0u8; 4];
        let s = span(0, FieldFormat::U16);

        let err = write_field(&mut buf, &s, &FieldValue::Scalar(0x1_0000)).unwrap_err();
        assert!(matches!(err, FbError::InvalidValue { .. }));
        // a failed write leaves the buffer unchanged
        assert_eq!(buf, [0; 4]);
    }

    #[test]
    fn test_string_zero_padded() {
        let mut buf = [0xffu8; 8];
        let s = span(0, FieldFormat::Str(8));

        write_field(&mut buf, &s, &FieldValue::Bytes(b"abc".to_vec())).unwrap();
        assert_eq!(&buf, b"abc\0\0\0\0\0");

        let err = write_field(&mut buf, &s, &FieldValue::Bytes(vec![0x61; 9])).unwrap_err();
        assert!(matches!(err, FbError::InvalidValue { .. }));
    }

    #[test]
    fn test_array_arity_checked() {
        let mut buf = [0u8; 12];
        let s = span(0, FieldFormat::U32Array(3));

        write_field(&mut buf, &s, &FieldValue::Array(vec![11, 5, 0])).unwrap();
        assert_eq!(read_field(&buf, &s), FieldValue::Array(vec![11, 5, 0]));

        let err = write_field(&mut buf, &s, &FieldValue::Array(vec![1, 2])).unwrap_err();
        assert!(matches!(err, FbError::InvalidValue { .. }));
    }

    #[test]
    fn test_wrong_value_shape() {
        let mut buf = [0u8; 4];
        let s = span(0, FieldFormat::U32);

        let err = write_field(&mut buf, &s, &FieldValue::Array(vec![1])).unwrap_err();
        assert!(matches!(err, FbError::InvalidValue { .. }));
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Scalar(1600).to_string(), "1600");
        assert_eq!(FieldValue::Array(vec![11, 5, 0]).to_string(), "(11, 5, 0)");
        assert_eq!(
            FieldValue::Bytes(b"mxc_epdc_fb\0\0\0\0\0".to_vec()).to_string(),
            "mxc_epdc_fb"
        );
    }
}
