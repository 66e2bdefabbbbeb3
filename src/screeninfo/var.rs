//! Variable screen information
//!
//! The negotiable half of the device state: geometry, pixel format and
//! timings. Matches `struct fb_var_screeninfo`, forty 32-bit slots on
//! every supported target.

use byteorder::{ByteOrder, NativeEndian};
use once_cell::sync::Lazy;

use crate::device::Framebuffer;
use crate::error::{FbError, FbResult};
use crate::pixel::ChannelLayout;
use crate::sys;

use super::{read_field, write_field, Entry, FieldFormat, FieldValue, RecordLayout};

/// Fields of the variable screen information, in kernel order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarField {
    Xres,
    Yres,
    XresVirtual,
    YresVirtual,
    Xoffset,
    Yoffset,
    BitsPerPixel,
    Grayscale,
    Red,
    Green,
    Blue,
    Transp,
    Nonstd,
    Activate,
    Height,
    Width,
    AccelFlags,
    Pixclock,
    LeftMargin,
    RightMargin,
    UpperMargin,
    LowerMargin,
    HsyncLen,
    VsyncLen,
    Sync,
    Vmode,
    Rotate,
}

impl VarField {
    /// Every field, in record order
    pub const ALL: [VarField; 27] = [
        VarField::Xres,
        VarField::Yres,
        VarField::XresVirtual,
        VarField::YresVirtual,
        VarField::Xoffset,
        VarField::Yoffset,
        VarField::BitsPerPixel,
        VarField::Grayscale,
        VarField::Red,
        VarField::Green,
        VarField::Blue,
        VarField::Transp,
        VarField::Nonstd,
        VarField::Activate,
        VarField::Height,
        VarField::Width,
        VarField::AccelFlags,
        VarField::Pixclock,
        VarField::LeftMargin,
        VarField::RightMargin,
        VarField::UpperMargin,
        VarField::LowerMargin,
        VarField::HsyncLen,
        VarField::VsyncLen,
        VarField::Sync,
        VarField::Vmode,
        VarField::Rotate,
    ];

    /// Kernel name of the field
    pub fn name(&self) -> &'static str {
        LAYOUT.spans[*self as usize].name
    }

    /// Look a field up by its kernel name
    pub fn from_name(name: &str) -> FbResult<Self> {
        VarField::ALL
            .iter()
            .copied()
            .find(|field| field.name() == name)
            .ok_or_else(|| FbError::InvalidField { name: name.to_string() })
    }
}

static ENTRIES: &[Entry] = &[
    Entry::Field("xres", FieldFormat::U32),
    Entry::Field("yres", FieldFormat::U32),
    Entry::Field("xres_virtual", FieldFormat::U32),
    Entry::Field("yres_virtual", FieldFormat::U32),
    Entry::Field("xoffset", FieldFormat::U32),
    Entry::Field("yoffset", FieldFormat::U32),
    Entry::Field("bits_per_pixel", FieldFormat::U32),
    Entry::Field("grayscale", FieldFormat::U32),
    Entry::Field("red", FieldFormat::U32Array(3)),
    Entry::Field("green", FieldFormat::U32Array(3)),
    Entry::Field("blue", FieldFormat::U32Array(3)),
    Entry::Field("transp", FieldFormat::U32Array(3)),
    Entry::Field("nonstd", FieldFormat::U32),
    Entry::Field("activate", FieldFormat::U32),
    Entry::Field("height", FieldFormat::U32),
    Entry::Field("width", FieldFormat::U32),
    Entry::Field("accel_flags", FieldFormat::U32),
    Entry::Field("pixclock", FieldFormat::U32),
    Entry::Field("left_margin", FieldFormat::U32),
    Entry::Field("right_margin", FieldFormat::U32),
    Entry::Field("upper_margin", FieldFormat::U32),
    Entry::Field("lower_margin", FieldFormat::U32),
    Entry::Field("hsync_len", FieldFormat::U32),
    Entry::Field("vsync_len", FieldFormat::U32),
    Entry::Field("sync", FieldFormat::U32),
    Entry::Field("vmode", FieldFormat::U32),
    Entry::Field("rotate", FieldFormat::U32),
    // reserved u32[5]
    Entry::Pad(20),
];

static LAYOUT: Lazy<RecordLayout> = Lazy::new(|| RecordLayout::build(ENTRIES));

/// Decoded view of `struct fb_var_screeninfo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarScreenInfo {
    buf: Vec<u8>,
}

impl VarScreenInfo {
    /// Create a zeroed record, not yet populated from any device
    pub fn new() -> Self {
        Self { buf: vec![0; LAYOUT.byte_len] }
    }

    /// Raw record bytes, kernel layout
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Read a field from the record
    pub fn get(&self, field: VarField) -> FieldValue {
        read_field(&self.buf, &LAYOUT.spans[field as usize])
    }

    /// Write a field into the record without touching the device
    pub fn set(&mut self, field: VarField, value: FieldValue) -> FbResult<()> {
        write_field(&mut self.buf, &LAYOUT.spans[field as usize], &value)
    }

    /// Re-read the record from the device, discarding local changes
    pub fn refresh(&mut self, fb: &Framebuffer) -> FbResult<()> {
        self.buf.fill(0);
        fb.read_info(sys::FBIOGET_VSCREENINFO, &mut self.buf)
    }

    /// Write the record back to the device, then refresh
    ///
    /// Drivers may clamp or adjust requested values; the refresh makes the
    /// record reflect what was actually accepted.
    pub fn commit(&mut self, fb: &Framebuffer) -> FbResult<()> {
        fb.write_info(sys::FBIOPUT_VSCREENINFO, &self.buf)?;
        self.refresh(fb)
    }

    pub fn xres(&self) -> u32 {
        self.read_u32(VarField::Xres)
    }

    pub fn yres(&self) -> u32 {
        self.read_u32(VarField::Yres)
    }

    pub fn xres_virtual(&self) -> u32 {
        self.read_u32(VarField::XresVirtual)
    }

    pub fn yres_virtual(&self) -> u32 {
        self.read_u32(VarField::YresVirtual)
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.read_u32(VarField::BitsPerPixel)
    }

    pub fn grayscale(&self) -> bool {
        self.read_u32(VarField::Grayscale) != 0
    }

    pub fn red(&self) -> ChannelLayout {
        self.channel(VarField::Red)
    }

    pub fn green(&self) -> ChannelLayout {
        self.channel(VarField::Green)
    }

    pub fn blue(&self) -> ChannelLayout {
        self.channel(VarField::Blue)
    }

    pub fn transp(&self) -> ChannelLayout {
        self.channel(VarField::Transp)
    }

    /// Whether the device reports the RGB565 pixel format
    pub fn is_rgb565(&self) -> bool {
        self.bits_per_pixel() == 16
            && self.red().matches(11, 5)
            && self.green().matches(5, 6)
            && self.blue().matches(0, 5)
    }

    fn read_u32(&self, field: VarField) -> u32 {
        let span = &LAYOUT.spans[field as usize];
        NativeEndian::read_u32(&self.buf[span.offset..])
    }

    fn channel(&self, field: VarField) -> ChannelLayout {
        let span = &LAYOUT.spans[field as usize];
        let read = |i: usize| NativeEndian::read_u32(&self.buf[span.offset + 4 * i..]);
        ChannelLayout { offset: read(0), length: read(1), msb_right: read(2) }
    }
}

impl Default for VarScreenInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_layout_matches_kernel() {
        assert_eq!(LAYOUT.byte_len, 160);
        assert_eq!(LAYOUT.spans[VarField::Xres as usize].offset, 0);
        assert_eq!(LAYOUT.spans[VarField::BitsPerPixel as usize].offset, 24);
        assert_eq!(LAYOUT.spans[VarField::Red as usize].offset, 32);
        assert_eq!(LAYOUT.spans[VarField::Transp as usize].offset, 68);
        assert_eq!(LAYOUT.spans[VarField::Pixclock as usize].offset, 100);
        assert_eq!(LAYOUT.spans[VarField::Rotate as usize].offset, 136);
    }

    #[test]
    fn test_field_enum_order_matches_layout() {
        assert_eq!(VarField::ALL.len(), LAYOUT.spans.len());
        for (i, field) in VarField::ALL.iter().enumerate() {
            assert_eq!(*field as usize, i);
            assert_eq!(VarField::from_name(field.name()).unwrap(), *field);
        }
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        let err = VarField::from_name("strides").unwrap_err();
        match err {
            FbError::InvalidField { name } => assert_eq!(name, "strides"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut var = VarScreenInfo::new();
        var.set(VarField::Xres, FieldValue::Scalar(800)).unwrap();
        var.set(VarField::Yres, FieldValue::Scalar(600)).unwrap();
        var.set(VarField::BitsPerPixel, FieldValue::Scalar(16)).unwrap();

        assert_eq!(var.get(VarField::Xres), FieldValue::Scalar(800));
        assert_eq!(var.xres(), 800);
        assert_eq!(var.yres(), 600);
        assert_eq!(var.bits_per_pixel(), 16);
    }

    #[test]
    fn test_set_leaves_adjacent_fields_alone() {
        let mut var = VarScreenInfo::new();
        var.set(VarField::Yoffset, FieldValue::Scalar(7)).unwrap();
        var.set(VarField::Grayscale, FieldValue::Scalar(9)).unwrap();

        // the field between the two written neighbours stays zero
        var.set(VarField::BitsPerPixel, FieldValue::Scalar(16)).unwrap();
        assert_eq!(var.get(VarField::Yoffset), FieldValue::Scalar(7));
        assert_eq!(var.get(VarField::Grayscale), FieldValue::Scalar(9));

        var.set(VarField::Green, FieldValue::Array(vec![5, 6, 0])).unwrap();
        assert_eq!(var.get(VarField::Red), FieldValue::Array(vec![0, 0, 0]));
        assert_eq!(var.get(VarField::Blue), FieldValue::Array(vec![0, 0, 0]));
    }

    #[test]
    fn test_scalar_too_wide_rejected() {
        let mut var = VarScreenInfo::new();
        let err = var
            .set(VarField::Xres, FieldValue::Scalar(u64::from(u32::MAX) + 1))
            .unwrap_err();
        assert!(matches!(err, FbError::InvalidValue { .. }));
        assert_eq!(var.xres(), 0);
    }

    #[test]
    fn test_is_rgb565() {
        let mut var = VarScreenInfo::new();
        var.set(VarField::BitsPerPixel, FieldValue::Scalar(16)).unwrap();
        var.set(VarField::Red, FieldValue::Array(vec![11, 5, 0])).unwrap();
        var.set(VarField::Green, FieldValue::Array(vec![5, 6, 0])).unwrap();
        var.set(VarField::Blue, FieldValue::Array(vec![0, 5, 0])).unwrap();
        assert!(var.is_rgb565());

        var.set(VarField::Green, FieldValue::Array(vec![5, 5, 0])).unwrap();
        assert!(!var.is_rgb565());
    }

    #[test]
    fn test_commit_reaches_the_device() {
        // a regular file accepts no ioctls, so commit must surface Ioctl
        let tmp = NamedTempFile::new().unwrap();
        let fb = Framebuffer::open(tmp.path()).unwrap();

        let mut var = VarScreenInfo::new();
        let err = var.commit(&fb).unwrap_err();
        assert!(matches!(err, FbError::Ioctl { request, .. }
            if request == sys::FBIOPUT_VSCREENINFO));
    }

    #[test]
    fn test_refresh_reaches_the_device() {
        let tmp = NamedTempFile::new().unwrap();
        let fb = Framebuffer::open(tmp.path()).unwrap();

        let mut var = VarScreenInfo::new();
        let err = var.refresh(&fb).unwrap_err();
        assert!(matches!(err, FbError::Ioctl { request, .. }
            if request == sys::FBIOGET_VSCREENINFO));
    }
}
