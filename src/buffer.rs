//! Mapped pixel buffer
//!
//! Maps the framebuffer memory into the process and provides the blit and
//! fill primitives rendering code needs. Controllers in this device class
//! fetch whole 32-pixel bursts, so rows are padded to a multiple of
//! 32 pixels regardless of the visible width.

use std::fmt;
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::ptr;
use std::slice;

use byteorder::{ByteOrder, NativeEndian};
use log::debug;

use crate::error::{FbError, FbResult};
use crate::pixel::Rgb565;

/// Geometry of the mapped buffer, derived from the variable screen info
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLayout {
    /// Visible width in pixels
    pub width: u32,
    /// Visible height in pixels
    pub height: u32,
    /// Bytes per pixel, rounded up for depths below one byte boundary
    pub bytes_per_pixel: u32,
    /// Bytes per row including the 32-pixel alignment padding
    pub stride: u32,
}

impl BufferLayout {
    /// Compute the mapping geometry for a screen mode
    ///
    /// Fails when the reported mode cannot be mapped: the stride must fit
    /// 32 bits and the total size must fit the target's address space.
    pub fn new(width: u32, height: u32, bits_per_pixel: u32) -> FbResult<Self> {
        let bytes_per_pixel = (u64::from(bits_per_pixel) + 7) / 8;
        let extra_pixels = (32 - width % 32) % 32;
        let stride = (u64::from(width) + u64::from(extra_pixels)) * bytes_per_pixel;
        let total = u128::from(stride) * u128::from(height);
        if stride > u64::from(u32::MAX) || total > usize::MAX as u128 {
            return Err(FbError::Mapping {
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "screen mode {}x{} at {} bpp is too large to map",
                        width, height, bits_per_pixel
                    ),
                ),
            });
        }
        Ok(Self {
            width,
            height,
            bytes_per_pixel: bytes_per_pixel as u32,
            stride: stride as u32,
        })
    }

    /// Total mapping size in bytes
    pub fn len(&self) -> usize {
        self.stride as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of one visible row, without the alignment padding
    pub fn row_bytes(&self) -> usize {
        (self.width * self.bytes_per_pixel) as usize
    }
}

/// Writable view of the framebuffer memory
///
/// Unmapped automatically when dropped. All drawing primitives assume the
/// 16-bit RGB565 format and refuse other depths.
pub struct PixelBuffer {
    ptr: *mut u8,
    layout: BufferLayout,
}

impl PixelBuffer {
    /// Map the device memory for the given geometry
    pub(crate) fn map(device: &File, layout: BufferLayout) -> FbResult<Self> {
        let len = layout.len();
        if len == 0 {
            return Err(FbError::Mapping {
                source: io::Error::new(io::ErrorKind::InvalidInput, "zero-sized screen mode"),
            });
        }

        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                device.as_raw_fd(),
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(FbError::Mapping { source: io::Error::last_os_error() });
        }

        debug!(
            "mapped {} bytes ({}x{} pixels, stride {})",
            len, layout.width, layout.height, layout.stride
        );
        Ok(Self { ptr: ptr as *mut u8, layout })
    }

    /// Mapping geometry
    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    /// Mapping size in bytes
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The mapped memory
    pub fn bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.ptr, self.len()) }
    }

    /// The mapped memory, writable
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.ptr, self.len()) }
    }

    /// Copy a tightly packed frame into the stride-padded mapping
    ///
    /// The frame must hold exactly `width * height` pixels in the pixel
    /// format the device is configured for; no conversion happens here.
    pub fn write_frame(&mut self, frame: &[u8]) -> FbResult<()> {
        let layout = self.layout;
        let row = layout.row_bytes();
        let expected = row * layout.height as usize;
        if frame.len() != expected {
            return Err(FbError::InvalidValue {
                field: "frame".to_string(),
                reason: format!("expected {} bytes, got {}", expected, frame.len()),
            });
        }

        let stride = layout.stride as usize;
        let dst = self.bytes_mut();
        if stride == row {
            dst.copy_from_slice(frame);
            return Ok(());
        }
        for y in 0..layout.height as usize {
            dst[y * stride..y * stride + row].copy_from_slice(&frame[y * row..(y + 1) * row]);
        }
        Ok(())
    }

    /// Put a pixel at (x, y) with bounds checking
    ///
    /// Returns false if the coordinates are out of bounds or the buffer is
    /// not 16 bits per pixel.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgb565) -> bool {
        let layout = self.layout;
        if layout.bytes_per_pixel != 2 || x >= layout.width || y >= layout.height {
            return false;
        }
        let offset = y as usize * layout.stride as usize + x as usize * 2;
        NativeEndian::write_u16(&mut self.bytes_mut()[offset..offset + 2], color.0);
        true
    }

    /// Fill a rectangle, clamped to the screen bounds
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb565) {
        let layout = self.layout;
        if layout.bytes_per_pixel != 2 {
            return;
        }

        let x_start = x.min(layout.width) as usize;
        let x_end = x.saturating_add(w).min(layout.width) as usize;
        let y_start = y.min(layout.height) as usize;
        let y_end = y.saturating_add(h).min(layout.height) as usize;

        let stride = layout.stride as usize;
        let dst = self.bytes_mut();
        for py in y_start..y_end {
            for px in x_start..x_end {
                let offset = py * stride + px * 2;
                NativeEndian::write_u16(&mut dst[offset..offset + 2], color.0);
            }
        }
    }

    /// Fill the whole mapping, padding included
    pub fn clear(&mut self, color: Rgb565) {
        let layout = self.layout;
        if layout.bytes_per_pixel != 2 {
            return;
        }
        let dst = self.bytes_mut();
        for cell in dst.chunks_exact_mut(2) {
            NativeEndian::write_u16(cell, color.0);
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("layout", &self.layout)
            .field("len", &self.len())
            .finish()
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        let rc = unsafe { libc::munmap(self.ptr as *mut libc::c_void, self.len()) };
        if rc != 0 {
            debug!("munmap failed: {}", io::Error::last_os_error());
        }
    }
}
