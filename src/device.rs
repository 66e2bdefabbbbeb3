//! Framebuffer device handle
//!
//! Owns the open device file and issues the screen information and
//! blanking requests against it. Queries always go to the device; nothing
//! about the screen mode is cached here except the pixel mapping itself.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::buffer::{BufferLayout, PixelBuffer};
use crate::error::{FbError, FbResult};
use crate::screeninfo::{FixScreenInfo, VarScreenInfo};
use crate::sys;

/// Display power state accepted by the blanking request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PowerState {
    /// Display on
    NoBlanking = sys::VESA_NO_BLANKING,
    /// Blanked, vertical sync suspended
    VsyncSuspend = sys::VESA_VSYNC_SUSPEND,
    /// Blanked, horizontal sync suspended
    HsyncSuspend = sys::VESA_HSYNC_SUSPEND,
    /// Display off
    PowerDown = sys::VESA_POWERDOWN,
}

impl PowerState {
    /// The VESA blanking level passed to the device
    pub fn code(&self) -> u32 {
        *self as u32
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::NoBlanking => write!(f, "on"),
            PowerState::VsyncSuspend => write!(f, "vsync suspend"),
            PowerState::HsyncSuspend => write!(f, "hsync suspend"),
            PowerState::PowerDown => write!(f, "powered down"),
        }
    }
}

/// Open framebuffer device
pub struct Framebuffer {
    // declared before the file so the mapping is torn down first
    buffer: Option<PixelBuffer>,
    device: File,
    path: PathBuf,
}

impl Framebuffer {
    /// Open a framebuffer device for reading and writing
    pub fn open<P: AsRef<Path>>(path: P) -> FbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| FbError::DeviceUnavailable { path: path.clone(), source })?;

        debug!("opened framebuffer device {}", path.display());
        Ok(Self { buffer: None, device, path })
    }

    /// Path the device was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Query the variable screen information
    pub fn var_screen_info(&self) -> FbResult<VarScreenInfo> {
        let mut var = VarScreenInfo::new();
        var.refresh(self)?;
        Ok(var)
    }

    /// Query the fixed screen information
    pub fn fixed_screen_info(&self) -> FbResult<FixScreenInfo> {
        let mut fix = FixScreenInfo::new();
        fix.refresh(self)?;
        Ok(fix)
    }

    /// Set the display power state
    pub fn set_power_state(&self, state: PowerState) -> FbResult<()> {
        debug!("setting power state: {}", state);
        let rc = unsafe {
            libc::ioctl(
                self.device.as_raw_fd(),
                sys::FBIOBLANK as _,
                state.code() as libc::c_ulong,
            )
        };
        if rc != 0 {
            return Err(FbError::Ioctl {
                request: sys::FBIOBLANK,
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }

    /// Power the display down
    pub fn blank(&self) -> FbResult<()> {
        self.set_power_state(PowerState::PowerDown)
    }

    /// Power the display back on
    pub fn unblank(&self) -> FbResult<()> {
        self.set_power_state(PowerState::NoBlanking)
    }

    /// The mapped pixel buffer, created on first use
    ///
    /// The first call queries the current screen mode and maps the device
    /// memory; later calls return the same mapping without touching the
    /// device again.
    pub fn pixel_buffer(&mut self) -> FbResult<&mut PixelBuffer> {
        let mapped = match self.buffer.take() {
            Some(mapped) => mapped,
            None => {
                let var = self.var_screen_info()?;
                let layout = BufferLayout::new(var.xres(), var.yres(), var.bits_per_pixel())?;
                debug!(
                    "mapping {}x{} at {} bpp, stride {}",
                    layout.width,
                    layout.height,
                    var.bits_per_pixel(),
                    layout.stride
                );
                PixelBuffer::map(&self.device, layout)?
            }
        };
        Ok(self.buffer.insert(mapped))
    }

    /// Issue a read request filling the whole record buffer
    pub(crate) fn read_info(&self, request: u32, buf: &mut [u8]) -> FbResult<()> {
        trace!("ioctl read 0x{:04x}, {} bytes", request, buf.len());
        let rc = unsafe {
            libc::ioctl(self.device.as_raw_fd(), request as _, buf.as_mut_ptr())
        };
        if rc != 0 {
            return Err(FbError::Ioctl { request, source: io::Error::last_os_error() });
        }
        Ok(())
    }

    /// Issue a write request from the whole record buffer
    pub(crate) fn write_info(&self, request: u32, buf: &[u8]) -> FbResult<()> {
        trace!("ioctl write 0x{:04x}, {} bytes", request, buf.len());
        let rc = unsafe {
            libc::ioctl(self.device.as_raw_fd(), request as _, buf.as_ptr())
        };
        if rc != 0 {
            return Err(FbError::Ioctl { request, source: io::Error::last_os_error() });
        }
        Ok(())
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framebuffer")
            .field("path", &self.path)
            .field("mapped", &self.buffer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_missing_device() {
        let err = Framebuffer::open("/nonexistent/fb0").unwrap_err();
        match err {
            FbError::DeviceUnavailable { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/fb0"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_queries_hit_the_device() {
        // regular files accept no framebuffer ioctls
        let tmp = NamedTempFile::new().unwrap();
        let fb = Framebuffer::open(tmp.path()).unwrap();

        let err = fb.var_screen_info().unwrap_err();
        assert!(matches!(err, FbError::Ioctl { request, .. }
            if request == sys::FBIOGET_VSCREENINFO));

        let err = fb.fixed_screen_info().unwrap_err();
        assert!(matches!(err, FbError::Ioctl { request, .. }
            if request == sys::FBIOGET_FSCREENINFO));
    }

    #[test]
    fn test_blanking_hits_the_device() {
        let tmp = NamedTempFile::new().unwrap();
        let fb = Framebuffer::open(tmp.path()).unwrap();

        let err = fb.blank().unwrap_err();
        assert!(matches!(err, FbError::Ioctl { request, .. } if request == sys::FBIOBLANK));
        let err = fb.set_power_state(PowerState::VsyncSuspend).unwrap_err();
        assert!(matches!(err, FbError::Ioctl { request, .. } if request == sys::FBIOBLANK));
    }

    #[test]
    fn test_power_state_codes() {
        assert_eq!(PowerState::NoBlanking.code(), 0);
        assert_eq!(PowerState::VsyncSuspend.code(), 1);
        assert_eq!(PowerState::HsyncSuspend.code(), 2);
        assert_eq!(PowerState::PowerDown.code(), 3);
    }

    #[test]
    fn test_pixel_buffer_reuses_mapping() {
        let layout = BufferLayout::new(32, 4, 16).unwrap();
        let tmp = NamedTempFile::new().unwrap();
        tmp.as_file().set_len(layout.len() as u64).unwrap();

        let mut fb = Framebuffer {
            buffer: None,
            device: tmp.reopen().unwrap(),
            path: tmp.path().to_path_buf(),
        };
        // seed the mapping; a mode query against the regular file would
        // fail, so a second map attempt cannot go unnoticed
        fb.buffer = Some(PixelBuffer::map(&fb.device, layout).unwrap());

        let first = fb.pixel_buffer().unwrap().bytes().as_ptr();
        let second = fb.pixel_buffer().unwrap().bytes().as_ptr();
        assert_eq!(first, second);
    }
}
