//! # Linux framebuffer device access
//!
//! This library talks to the Linux framebuffer device layer: it queries and
//! edits the variable and fixed screen information records, controls display
//! blanking, and maps the pixel memory for drawing. It was written for small
//! e-paper devices whose controllers fetch rows in 32-pixel bursts, so the
//! pixel mapping pads every row to a multiple of 32 pixels.
//!
//! ## Screen information records
//!
//! The kernel describes a framebuffer with two C structs. Both are handled
//! here as byte-buffer records with typed field access:
//!
//! - **Variable** ([`VarScreenInfo`]): resolution, depth, channel layouts,
//!   timings. Readable and writable; a commit writes the record back and
//!   re-reads what the driver actually accepted.
//! - **Fixed** ([`FixScreenInfo`]): identifier, memory ranges, line length.
//!   Read-only; committing it is refused before anything reaches the device.
//!
//! ## Example
//!
//! ```no_run
//! use linuxfb::{Framebuffer, Rgb565};
//!
//! fn main() -> linuxfb::FbResult<()> {
//!     let mut fb = Framebuffer::open("/dev/fb0")?;
//!
//!     let var = fb.var_screen_info()?;
//!     println!("{}x{} at {} bpp", var.xres(), var.yres(), var.bits_per_pixel());
//!
//!     let buffer = fb.pixel_buffer()?;
//!     buffer.fill_rect(0, 0, var.xres(), var.yres(), Rgb565::WHITE);
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod config;
pub mod device;
pub mod error;
pub mod input;
pub mod pixel;
pub mod screeninfo;
pub mod sys;

pub use buffer::{BufferLayout, PixelBuffer};
pub use config::DisplayConfig;
pub use device::{Framebuffer, PowerState};
pub use error::{FbError, FbResult};
pub use input::{InputEvent, Touch, TouchReader};
pub use pixel::{ChannelLayout, Rgb565};
pub use screeninfo::{FieldValue, FixField, FixScreenInfo, VarField, VarScreenInfo};
pub use sys::{FbType, FbVisual};
