//! Framebuffer Tool
//!
//! Inspection and test tool for Linux framebuffer devices: show and edit the
//! screen information records, control display blanking, and draw test
//! images on RGB565 panels.
//!
//! # Usage
//!
//! ```bash
//! # Show both screen information records
//! fbtool info
//!
//! # Read and change single fields
//! fbtool get var xres
//! fbtool get fix line_length
//! fbtool set bits_per_pixel 16 --commit
//!
//! # Display power control
//! fbtool blank
//! fbtool unblank
//!
//! # Test images
//! fbtool pattern
//! fbtool mandelbrot
//! fbtool scribble --touch /dev/input/event1
//! ```

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use byteorder::{ByteOrder, NativeEndian};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use linuxfb::{
    ChannelLayout, DisplayConfig, FieldValue, FixField, Framebuffer, PowerState, Rgb565,
    TouchReader, VarField,
};

/// Framebuffer Tool
///
/// Inspection and test tool for Linux framebuffer devices
#[derive(Parser)]
#[command(name = "fbtool")]
#[command(version = "0.1.0")]
#[command(about = "Framebuffer inspection and test tool for Linux fbdev displays")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Framebuffer device path (overrides the configuration file)
    #[arg(short, long, global = true)]
    device: Option<PathBuf>,

    /// Configuration file with device paths
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the screen information records
    Info {
        /// Also hex dump the raw records
        #[arg(long)]
        raw: bool,
    },

    /// Read one field from a screen information record
    Get {
        /// Which record to read
        #[arg(value_enum)]
        record: RecordArg,

        /// Field name (e.g. xres, line_length)
        field: String,
    },

    /// Set one field in the variable screen information
    Set {
        /// Field name (e.g. xres, bits_per_pixel)
        field: String,

        /// New value; channel layouts as offset,length,msb_right
        value: String,

        /// Write the change back to the device
        #[arg(long)]
        commit: bool,
    },

    /// Blank the display
    Blank {
        /// Blanking level
        #[arg(short, long, value_enum, default_value = "powerdown")]
        mode: BlankMode,
    },

    /// Power the display back on
    Unblank,

    /// Draw a grayscale gradient test picture
    Pattern,

    /// Draw the Mandelbrot set
    Mandelbrot,

    /// Paint with the touch panel
    Scribble {
        /// Touch input device path (overrides the configuration file)
        #[arg(short, long)]
        touch: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordArg {
    /// Variable screen information
    Var,
    /// Fixed screen information
    Fix,
}

#[derive(Clone, Copy, ValueEnum)]
enum BlankMode {
    Powerdown,
    Vsync,
    Hsync,
}

impl BlankMode {
    fn power_state(self) -> PowerState {
        match self {
            BlankMode::Powerdown => PowerState::PowerDown,
            BlankMode::Vsync => PowerState::VsyncSuspend,
            BlankMode::Hsync => PowerState::HsyncSuspend,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DisplayConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => DisplayConfig::default(),
    };
    let device = cli
        .device
        .clone()
        .unwrap_or_else(|| config.framebuffer_device.clone());

    match cli.command {
        Commands::Info { raw } => handle_info(&device, raw),
        Commands::Get { record, field } => handle_get(&device, record, &field),
        Commands::Set { field, value, commit } => handle_set(&device, &field, &value, commit),
        Commands::Blank { mode } => handle_blank(&device, mode.power_state()),
        Commands::Unblank => handle_blank(&device, PowerState::NoBlanking),
        Commands::Pattern => handle_pattern(&device),
        Commands::Mandelbrot => handle_mandelbrot(&device),
        Commands::Scribble { touch } => {
            let touch = touch.unwrap_or_else(|| config.touch_device.clone());
            handle_scribble(&device, &touch)
        }
    }
}

fn handle_info(device: &Path, raw: bool) -> Result<()> {
    let fb = Framebuffer::open(device)?;
    let var = fb.var_screen_info()?;
    let fix = fb.fixed_screen_info()?;

    println!("{}", "=".repeat(60));
    println!(
        "{}",
        format!("Framebuffer: {}", device.display()).cyan().bold()
    );
    println!("{}", "=".repeat(60));

    println!("\n{}", "Device:".white().bold());
    println!("  Identifier: {}", fix.id_str());
    println!("  Type: {}", fix.fb_type());
    println!("  Visual: {}", fix.visual());
    println!("  Line length: {} bytes", fix.line_length());
    println!("  Memory: {} bytes", fix.smem_len());

    println!("\n{}", "Mode:".white().bold());
    println!("  Resolution: {}x{}", var.xres(), var.yres());
    println!("  Virtual: {}x{}", var.xres_virtual(), var.yres_virtual());
    println!("  Depth: {} bpp", var.bits_per_pixel());
    println!("  Grayscale: {}", if var.grayscale() { "yes" } else { "no" });

    println!("\n{}", "Channels:".white().bold());
    print_channel("Red", var.red());
    print_channel("Green", var.green());
    print_channel("Blue", var.blue());
    print_channel("Transp", var.transp());

    if var.is_rgb565() {
        println!("\n{} RGB565 pixel format", "[OK]".green().bold());
    }

    if raw {
        println!("\n{}", "Variable record:".white().bold());
        hexdump::hexdump(var.bytes());
        println!("\n{}", "Fixed record:".white().bold());
        hexdump::hexdump(fix.bytes());
    }

    Ok(())
}

fn print_channel(name: &str, channel: ChannelLayout) {
    println!(
        "  {}: offset {}, length {}{}",
        name,
        channel.offset,
        channel.length,
        if channel.msb_right != 0 { ", msb right" } else { "" }
    );
}

fn handle_get(device: &Path, record: RecordArg, field: &str) -> Result<()> {
    let fb = Framebuffer::open(device)?;

    let value = match record {
        RecordArg::Var => fb.var_screen_info()?.get(VarField::from_name(field)?),
        RecordArg::Fix => fb.fixed_screen_info()?.get(FixField::from_name(field)?),
    };
    println!("{}", value);

    Ok(())
}

fn handle_set(device: &Path, field: &str, value: &str, commit: bool) -> Result<()> {
    let fb = Framebuffer::open(device)?;
    let field = VarField::from_name(field)?;
    let parsed = parse_field_value(value)?;

    let mut var = fb.var_screen_info()?;
    var.set(field, parsed)?;

    if commit {
        var.commit(&fb)?;
        println!(
            "{} {} = {} (driver accepted {})",
            "[OK]".green().bold(),
            field.name(),
            value,
            var.get(field)
        );
    } else {
        println!(
            "{} {} = {} in memory only; use --commit to apply",
            "[*]".cyan().bold(),
            field.name(),
            value
        );
    }

    Ok(())
}

fn parse_field_value(text: &str) -> Result<FieldValue> {
    if text.contains(',') {
        let mut parts = Vec::new();
        for part in text.split(',') {
            let part = part.trim();
            let n = parse_number(part)?;
            let n = u32::try_from(n)
                .map_err(|_| anyhow::anyhow!("value out of range: {}", part))?;
            parts.push(n);
        }
        return Ok(FieldValue::Array(parts));
    }
    Ok(FieldValue::Scalar(parse_number(text.trim())?))
}

fn parse_number(text: &str) -> Result<u64> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| anyhow::anyhow!("not a number: {}", text))
}

fn handle_blank(device: &Path, state: PowerState) -> Result<()> {
    let fb = Framebuffer::open(device)?;
    fb.set_power_state(state)?;
    println!("{} display {}", "[OK]".green().bold(), state);

    Ok(())
}

fn handle_pattern(device: &Path) -> Result<()> {
    let mut fb = Framebuffer::open(device)?;
    let var = fb.var_screen_info()?;
    ensure!(
        var.is_rgb565(),
        "the test picture needs an RGB565 mode, found {} bpp",
        var.bits_per_pixel()
    );

    let (width, height) = (var.xres(), var.yres());
    ensure!(width > 0 && height > 0, "zero-sized screen mode");

    // vertical gradient, black at the top to white at the bottom
    let mut frame = vec![0u8; (width * height * 2) as usize];
    for y in 0..height {
        let level = (y * 256 / height).min(255) as u8;
        let pixel = Rgb565::from_rgb(level, level, level).0;
        let row = (y * width * 2) as usize;
        for cell in frame[row..row + width as usize * 2].chunks_exact_mut(2) {
            NativeEndian::write_u16(cell, pixel);
        }
    }
    fb.pixel_buffer()?.write_frame(&frame)?;

    println!(
        "{} gradient drawn ({}x{})",
        "[OK]".green().bold(),
        width,
        height
    );

    Ok(())
}

fn handle_mandelbrot(device: &Path) -> Result<()> {
    let mut fb = Framebuffer::open(device)?;
    let var = fb.var_screen_info()?;
    ensure!(
        var.is_rgb565(),
        "drawing needs an RGB565 mode, found {} bpp",
        var.bits_per_pixel()
    );

    let (width, height) = (var.xres(), var.yres());
    ensure!(width > 0 && height > 0, "zero-sized screen mode");
    let buffer = fb.pixel_buffer()?;

    // escape counts 0 to 10 index into the grayscale ramp
    let colours = grayscale_ramp();
    for y in 0..height {
        let im0 = -1.4 + f64::from(y) * 2.8 / f64::from(height);
        for x in 0..width {
            let re0 = -2.1 + f64::from(x) * 3.2 / f64::from(width);

            let (mut re, mut im) = (re0, im0);
            let mut count = 0;
            while count < 10 && re * re + im * im <= 4.0 {
                let next = re * re - im * im + re0;
                im = 2.0 * re * im + im0;
                re = next;
                count += 1;
            }
            buffer.put_pixel(x, y, colours[count]);
        }
    }

    println!(
        "{} set drawn ({}x{})",
        "[OK]".green().bold(),
        width,
        height
    );

    Ok(())
}

fn grayscale_ramp() -> [Rgb565; 11] {
    let mut ramp = [Rgb565::BLACK; 11];
    for (i, colour) in ramp.iter_mut().enumerate() {
        let level = (i * 25) as u8;
        *colour = Rgb565::from_rgb(level, level, level);
    }
    ramp
}

fn handle_scribble(device: &Path, touch_device: &Path) -> Result<()> {
    let mut fb = Framebuffer::open(device)?;
    let var = fb.var_screen_info()?;
    ensure!(
        var.is_rgb565(),
        "drawing needs an RGB565 mode, found {} bpp",
        var.bits_per_pixel()
    );

    let mut touch = TouchReader::open(touch_device)?;
    let buffer = fb.pixel_buffer()?;
    buffer.clear(Rgb565::WHITE);

    println!(
        "{} scribbling from {}; press Ctrl-C to stop",
        "[*]".cyan().bold(),
        touch_device.display()
    );

    loop {
        match touch.read_touch()? {
            Some(point) => {
                let x = (point.x - 3).max(0) as u32;
                let y = (point.y - 3).max(0) as u32;
                buffer.fill_rect(x, y, 7, 7, Rgb565::BLACK);
            }
            None => thread::sleep(Duration::from_millis(5)),
        }
    }
}
