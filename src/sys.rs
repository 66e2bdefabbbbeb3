//! Framebuffer kernel interface constants
//!
//! Request codes and mode values from /usr/include/linux/fb.h.

/// Read the variable screen information
pub const FBIOGET_VSCREENINFO: u32 = 0x4600;

/// Write the variable screen information
pub const FBIOPUT_VSCREENINFO: u32 = 0x4601;

/// Read the fixed screen information
pub const FBIOGET_FSCREENINFO: u32 = 0x4602;

/// Set the display blanking level
pub const FBIOBLANK: u32 = 0x4611;

/// VESA blanking levels accepted by FBIOBLANK
pub const VESA_NO_BLANKING: u32 = 0;
pub const VESA_VSYNC_SUSPEND: u32 = 1;
pub const VESA_HSYNC_SUSPEND: u32 = 2;
pub const VESA_POWERDOWN: u32 = 3;

/// Framebuffer memory layouts
pub const FB_TYPE_PACKED_PIXELS: u32 = 0;
pub const FB_TYPE_PLANES: u32 = 1;
pub const FB_TYPE_INTERLEAVED_PLANES: u32 = 2;
pub const FB_TYPE_TEXT: u32 = 3;
pub const FB_TYPE_VGA_PLANES: u32 = 4;

/// Framebuffer visual classes
pub const FB_VISUAL_MONO01: u32 = 0;
pub const FB_VISUAL_MONO10: u32 = 1;
pub const FB_VISUAL_TRUECOLOR: u32 = 2;
pub const FB_VISUAL_PSEUDOCOLOR: u32 = 3;
pub const FB_VISUAL_DIRECTCOLOR: u32 = 4;
pub const FB_VISUAL_STATIC_PSEUDOCOLOR: u32 = 5;

/// Memory layout reported in the fixed screen information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FbType {
    PackedPixels,
    Planes,
    InterleavedPlanes,
    Text,
    VgaPlanes,
    Unknown(u32),
}

impl From<u32> for FbType {
    fn from(raw: u32) -> Self {
        match raw {
            FB_TYPE_PACKED_PIXELS => FbType::PackedPixels,
            FB_TYPE_PLANES => FbType::Planes,
            FB_TYPE_INTERLEAVED_PLANES => FbType::InterleavedPlanes,
            FB_TYPE_TEXT => FbType::Text,
            FB_TYPE_VGA_PLANES => FbType::VgaPlanes,
            other => FbType::Unknown(other),
        }
    }
}

impl std::fmt::Display for FbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FbType::PackedPixels => write!(f, "packed pixels"),
            FbType::Planes => write!(f, "planes"),
            FbType::InterleavedPlanes => write!(f, "interleaved planes"),
            FbType::Text => write!(f, "text"),
            FbType::VgaPlanes => write!(f, "VGA planes"),
            FbType::Unknown(raw) => write!(f, "unknown ({})", raw),
        }
    }
}

/// Visual class reported in the fixed screen information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FbVisual {
    Mono01,
    Mono10,
    TrueColor,
    PseudoColor,
    DirectColor,
    StaticPseudoColor,
    Unknown(u32),
}

impl From<u32> for FbVisual {
    fn from(raw: u32) -> Self {
        match raw {
            FB_VISUAL_MONO01 => FbVisual::Mono01,
            FB_VISUAL_MONO10 => FbVisual::Mono10,
            FB_VISUAL_TRUECOLOR => FbVisual::TrueColor,
            FB_VISUAL_PSEUDOCOLOR => FbVisual::PseudoColor,
            FB_VISUAL_DIRECTCOLOR => FbVisual::DirectColor,
            FB_VISUAL_STATIC_PSEUDOCOLOR => FbVisual::StaticPseudoColor,
            other => FbVisual::Unknown(other),
        }
    }
}

impl std::fmt::Display for FbVisual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FbVisual::Mono01 => write!(f, "monochrome (1 is black)"),
            FbVisual::Mono10 => write!(f, "monochrome (1 is white)"),
            FbVisual::TrueColor => write!(f, "truecolor"),
            FbVisual::PseudoColor => write!(f, "pseudocolor"),
            FbVisual::DirectColor => write!(f, "directcolor"),
            FbVisual::StaticPseudoColor => write!(f, "static pseudocolor"),
            FbVisual::Unknown(raw) => write!(f, "unknown ({})", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fb_type_mapping() {
        assert_eq!(FbType::from(0), FbType::PackedPixels);
        assert_eq!(FbType::from(4), FbType::VgaPlanes);
        assert_eq!(FbType::from(9), FbType::Unknown(9));
    }

    #[test]
    fn test_fb_visual_mapping() {
        assert_eq!(FbVisual::from(2), FbVisual::TrueColor);
        assert_eq!(FbVisual::from(5), FbVisual::StaticPseudoColor);
        assert_eq!(FbVisual::from(17), FbVisual::Unknown(17));
    }

    #[test]
    fn test_unknown_values_survive_display() {
        assert_eq!(FbType::Unknown(7).to_string(), "unknown (7)");
        assert_eq!(FbVisual::TrueColor.to_string(), "truecolor");
    }
}
