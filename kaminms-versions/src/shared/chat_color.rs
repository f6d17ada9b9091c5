use kaminms_api::{ChatColor, ChatColors, Fault, Rgb};

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

const LEGACY_PALETTE: [(ChatColor, Rgb); 16] = [
    (ChatColor::Black, Rgb::from_hex(0x000000)),
    (ChatColor::DarkBlue, Rgb::from_hex(0x0000AA)),
    (ChatColor::DarkGreen, Rgb::from_hex(0x00AA00)),
    (ChatColor::DarkAqua, Rgb::from_hex(0x00AAAA)),
    (ChatColor::DarkRed, Rgb::from_hex(0xAA0000)),
    (ChatColor::DarkPurple, Rgb::from_hex(0xAA00AA)),
    (ChatColor::Gold, Rgb::from_hex(0xFFAA00)),
    (ChatColor::Gray, Rgb::from_hex(0xAAAAAA)),
    (ChatColor::DarkGray, Rgb::from_hex(0x555555)),
    (ChatColor::Blue, Rgb::from_hex(0x5555FF)),
    (ChatColor::Green, Rgb::from_hex(0x55FF55)),
    (ChatColor::Aqua, Rgb::from_hex(0x55FFFF)),
    (ChatColor::Red, Rgb::from_hex(0xFF5555)),
    (ChatColor::LightPurple, Rgb::from_hex(0xFF55FF)),
    (ChatColor::Yellow, Rgb::from_hex(0xFFFF55)),
    (ChatColor::White, Rgb::from_hex(0xFFFFFF)),
];

pub(crate) fn legacy_rgb(color: ChatColor) -> Option<Rgb> {
    LEGACY_PALETTE
        .iter()
        .find(|(c, _)| *c == color)
        .map(|(_, rgb)| *rgb)
}

/// Closest of the sixteen legacy colors to `rgb`.
pub(crate) fn nearest_legacy(rgb: Rgb) -> ChatColor {
    let distance = |other: &Rgb| {
        let dr = i32::from(rgb.r) - i32::from(other.r);
        let dg = i32::from(rgb.g) - i32::from(other.g);
        let db = i32::from(rgb.b) - i32::from(other.b);
        dr * dr + dg * dg + db * db
    };
    LEGACY_PALETTE
        .iter()
        .min_by_key(|(_, candidate)| distance(candidate))
        .map(|(color, _)| *color)
        .unwrap_or(ChatColor::White)
}

/// Fixed palette for releases before hex colors (pre 1.16.2).
#[derive(Debug, Default)]
pub struct ApproximatedColors;

impl ChatColors for ApproximatedColors {
    fn color_of(&self, color: ChatColor) -> Result<Option<Rgb>, Fault> {
        Ok(legacy_rgb(color))
    }
}

/// Reads the color from the host (1.16.2+).
#[derive(Debug)]
pub struct NativeColors {
    internals: Internals,
}

impl NativeColors {
    pub fn new(internals: Internals) -> Self {
        Self { internals }
    }
}

impl ChatColors for NativeColors {
    fn color_of(&self, color: ChatColor) -> Result<Option<Rgb>, Fault> {
        if color.is_format() {
            return Ok(None);
        }
        self.internals.call(Internal::ChatColorRgb, vec![arg(&color)?])
    }
}
