//! Label contrast for colored event blocks.

use serde::{Deserialize, Serialize};

use crate::constants::LIGHT_BACKGROUND_LUMINANCE;

/// Tone of the label text drawn over a block's background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelTone {
    /// Dark text, for light backgrounds.
    Dark,
    /// Light text, for dark or unreadable backgrounds.
    Light,
}

/// Parse `#rrggbb` (the `#` is optional) into its channels.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim();
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Relative luminance on a 0-255 scale.
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)
}

/// Pick a readable label tone for `background`.
pub fn label_tone(background: &str) -> LabelTone {
    match parse_hex(background) {
        Some((r, g, b)) if luminance(r, g, b) > LIGHT_BACKGROUND_LUMINANCE => LabelTone::Dark,
        _ => LabelTone::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#3366ff"), Some((0x33, 0x66, 0xff)));
        assert_eq!(parse_hex("FFFFFF"), Some((255, 255, 255)));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#zz0000"), None);
        assert_eq!(parse_hex("+f+f+f"), None);
        assert_eq!(parse_hex("#1234567"), None);
        assert_eq!(parse_hex("##123456"), None);
    }

    #[test]
    fn test_label_tone() {
        assert_eq!(label_tone("#ffffff"), LabelTone::Dark);
        assert_eq!(label_tone("#ffeb3b"), LabelTone::Dark);
        assert_eq!(label_tone("#3366ff"), LabelTone::Light);
        assert_eq!(label_tone("#000000"), LabelTone::Light);
        assert_eq!(label_tone("not a color"), LabelTone::Light);
        assert_eq!(label_tone("+f+f+f"), LabelTone::Light);
    }
}
