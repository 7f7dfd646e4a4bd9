//! Color helpers for the dimmed-segment fill.

/// Sentinel value for `dimmed_color` meaning "derive from the digit color".
pub const DERIVE_SENTINEL: &str = "none";

const WHITE: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` into RGB channels. Alpha is ignored.
pub fn parse_hex_rgb(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 0x11;
            }
            Some(out)
        }
        6 | 8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b])
        }
        _ => None,
    }
}

/// Build the translucent dimmed color for `digit_color` at `opacity` percent.
///
/// Hex digit colors keep their channels; `white` and anything unparseable fall
/// back to white at the same alpha.
pub fn derive_dimmed(digit_color: &str, opacity: f64) -> String {
    let alpha = opacity / 100.0;
    let rgb = if digit_color.starts_with('#') {
        parse_hex_rgb(digit_color).unwrap_or_else(|| {
            log::warn!("Digit color {:?} is not a valid hex color, dimming with white", digit_color);
            WHITE
        })
    } else if digit_color.eq_ignore_ascii_case("white") {
        WHITE
    } else {
        log::debug!("No channel decomposition for {:?}, dimming with white", digit_color);
        WHITE
    };
    format!("rgba({},{},{},{})", rgb[0], rgb[1], rgb[2], alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_triplets_and_short_form() {
        assert_eq!(parse_hex_rgb("#FF0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_rgb("#0a0B0c"), Some([10, 11, 12]));
        assert_eq!(parse_hex_rgb("#f80"), Some([0xFF, 0x88, 0x00]));
        assert_eq!(parse_hex_rgb("#11223380"), Some([0x11, 0x22, 0x33]));
        assert_eq!(parse_hex_rgb("FF0000"), None);
        assert_eq!(parse_hex_rgb("#GG0000"), None);
        assert_eq!(parse_hex_rgb("#12345"), None);
    }

    #[test]
    fn red_at_half_opacity() {
        assert_eq!(derive_dimmed("#FF0000", 50.0), "rgba(255,0,0,0.5)");
    }

    #[test]
    fn white_and_named_colors_use_white_channels() {
        assert_eq!(derive_dimmed("white", 30.0), "rgba(255,255,255,0.3)");
        assert_eq!(derive_dimmed("red", 20.0), "rgba(255,255,255,0.2)");
        assert_eq!(derive_dimmed("#zzzzzz", 10.0), "rgba(255,255,255,0.1)");
    }

    #[test]
    fn zero_opacity_is_fully_transparent() {
        assert_eq!(derive_dimmed("#00FF00", 0.0), "rgba(0,255,0,0)");
    }
}
