/// Straight-alpha RGBA8 color.
pub(crate) type Rgba8 = [u8; 4];

pub(crate) const WHITE: Rgba8 = [255, 255, 255, 255];
pub(crate) const BLACK: Rgba8 = [0, 0, 0, 255];
pub(crate) const PLACEHOLDER_GREY: Rgba8 = [128, 128, 128, 255];

/// Resolve an optional hex color string, falling back when absent or unparsable.
pub(crate) fn resolve_color(value: Option<&str>, fallback: Rgba8) -> Rgba8 {
    let Some(s) = value else {
        return fallback;
    };
    match parse_hex(s) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(color = s, "{e}; using fallback color");
            fallback
        }
    }
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (case-insensitive, leading `#` required).
pub(crate) fn parse_hex(s: &str) -> Result<Rgba8, String> {
    let s = s.trim();
    let Some(hex) = s.strip_prefix('#') else {
        return Err(format!("color \"{s}\" is not a hex color"));
    };

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !hex.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    match hex.len() {
        3 => {
            let mut out = [0u8, 0, 0, 255];
            for (i, c) in hex.chars().enumerate() {
                let d = hex_byte(&c.to_string())?;
                out[i] = d * 17;
            }
            Ok(out)
        }
        6 => Ok([
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
            255,
        ]),
        8 => Ok([
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
            hex_byte(&hex[6..8])?,
        ]),
        _ => Err("hex color must be #RGB, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/color.rs"]
mod tests;
