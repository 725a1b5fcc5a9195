//! Colour conversions between stored RGB triples, packed `0xRRGGBB`
//! integers used by the renderer, and `#rrggbb` strings used by forms.

/// An RGB triple as stored on divisions, resources and bodies.
pub type Rgb = [u8; 3];

/// Packed colour used when an entity carries no colour.
pub const DEFAULT_PACKED: u32 = 0x00ff_ffff;

/// Hues cycled through by [`fallback_palette`].
const FALLBACK_HUES: [u16; 10] = [180, 210, 250, 320, 45, 90, 0, 280, 120, 30];

/// Pack an optional RGB triple into `0xRRGGBB`; missing colours are white.
pub fn rgb_to_packed(rgb: Option<Rgb>) -> u32 {
    rgb.map_or(DEFAULT_PACKED, |[r, g, b]| {
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    })
}

/// Unpack `0xRRGGBB` into an RGB triple. Bits above 24 are ignored.
pub fn packed_to_rgb(packed: u32) -> Rgb {
    let [_, r, g, b] = packed.to_be_bytes();
    [r, g, b]
}

/// Format as a lowercase `#rrggbb` string.
pub fn rgb_to_hex_string([r, g, b]: Rgb) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Parse `#rrggbb` (leading `#` optional, case-insensitive). Anything
/// malformed yields white.
pub fn hex_to_rgb(hex: &str) -> Rgb {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return [255, 255, 255];
    }
    let channel = |range: core::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => [r, g, b],
        _ => [255, 255, 255],
    }
}

/// Deterministic packed colour for entity `id` when no colour is stored.
///
/// Cycles a fixed hue list at saturation 0.65 and lightness 0.52.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::arithmetic_side_effects
)]
pub fn fallback_palette(id: usize) -> u32 {
    let hue = FALLBACK_HUES
        .get(id % FALLBACK_HUES.len())
        .copied()
        .unwrap_or_default();
    let h = f64::from(hue);
    let s = 0.65_f64;
    let l = 0.52_f64;
    let c = (1.0 - 2.0f64.mul_add(l, -1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match hue {
        0..60 => (c, x, 0.0),
        60..120 => (x, c, 0.0),
        120..180 => (0.0, c, x),
        180..240 => (0.0, x, c),
        240..300 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    rgb_to_packed(Some([to_byte(r), to_byte(g), to_byte(b)]))
}
