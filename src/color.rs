//! RGB color carried by a [`Font`](crate::Font).
//!
//! Colors in a styled buffer are plain values: they are compared, sorted and
//! deduplicated when a snapshot is serialized, so the components are integers
//! rather than blend-friendly floats.
//!
//! # Examples
//!
//! ```
//! use styled_text::Rgb;
//!
//! let accent = Rgb::from_hex("#6495ed").unwrap();
//! assert_eq!(accent, Rgb::new(100, 149, 237));
//! assert_eq!(accent.to_hex(), "#6495ed");
//! ```

use std::fmt;

/// Opaque RGB color with 8-bit components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    /// Mid gray, the usual color for de-emphasized text.
    pub const GRAY: Self = Self::new(128, 128, 128);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB` (the `#` is optional).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                // #RGB -> #RRGGBB
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("ff0000"), Some(Rgb::RED));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::from_hex("#ééé"), None);
    }

    #[test]
    fn test_ordering_is_component_wise() {
        let mut colors = vec![Rgb::WHITE, Rgb::BLACK, Rgb::RED, Rgb::BLACK];
        colors.sort();
        colors.dedup();
        assert_eq!(colors, vec![Rgb::BLACK, Rgb::RED, Rgb::WHITE]);
    }

    #[test]
    fn test_display_is_space_separated() {
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "1 2 3");
    }
}
