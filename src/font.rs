//! Font values stored per character in a styled buffer.
//!
//! - [`FontAttributes`]: bitflags for bold, italic and strike
//! - [`FontStyle`]: attributes plus underline count and color
//! - [`Font`]: name, size and style, the value kept in the run store
//! - [`FontProvider`]: where new fonts come from when the buffer needs one
//!
//! # Examples
//!
//! ```
//! use styled_text::{Font, FontStyle, Rgb};
//!
//! let body = Font::new("Helvetica", 12);
//! let heading = body.clone().with_size(18).with_bold(true);
//! assert!(heading.style.is_bold());
//!
//! let link = body.with_style(FontStyle::default().with_underline(1).with_color(Rgb::BLUE));
//! assert_eq!(link.style.underline_count, 1);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::color::Rgb;
use bitflags::bitflags;

bitflags! {
    /// Weight/slant/strike flags of a font.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct FontAttributes: u8 {
        const BOLD   = 0x01;
        const ITALIC = 0x02;
        const STRIKE = 0x04;
    }
}

/// Style part of a font: everything except family name and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontStyle {
    pub attributes: FontAttributes,
    /// Number of underlines (0 = none, 2 = double underline).
    pub underline_count: u8,
    pub color: Rgb,
}

impl FontStyle {
    /// Plain black text.
    pub const PLAIN: Self = Self {
        attributes: FontAttributes::empty(),
        underline_count: 0,
        color: Rgb::BLACK,
    };

    #[must_use]
    pub const fn is_bold(&self) -> bool {
        self.attributes.contains(FontAttributes::BOLD)
    }

    #[must_use]
    pub const fn is_italic(&self) -> bool {
        self.attributes.contains(FontAttributes::ITALIC)
    }

    #[must_use]
    pub const fn is_strike(&self) -> bool {
        self.attributes.contains(FontAttributes::STRIKE)
    }

    #[must_use]
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.attributes.set(FontAttributes::BOLD, bold);
        self
    }

    #[must_use]
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.attributes.set(FontAttributes::ITALIC, italic);
        self
    }

    #[must_use]
    pub fn with_strike(mut self, strike: bool) -> Self {
        self.attributes.set(FontAttributes::STRIKE, strike);
        self
    }

    #[must_use]
    pub const fn with_underline(mut self, count: u8) -> Self {
        self.underline_count = count;
        self
    }

    #[must_use]
    pub const fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

/// A complete font: family name, point size and style.
///
/// Fonts are values. The name is shared behind an `Arc` so cloning a font for
/// every run split is cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    name: Arc<str>,
    pub size: u16,
    pub style: FontStyle,
}

impl Font {
    #[must_use]
    pub fn new(name: &str, size: u16) -> Self {
        Self {
            name: Arc::from(name),
            size,
            style: FontStyle::PLAIN,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        if &*self.name != name {
            self.name = Arc::from(name);
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.set_name(name);
        self
    }

    #[must_use]
    pub const fn with_size(mut self, size: u16) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub const fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.style = self.style.with_bold(bold);
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(DefaultFontProvider::DEFAULT_NAME, DefaultFontProvider::DEFAULT_SIZE)
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.size)?;
        if self.style.is_bold() {
            write!(f, " bold")?;
        }
        if self.style.is_italic() {
            write!(f, " italic")?;
        }
        if self.style.is_strike() {
            write!(f, " strike")?;
        }
        if self.style.underline_count > 0 {
            write!(f, " underline×{}", self.style.underline_count)?;
        }
        Ok(())
    }
}

/// Source of fonts for a buffer.
///
/// The buffer copies fonts it is given but only asks the provider when it
/// needs a brand new one: the default font and fonts rebuilt while reading a
/// serialized snapshot.
pub trait FontProvider {
    /// Font used for text with no other styling information.
    fn default_font(&self) -> Font;

    /// Font with the given attributes.
    fn font(&self, name: &str, size: u16, style: FontStyle) -> Font {
        Font::new(name, size).with_style(style)
    }
}

/// Provider that builds fonts directly from their attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFontProvider;

impl DefaultFontProvider {
    pub const DEFAULT_NAME: &'static str = "Helvetica";
    pub const DEFAULT_SIZE: u16 = 12;
}

impl FontProvider for DefaultFontProvider {
    fn default_font(&self) -> Font {
        Font::new(Self::DEFAULT_NAME, Self::DEFAULT_SIZE)
    }
}
