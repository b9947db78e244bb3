//! Reading and writing buffers.
//!
//! Two formats are supported:
//!
//! - plain text, with the newline convention detected on read and restored
//!   on write
//! - a versioned styled snapshot used for clipboards and save files
//!
//! # Styled snapshot layout (version 1)
//!
//! All fields are separated by single spaces:
//!
//! ```text
//! 1 <byte count> <UTF-8 bytes>
//!   <font count> "<name>"...
//!   <color count> <r> <g> <b>...
//!   <run count> <chars> <font index> <size> <bold italic strike as T/F> <underlines> <color index>...
//! ```
//!
//! Font names and colors are stored once, sorted, and referenced by
//! zero-based index. An empty snapshot is `1 0 0 0 0`.
//!
//! # Examples
//!
//! ```
//! use styled_text::{StyledText, TextOptions};
//!
//! let mut text = StyledText::with_text("bold move", TextOptions::default());
//! let bold = text.char_range(0..4);
//! text.set_font_bold(&bold, true, false);
//!
//! let mut saved = Vec::new();
//! text.write_private_format(&mut saved, None).unwrap();
//!
//! let mut copy = StyledText::default();
//! copy.read_private(saved.as_slice()).unwrap();
//! assert_eq!(copy.text(), "bold move");
//! assert!(copy.font_at(0).style.is_bold());
//! ```

use std::io::{Read, Write};

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::event::{RejectReason, TextEvent};
use crate::font::{Font, FontAttributes, FontProvider, FontStyle};
use crate::text::{RunArray, StyledText, TextRange, contains_illegal_chars};

/// Newest styled snapshot version this crate reads and writes.
pub const PRIVATE_FORMAT_VERSION: u32 = 1;

/// Newline convention of a plain text file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlainTextFormat {
    #[default]
    Unix,
    Dos,
    Mac,
}

impl PlainTextFormat {
    #[must_use]
    pub const fn newline(self) -> &'static str {
        match self {
            Self::Unix => "\n",
            Self::Dos => "\r\n",
            Self::Mac => "\r",
        }
    }

    /// Convention used by `text`: any `\r\n` means DOS, a lone `\r` means Mac.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Dos
        } else if text.contains('\r') {
            Self::Mac
        } else {
            Self::Unix
        }
    }
}

/// Outcome of [`StyledText::read_plain_text`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlainTextLoad {
    /// The text replaced the buffer contents.
    Loaded {
        format: PlainTextFormat,
        /// `false` if bytes or characters had to be dropped or replaced.
        clean: bool,
    },
    /// The input looked binary and binary input was not accepted.
    RejectedBinary,
}

impl StyledText {
    /// Replace the contents with plain text read from `reader`.
    ///
    /// Line endings are converted to `\n` and the detected convention is
    /// returned so [`write_plain_text`](Self::write_plain_text) can restore
    /// it. Input holding control characters is treated as binary: it is
    /// loaded (with those characters dropped) only if `accept_binary` is set.
    /// Undo history is cleared.
    pub fn read_plain_text(&mut self, mut reader: impl Read, accept_binary: bool) -> Result<PlainTextLoad> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let decoded = String::from_utf8_lossy(&bytes);
        let lossless = matches!(decoded, std::borrow::Cow::Borrowed(_));
        let mut text = decoded.into_owned();

        let format = if contains_illegal_chars(&text) {
            if !accept_binary {
                tracing::warn!(bytes = bytes.len(), "refusing binary input");
                self.emit(&TextEvent::InputRejected {
                    reason: RejectReason::Binary,
                });
                return Ok(PlainTextLoad::RejectedBinary);
            }
            PlainTextFormat::Unix
        } else {
            let format = PlainTextFormat::detect(&text);
            match format {
                PlainTextFormat::Dos => text.retain(|c| c != '\r'),
                PlainTextFormat::Mac => text = text.replace('\r', "\n"),
                PlainTextFormat::Unix => {}
            }
            format
        };

        tracing::debug!(?format, len = text.len(), "read plain text");
        let clean = self.set_text(&text, None) && lossless;
        Ok(PlainTextLoad::Loaded { format, clean })
    }

    /// Write the text with `format`'s line endings.
    pub fn write_plain_text(&self, mut writer: impl Write, format: PlainTextFormat) -> Result<()> {
        for chunk in self.store().inner().chunks() {
            if format == PlainTextFormat::Unix {
                writer.write_all(chunk.as_bytes())?;
                continue;
            }
            let mut lines = chunk.split('\n');
            if let Some(first) = lines.next() {
                writer.write_all(first.as_bytes())?;
            }
            for line in lines {
                writer.write_all(format.newline().as_bytes())?;
                writer.write_all(line.as_bytes())?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Write `range` (the whole text if `None`) as a styled snapshot.
    pub fn write_private_format(&self, writer: impl Write, range: Option<&TextRange>) -> Result<()> {
        let range = range.cloned().unwrap_or_else(|| self.select_all());
        match self.copy(&range) {
            Some((text, styles)) => write_private_format(writer, &text, &styles),
            None => write_private_format(writer, "", &RunArray::new()),
        }
    }

    /// Replace the contents with a styled snapshot read from `reader`.
    ///
    /// Fonts are rebuilt through the buffer's font provider. On error the
    /// buffer is left untouched. Returns `false` if the text had to be
    /// cleaned, as [`set_text`](Self::set_text) does.
    pub fn read_private(&mut self, reader: impl Read) -> Result<bool> {
        let (text, styles) = read_private_format(reader, self.font_provider())?;
        Ok(self.set_text(&text, Some(&styles)))
    }
}

/// Serialize `text` and its `styles` as a version 1 snapshot.
///
/// # Panics
///
/// Panics if `styles` does not hold one font per character of `text`.
pub fn write_private_format(mut writer: impl Write, text: &str, styles: &RunArray<Font>) -> Result<()> {
    assert_eq!(
        styles.len(),
        text.chars().count(),
        "style count does not match text length"
    );

    let mut names: Vec<&str> = styles.runs().iter().map(|run| run.value.name()).collect();
    names.sort_unstable();
    names.dedup();
    let mut colors: Vec<Rgb> = styles.runs().iter().map(|run| run.value.style.color).collect();
    colors.sort_unstable();
    colors.dedup();

    write!(writer, "{PRIVATE_FORMAT_VERSION} {}", text.len())?;
    if !text.is_empty() {
        writer.write_all(b" ")?;
        writer.write_all(text.as_bytes())?;
    }

    write!(writer, " {}", names.len())?;
    for name in &names {
        write!(writer, " {}", quote(name))?;
    }
    write!(writer, " {}", colors.len())?;
    for color in &colors {
        write!(writer, " {} {} {}", color.r, color.g, color.b)?;
    }

    write!(writer, " {}", styles.run_count())?;
    for run in styles.runs() {
        let font = &run.value;
        let font_index = names.binary_search(&font.name()).unwrap_or_default();
        let color_index = colors.binary_search(&font.style.color).unwrap_or_default();
        write!(
            writer,
            " {} {font_index} {} {} {} {color_index}",
            run.len,
            font.size,
            flags_token(font.style.attributes),
            font.style.underline_count,
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse a snapshot written by [`write_private_format`].
pub fn read_private_format(mut reader: impl Read, provider: &dyn FontProvider) -> Result<(String, RunArray<Font>)> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    let mut scanner = Scanner::new(&data);

    let version: u32 = scanner.number("version")?;
    if version > PRIVATE_FORMAT_VERSION {
        return Err(Error::UnsupportedVersion {
            found: version,
            supported: PRIVATE_FORMAT_VERSION,
        });
    }

    let byte_count: usize = scanner.number("byte count")?;
    let text = String::from_utf8(scanner.blob(byte_count)?.to_vec()).map_err(|_| Error::InvalidUtf8)?;

    let font_count: usize = scanner.number("font count")?;
    let names = (0..font_count)
        .map(|_| scanner.quoted())
        .collect::<Result<Vec<_>>>()?;

    let color_count: usize = scanner.number("color count")?;
    let mut colors = Vec::with_capacity(color_count.min(data.len()));
    for _ in 0..color_count {
        let r = scanner.number("red")?;
        let g = scanner.number("green")?;
        let b = scanner.number("blue")?;
        colors.push(Rgb::new(r, g, b));
    }

    let chars = text.chars().count();
    let run_count: usize = scanner.number("run count")?;
    let mut styles = RunArray::new();
    let mut covered = 0usize;
    for _ in 0..run_count {
        let len: usize = scanner.number("run length")?;
        covered = covered
            .checked_add(len)
            .filter(|&total| total <= chars)
            .ok_or_else(|| Error::Malformed(format!("runs cover more than the {chars} characters of the text")))?;
        let font_index: usize = scanner.number("font index")?;
        let size: u16 = scanner.number("font size")?;
        let attributes = parse_flags(scanner.token("font flags")?)?;
        let underline_count: u8 = scanner.number("underline count")?;
        let color_index: usize = scanner.number("color index")?;

        let name = names
            .get(font_index)
            .ok_or_else(|| Error::Malformed(format!("font index {font_index} out of range")))?;
        let color = *colors
            .get(color_index)
            .ok_or_else(|| Error::Malformed(format!("color index {color_index} out of range")))?;
        let style = FontStyle {
            attributes,
            underline_count,
            color,
        };
        styles.push(provider.font(name, size, style), len);
    }

    if styles.len() != chars {
        return Err(Error::Malformed(format!(
            "runs cover {} characters but the text has {chars}",
            styles.len()
        )));
    }
    Ok((text, styles))
}

fn quote(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn flags_token(attributes: FontAttributes) -> String {
    [FontAttributes::BOLD, FontAttributes::ITALIC, FontAttributes::STRIKE]
        .iter()
        .map(|&flag| if attributes.contains(flag) { 'T' } else { 'F' })
        .collect()
}

fn parse_flags(token: &str) -> Result<FontAttributes> {
    let flags = [FontAttributes::BOLD, FontAttributes::ITALIC, FontAttributes::STRIKE];
    if token.len() != flags.len() {
        return Err(Error::Malformed(format!("bad font flags {token:?}")));
    }
    let mut attributes = FontAttributes::empty();
    for (c, flag) in token.chars().zip(flags) {
        match c {
            'T' => attributes |= flag,
            'F' => {}
            _ => return Err(Error::Malformed(format!("bad font flags {token:?}"))),
        }
    }
    Ok(attributes)
}

/// Cursor over snapshot bytes.
struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        while self.data.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn token(&mut self, what: &str) -> Result<&'a str> {
        self.skip_whitespace();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(|b| !b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(Error::Malformed(format!("missing {what}")));
        }
        std::str::from_utf8(&self.data[start..self.pos]).map_err(|_| Error::InvalidUtf8)
    }

    fn number<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.token(what)?;
        token
            .parse()
            .map_err(|_| Error::Malformed(format!("bad {what} {token:?}")))
    }

    /// `len` raw bytes after the single separator that follows a count.
    fn blob(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.data.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| Error::Malformed(format!("text shorter than {len} bytes")))?;
        let blob = &self.data[self.pos..end];
        self.pos = end;
        Ok(blob)
    }

    fn quoted(&mut self) -> Result<String> {
        self.skip_whitespace();
        if self.data.get(self.pos) != Some(&b'"') {
            return Err(Error::Malformed("expected quoted font name".to_string()));
        }
        self.pos += 1;

        let mut out = Vec::new();
        loop {
            match self.data.get(self.pos) {
                None => return Err(Error::Malformed("unterminated font name".to_string())),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    let escaped = self
                        .data
                        .get(self.pos + 1)
                        .ok_or_else(|| Error::Malformed("unterminated font name".to_string()))?;
                    out.push(*escaped);
                    self.pos += 2;
                }
                Some(&b) => {
                    out.push(b);
                    self.pos += 1;
                }
            }
        }
        String::from_utf8(out).map_err(|_| Error::InvalidUtf8)
    }
}
