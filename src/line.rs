//! Physical lines and numbering markers.
//!
//! ## The Problem
//!
//! Text extracted from word-processor and PDF documents loses its list
//! structure. What survives is a marker at the start of the line and some
//! leading whitespace:
//!
//! ```text
//! 1) Scope
//! \t1) Terms
//! \ta) Definitions        <- alphabetic list nested at the same indent
//! 2.3.1 Retention         <- explicit dotted path, depth 3
//! IV. Annex               <- roman
//! 2024. Annual report     <- a year, not a marker
//! ```
//!
//! This module does only the lexical part: measure indentation, recognise a
//! marker token, and classify it into a closed set of [`Marker`] variants.
//! Deciding what the marker *means* for depth is the restorer's job.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Leading numbering token patterns, tried in order: dotted paths, plain
/// numbers, roman numerals, single letters.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<dotted>\d{1,4}(?:\.\d{1,4})+)\.?|(?P<num>\d{1,4})[.)]|(?P<roman>[ivxlcdm]{1,7}|[IVXLCDM]{1,7})[.)]|(?P<alpha>[A-Za-z])[.)])(?:\s+|$)",
    )
    .expect("marker pattern is valid")
});

/// Bulleted list items. These are body content, never headings.
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•–—·▪◦]\s").expect("bullet pattern is valid"));

/// A raw numbering marker found at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Marker {
    /// `1)` or `1.`
    Numeric(u32),
    /// `1.2` or `1.2.3.`. Carries an explicit depth.
    Dotted(Vec<u32>),
    /// `a)` or `B.`, valued from 1.
    Alpha {
        /// Position in the alphabet, `a` = 1.
        value: u32,
        /// Upper-case letter.
        upper: bool,
    },
    /// `iv)` or `II.`
    Roman {
        /// Numeric value.
        value: u32,
        /// Upper-case numeral.
        upper: bool,
    },
}

/// The lexical family of a marker. Siblings must share a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerKind {
    /// Numbers, with either delimiter.
    Numeric,
    /// Explicit dotted paths.
    Dotted,
    /// Lower-case letters.
    LowerAlpha,
    /// Upper-case letters.
    UpperAlpha,
    /// Lower-case roman numerals.
    LowerRoman,
    /// Upper-case roman numerals.
    UpperRoman,
}

impl Marker {
    /// The marker's family.
    #[must_use]
    pub const fn kind(&self) -> MarkerKind {
        match self {
            Self::Numeric(_) => MarkerKind::Numeric,
            Self::Dotted(_) => MarkerKind::Dotted,
            Self::Alpha { upper: false, .. } => MarkerKind::LowerAlpha,
            Self::Alpha { upper: true, .. } => MarkerKind::UpperAlpha,
            Self::Roman { upper: false, .. } => MarkerKind::LowerRoman,
            Self::Roman { upper: true, .. } => MarkerKind::UpperRoman,
        }
    }

    /// The ordinal this marker claims at its own depth.
    ///
    /// For dotted paths that is the last segment.
    #[must_use]
    pub fn value(&self) -> u32 {
        match self {
            Self::Numeric(n) => *n,
            Self::Dotted(path) => path.last().copied().unwrap_or(1),
            Self::Alpha { value, .. } | Self::Roman { value, .. } => *value,
        }
    }

    /// Reinterpret a single-letter roman numeral (`c)`, `D.`) as a letter.
    ///
    /// Returns `None` for anything that is not a one-letter roman numeral.
    #[must_use]
    pub fn as_alpha(&self) -> Option<Self> {
        let Self::Roman { value, upper } = *self else {
            return None;
        };
        let letter = match value {
            1 => 'i',
            5 => 'v',
            10 => 'x',
            50 => 'l',
            100 => 'c',
            500 => 'd',
            1000 => 'm',
            _ => return None,
        };
        Some(Self::Alpha {
            value: u32::from(letter) - u32::from('a') + 1,
            upper,
        })
    }
}

/// One physical line of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLine {
    /// 1-based line number in the source.
    pub line_no: usize,
    /// Line content after leading whitespace, verbatim.
    pub text: String,
    /// Leading whitespace width in columns.
    pub indent: usize,
    /// Numbering marker at line start, if any.
    pub marker: Option<Marker>,
    /// Byte offset in `text` where the content after the marker begins.
    #[serde(skip)]
    marker_len: usize,
}

impl RawLine {
    /// Build a line from content and an indentation already measured by the
    /// caller. `text` must not carry leading whitespace.
    #[must_use]
    pub fn new(text: impl Into<String>, indent: usize, line_no: usize) -> Self {
        let text = text.into();
        let (marker, marker_len) = match detect_marker(&text) {
            Some((marker, len)) => (Some(marker), len),
            None => (None, 0),
        };
        Self {
            line_no,
            text,
            indent,
            marker,
            marker_len,
        }
    }

    /// Split a physical line into indentation and content.
    ///
    /// ```rust
    /// use strata::{Marker, RawLine};
    ///
    /// let line = RawLine::parse("\t  2) Scope", 4, 1);
    /// assert_eq!(line.indent, 6);
    /// assert_eq!(line.marker, Some(Marker::Numeric(2)));
    /// assert_eq!(line.title(), "Scope");
    /// ```
    #[must_use]
    pub fn parse(line: &str, tab_width: usize, line_no: usize) -> Self {
        let content = line.trim_start();
        let leading = &line[..line.len() - content.len()];
        Self::new(content.trim_end(), indent_width(leading, tab_width), line_no)
    }

    /// Whether the line holds nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Heading text after the marker, whitespace-normalized.
    ///
    /// For unmarked lines this is the whole line.
    #[must_use]
    pub fn title(&self) -> String {
        normalize_whitespace(&self.text[self.marker_len..])
    }

    /// Whether the line is a bulleted list item.
    #[must_use]
    pub fn is_bullet(&self) -> bool {
        is_bullet(&self.text)
    }
}

/// Split text into lines, measuring tabs at `tab_width`.
#[must_use]
pub fn lines_from_text(text: &str, tab_width: usize) -> Vec<RawLine> {
    text.lines()
        .enumerate()
        .map(|(i, line)| RawLine::parse(line, tab_width, i + 1))
        .collect()
}

/// Column width of a run of leading whitespace.
///
/// A tab advances to the next multiple of `tab_width`; every other
/// whitespace character counts one column.
#[must_use]
pub fn indent_width(leading: &str, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    leading.chars().fold(0, |col, ch| {
        if ch == '\t' {
            (col / tab_width + 1) * tab_width
        } else {
            col + 1
        }
    })
}

/// Trim and collapse internal whitespace runs to single spaces.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a line of content starts with a bullet.
#[must_use]
pub fn is_bullet(text: &str) -> bool {
    BULLET.is_match(text.trim_start())
}

fn detect_marker(text: &str) -> Option<(Marker, usize)> {
    let caps = MARKER.captures(text)?;
    let len = caps.get(0)?.end();

    if let Some(m) = caps.name("dotted") {
        let raw = m.as_str();
        if looks_like_date(raw) {
            return None;
        }
        let path = raw
            .split('.')
            .map(str::parse)
            .collect::<Result<Vec<u32>, _>>()
            .ok()?;
        return Some((Marker::Dotted(path), len));
    }
    if let Some(m) = caps.name("num") {
        if looks_like_year(m.as_str()) {
            return None;
        }
        return Some((Marker::Numeric(m.as_str().parse().ok()?), len));
    }
    if let Some(m) = caps.name("roman") {
        let raw = m.as_str();
        let upper = raw.chars().all(|c| c.is_ascii_uppercase());
        return parse_roman(raw).map(|value| (Marker::Roman { value, upper }, len));
    }
    if let Some(m) = caps.name("alpha") {
        let ch = m.as_str().chars().next()?;
        let value = u32::from(ch.to_ascii_lowercase()) - u32::from('a') + 1;
        return Some((
            Marker::Alpha {
                value,
                upper: ch.is_ascii_uppercase(),
            },
            len,
        ));
    }
    None
}

fn looks_like_year(token: &str) -> bool {
    token.len() == 4 && (token.starts_with("19") || token.starts_with("20"))
}

/// `12.05.2023`, `01.02.23`
fn looks_like_date(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    let [day, month, year] = parts.as_slice() else {
        return false;
    };
    if year.len() == 4 {
        return true;
    }
    let (Ok(d), Ok(m)) = (day.parse::<u32>(), month.parse::<u32>()) else {
        return false;
    };
    day.len() == 2 && month.len() == 2 && year.len() == 2 && (1..=31).contains(&d) && (1..=12).contains(&m)
}

fn roman_digit(ch: char) -> Option<u32> {
    Some(match ch {
        'i' => 1,
        'v' => 5,
        'x' => 10,
        'l' => 50,
        'c' => 100,
        'd' => 500,
        'm' => 1000,
        _ => return None,
    })
}

/// Parse a canonical roman numeral; non-canonical spellings are rejected.
fn parse_roman(token: &str) -> Option<u32> {
    let lower = token.to_ascii_lowercase();
    let mut total = 0u32;
    let mut prev = 0u32;
    for ch in lower.chars().rev() {
        let v = roman_digit(ch)?;
        if v < prev {
            total = total.checked_sub(v)?;
        } else {
            total += v;
            prev = v;
        }
    }
    (total > 0 && to_roman(total) == lower).then_some(total)
}

fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(text: &str) -> Option<Marker> {
        RawLine::new(text, 0, 1).marker
    }

    #[test]
    fn test_indent_tabs_and_spaces() {
        assert_eq!(indent_width("", 4), 0);
        assert_eq!(indent_width("  ", 4), 2);
        assert_eq!(indent_width("\t", 4), 4);
        assert_eq!(indent_width("  \t", 4), 4);
        assert_eq!(indent_width("\t\t", 8), 16);
        assert_eq!(indent_width("\t ", 4), 5);
    }

    #[test]
    fn test_numeric_markers() {
        assert_eq!(marker("1) Intro"), Some(Marker::Numeric(1)));
        assert_eq!(marker("12. Scope"), Some(Marker::Numeric(12)));
        assert_eq!(marker("3)"), Some(Marker::Numeric(3)));
        assert_eq!(marker("3)Intro"), None);
    }

    #[test]
    fn test_dotted_markers() {
        assert_eq!(marker("1.2 Terms"), Some(Marker::Dotted(vec![1, 2])));
        assert_eq!(marker("2.3.1. Retention"), Some(Marker::Dotted(vec![2, 3, 1])));
    }

    #[test]
    fn test_years_and_dates_are_not_markers() {
        assert_eq!(marker("2024. Annual report"), None);
        assert_eq!(marker("1999) was a year"), None);
        assert_eq!(marker("12.05.2023 signed"), None);
        assert_eq!(marker("01.02.23 signed"), None);
        // Not a date: three-level section.
        assert_eq!(marker("1.2.10 Limits"), Some(Marker::Dotted(vec![1, 2, 10])));
    }

    #[test]
    fn test_alpha_and_roman() {
        assert_eq!(marker("a) first"), Some(Marker::Alpha { value: 1, upper: false }));
        assert_eq!(marker("B. second"), Some(Marker::Alpha { value: 2, upper: true }));
        assert_eq!(marker("iv) fourth"), Some(Marker::Roman { value: 4, upper: false }));
        assert_eq!(marker("XII. twelfth"), Some(Marker::Roman { value: 12, upper: true }));
        assert_eq!(marker("iiii) nope"), None);
        assert_eq!(marker("Dr. Smith"), None);
        assert_eq!(marker("e.g. this"), None);
    }

    #[test]
    fn test_single_letter_roman_reads_as_alpha() {
        let c = marker("c) third").unwrap();
        assert_eq!(c, Marker::Roman { value: 100, upper: false });
        assert_eq!(c.as_alpha(), Some(Marker::Alpha { value: 3, upper: false }));
        assert_eq!(Marker::Roman { value: 4, upper: false }.as_alpha(), None);
    }

    #[test]
    fn test_bullets_are_body() {
        let line = RawLine::parse("  - item", 4, 1);
        assert!(line.marker.is_none());
        assert!(line.is_bullet());
        assert!(!RawLine::parse("-item", 4, 1).is_bullet());
    }

    #[test]
    fn test_title_normalized() {
        let line = RawLine::parse("\t1)   Sub \t one ", 4, 3);
        assert_eq!(line.title(), "Sub one");
        assert_eq!(line.line_no, 3);
        assert!(RawLine::parse(" \t ", 4, 1).is_blank());
    }

    #[test]
    fn test_lines_from_text() {
        let lines = lines_from_text("1) A\r\n\ttext\n", 4);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].indent, 4);
        assert_eq!(lines[1].text, "text");
    }
}
