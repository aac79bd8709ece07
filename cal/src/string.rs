//! An additional helper module for working with terminal strings.
//!
//! Widths here are columns on a terminal: East Asian wide and fullwidth glyphs take two, everything
//! else one. Color and line art tokens take none and are only ever skipped, never measured.

use gcal::color::{ESC, Markup};
use unicode_width::UnicodeWidthChar;

/// Columns taken by a single code point (1 or 2).
pub fn char_width(c: char) -> usize {
    // unicode-width reports 2 exactly for the Wide and Fullwidth East Asian categories (and emoji
    // presentation, which Unicode files under Wide), 0 or nothing for controls and combining marks
    // which still take a column in a calendar cell.
    match c.width() {
        Some(2) => 2,
        _ => 1,
    }
}

/// Columns taken by a string without any token in it.
pub fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Columns taken by a string, skipping its color and line art tokens.
///
/// In Conky markup an escaped `$$` shows a single `$`.
pub fn visible_width(s: &str, markup: Markup) -> usize {
    let mut width = 0;
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if markup == Markup::Conky {
            if let Some(remainder) = rest.strip_prefix("$$") {
                width += 1;
                rest = remainder;
                continue;
            }
        }
        if let Some((_, remainder)) = extract_token(rest, markup) {
            rest = remainder;
            continue;
        }
        width += char_width(c);
        rest = &rest[c.len_utf8()..];
    }
    width
}

/// Remove every token from the string.
pub fn strip_tokens(s: &str, markup: Markup) -> String {
    let mut stripped = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if let Some((_, remainder)) = extract_token(rest, markup) {
            rest = remainder;
            continue;
        }
        stripped.push(c);
        rest = &rest[c.len_utf8()..];
    }
    stripped
}

/// Split a token off the start of the string, if one starts there.
///
/// - ANSI: `ESC ( X` designates a character set (line art); any other sequence starting with `ESC`
///   runs up to and including the first `m`.
/// - Conky: `${` up to and including the first `}`.
///
/// Unterminated tokens take everything that is left.
pub fn extract_token(s: &str, markup: Markup) -> Option<(&str, &str)> {
    let end = match markup {
        Markup::Ansi => {
            let rest = s.strip_prefix(ESC)?;
            if let Some(designator) = rest.strip_prefix('(') {
                // ESC + '(' + the set
                match designator.chars().next() {
                    Some(set) => ESC.len_utf8() + 1 + set.len_utf8(),
                    None => s.len(),
                }
            } else {
                rest.find('m')
                    .map_or(s.len(), |i| ESC.len_utf8() + i + 1)
            }
        }
        Markup::Conky => {
            if !s.starts_with("${") {
                return None;
            }
            s.find('}').map_or(s.len(), |i| i + 1)
        }
    };
    Some(s.split_at(end))
}

/// Take characters while it fits in the maximum width.
pub fn cut_end(s: &str, maximum_width: usize) -> &str {
    let mut width_this_far = 0;
    for (i, c) in s.char_indices() {
        width_this_far += char_width(c);
        if width_this_far > maximum_width {
            return &s[..i];
        }
    }
    s
}

/// Where a fragment is broken to fit a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cut {
    /// Columns taken by `fragment[..index]`.
    pub width: usize,
    /// Byte index of the break.
    pub index: usize,
    /// True if the break is in the middle of a word.
    pub forced: bool,
}

/// Find the end of the next line of `s` that fits in `width` columns.
///
/// Words are kept whole as long as at least one fits, spaces between them are part of the line.
/// A first word too long for the column is cut at the last character that still fits, though at
/// least one character is always taken so a glyph wider than the column cannot stall the caller.
pub fn find_cut(s: &str, width: usize) -> Cut {
    let total = str_width(s);
    if total <= width {
        return match s.find('\n') {
            Some(index) => Cut {
                width: str_width(&s[..index]),
                index,
                forced: false,
            },
            None => Cut {
                width: total,
                index: s.len(),
                forced: false,
            },
        };
    }

    let first = next_break(s, 0, width);
    tracing::trace!(?first, fragment = s, "first break");
    if first.forced {
        if first.index == 0 {
            // nothing fits, take one glyph regardless
            let c = s.chars().next().unwrap_or(' ');
            return Cut {
                width: char_width(c),
                index: c.len_utf8(),
                forced: true,
            };
        }
        return first;
    }

    let mut cut = first;
    while cut.width < width {
        let mut index = cut.index;
        let mut used = cut.width;
        // the spaces count towards the line but are never a line start
        while used < width && s[index..].starts_with(' ') {
            used += 1;
            index += 1;
        }

        let next = next_break(&s[index..], used, width);
        tracing::trace!(?next, used, index, "next break");
        if next.forced {
            break;
        }
        cut = Cut {
            width: used + next.width,
            index: index + next.index,
            forced: false,
        };
        if s[cut.index..].starts_with('\n') || cut.index >= s.len() {
            break;
        }
    }
    cut
}

/// Scan up to the next space or newline, given `used` columns are already taken.
///
/// The returned width and index are relative to `s`. Forced if the column fills up first, in which
/// case the index is after the last character that fits.
fn next_break(s: &str, used: usize, width: usize) -> Cut {
    let mut taken = 0;
    for (index, c) in s.char_indices() {
        if c == ' ' || c == '\n' {
            return Cut {
                width: taken,
                index,
                forced: false,
            };
        }
        let w = char_width(c);
        if used + taken + w > width {
            return Cut {
                width: taken,
                index,
                forced: true,
            };
        }
        taken += w;
    }
    Cut {
        width: taken,
        index: s.len(),
        forced: false,
    }
}

/// Shift the given string by repeating the given filler.
///
/// Since this has a strict width policy, a string wider than requested is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aligner {
    filler: char,
}

impl Aligner {
    /// Aligns everything with space.
    pub const SPACE: Self = Self { filler: ' ' };

    /// Used for the horizontal "now" rule.
    pub const DASH: Self = Self { filler: '-' };

    /// Return the filler with the exact width.
    pub fn filler(&self, needed_width: usize) -> String {
        // both fillers are a single column
        std::iter::repeat_n(self.filler, needed_width).collect()
    }

    /// Append the repeating filler to the end to fit the exact width.
    pub fn left(&self, s: &str, width: usize) -> String {
        let s = cut_end(s, width);
        s.to_owned() + &self.filler(width - str_width(s))
    }
}
