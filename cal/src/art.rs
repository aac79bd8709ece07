//! Box drawing for the grid borders.
//!
//! Fancy art switches the terminal to the DEC special graphics set (`ESC ( 0`), draws the glyphs
//! as ASCII letters and switches back (`ESC ( B`). Plain art is `-`, `|` and `+`.

use gcal::color::ESC;

/// A border glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Art {
    Horizontal,
    Vertical,
    LowerRight,
    UpperRight,
    UpperLeft,
    LowerLeft,
    Cross,
    LeftTee,
    RightTee,
    BottomTee,
    TopTee,
}

impl Art {
    /// The letter drawing this glyph in the DEC special graphics set.
    pub const fn dec(self) -> char {
        match self {
            Art::Horizontal => 'q',
            Art::Vertical => 'x',
            Art::LowerRight => 'j',
            Art::UpperRight => 'k',
            Art::UpperLeft => 'l',
            Art::LowerLeft => 'm',
            Art::Cross => 'n',
            Art::LeftTee => 't',
            Art::RightTee => 'u',
            Art::BottomTee => 'v',
            Art::TopTee => 'w',
        }
    }

    pub const fn plain(self) -> char {
        match self {
            Art::Horizontal => '-',
            Art::Vertical => '|',
            _ => '+',
        }
    }
}

/// Draws runs of [`Art`] glyphs, every glyph a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineArt {
    pub fancy: bool,
}

impl LineArt {
    pub fn draw(&self, glyphs: impl IntoIterator<Item = Art>) -> String {
        if self.fancy {
            let mut s = format!("{ESC}(0");
            s.extend(glyphs.into_iter().map(Art::dec));
            s.push(ESC);
            s.push_str("(B");
            s
        } else {
            glyphs.into_iter().map(Art::plain).collect()
        }
    }

    /// A border line: `left`, then `width` horizontals between each of the 7 cells joined by
    /// `joint`, then `right`.
    pub fn divider(&self, left: Art, joint: Art, right: Art, width: usize) -> String {
        let cell = std::iter::repeat_n(Art::Horizontal, width);
        let glyphs = std::iter::once(left)
            .chain(cell.clone())
            .chain((0..6).flat_map(move |_| std::iter::once(joint).chain(cell.clone())))
            .chain(std::iter::once(right));
        self.draw(glyphs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_divider() {
        let art = LineArt { fancy: false };
        assert_eq!(
            "+--+--+--+--+--+--+--+",
            art.divider(Art::UpperLeft, Art::TopTee, Art::UpperRight, 2)
        );
        assert_eq!("|", art.draw([Art::Vertical]));
    }

    #[test]
    fn test_fancy_divider() {
        let art = LineArt { fancy: true };
        assert_eq!(
            "\u{1b}(0mqvqvqvqvqvqvqj\u{1b}(B",
            art.divider(Art::LowerLeft, Art::BottomTee, Art::LowerRight, 1)
        );
    }
}
