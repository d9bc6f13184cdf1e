//! Built-in bitmap font, 7 rows tall to match the weekday rows of the heatmap.
//!
//! Glyphs are stored as text: `#` is a filled cell, `.` an empty one. Widths vary
//! between 1 and 5 columns. Lowercase ASCII letters reuse the uppercase bitmaps.

use crate::{
    canvas::CANVAS_HEIGHT,
    error::{HeatmarkError, HeatmarkResult},
};

pub const MAX_GLYPH_WIDTH: usize = 5;

type Bitmap = [&'static str; CANVAS_HEIGHT];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    rows: &'static Bitmap,
}

impl Glyph {
    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.rows[row].as_bytes()[col] == b'#'
    }
}

/// Resolves `ch` to its bitmap, folding ASCII lowercase onto uppercase.
pub fn lookup(ch: char) -> HeatmarkResult<Glyph> {
    let key = ch.to_ascii_uppercase();
    GLYPHS
        .iter()
        .find(|(c, _)| *c == key)
        .map(|(c, rows)| Glyph { ch: *c, rows })
        .ok_or(HeatmarkError::UnsupportedGlyph(ch))
}

pub fn supported_chars() -> impl Iterator<Item = char> {
    GLYPHS.iter().map(|(c, _)| *c)
}

/// Checks every bitmap in the table: unique characters, rows of equal non-zero
/// width, and nothing but `#` and `.` cells.
pub fn validate_glyph_table() -> HeatmarkResult<()> {
    for (i, (ch, rows)) in GLYPHS.iter().enumerate() {
        if GLYPHS[..i].iter().any(|(other, _)| other == ch) {
            return Err(HeatmarkError::input(format!("glyph {ch:?} is defined twice")));
        }
        let width = rows[0].len();
        if width == 0 || width > MAX_GLYPH_WIDTH {
            return Err(HeatmarkError::input(format!(
                "glyph {ch:?} has width {width}, expected 1..={MAX_GLYPH_WIDTH}"
            )));
        }
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(HeatmarkError::input(format!(
                    "glyph {ch:?} row {r} has width {}, expected {width}",
                    row.len()
                )));
            }
            if let Some(bad) = row.chars().find(|c| *c != '#' && *c != '.') {
                return Err(HeatmarkError::input(format!(
                    "glyph {ch:?} row {r} contains {bad:?}"
                )));
            }
        }
    }
    Ok(())
}

#[rustfmt::skip]
static GLYPHS: &[(char, Bitmap)] = &[
    ('A', [".###.", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"]),
    ('B', ["####.", "#...#", "#...#", "####.", "#...#", "#...#", "####."]),
    ('C', [".###.", "#...#", "#....", "#....", "#....", "#...#", ".###."]),
    ('D', ["####.", "#...#", "#...#", "#...#", "#...#", "#...#", "####."]),
    ('E', ["#####", "#....", "#....", "####.", "#....", "#....", "#####"]),
    ('F', ["#####", "#....", "#....", "####.", "#....", "#....", "#...."]),
    ('G', [".###.", "#...#", "#....", "#.###", "#...#", "#...#", ".###."]),
    ('H', ["#...#", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"]),
    ('I', ["###", ".#.", ".#.", ".#.", ".#.", ".#.", "###"]),
    ('J', ["..###", "...#.", "...#.", "...#.", "#..#.", "#..#.", ".##.."]),
    ('K', ["#...#", "#..#.", "#.#..", "##...", "#.#..", "#..#.", "#...#"]),
    ('L', ["#....", "#....", "#....", "#....", "#....", "#....", "#####"]),
    ('M', ["#...#", "##.##", "#.#.#", "#.#.#", "#...#", "#...#", "#...#"]),
    ('N', ["#...#", "#...#", "##..#", "#.#.#", "#..##", "#...#", "#...#"]),
    ('O', [".###.", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."]),
    ('P', ["####.", "#...#", "#...#", "####.", "#....", "#....", "#...."]),
    ('Q', [".###.", "#...#", "#...#", "#...#", "#.#.#", "#..#.", ".##.#"]),
    ('R', ["####.", "#...#", "#...#", "####.", "#.#..", "#..#.", "#...#"]),
    ('S', [".####", "#....", "#....", ".###.", "....#", "....#", "####."]),
    ('T', ["#####", "..#..", "..#..", "..#..", "..#..", "..#..", "..#.."]),
    ('U', ["#...#", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."]),
    ('V', ["#...#", "#...#", "#...#", "#...#", "#...#", ".#.#.", "..#.."]),
    ('W', ["#...#", "#...#", "#...#", "#.#.#", "#.#.#", "#.#.#", ".#.#."]),
    ('X', ["#...#", "#...#", ".#.#.", "..#..", ".#.#.", "#...#", "#...#"]),
    ('Y', ["#...#", "#...#", ".#.#.", "..#..", "..#..", "..#..", "..#.."]),
    ('Z', ["#####", "....#", "...#.", "..#..", ".#...", "#....", "#####"]),
    ('0', [".###.", "#...#", "#..##", "#.#.#", "##..#", "#...#", ".###."]),
    ('1', [".#.", "##.", ".#.", ".#.", ".#.", ".#.", "###"]),
    ('2', [".###.", "#...#", "....#", "...#.", "..#..", ".#...", "#####"]),
    ('3', ["####.", "....#", "....#", ".###.", "....#", "....#", "####."]),
    ('4', ["...#.", "..##.", ".#.#.", "#..#.", "#####", "...#.", "...#."]),
    ('5', ["#####", "#....", "####.", "....#", "....#", "#...#", ".###."]),
    ('6', [".###.", "#....", "#....", "####.", "#...#", "#...#", ".###."]),
    ('7', ["#####", "....#", "...#.", "..#..", ".#...", ".#...", ".#..."]),
    ('8', [".###.", "#...#", "#...#", ".###.", "#...#", "#...#", ".###."]),
    ('9', [".###.", "#...#", "#...#", ".####", "....#", "....#", ".###."]),
    (' ', ["...", "...", "...", "...", "...", "...", "..."]),
    ('!', ["#", "#", "#", "#", "#", ".", "#"]),
    ('?', [".###.", "#...#", "....#", "...#.", "..#..", ".....", "..#.."]),
    ('.', [".", ".", ".", ".", ".", ".", "#"]),
    (',', ["..", "..", "..", "..", "..", ".#", "#."]),
    (':', [".", "#", ".", ".", ".", "#", "."]),
    (';', ["..", ".#", "..", "..", "..", ".#", "#."]),
    ('\'', ["#", "#", ".", ".", ".", ".", "."]),
    ('"', ["#.#", "#.#", "...", "...", "...", "...", "..."]),
    ('-', ["...", "...", "...", "###", "...", "...", "..."]),
    ('_', [".....", ".....", ".....", ".....", ".....", ".....", "#####"]),
    ('+', [".....", "..#..", "..#..", "#####", "..#..", "..#..", "....."]),
    ('=', ["....", "....", "####", "....", "####", "....", "...."]),
    ('#', [".#.#.", ".#.#.", "#####", ".#.#.", "#####", ".#.#.", ".#.#."]),
    ('/', ["....#", "....#", "...#.", "..#..", ".#...", "#....", "#...."]),
    ('\\', ["#....", "#....", ".#...", "..#..", "...#.", "....#", "....#"]),
    ('(', [".#", "#.", "#.", "#.", "#.", "#.", ".#"]),
    (')', ["#.", ".#", ".#", ".#", ".#", ".#", "#."]),
    ('<', ["....", "...#", "..#.", ".#..", "..#.", "...#", "...."]),
    ('>', ["....", "#...", ".#..", "..#.", ".#..", "#...", "...."]),
    ('*', [".....", "#.#.#", ".###.", "#####", ".###.", "#.#.#", "....."]),
    ('&', [".##..", "#..#.", "#.#..", ".#...", "#.#.#", "#..#.", ".##.#"]),
    ('@', [".###.", "#...#", "#.###", "#.#.#", "#.###", "#....", ".####"]),
    ('♥', [".....", ".#.#.", "#####", "#####", ".###.", "..#..", "....."]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_well_formed() {
        validate_glyph_table().unwrap();
    }

    #[test]
    fn every_supported_char_resolves() {
        for ch in supported_chars() {
            let g = lookup(ch).unwrap();
            assert_eq!(g.ch, ch);
            assert!((1..=MAX_GLYPH_WIDTH).contains(&g.width()));
        }
    }

    #[test]
    fn full_ascii_alphanumerics_are_covered() {
        for ch in ('A'..='Z').chain('a'..='z').chain('0'..='9') {
            assert!(lookup(ch).is_ok(), "missing glyph for {ch:?}");
        }
    }

    #[test]
    fn lowercase_folds_to_uppercase() {
        assert_eq!(lookup('h').unwrap(), lookup('H').unwrap());
    }

    #[test]
    fn unsupported_glyph_names_the_character() {
        match lookup('~') {
            Err(HeatmarkError::UnsupportedGlyph(c)) => assert_eq!(c, '~'),
            other => panic!("expected UnsupportedGlyph, got {other:?}"),
        }
        assert!(matches!(lookup('é'), Err(HeatmarkError::UnsupportedGlyph('é'))));
    }

    #[test]
    fn h_bitmap_spot_check() {
        let h = lookup('H').unwrap();
        assert_eq!(h.width(), 5);
        assert!(h.is_filled(0, 0));
        assert!(!h.is_filled(0, 1));
        assert!(h.is_filled(3, 2));
        assert!(h.is_filled(6, 4));
    }
}
