use std::path::Path;

use crate::{
    error::{HeatmarkError, HeatmarkResult},
    glyphs,
};

/// Rows of the heatmap, Sunday first.
pub const CANVAS_HEIGHT: usize = 7;

/// Most weekly columns a one-year heatmap can show.
pub const MAX_CALENDAR_WEEKS: usize = 53;

pub const MAX_LETTER_SPACING: usize = 7;

/// Alpha at or above this counts as opaque, luma below this counts as ink.
const ALPHA_THRESHOLD: u8 = 128;
const LUMA_THRESHOLD: u8 = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Pixel {
    #[default]
    Empty,
    Filled,
}

impl Pixel {
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled)
    }
}

impl From<bool> for Pixel {
    fn from(filled: bool) -> Self {
        if filled { Self::Filled } else { Self::Empty }
    }
}

/// 7-row binary matrix, stored row-major. Every row has `width` cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    pixels: Vec<Pixel>,
}

impl Canvas {
    pub fn blank(width: usize) -> Self {
        Self {
            width,
            pixels: vec![Pixel::Empty; width * CANVAS_HEIGHT],
        }
    }

    pub fn from_rows(rows: Vec<Vec<Pixel>>) -> HeatmarkResult<Self> {
        if rows.len() != CANVAS_HEIGHT {
            return Err(HeatmarkError::InvalidImageShape {
                height: rows.len() as u32,
            });
        }
        let width = rows[0].len();
        if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(HeatmarkError::input(format!(
                "canvas row {r} has {} cells, expected {width}",
                row.len()
            )));
        }
        Ok(Self {
            width,
            pixels: rows.into_iter().flatten().collect(),
        })
    }

    /// Lays out `text` with the built-in font, `spacing` empty columns between glyphs.
    #[tracing::instrument(skip(text), fields(chars = text.chars().count()))]
    pub fn from_text(text: &str, spacing: usize) -> HeatmarkResult<Self> {
        if spacing > MAX_LETTER_SPACING {
            return Err(HeatmarkError::input(format!(
                "space between letters must be within 0..={MAX_LETTER_SPACING}, got {spacing}"
            )));
        }
        if text.is_empty() {
            return Err(HeatmarkError::input("text must not be empty"));
        }

        let glyphs = text
            .chars()
            .map(glyphs::lookup)
            .collect::<HeatmarkResult<Vec<_>>>()?;
        let width = glyphs.iter().map(|g| g.width()).sum::<usize>() + spacing * (glyphs.len() - 1);

        let mut canvas = Self::blank(width);
        let mut x = 0;
        for glyph in &glyphs {
            for row in 0..CANVAS_HEIGHT {
                for col in 0..glyph.width() {
                    canvas.set(row, x + col, glyph.is_filled(row, col).into());
                }
            }
            x += glyph.width() + spacing;
        }

        canvas.warn_if_too_wide();
        Ok(canvas)
    }

    pub fn from_image(path: &Path) -> HeatmarkResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            HeatmarkError::input(format!("read image '{}': {e}", path.display()))
        })?;
        Self::from_image_bytes(&bytes)
    }

    /// Decodes an image; a pixel is filled when it is opaque enough and dark enough.
    pub fn from_image_bytes(bytes: &[u8]) -> HeatmarkResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| HeatmarkError::input(format!("decode image: {e}")))?
            .to_luma_alpha8();
        let (width, height) = img.dimensions();
        if height as usize != CANVAS_HEIGHT {
            return Err(HeatmarkError::InvalidImageShape { height });
        }

        let mut canvas = Self::blank(width as usize);
        for (x, y, px) in img.enumerate_pixels() {
            let [luma, alpha] = px.0;
            let filled = alpha >= ALPHA_THRESHOLD && luma < LUMA_THRESHOLD;
            canvas.set(y as usize, x as usize, filled.into());
        }

        canvas.warn_if_too_wide();
        Ok(canvas)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        CANVAS_HEIGHT
    }

    pub fn get(&self, row: usize, col: usize) -> Pixel {
        self.pixels[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, px: Pixel) {
        self.pixels[row * self.width + col] = px;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        // chunks_exact panics on a zero chunk size; a zero-width canvas still has 7 rows.
        (0..CANVAS_HEIGHT).map(move |r| &self.pixels[r * self.width..(r + 1) * self.width])
    }

    pub fn filled_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_filled()).count()
    }

    /// Terminal rendering, one line per weekday.
    pub fn preview(&self) -> String {
        let mut out = String::with_capacity((self.width * 3 + 1) * CANVAS_HEIGHT);
        for row in self.rows() {
            for px in row {
                out.push(if px.is_filled() { '█' } else { '·' });
            }
            out.push('\n');
        }
        out
    }

    fn warn_if_too_wide(&self) {
        if self.width > MAX_CALENDAR_WEEKS {
            tracing::warn!(
                width = self.width,
                max = MAX_CALENDAR_WEEKS,
                "canvas is wider than a one-year heatmap; columns past the end date are dropped"
            );
        }
    }
}
