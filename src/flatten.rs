use crate::{
    canvas::{CANVAS_HEIGHT, Canvas, Pixel},
    error::{HeatmarkError, HeatmarkResult},
};

/// Canvas cells in calendar order: week by week, Sunday to Saturday within a week.
///
/// Index `i` holds the cell at `(row = i % 7, col = i / 7)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelSequence(Vec<Pixel>);

impl PixelSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Pixel] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<Pixel>> for PixelSequence {
    fn from(v: Vec<Pixel>) -> Self {
        Self(v)
    }
}

pub fn flatten_column_major(canvas: &Canvas) -> PixelSequence {
    let len = canvas.width() * CANVAS_HEIGHT;
    let cells = (0..len)
        .map(|i| canvas.get(i % CANVAS_HEIGHT, i / CANVAS_HEIGHT))
        .collect();
    PixelSequence(cells)
}

/// Inverse of [`flatten_column_major`].
pub fn unflatten_column_major(seq: &PixelSequence) -> HeatmarkResult<Canvas> {
    if !seq.len().is_multiple_of(CANVAS_HEIGHT) {
        return Err(HeatmarkError::input(format!(
            "pixel sequence length {} is not a multiple of {CANVAS_HEIGHT}",
            seq.len()
        )));
    }
    let mut canvas = Canvas::blank(seq.len() / CANVAS_HEIGHT);
    for (i, px) in seq.iter().enumerate() {
        canvas.set(i % CANVAS_HEIGHT, i / CANVAS_HEIGHT, px);
    }
    Ok(canvas)
}
