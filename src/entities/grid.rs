use crate::common::error::CollageError;

use super::aspect::AspectRatio;

const GROWTH_FACTOR: f64 = 1.05;

/// Columns and rows of the collage, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
}

impl Grid {
    /// Smallest uniform upscale of `aspect` with room for `image_count` cells.
    pub fn plan(image_count: usize, aspect: AspectRatio) -> Result<Grid, CollageError> {
        if aspect.width() == 0 || aspect.height() == 0 {
            return Err(CollageError::InvalidArgument(format!(
                "aspect ratio must be positive, got {}",
                aspect
            )));
        }

        let needed = image_count as u64;
        let mut scale = 1.0_f64;
        loop {
            let columns = (scale * aspect.width() as f64).floor() as u32;
            let rows = (scale * aspect.height() as f64).floor() as u32;
            if columns as u64 * rows as u64 >= needed {
                return Ok(Grid {
                    columns: columns.max(1),
                    rows: rows.max(1),
                });
            }
            scale *= GROWTH_FACTOR;
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn capacity(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Row-major cell of the `index`-th image.
    pub fn cell(&self, index: u64) -> (u32, u32) {
        let columns = self.columns as u64;
        ((index % columns) as u32, (index / columns) as u32)
    }
}
