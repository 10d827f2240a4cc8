//! Bit-packed 1-bit-per-pixel mask.

const WORD_BITS: usize = u64::BITS as usize;

/// Monochrome pixel mask where `true` marks a lit pixel.
///
/// Cells are stored row-major, one bit each. Writes outside the grid are
/// ignored so callers never have to range-check transient coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bitmap {
    width: u32,
    height: u32,
    words: Vec<u64>,
}

impl Bitmap {
    /// Allocates a cleared bitmap.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        Self {
            width,
            height,
            words: vec![0; cells.div_ceil(WORD_BITS)],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Reads a pixel; coordinates outside the grid read as unlit.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|index| {
            self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
        })
    }

    /// Writes a pixel and returns whether the coordinates addressed a cell.
    pub fn set(&mut self, x: i32, y: i32, lit: bool) -> bool {
        let Some(index) = self.index(x, y) else {
            return false;
        };
        let word = &mut self.words[index / WORD_BITS];
        let mask = 1 << (index % WORD_BITS);
        if lit {
            *word |= mask;
        } else {
            *word &= !mask;
        }
        true
    }

    /// Number of lit pixels.
    #[must_use]
    pub fn count_lit(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Iterates the coordinates of lit pixels in row-major order.
    #[must_use]
    pub fn lit_cells(&self) -> LitCells<'_> {
        LitCells {
            bitmap: self,
            word_index: 0,
            pending: self.words.first().copied().unwrap_or(0),
        }
    }
}

/// Iterator over lit pixel coordinates, produced by [`Bitmap::lit_cells`].
#[derive(Debug)]
pub struct LitCells<'a> {
    bitmap: &'a Bitmap,
    word_index: usize,
    pending: u64,
}

impl Iterator for LitCells<'_> {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pending != 0 {
                let bit = self.pending.trailing_zeros() as usize;
                self.pending &= self.pending - 1;
                let index = self.word_index * WORD_BITS + bit;
                let width = self.bitmap.width as usize;
                return Some(((index % width) as i32, (index / width) as i32));
            }
            self.word_index += 1;
            self.pending = *self.bitmap.words.get(self.word_index)?;
        }
    }
}
