//! Text-mode display that down-samples frames into character cells.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use moonbound_rendering::{Display, Frame};

const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";
const STAR: char = '*';
const SPACE: char = ' ';

/// Display writing each frame as text; one character covers a block of pixels.
///
/// Characters are roughly twice as tall as they are wide, so every character
/// covers `scale` columns and `2 * scale` rows.
#[derive(Debug)]
pub(crate) struct TerminalDisplay<W> {
    out: W,
    columns: u32,
    clear: bool,
    cells: Vec<bool>,
    line: String,
}

impl<W> TerminalDisplay<W>
where
    W: Write,
{
    pub(crate) fn new(out: W, columns: u32, clear: bool) -> Self {
        Self {
            out,
            columns: columns.max(1),
            clear,
            cells: Vec::new(),
            line: String::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W> Display for TerminalDisplay<W>
where
    W: Write,
{
    fn present(&mut self, frame: &Frame<'_>) -> AnyResult<()> {
        let pixels = frame.pixels;
        let scale = pixels.width().div_ceil(self.columns).max(1);
        let columns = pixels.width().div_ceil(scale) as usize;
        let rows = pixels.height().div_ceil(scale * 2) as usize;

        self.cells.clear();
        self.cells.resize(columns * rows, false);
        for (x, y) in pixels.lit_cells() {
            let column = x as usize / scale as usize;
            let row = y as usize / (scale as usize * 2);
            self.cells[row * columns + column] = true;
        }

        if self.clear {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        writeln!(self.out, "{}", frame.header)?;
        writeln!(self.out, "{}", frame.counter_label)?;

        for row in self.cells.chunks(columns) {
            self.line.clear();
            self.line
                .extend(row.iter().map(|&lit| if lit { STAR } else { SPACE }));
            writeln!(self.out, "{}", self.line.trim_end())?;
        }

        let rocket_column = (frame.rocket.position.max(0) as u32 / scale) as usize;
        let rocket = if frame.rocket.flipped { '>' } else { '<' };
        writeln!(self.out, "{:>width$}", rocket, width = rocket_column + 1)?;

        self.out
            .flush()
            .context("failed to flush terminal output")
    }
}
