//! Off-screen character buffer and frame diffing.

/// What a glyph depicts; the driver picks colours from it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shade {
    #[default]
    Empty,
    Wall,
    Start,
    End,
    /// Queued in the open set.
    Frontier,
    Expanded,
    Path,
    /// Status line text.
    Text,
}

/// A single character cell on screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Glyph {
    pub ch: char,
    pub shade: Shade,
}

impl Default for Glyph {
    fn default() -> Self {
        Self {
            ch: ' ',
            shade: Shade::Empty,
        }
    }
}

/// A `width × height` buffer of glyphs, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    glyphs: Vec<Glyph>,
    width: u16,
    height: u16,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            glyphs: vec![Glyph::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Glyph at column `x`, line `y`; blank outside the canvas.
    pub fn at(&self, x: u16, y: u16) -> Glyph {
        self.index(x, y)
            .map(|i| self.glyphs[i])
            .unwrap_or_default()
    }

    /// Set a glyph. No-op outside the canvas.
    pub fn set(&mut self, x: u16, y: u16, glyph: Glyph) {
        if let Some(i) = self.index(x, y) {
            self.glyphs[i] = glyph;
        }
    }

    /// Write `text` on line `y` from column 0, padding the rest of the line
    /// with blanks and cutting what does not fit.
    pub fn print_line(&mut self, y: u16, text: &str) {
        let mut chars = text.chars();
        for x in 0..self.width {
            let ch = chars.next().unwrap_or(' ');
            self.set(
                x,
                y,
                Glyph {
                    ch,
                    shade: Shade::Text,
                },
            );
        }
    }

    pub fn clear(&mut self) {
        self.glyphs.fill(Glyph::default());
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

/// A glyph that changed between two frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Change {
    pub x: u16,
    pub y: u16,
    pub glyph: Glyph,
}

/// Glyphs of `curr` that differ from `prev`. Canvases of different size are
/// compared over `curr`'s extent.
pub fn diff(prev: &Canvas, curr: &Canvas) -> Vec<Change> {
    let mut changes = Vec::new();
    for y in 0..curr.height {
        for x in 0..curr.width {
            let glyph = curr.at(x, y);
            let same = prev.index(x, y).is_some() && prev.at(x, y) == glyph;
            if !same {
                changes.push(Change { x, y, glyph });
            }
        }
    }
    changes
}
