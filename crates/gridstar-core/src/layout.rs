//! Text layouts: build a [`Grid`] from ASCII art and render it back.
//!
//! One character per cell, one line per row:
//!
//! | char | role |
//! |---|---|
//! | `.` | empty |
//! | `#` | wall |
//! | `S` | start |
//! | `E` | end |
//!
//! Leading and trailing whitespace around the whole layout is trimmed, but
//! not inside lines.

use std::fmt;
use std::str::FromStr;

use crate::geom::Point;
use crate::grid::Grid;
use crate::node::Role;

/// Errors that can occur when parsing a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A line is wider or narrower than the first one.
    InconsistentWidth { row: i32, width: i32, expected: i32 },
    /// A character outside the layout alphabet.
    InvalidGlyph { ch: char, pos: Point },
    /// A second `S` or `E`.
    DuplicateEndpoint { role: Role, pos: Point },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentWidth {
                row,
                width,
                expected,
            } => write!(f, "layout: row {row} has width {width}, expected {expected}"),
            Self::InvalidGlyph { ch, pos } => {
                write!(f, "layout contains invalid glyph \u{201c}{ch}\u{201d} at {pos}")
            }
            Self::DuplicateEndpoint { role, pos } => {
                write!(f, "layout: second {role:?} at {pos}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

impl FromStr for Grid {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let lines: Vec<&str> = if s.is_empty() {
            Vec::new()
        } else {
            s.lines().collect()
        };
        let cols = lines.first().map_or(0, |l| l.chars().count() as i32);

        let mut grid = Grid::new(lines.len() as i32, cols);
        for (row, line) in lines.iter().enumerate() {
            let row = row as i32;
            let width = line.chars().count() as i32;
            if width != cols {
                return Err(LayoutError::InconsistentWidth {
                    row,
                    width,
                    expected: cols,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let pos = Point::new(row, col as i32);
                let role = Role::from_glyph(ch).ok_or(LayoutError::InvalidGlyph { ch, pos })?;
                let taken = match role {
                    Role::Start => grid.start().is_some(),
                    Role::End => grid.end().is_some(),
                    _ => false,
                };
                if taken {
                    return Err(LayoutError::DuplicateEndpoint { role, pos });
                }
                if role != Role::Empty {
                    // Fresh empty cell and a free endpoint slot: cannot conflict.
                    grid.set_role(pos, role)
                        .map_err(|_| LayoutError::InvalidGlyph { ch, pos })?;
                }
            }
        }
        Ok(grid)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.nodes().enumerate() {
            if i > 0 && n.pos().col == 0 {
                writeln!(f)?;
            }
            write!(f, "{}", n.role().glyph())?;
        }
        Ok(())
    }
}
