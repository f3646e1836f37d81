//! The [`Grid`] type — a fixed-size, row-major collection of [`Node`]s.
//!
//! A `Grid` owns every node. Nodes refer to each other (the `parent` link)
//! by index into this storage, so the search tree needs no shared ownership.

use std::fmt;

use crate::config::GridConfig;
use crate::geom::Point;
use crate::node::{Node, Role};

// ---------------------------------------------------------------------------
// GridError
// ---------------------------------------------------------------------------

/// Errors returned by grid queries and edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The coordinate lies outside the grid.
    InvalidCoordinate { pos: Point, rows: i32, cols: i32 },
    /// The requested role would break role exclusivity (e.g. end on the
    /// start cell, or a wall over an endpoint).
    RoleConflict {
        pos: Point,
        requested: Role,
        existing: Role,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoordinate { pos, rows, cols } => {
                write!(f, "coordinate {pos} is outside the {rows}x{cols} grid")
            }
            Self::RoleConflict {
                pos,
                requested,
                existing,
            } => write!(
                f,
                "cannot make {pos} {requested:?}: it is already {existing:?}"
            ),
        }
    }
}

impl std::error::Error for GridError {}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A fixed-size 2D grid of nodes with at most one start and one end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    nodes: Vec<Node>,
    rows: i32,
    cols: i32,
    start: Option<usize>,
    end: Option<usize>,
}

impl Grid {
    /// Create a grid of the given dimensions with every node empty and
    /// unreached. Negative dimensions are treated as zero.
    pub fn new(rows: i32, cols: i32) -> Self {
        let rows = rows.max(0);
        let cols = cols.max(0);
        let mut nodes = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                nodes.push(Node::new(Point::new(row, col)));
            }
        }
        Self {
            nodes,
            rows,
            cols,
            start: None,
            end: None,
        }
    }

    /// Create a grid from a [`GridConfig`].
    pub fn with_config(config: GridConfig) -> Self {
        Self::new(config.rows, config.cols)
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `p` is inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.row >= 0 && p.col >= 0 && p.row < self.rows && p.col < self.cols
    }

    // -----------------------------------------------------------------------
    // Coordinate helpers
    // -----------------------------------------------------------------------

    /// Convert a `Point` to a flat index.
    #[inline]
    pub fn index(&self, p: Point) -> Result<usize, GridError> {
        if !self.contains(p) {
            return Err(GridError::InvalidCoordinate {
                pos: p,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(p.row as usize * self.cols as usize + p.col as usize)
    }

    /// Convert a flat index back to a `Point`, or `None` if `idx` is past
    /// the last node.
    #[inline]
    pub fn point(&self, idx: usize) -> Option<Point> {
        self.nodes.get(idx).map(Node::pos)
    }

    // -----------------------------------------------------------------------
    // Node access
    // -----------------------------------------------------------------------

    /// The node at `p`.
    pub fn node(&self, p: Point) -> Result<&Node, GridError> {
        let i = self.index(p)?;
        Ok(&self.nodes[i])
    }

    /// The node at flat index `idx`, if any.
    #[inline]
    pub fn node_at(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Mutable access to the search fields of the node at `idx`. Roles can
    /// only be changed through [`set_role`](Grid::set_role) and friends.
    #[inline]
    pub fn node_at_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.nodes.get_mut(idx)
    }

    /// Row-major iterator over all nodes.
    pub fn nodes(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Position of the start node, if set.
    #[inline]
    pub fn start(&self) -> Option<Point> {
        self.start.and_then(|i| self.point(i))
    }

    /// Position of the end node, if set.
    #[inline]
    pub fn end(&self) -> Option<Point> {
        self.end.and_then(|i| self.point(i))
    }

    #[inline]
    pub fn start_index(&self) -> Option<usize> {
        self.start
    }

    #[inline]
    pub fn end_index(&self) -> Option<usize> {
        self.end
    }

    // -----------------------------------------------------------------------
    // Bulk reset
    // -----------------------------------------------------------------------

    /// Return every node to its initial state: no roles, unreached, no
    /// parent. Start and end are unset.
    pub fn reset(&mut self) {
        for n in self.nodes.iter_mut() {
            n.reset();
        }
        self.start = None;
        self.end = None;
    }

    /// Clear costs and parent links but keep the painted roles.
    pub fn clear_search(&mut self) {
        for n in self.nodes.iter_mut() {
            n.clear_search();
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Assign `role` to the cell at `p`.
    ///
    /// - `Start` / `End` replace the previous start / end (which becomes
    ///   empty) and overwrite a wall.
    /// - `Wall` toggles: a wall becomes empty again.
    /// - `Empty` clears whatever was there.
    ///
    /// Putting the end on the start cell, the start on the end cell, or a
    /// wall on either endpoint fails with [`GridError::RoleConflict`] and
    /// leaves the grid untouched.
    pub fn set_role(&mut self, p: Point, role: Role) -> Result<(), GridError> {
        let i = self.index(p)?;
        let existing = self.nodes[i].role;
        let conflict = match role {
            Role::Start => existing == Role::End,
            Role::End => existing == Role::Start,
            Role::Wall => matches!(existing, Role::Start | Role::End),
            Role::Empty => false,
        };
        if conflict {
            return Err(GridError::RoleConflict {
                pos: p,
                requested: role,
                existing,
            });
        }

        match role {
            Role::Start => {
                if let Some(old) = self.start.replace(i) {
                    self.nodes[old].role = Role::Empty;
                }
                self.nodes[i].role = Role::Start;
            }
            Role::End => {
                if let Some(old) = self.end.replace(i) {
                    self.nodes[old].role = Role::Empty;
                }
                self.nodes[i].role = Role::End;
            }
            Role::Wall => {
                self.nodes[i].role = if existing == Role::Wall {
                    Role::Empty
                } else {
                    Role::Wall
                };
            }
            Role::Empty => {
                self.unlink(i);
                self.nodes[i].role = Role::Empty;
            }
        }
        Ok(())
    }

    /// Apply a click at `p`: the first click places the start, the second
    /// the end, later clicks toggle walls. Returns the role the cell ends up
    /// with.
    pub fn click(&mut self, p: Point) -> Result<Role, GridError> {
        let role = if self.start.is_none() {
            Role::Start
        } else if self.end.is_none() {
            Role::End
        } else {
            Role::Wall
        };
        self.set_role(p, role)?;
        Ok(self.node(p)?.role)
    }

    /// Make `p` a wall unless it is an endpoint (drag painting). Never
    /// toggles. Returns whether the cell changed.
    pub fn paint_wall(&mut self, p: Point) -> Result<bool, GridError> {
        let i = self.index(p)?;
        let node = &mut self.nodes[i];
        if node.role != Role::Empty {
            return Ok(false);
        }
        node.role = Role::Wall;
        Ok(true)
    }

    fn unlink(&mut self, i: usize) {
        if self.start == Some(i) {
            self.start = None;
        }
        if self.end == Some(i) {
            self.end = None;
        }
    }

    // -----------------------------------------------------------------------
    // Neighbours
    // -----------------------------------------------------------------------

    /// In-bounds 4-connected neighbours of `p`, in the order up, down, left,
    /// right. Walls are included; filtering is the caller's business.
    pub fn neighbors(&self, p: Point) -> Result<Vec<Point>, GridError> {
        self.index(p)?;
        Ok(p.neighbors_4()
            .into_iter()
            .filter(|&n| self.contains(n))
            .collect())
    }

    /// Append the indices of the non-wall neighbours of node `idx` into
    /// `buf`, in neighbour order. The caller clears `buf` before calling.
    /// An out-of-range `idx` appends nothing.
    pub fn open_neighbors(&self, idx: usize, buf: &mut Vec<usize>) {
        let Some(p) = self.point(idx) else {
            return;
        };
        for n in p.neighbors_4() {
            if let Ok(ni) = self.index(n) {
                if !self.nodes[ni].is_wall() {
                    buf.push(ni);
                }
            }
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::with_config(GridConfig::default())
    }
}
