//! Per-cell search state: [`Role`] and [`Node`].

use crate::geom::Point;

/// Sentinel cost meaning "not reached yet".
pub const UNREACHED: i32 = i32::MAX;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What a cell is, as painted by the user. Start and end cells are never
/// walls, so the roles are a single enum rather than independent flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    #[default]
    Empty,
    Start,
    End,
    Wall,
}

impl Role {
    /// Layout character for this role.
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Start => 'S',
            Self::End => 'E',
            Self::Wall => '#',
        }
    }

    /// Inverse of [`glyph`](Role::glyph).
    pub const fn from_glyph(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Self::Empty),
            'S' => Some(Self::Start),
            'E' => Some(Self::End),
            '#' => Some(Self::Wall),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A grid cell together with the search fields the engine writes into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pos: Point,
    pub(crate) role: Role,
    /// Best known cost from the start node.
    pub g: i32,
    /// Heuristic estimate of the remaining cost to the end node.
    pub h: i32,
    /// Index of the predecessor on the best known path, into the owning
    /// grid's node storage.
    pub parent: Option<usize>,
}

impl Node {
    pub(crate) fn new(pos: Point) -> Self {
        Self {
            pos,
            role: Role::Empty,
            g: UNREACHED,
            h: UNREACHED,
            parent: None,
        }
    }

    /// The node's coordinate. Fixed for the lifetime of the grid.
    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn is_start(&self) -> bool {
        self.role == Role::Start
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.role == Role::End
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.role == Role::Wall
    }

    /// Whether the search has assigned this node a finite cost.
    #[inline]
    pub fn is_reached(&self) -> bool {
        self.g != UNREACHED
    }

    /// Priority key `g + h`, saturating for unreached nodes.
    #[inline]
    pub fn f(&self) -> i32 {
        self.g.saturating_add(self.h)
    }

    /// Forget everything the search wrote, keeping the role.
    pub(crate) fn clear_search(&mut self) {
        self.g = UNREACHED;
        self.h = UNREACHED;
        self.parent = None;
    }

    /// Back to the freshly created state.
    pub(crate) fn reset(&mut self) {
        self.clear_search();
        self.role = Role::Empty;
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        let json = serde_json::to_string(&Role::Wall).unwrap();
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Wall);
    }
}
