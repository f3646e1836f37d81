use std::fmt;

use gridstar_core::{GridError, Point};

use crate::engine::SessionHandle;

/// Errors returned by the search engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A coordinate or role problem reported by the grid.
    Grid(GridError),
    /// A run was requested before both endpoints were placed.
    MissingEndpoints {
        start: Option<Point>,
        end: Option<Point>,
    },
    /// A run is already active; the grid cannot be searched or edited
    /// until it finishes or is cancelled.
    Busy,
    /// The handle does not name the active run.
    UnknownSession(SessionHandle),
    /// The last run did not reach the end node.
    NoPath,
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "{e}"),
            Self::MissingEndpoints { start, end } => {
                let missing = match (start, end) {
                    (None, None) => "start and end",
                    (None, Some(_)) => "start",
                    _ => "end",
                };
                write!(f, "cannot search: no {missing} cell placed")
            }
            Self::Busy => f.write_str("a search is already running on this grid"),
            Self::UnknownSession(h) => write!(f, "session {} is not running", h.id()),
            Self::NoPath => f.write_str("no path to the end cell"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for SearchError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}
