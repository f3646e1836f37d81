//! **gridstar-core** — the grid model of the gridstar pathfinder.
//!
//! This crate provides the data the search runs over: the [`Point`]
//! coordinate, per-cell [`Node`] state with its [`Role`], and the
//! fixed-size [`Grid`] that owns every node, enumerates neighbours and
//! enforces the one-start / one-end rule. Grids can also be built from text
//! layouts (see [`layout`]).

pub mod config;
pub mod geom;
pub mod grid;
pub mod layout;
pub mod node;

pub use config::{DEFAULT_SIZE, GridConfig};
pub use geom::Point;
pub use grid::{Grid, GridError};
pub use layout::LayoutError;
pub use node::{Node, Role, UNREACHED};
