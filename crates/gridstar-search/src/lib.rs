//! Incremental A* search over [`gridstar_core::Grid`]s.
//!
//! The [`Engine`] owns a grid and runs one search at a time over it. A
//! search advances only when the caller asks: every [`Engine::step`] does a
//! bounded amount of work and reports a single [`StepOutcome`], which lets a
//! presentation layer animate the search at its own pace.
//!
//! - 4-connected moves of uniform cost 1, walls are impassable
//! - [`manhattan`] heuristic, so the first time the end cell is popped its
//!   cost is optimal
//! - open-set ties are broken by insertion order, which makes runs
//!   reproducible
//! - improved nodes are re-queued and stale queue entries skipped on pop
//!
//! ```
//! use gridstar_core::Grid;
//! use gridstar_search::{Engine, StepOutcome};
//!
//! let grid: Grid = "S.#.E\n..#..\n.....".parse().unwrap();
//! let mut engine = Engine::new(grid);
//! let run = engine.start().unwrap();
//! assert_eq!(engine.run_to_completion(run).unwrap(), StepOutcome::Succeeded);
//! assert_eq!(engine.path().unwrap().len(), 9);
//! ```

mod cancel;
mod distance;
mod engine;
mod error;
mod open;
mod path;

pub use cancel::CancelToken;
pub use distance::manhattan;
pub use engine::{Engine, SearchState, SearchStats, SessionHandle, StepOutcome};
pub use error::SearchError;
