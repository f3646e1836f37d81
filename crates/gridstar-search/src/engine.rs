//! The steppable A* [`Engine`].
//!
//! The engine owns the [`Grid`] it searches. A run is started with
//! [`Engine::start`], which hands back a [`SessionHandle`]; the caller then
//! drives it with [`Engine::step`] (one event per call) or
//! [`Engine::run_to_completion`]. Pacing is entirely up to the caller.
//!
//! ```text
//! Idle ──start──▶ Running ──step…──▶ Succeeded | Failed | Cancelled
//!                    ▲                          │
//!                    └──────────start───────────┘
//! ```

use std::collections::VecDeque;

use gridstar_core::{Grid, GridConfig, Point};

use crate::cancel::CancelToken;
use crate::distance::manhattan;
use crate::error::SearchError;
use crate::open::OpenSet;
use crate::path::extract_path;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Where the engine is in its lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchState {
    /// No run yet, or the grid was edited since the last one.
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl SearchState {
    /// Whether a run has ended in this state.
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// What a single call to [`Engine::step`] reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepOutcome {
    /// The cell was popped from the open set and its neighbours examined.
    Expanded(Point),
    /// The cell's best known cost improved and it was queued.
    Relaxed(Point),
    /// The end cell was reached; the run is over.
    Succeeded,
    /// The open set ran dry; there is no path. The run is over.
    Failed,
    /// The run was cancelled before this step.
    Cancelled,
}

impl StepOutcome {
    /// Whether this outcome ends the run.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Counters for the current (or last) run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Calls to `step` that returned an event.
    pub steps: u64,
    pub expanded: u64,
    pub relaxed: u64,
    /// Popped entries skipped because the node was closed or had improved.
    pub stale: u64,
}

/// Names one run. Only the handle of the active run is accepted by
/// [`Engine::step`] and friends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    id: u64,
}

impl SessionHandle {
    #[inline]
    pub fn id(self) -> u64 {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State of one run. Dropped as soon as the run ends.
struct Session {
    id: u64,
    goal: usize,
    goal_pos: Point,
    open: OpenSet,
    closed: Vec<bool>,
    /// Events produced by the last expansion, not yet handed out.
    pending: VecDeque<StepOutcome>,
    cancel: CancelToken,
    // scratch buffer for neighbor queries
    nbuf: Vec<usize>,
}

impl Session {
    fn new(id: u64, grid: &mut Grid, start: usize, goal: usize, goal_pos: Point) -> Self {
        grid.clear_search();
        let mut open = OpenSet::new();
        if let Some(node) = grid.node_at_mut(start) {
            node.g = 0;
            node.h = manhattan(node.pos(), goal_pos);
            open.push(start, node.g, node.f());
        }
        Self {
            id,
            goal,
            goal_pos,
            open,
            closed: vec![false; grid.len()],
            pending: VecDeque::new(),
            cancel: CancelToken::new(),
            nbuf: Vec::with_capacity(4),
        }
    }

    /// One iteration of the A* loop: pop the best live entry, stop if it
    /// is the goal, otherwise close it and relax its neighbours.
    fn advance(&mut self, grid: &mut Grid, stats: &mut SearchStats) -> StepOutcome {
        let current = loop {
            let Some(entry) = self.open.pop() else {
                return StepOutcome::Failed;
            };
            let live = !self.closed[entry.idx]
                && grid.node_at(entry.idx).is_some_and(|n| n.g == entry.g);
            if live {
                break entry.idx;
            }
            stats.stale += 1;
        };

        if current == self.goal {
            return StepOutcome::Succeeded;
        }

        self.closed[current] = true;
        stats.expanded += 1;
        let Some((current_g, pos)) = grid.node_at(current).map(|n| (n.g, n.pos())) else {
            return StepOutcome::Failed;
        };

        let mut nbuf = std::mem::take(&mut self.nbuf);
        nbuf.clear();
        grid.open_neighbors(current, &mut nbuf);

        for &ni in nbuf.iter() {
            let tentative_g = current_g + 1;
            let Some(n) = grid.node_at_mut(ni) else {
                continue;
            };
            if tentative_g >= n.g {
                continue;
            }
            n.parent = Some(current);
            n.g = tentative_g;
            n.h = manhattan(n.pos(), self.goal_pos);
            self.open.push(ni, n.g, n.f());
            self.pending.push_back(StepOutcome::Relaxed(n.pos()));
            stats.relaxed += 1;
        }

        self.nbuf = nbuf;
        log::trace!(
            "search {}: expanded {pos} (g={current_g}, open={})",
            self.id,
            self.open.len()
        );
        StepOutcome::Expanded(pos)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Incremental A* over a [`Grid`] it owns.
pub struct Engine {
    grid: Grid,
    state: SearchState,
    session: Option<Session>,
    stats: SearchStats,
    next_id: u64,
}

impl Engine {
    /// Create an engine searching `grid`.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            state: SearchState::Idle,
            session: None,
            stats: SearchStats::default(),
            next_id: 1,
        }
    }

    /// Create an engine over a fresh grid of the configured size.
    pub fn with_config(config: GridConfig) -> Self {
        Self::new(Grid::with_config(config))
    }

    /// The grid, including the costs and parents written by the last run.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access for editing. Refused with [`SearchError::Busy`] while
    /// a run is active. Any previous result is discarded: the state goes
    /// back to [`SearchState::Idle`].
    pub fn grid_mut(&mut self) -> Result<&mut Grid, SearchError> {
        if self.session.is_some() {
            return Err(SearchError::Busy);
        }
        self.state = SearchState::Idle;
        Ok(&mut self.grid)
    }

    #[inline]
    pub fn state(&self) -> SearchState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Counters of the current or last run.
    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Handle of the active run, if any.
    pub fn session(&self) -> Option<SessionHandle> {
        self.session.as_ref().map(|s| SessionHandle { id: s.id })
    }

    /// Start a run from the grid's start cell to its end cell.
    ///
    /// Clears the costs and parents of every node (roles are kept), seeds
    /// the open set with the start node and returns without expanding
    /// anything.
    pub fn start(&mut self) -> Result<SessionHandle, SearchError> {
        if self.session.is_some() {
            log::warn!("search rejected: a run is already active");
            return Err(SearchError::Busy);
        }
        let (Some(start), Some(goal), Some(start_pos), Some(goal_pos)) = (
            self.grid.start_index(),
            self.grid.end_index(),
            self.grid.start(),
            self.grid.end(),
        ) else {
            log::warn!("search rejected: endpoints not placed");
            return Err(SearchError::MissingEndpoints {
                start: self.grid.start(),
                end: self.grid.end(),
            });
        };

        let id = self.next_id;
        self.next_id += 1;
        self.session = Some(Session::new(id, &mut self.grid, start, goal, goal_pos));
        self.state = SearchState::Running;
        self.stats = SearchStats::default();
        log::debug!("search {id} started: {start_pos} -> {goal_pos}");
        Ok(SessionHandle { id })
    }

    /// Advance the run by one event.
    ///
    /// Relaxations found by an expansion are buffered and handed out by the
    /// following calls, in neighbour order. Once the buffer is empty the
    /// next call performs exactly one more iteration of the search loop and
    /// reports `Expanded`, `Succeeded` or `Failed`. A pending cancellation
    /// is reported as `Cancelled` before any of that. Terminal outcomes end
    /// the session; the handle is not accepted afterwards.
    pub fn step(&mut self, handle: SessionHandle) -> Result<StepOutcome, SearchError> {
        let session = match self.session.as_mut() {
            Some(s) if s.id == handle.id => s,
            _ => return Err(SearchError::UnknownSession(handle)),
        };
        self.stats.steps += 1;

        if session.cancel.is_cancelled() {
            return Ok(self.finish(SearchState::Cancelled));
        }
        if let Some(event) = session.pending.pop_front() {
            return Ok(event);
        }

        match session.advance(&mut self.grid, &mut self.stats) {
            StepOutcome::Succeeded => Ok(self.finish(SearchState::Succeeded)),
            StepOutcome::Failed => Ok(self.finish(SearchState::Failed)),
            outcome => Ok(outcome),
        }
    }

    /// Step until the run ends and return the terminal outcome.
    pub fn run_to_completion(&mut self, handle: SessionHandle) -> Result<StepOutcome, SearchError> {
        loop {
            let outcome = self.step(handle)?;
            if outcome.is_terminal() {
                return Ok(outcome);
            }
        }
    }

    /// Request cancellation of the run. Takes effect on the next step.
    pub fn cancel(&mut self, handle: SessionHandle) -> Result<(), SearchError> {
        self.cancel_token(handle)?.cancel();
        Ok(())
    }

    /// A token that cancels the run when triggered, for callers that keep
    /// it somewhere the engine is not reachable from.
    pub fn cancel_token(&self, handle: SessionHandle) -> Result<CancelToken, SearchError> {
        match self.session.as_ref() {
            Some(s) if s.id == handle.id => Ok(s.cancel.clone()),
            _ => Err(SearchError::UnknownSession(handle)),
        }
    }

    /// The route from the start cell to `end`, in start-to-end order.
    ///
    /// Only available after a run that succeeded; a failed, cancelled or
    /// still-running search yields [`SearchError::NoPath`] even if some
    /// parent links are already in place.
    pub fn extract_path(&self, end: Point) -> Result<Vec<Point>, SearchError> {
        let idx = self.grid.index(end)?;
        if self.state != SearchState::Succeeded {
            return Err(SearchError::NoPath);
        }
        extract_path(&self.grid, idx)
    }

    /// Shorthand for [`extract_path`](Engine::extract_path) to the grid's
    /// end cell.
    pub fn path(&self) -> Result<Vec<Point>, SearchError> {
        let end = self.grid.end().ok_or(SearchError::NoPath)?;
        self.extract_path(end)
    }

    fn finish(&mut self, state: SearchState) -> StepOutcome {
        let id = self.session.take().map_or(0, |s| s.id);
        self.state = state;
        log::debug!(
            "search {id} finished: {state:?} (expanded {}, relaxed {}, stale {})",
            self.stats.expanded,
            self.stats.relaxed,
            self.stats.stale
        );
        match state {
            SearchState::Succeeded => StepOutcome::Succeeded,
            SearchState::Cancelled => StepOutcome::Cancelled,
            _ => StepOutcome::Failed,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use gridstar_core::Role;

    fn engine(layout: &str) -> Engine {
        Engine::new(layout.parse().unwrap())
    }

    fn solve(e: &mut Engine) -> StepOutcome {
        let h = e.start().unwrap();
        e.run_to_completion(h).unwrap()
    }

    /// Plain BFS distance, as an oracle for optimality.
    fn bfs_distance(grid: &Grid) -> Option<i32> {
        let start = grid.start_index()?;
        let goal = grid.end_index()?;
        let mut dist = vec![i32::MAX; grid.len()];
        let mut queue = VecDeque::from([start]);
        dist[start] = 0;
        let mut buf = Vec::new();
        while let Some(ci) = queue.pop_front() {
            if ci == goal {
                return Some(dist[ci]);
            }
            buf.clear();
            grid.open_neighbors(ci, &mut buf);
            for &ni in &buf {
                if dist[ni] == i32::MAX {
                    dist[ni] = dist[ci] + 1;
                    queue.push_back(ni);
                }
            }
        }
        None
    }

    fn assert_valid_path(e: &Engine, path: &[Point]) {
        let grid = e.grid();
        assert_eq!(path.first().copied(), grid.start());
        assert_eq!(path.last().copied(), grid.end());
        for w in path.windows(2) {
            assert!(w[0].is_adjacent(w[1]), "{} -> {} not adjacent", w[0], w[1]);
            assert!(!grid.node(w[1]).unwrap().is_wall());
        }
    }

    #[test]
    fn open_grid_path_is_manhattan() {
        for (start, end) in [
            (Point::new(0, 0), Point::new(7, 7)),
            (Point::new(3, 6), Point::new(3, 1)),
            (Point::new(7, 2), Point::new(0, 5)),
            (Point::new(4, 4), Point::new(4, 5)),
        ] {
            let mut grid = Grid::new(8, 8);
            grid.set_role(start, Role::Start).unwrap();
            grid.set_role(end, Role::End).unwrap();
            let mut e = Engine::new(grid);
            assert_eq!(solve(&mut e), StepOutcome::Succeeded);
            let path = e.path().unwrap();
            assert_valid_path(&e, &path);
            assert_eq!(path.len() as i32 - 1, manhattan(start, end));
        }
    }

    #[test]
    fn detour_around_wall() {
        let mut e = engine(
            "\
S.#.E
..#..
.....
.....
.....",
        );
        assert_eq!(solve(&mut e), StepOutcome::Succeeded);
        let path = e.path().unwrap();
        assert_eq!(path.len() - 1, 8);
        assert!(path.contains(&Point::new(2, 2)));
        assert_valid_path(&e, &path);
        assert_eq!(e.grid().node(Point::new(0, 4)).unwrap().g, 8);
        assert_eq!(e.state(), SearchState::Succeeded);
    }

    #[test]
    fn end_cost_matches_bfs() {
        let layouts = [
            "\
S...#....
.##.#.##.
.#..#..#.
.#.###.#.
.#.....#E",
            "\
..........
.########.
.#......#.
.#.####.#.
.#.#E.#.#.
.#.#..#.#.
.#.##.#.#.
.#....#.#.
.######.#S
..........",
            "\
S#........
.#.######.
.#.#....#.
...#.##.#.
####.#E...
.....#####
.#........",
        ];
        for layout in layouts {
            let mut e = engine(layout);
            let expected = bfs_distance(e.grid()).unwrap();
            assert_eq!(solve(&mut e), StepOutcome::Succeeded, "{layout}");
            let end = e.grid().end().unwrap();
            assert_eq!(e.grid().node(end).unwrap().g, expected, "{layout}");
            let path = e.path().unwrap();
            assert_eq!(path.len() as i32 - 1, expected);
            assert_valid_path(&e, &path);
        }
    }

    #[test]
    fn rerun_is_deterministic() {
        let mut e = engine(
            "\
S.......
.##.###.
........
.###.##.
.......E",
        );
        assert_eq!(solve(&mut e), StepOutcome::Succeeded);
        let first = e.path().unwrap();
        let first_stats = e.stats();

        let mut events = Vec::new();
        let h = e.start().unwrap();
        loop {
            let o = e.step(h).unwrap();
            events.push(o);
            if o.is_terminal() {
                break;
            }
        }
        assert_eq!(e.path().unwrap(), first);
        assert_eq!(e.stats().expanded, first_stats.expanded);

        let mut again = Vec::new();
        let h = e.start().unwrap();
        loop {
            let o = e.step(h).unwrap();
            again.push(o);
            if o.is_terminal() {
                break;
            }
        }
        assert_eq!(events, again);
    }

    #[test]
    fn walled_in_start_fails() {
        let mut e = engine(
            "\
S#...
##...
....E",
        );
        assert_eq!(solve(&mut e), StepOutcome::Failed);
        assert_eq!(e.state(), SearchState::Failed);
        assert_eq!(e.path(), Err(SearchError::NoPath));
        assert_eq!(e.stats().expanded, 1);
    }

    #[test]
    fn walled_in_end_fails() {
        let mut e = engine(
            "\
S....
...#.
..#E#
...#.",
        );
        assert_eq!(solve(&mut e), StepOutcome::Failed);
        assert!(!e.grid().node(Point::new(2, 3)).unwrap().is_reached());
    }

    #[test]
    fn missing_endpoints_do_no_work() {
        let mut e = Engine::new(Grid::new(4, 4));
        assert_eq!(
            e.start(),
            Err(SearchError::MissingEndpoints {
                start: None,
                end: None
            })
        );
        e.grid_mut().unwrap().click(Point::new(1, 1)).unwrap();
        assert_eq!(
            e.start(),
            Err(SearchError::MissingEndpoints {
                start: Some(Point::new(1, 1)),
                end: None
            })
        );
        assert_eq!(e.state(), SearchState::Idle);
        assert!(!e.is_running());
        assert!(e.grid().nodes().all(|n| !n.is_reached()));
    }

    #[test]
    fn second_start_is_busy() {
        let mut e = engine("S..E");
        let h = e.start().unwrap();
        assert_eq!(e.start(), Err(SearchError::Busy));
        assert_eq!(e.grid_mut().err(), Some(SearchError::Busy));
        assert_eq!(e.session(), Some(h));
        assert_eq!(e.run_to_completion(h), Ok(StepOutcome::Succeeded));
        assert!(e.start().is_ok());
    }

    #[test]
    fn finished_handle_is_unknown() {
        let mut e = engine("SE");
        let h = e.start().unwrap();
        assert_eq!(e.run_to_completion(h), Ok(StepOutcome::Succeeded));
        assert_eq!(e.step(h), Err(SearchError::UnknownSession(h)));
        assert_eq!(e.cancel(h), Err(SearchError::UnknownSession(h)));
        let h2 = e.start().unwrap();
        assert_ne!(h, h2);
        assert_eq!(e.step(h), Err(SearchError::UnknownSession(h)));
    }

    #[test]
    fn step_reports_expansion_then_relaxations() {
        let mut e = engine(
            "\
...
.S.
..E",
        );
        let h = e.start().unwrap();
        assert_eq!(e.step(h), Ok(StepOutcome::Expanded(Point::new(1, 1))));
        // up, down, left, right
        assert_eq!(e.step(h), Ok(StepOutcome::Relaxed(Point::new(0, 1))));
        assert_eq!(e.step(h), Ok(StepOutcome::Relaxed(Point::new(2, 1))));
        assert_eq!(e.step(h), Ok(StepOutcome::Relaxed(Point::new(1, 0))));
        assert_eq!(e.step(h), Ok(StepOutcome::Relaxed(Point::new(1, 2))));
        // f ties at 2 for (2,1) and (1,2): the earlier insertion wins.
        assert_eq!(e.step(h), Ok(StepOutcome::Expanded(Point::new(2, 1))));
        let n = e.grid().node(Point::new(1, 2)).unwrap();
        assert_eq!((n.g, n.h), (1, 1));
        assert_eq!(n.parent, e.grid().index(Point::new(1, 1)).ok());
    }

    #[test]
    fn start_clears_previous_costs_but_keeps_roles() {
        let mut e = engine("S.#\n..E");
        solve(&mut e);
        let h = e.start().unwrap();
        let g = e.grid();
        assert!(g.node(Point::new(0, 2)).unwrap().is_wall());
        let reached: Vec<Point> = g.nodes().filter(|n| n.is_reached()).map(|n| n.pos()).collect();
        assert_eq!(reached, vec![Point::new(0, 0)]);
        assert_eq!(g.node(Point::new(0, 0)).unwrap().h, 3);
        e.cancel(h).unwrap();
    }

    #[test]
    fn cancel_mid_run() {
        let mut e = engine(
            "\
S.....
......
......
.....E",
        );
        let h = e.start().unwrap();
        let token = e.cancel_token(h).unwrap();
        for _ in 0..6 {
            assert!(!e.step(h).unwrap().is_terminal());
        }
        token.cancel();
        assert_eq!(e.step(h), Ok(StepOutcome::Cancelled));
        assert_eq!(e.state(), SearchState::Cancelled);
        assert!(!e.is_running());

        // Partial state stays consistent: every reached node other than the
        // start has a reached parent one step cheaper.
        let g = e.grid();
        for n in g.nodes().filter(|n| n.is_reached() && !n.is_start()) {
            let parent = g.node_at(n.parent.unwrap()).unwrap();
            assert_eq!(parent.g + 1, n.g);
            assert!(parent.pos().is_adjacent(n.pos()));
        }
        assert_eq!(e.path(), Err(SearchError::NoPath));
        assert_eq!(e.extract_path(Point::new(3, 5)), Err(SearchError::NoPath));
    }

    #[test]
    fn cancel_after_end_relaxed_still_has_no_path() {
        let mut e = engine("SE");
        let h = e.start().unwrap();
        assert_eq!(e.step(h), Ok(StepOutcome::Expanded(Point::new(0, 0))));
        assert_eq!(e.step(h), Ok(StepOutcome::Relaxed(Point::new(0, 1))));
        e.cancel(h).unwrap();
        assert_eq!(e.step(h), Ok(StepOutcome::Cancelled));
        // The end node has a parent chain, but the run never succeeded.
        assert!(e.grid().node(Point::new(0, 1)).unwrap().parent.is_some());
        assert_eq!(e.path(), Err(SearchError::NoPath));
    }

    #[test]
    fn extract_path_checks_coordinates() {
        let mut e = engine("S.E");
        solve(&mut e);
        assert!(matches!(
            e.extract_path(Point::new(5, 5)),
            Err(SearchError::Grid(_))
        ));
        assert_eq!(
            e.extract_path(Point::new(0, 1)),
            Ok(vec![Point::new(0, 0), Point::new(0, 1)])
        );
    }

    #[test]
    fn editing_discards_result() {
        let mut e = engine("S.E");
        solve(&mut e);
        assert!(e.path().is_ok());
        e.grid_mut().unwrap().click(Point::new(0, 1)).unwrap();
        assert_eq!(e.state(), SearchState::Idle);
        assert_eq!(e.path(), Err(SearchError::NoPath));
        assert_eq!(solve(&mut e), StepOutcome::Failed);
    }

    #[test]
    fn stale_entries_are_skipped() {
        // A queued cell gets a cheaper cost before it is popped, leaving an
        // outdated entry behind in the open set.
        let mut e = engine(
            "\
......
#...#.
....#E
..#..#
#.S...",
        );
        let expected = bfs_distance(e.grid()).unwrap();
        let h = e.start().unwrap();
        let mut expanded = Vec::new();
        loop {
            match e.step(h).unwrap() {
                StepOutcome::Expanded(p) => expanded.push(p),
                o if o.is_terminal() => break,
                _ => {}
            }
        }
        let mut unique = expanded.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), expanded.len());
        assert!(e.stats().stale > 0);
        assert_eq!(e.stats().expanded, expanded.len() as u64);
        assert_eq!(expected, 9);
        assert_eq!(e.path().unwrap().len() as i32 - 1, expected);
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn outcome_round_trip() {
        let o = StepOutcome::Relaxed(Point::new(2, 3));
        let json = serde_json::to_string(&o).unwrap();
        let back: StepOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(o, back);
    }
}
