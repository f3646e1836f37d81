//! The visualizer model: grid editing, search animation and drawing.
//!
//! The model is driver-agnostic. A driver feeds it [`Input`]s, calls
//! [`Visualizer::draw`] and flushes the resulting canvas; a periodic
//! [`Input::Tick`] advances an animated search.

use gridstar_core::{Point, Role};
use gridstar_search::{Engine, SearchError, SessionHandle, StepOutcome};

use crate::canvas::{Canvas, Glyph, Shade};
use crate::config::TermConfig;

pub const HELP: &str = "click: start/end/wall  drag: walls  enter: run  n: step  c: clear  esc: cancel/quit";

/// An input event, already translated to grid terms.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Main button pressed over a grid cell.
    Click(Point),
    /// Pointer moved over a grid cell, button state unknown.
    Drag(Point),
    /// Main button released.
    Release,
    /// Run the search, animated by ticks.
    Start,
    /// Advance the search by one event, starting it if needed.
    Step,
    /// Reset the board.
    Clear,
    /// Cancel the running search, or quit when idle.
    Cancel,
    Quit,
    /// Animation tick.
    Tick,
}

/// Whether the driver should keep going.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Search overlay for a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mark {
    #[default]
    None,
    Frontier,
    Expanded,
    Path,
}

/// Interactive pathfinder state.
pub struct Visualizer {
    engine: Engine,
    session: Option<SessionHandle>,
    /// Ticks drive the search (as opposed to single-stepping).
    animate: bool,
    marks: Vec<Mark>,
    status: String,
    dragging: bool,
    steps_per_tick: usize,
    cell_width: u16,
}

impl Visualizer {
    pub fn new(config: TermConfig) -> Self {
        let engine = Engine::with_config(config.grid);
        let marks = vec![Mark::None; engine.grid().len()];
        Self {
            engine,
            session: None,
            animate: false,
            marks,
            status: String::from("place the start cell"),
            dragging: false,
            steps_per_tick: config.steps_per_tick.max(1),
            cell_width: config.cell_width.max(1),
        }
    }

    #[inline]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Last status message.
    #[inline]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Whether ticks are currently advancing a search.
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animate && self.session.is_some()
    }

    /// Overlay of the cell at `p`.
    pub fn mark(&self, p: Point) -> Mark {
        self.engine
            .grid()
            .index(p)
            .map_or(Mark::None, |i| self.marks[i])
    }

    /// Grid cell under terminal position `(x, y)`, if any.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<Point> {
        let p = Point::new(y as i32, (x / self.cell_width) as i32);
        self.engine.grid().contains(p).then_some(p)
    }

    /// Process one input.
    pub fn update(&mut self, input: Input) -> Control {
        match input {
            Input::Click(p) => {
                self.dragging = true;
                self.click(p);
            }
            Input::Drag(p) => {
                if self.dragging {
                    self.paint(p);
                }
            }
            Input::Release => self.dragging = false,
            Input::Start => self.start(true),
            Input::Step => {
                if self.session.is_none() {
                    self.start(false);
                }
                self.animate = false;
                self.advance(1);
            }
            Input::Clear => self.clear(),
            Input::Cancel => {
                let Some(h) = self.session else {
                    return Control::Quit;
                };
                if let Err(e) = self.engine.cancel(h) {
                    self.status = e.to_string();
                }
                self.advance(1);
            }
            Input::Quit => {
                if let Some(h) = self.session {
                    let _ = self.engine.cancel(h);
                    self.advance(1);
                }
                return Control::Quit;
            }
            Input::Tick => {
                if self.animate {
                    self.advance(self.steps_per_tick);
                }
            }
        }
        Control::Continue
    }

    fn click(&mut self, p: Point) {
        if self.session.is_some() {
            self.status = SearchError::Busy.to_string();
            return;
        }
        // Taking the grid discards the last run, so its marks go too, even
        // when the edit itself is refused.
        let result = match self.engine.grid_mut() {
            Ok(g) => g.click(p),
            Err(e) => {
                self.status = e.to_string();
                return;
            }
        };
        self.clear_marks();
        match result {
            Ok(role) => {
                log::debug!("click {p}: {role:?}");
                self.status = match (role, self.engine.grid().end()) {
                    (Role::Start, None) => String::from("place the end cell"),
                    _ => String::from("draw walls, then press enter"),
                };
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn paint(&mut self, p: Point) {
        if self.session.is_some() {
            return;
        }
        let Ok(grid) = self.engine.grid_mut() else {
            return;
        };
        if let Ok(true) = grid.paint_wall(p) {
            log::trace!("wall painted at {p}");
        }
        self.clear_marks();
    }

    fn clear(&mut self) {
        match self.engine.grid_mut() {
            Ok(grid) => {
                grid.reset();
                self.clear_marks();
                self.status = String::from("place the start cell");
                log::debug!("board cleared");
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn start(&mut self, animate: bool) {
        match self.engine.start() {
            Ok(h) => {
                self.clear_marks();
                self.session = Some(h);
                self.animate = animate;
                self.status = String::from("searching…");
                log::debug!("session {} started (animate: {animate})", h.id());
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    /// Pull up to `n` events from the engine and record them for drawing.
    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            let Some(h) = self.session else {
                return;
            };
            let outcome = match self.engine.step(h) {
                Ok(o) => o,
                Err(e) => {
                    self.status = e.to_string();
                    self.session = None;
                    return;
                }
            };
            match outcome {
                StepOutcome::Expanded(p) => self.set_mark(p, Mark::Expanded),
                StepOutcome::Relaxed(p) => self.set_mark(p, Mark::Frontier),
                StepOutcome::Succeeded => {
                    let path = self.engine.path().unwrap_or_default();
                    for &p in &path {
                        self.set_mark(p, Mark::Path);
                    }
                    self.status = format!(
                        "path found: {} steps, {} cells expanded",
                        path.len().saturating_sub(1),
                        self.engine.stats().expanded
                    );
                }
                StepOutcome::Failed => self.status = SearchError::NoPath.to_string(),
                StepOutcome::Cancelled => self.status = String::from("search cancelled"),
            }
            if outcome.is_terminal() {
                log::debug!("session {} ended: {outcome:?}", h.id());
                self.session = None;
                self.animate = false;
                return;
            }
        }
    }

    fn set_mark(&mut self, p: Point, mark: Mark) {
        if let Ok(i) = self.engine.grid().index(p) {
            self.marks[i] = mark;
        }
    }

    fn clear_marks(&mut self) {
        self.marks.fill(Mark::None);
    }

    /// Render the grid and the two status lines into `canvas`.
    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.clear();
        let grid = self.engine.grid();
        for (node, &mark) in grid.nodes().zip(self.marks.iter()) {
            let (ch, shade) = match (node.role(), mark) {
                (Role::Start, _) => ('S', Shade::Start),
                (Role::End, _) => ('E', Shade::End),
                (Role::Wall, _) => ('#', Shade::Wall),
                (Role::Empty, Mark::Path) => ('*', Shade::Path),
                (Role::Empty, Mark::Expanded) => ('+', Shade::Expanded),
                (Role::Empty, Mark::Frontier) => ('o', Shade::Frontier),
                (Role::Empty, Mark::None) => ('.', Shade::Empty),
            };
            let p = node.pos();
            // cells past the terminal coordinate range are not drawn
            let (Ok(y), Ok(col)) = (u16::try_from(p.row), u16::try_from(p.col)) else {
                continue;
            };
            let Some(x0) = col.checked_mul(self.cell_width) else {
                continue;
            };
            for dx in 0..self.cell_width {
                let Some(x) = x0.checked_add(dx) else {
                    break;
                };
                let ch = if dx == 0 { ch } else { ' ' };
                canvas.set(x, y, Glyph { ch, shade });
            }
        }

        let stats = self.engine.stats();
        let line = u16::try_from(grid.rows().max(0)).unwrap_or(u16::MAX);
        canvas.print_line(
            line,
            &format!(
                "{:?}  expanded {}  relaxed {}  | {}",
                self.engine.state(),
                stats.expanded,
                stats.relaxed,
                self.status
            ),
        );
        canvas.print_line(line.saturating_add(1), HELP);
    }
}
