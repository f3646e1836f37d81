//! Visualizer settings.

use std::time::Duration;

use gridstar_core::GridConfig;

/// Delay between two animation ticks.
pub const DEFAULT_TICK: Duration = Duration::from_millis(5);

/// Configuration for the terminal visualizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermConfig {
    /// Grid dimensions.
    pub grid: GridConfig,
    /// How long the driver waits for input before the next tick.
    pub tick: Duration,
    /// Engine steps performed per tick while a search is animating.
    pub steps_per_tick: usize,
    /// Terminal columns per grid cell. Two makes cells roughly square.
    pub cell_width: u16,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            tick: DEFAULT_TICK,
            steps_per_tick: 1,
            cell_width: 2,
        }
    }
}

impl TermConfig {
    /// Screen size in terminal cells: the grid plus two status lines.
    /// Saturates at `u16::MAX` for grids wider or taller than a terminal
    /// can address.
    pub fn screen_size(&self) -> (u16, u16) {
        let cols = u16::try_from(self.grid.cols.max(0)).unwrap_or(u16::MAX);
        let rows = u16::try_from(self.grid.rows.max(0)).unwrap_or(u16::MAX);
        let w = cols.saturating_mul(self.cell_width.max(1));
        let h = rows.saturating_add(2);
        (w, h)
    }
}
