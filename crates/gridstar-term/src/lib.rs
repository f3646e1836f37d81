//! **gridstar-term** — an interactive terminal front end for the gridstar
//! pathfinder.
//!
//! Click to place the start, the end and walls, drag to paint walls, then
//! watch the A* search expand frame by frame. The [`Visualizer`] model is
//! independent of the terminal; [`TermDriver`] connects it to crossterm and
//! [`run`] ties the two together.

pub mod canvas;
pub mod config;
pub mod driver;
pub mod visualizer;

pub use canvas::{Canvas, Glyph, Shade};
pub use config::TermConfig;
pub use driver::TermDriver;
pub use visualizer::{Control, Input, Mark, Visualizer};

/// Run the visualizer until the user quits.
///
/// 1. Initialises the terminal.
/// 2. Polls input for at most one tick, feeds it to the model, then ticks.
/// 3. Draws, diffs against the previous frame and flushes the changes.
///
/// The terminal is restored on every exit path.
pub fn run(config: TermConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut model = Visualizer::new(config);
    let mut driver = TermDriver::new();
    driver.init()?;
    let result = event_loop(&mut model, &mut driver, config);
    driver.close();
    result
}

fn event_loop(
    model: &mut Visualizer,
    driver: &mut TermDriver,
    config: TermConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = config.screen_size();
    let mut prev = Canvas::new(width, height);
    let mut curr = Canvas::new(width, height);

    // Diffing against an empty canvas draws every glyph.
    model.draw(&mut curr);
    driver.flush(&canvas::diff(&Canvas::new(0, 0), &curr))?;
    prev.clone_from(&curr);

    loop {
        for input in driver.poll(model, config.tick)? {
            if model.update(input) == Control::Quit {
                return Ok(());
            }
        }
        model.update(Input::Tick);

        model.draw(&mut curr);
        let changes = canvas::diff(&prev, &curr);
        if !changes.is_empty() {
            driver.flush(&changes)?;
            prev.clone_from(&curr);
        }
    }
}
