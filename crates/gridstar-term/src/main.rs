//! Terminal A* pathfinding visualizer.
//!
//! Run: cargo run --bin gridstar

use gridstar_term::TermConfig;

fn main() {
    if let Err(e) = gridstar_term::run(TermConfig::default()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
