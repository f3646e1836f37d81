use gridstar_core::{Grid, Point};

use crate::error::SearchError;

/// Walk `parent` links from node `end` back to the start node and return
/// the route in start-to-end order.
///
/// Fails with [`SearchError::NoPath`] unless the chain ends at the node
/// flagged as start. The walk is bounded by the node count, so a corrupted
/// chain cannot loop forever.
pub(crate) fn extract_path(grid: &Grid, end: usize) -> Result<Vec<Point>, SearchError> {
    let mut path = Vec::new();
    let mut cur = Some(end);
    while let Some(ci) = cur {
        if path.len() > grid.len() {
            return Err(SearchError::NoPath);
        }
        let node = grid.node_at(ci).ok_or(SearchError::NoPath)?;
        path.push(node.pos());
        cur = node.parent;
        if cur.is_none() && !node.is_start() {
            return Err(SearchError::NoPath);
        }
    }
    path.reverse();
    Ok(path)
}
