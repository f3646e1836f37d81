//! Grid dimensions.

/// Default number of rows (and columns) of a grid.
pub const DEFAULT_SIZE: i32 = 16;

/// Dimensions used to create a [`Grid`](crate::Grid).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    pub rows: i32,
    pub cols: i32,
}

impl GridConfig {
    pub const fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }

    /// Number of cells, treating negative dimensions as zero.
    #[inline]
    pub fn len(self) -> usize {
        self.rows.max(0) as usize * self.cols.max(0) as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE, DEFAULT_SIZE)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: GridConfig = serde_json::from_str(r#"{"rows": 5}"#).unwrap();
        assert_eq!(cfg, GridConfig::new(5, DEFAULT_SIZE));
    }
}
