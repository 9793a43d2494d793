//! Step 1: thresholding the raw probability map into a binary grid.

use crate::types::ReliefMap;

/// A binary grid, one byte per cell (0 or 1), row-major.
#[derive(Debug, Clone)]
pub struct BinaryGrid {
    pub width: usize,
    pub height: usize,
    cells: Vec<u8>,
}

impl BinaryGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.cells[y * self.width + x] = value;
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
}

/// `out[i] = 1 if in[i] > threshold else 0`, pointwise. Dimensions preserved.
pub fn binarize(map: &ReliefMap, threshold: f32) -> BinaryGrid {
    let mut grid = BinaryGrid::new(map.width, map.height);
    for y in 0..map.height {
        for x in 0..map.width {
            if map.get(x, y) > threshold {
                grid.set(x, y, 1);
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_pointwise() {
        let map = ReliefMap::new(3, 1, vec![0.1, 0.2, 0.3]);
        let grid = binarize(&map, 0.2);
        assert_eq!(grid.get(0, 0), 0);
        assert_eq!(grid.get(1, 0), 0); // 0.2 is not > 0.2
        assert_eq!(grid.get(2, 0), 1);
    }

    #[test]
    fn idempotent_on_binary_input() {
        let map = ReliefMap::new(2, 2, vec![0.0, 1.0, 1.0, 0.0]);
        let first = binarize(&map, 0.2);
        let as_map = ReliefMap::new(2, 2, first.cells.iter().map(|&c| c as f32).collect());
        let second = binarize(&as_map, 0.5);
        assert_eq!(first.cells, second.cells);
    }
}
