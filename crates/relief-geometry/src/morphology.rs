//! Step 2: morphological opening (erode then dilate) over a 3x3,
//! 8-connected structuring element.

use crate::binarize::BinaryGrid;

/// Counts set neighbors (8-connectivity) around (x,y), treating
/// out-of-bounds as zero.
fn neighbor_count(grid: &BinaryGrid, x: usize, y: usize) -> u8 {
    let mut count = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if grid.in_bounds(nx, ny) && grid.get(nx as usize, ny as usize) > 0 {
                count += 1;
            }
        }
    }
    count
}

/// A pixel survives erosion only if it and its full 3x3 neighborhood
/// (within bounds) are all set; cells touching the border are eroded away,
/// matching 8-connected structuring-element behavior at the edges.
fn erode(grid: &BinaryGrid) -> BinaryGrid {
    let mut out = BinaryGrid::new(grid.width, grid.height);
    for y in 0..grid.height {
        let mut x = 0;
        while x < grid.width {
            if grid.get(x, y) == 0 {
                // Vectorized zero-run skip: scan ahead over the whole run
                // of zeros at once instead of re-checking each pixel's
                // neighbor count (a zero pixel never survives erosion).
                while x < grid.width && grid.get(x, y) == 0 {
                    x += 1;
                }
                continue;
            }
            let on_border = x == 0 || y == 0 || x == grid.width - 1 || y == grid.height - 1;
            let survives = !on_border && neighbor_count(grid, x, y) == 8;
            if survives {
                out.set(x, y, 1);
            }
            x += 1;
        }
    }
    out
}

fn dilate(grid: &BinaryGrid) -> BinaryGrid {
    let mut out = BinaryGrid::new(grid.width, grid.height);
    for y in 0..grid.height {
        let mut x = 0;
        while x < grid.width {
            if grid.get(x, y) == 0 {
                // Vectorized zero-run skip: scan ahead over the whole run of
                // zeros at once (a zero pixel contributes nothing to dilate).
                while x < grid.width && grid.get(x, y) == 0 {
                    x += 1;
                }
                continue;
            }
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if grid.in_bounds(nx, ny) {
                        out.set(nx as usize, ny as usize, 1);
                    }
                }
            }
            x += 1;
        }
    }
    out
}

/// Erode then dilate, cleaning up speckle noise while preserving the rough
/// shape of surviving components.
pub fn morphological_open(grid: &BinaryGrid) -> BinaryGrid {
    dilate(&erode(grid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_rows(rows: &[&[u8]]) -> BinaryGrid {
        let height = rows.len();
        let width = rows[0].len();
        let mut grid = BinaryGrid::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                grid.set(x, y, v);
            }
        }
        grid
    }

    #[test]
    fn removes_isolated_speckle() {
        let grid = grid_from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 0, 1, 0, 0],
            &[0, 0, 0, 0, 0],
        ]);
        let opened = morphological_open(&grid);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(opened.get(x, y), 0);
            }
        }
    }

    #[test]
    fn preserves_solid_block() {
        let grid = grid_from_rows(&[
            &[1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1],
        ]);
        let opened = morphological_open(&grid);
        assert_eq!(opened.get(2, 2), 1);
    }
}
