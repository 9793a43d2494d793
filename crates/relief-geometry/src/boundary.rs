//! Step 3: boundary extraction via Moore-neighborhood tracing with Jacob's
//! stopping criterion, and destructive flood-fill marking of traced
//! components so they are never retraced.

use crate::binarize::BinaryGrid;
use crate::types::{Point, Polygon};

/// Working field for boundary extraction: 0 = background, 1 = foreground
/// not yet visited, -1 = already traced/filled.
pub struct TraceField {
    width: usize,
    height: usize,
    cells: Vec<i8>,
}

impl TraceField {
    pub fn from_binary(grid: &BinaryGrid) -> Self {
        let mut cells = Vec::with_capacity(grid.width * grid.height);
        for y in 0..grid.height {
            for x in 0..grid.width {
                cells.push(grid.get(x, y) as i8);
            }
        }
        Self {
            width: grid.width,
            height: grid.height,
            cells,
        }
    }

    #[inline]
    fn idx(&self, x: i64, y: i64) -> usize {
        y as usize * self.width + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: i64, y: i64) -> i8 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        self.cells[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: i64, y: i64, value: i8) {
        let i = self.idx(x, y);
        self.cells[i] = value;
    }

    fn is_foreground(&self, x: i64, y: i64) -> bool {
        self.get(x, y) == 1
    }

    /// Any 8-neighbor is background (0) or out of the grid.
    fn on_boundary(&self, x: i64, y: i64) -> bool {
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.get(x + dx, y + dy) != 1 {
                    return true;
                }
            }
        }
        false
    }
}

/// Clockwise 8-neighborhood offsets starting at North, matching screen
/// rotation in a y-down coordinate system.
const CW_OFFSETS: [(i64, i64); 8] = [
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
];

fn dir_index(from: (i64, i64), to: (i64, i64)) -> usize {
    let d = (to.0 - from.0, to.1 - from.1);
    CW_OFFSETS
        .iter()
        .position(|&o| o == d)
        .expect("backtrack must be one of the 8 neighbor offsets")
}

/// Traces one boundary clockwise starting at `start`, using `start`'s west
/// neighbor as the initial backtrack point (the background pixel the
/// row-major scan arrived from). Stops per Jacob's criterion: when the
/// traversal returns to `(start, initial_backtrack)` as a pair, not merely
/// when it revisits `start`.
pub fn trace_boundary(field: &TraceField, start: (i64, i64)) -> Vec<(i64, i64)> {
    let initial_backtrack = (start.0 - 1, start.1);
    let mut boundary = vec![start];
    let mut current = start;
    let mut backtrack = initial_backtrack;
    let max_iters = field.width * field.height;

    for _ in 0..max_iters {
        let base_idx = dir_index(current, backtrack);
        let mut found = None;
        for step in 1..=8 {
            let idx = (base_idx + step) % 8;
            let (dx, dy) = CW_OFFSETS[idx];
            let cand = (current.0 + dx, current.1 + dy);
            if field.is_foreground(cand.0, cand.1) {
                found = Some((cand, idx));
                break;
            }
        }
        let (next, idx) = match found {
            Some(v) => v,
            // Isolated single pixel: no foreground neighbor found at all.
            None => break,
        };
        let prev_idx = (idx + 7) % 8;
        let (pdx, pdy) = CW_OFFSETS[prev_idx];
        let new_backtrack = (current.0 + pdx, current.1 + pdy);
        current = next;
        backtrack = new_backtrack;
        if current == start && backtrack == initial_backtrack {
            break;
        }
        boundary.push(current);
    }
    boundary
}

/// Marks every pixel of the 8-connected component containing `start` as -1,
/// using an explicit stack to avoid recursion depth issues.
fn flood_fill_component(field: &mut TraceField, start: (i64, i64)) {
    let mut stack = vec![start];
    field.set(start.0, start.1, -1);
    while let Some((x, y)) = stack.pop() {
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if field.is_foreground(nx, ny) {
                    field.set(nx, ny, -1);
                    stack.push((nx, ny));
                }
            }
        }
    }
}

/// Scans row-major for untraced foreground boundary pixels, traces each
/// component's outer boundary, and flood-fills the component so it is
/// never retraced. Returns one polygon per connected component.
pub fn extract_boundaries(grid: &BinaryGrid) -> Vec<Polygon> {
    let mut field = TraceField::from_binary(grid);
    let mut polygons = Vec::new();

    for y in 0..field.height as i64 {
        for x in 0..field.width as i64 {
            if field.get(x, y) != 1 || !field.on_boundary(x, y) {
                continue;
            }
            let trace = trace_boundary(&field, (x, y));
            let points = trace
                .into_iter()
                .map(|(px, py)| Point::new(px as f64, py as f64))
                .collect();
            polygons.push(Polygon::new(points));
            flood_fill_component(&mut field, (x, y));
        }
    }
    polygons
}
