use serde::{Deserialize, Serialize};

use crate::types::Cell;

/// Fixed-size, row-major grid of optional cells. `None` is an empty cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<Cell>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![None; width * height] }
    }

    #[inline]
    pub fn width(&self) -> usize { self.width }
    #[inline]
    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside {}x{}", self.width, self.height);
        y * self.width + x
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells[self.idx(x, y)].as_ref()
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Option<Cell>) {
        let i = self.idx(x, y);
        self.cells[i] = cell;
    }

    /// Moves the cell out of the grid, leaving it empty.
    pub fn take(&mut self, x: usize, y: usize) -> Option<Cell> {
        let i = self.idx(x, y);
        self.cells[i].take()
    }

    pub fn is_empty(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_none()
    }

    /// Non-empty cells as `(index, x, y, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize, &Cell)> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.as_ref().map(|cell| (i, i % w, i / w, cell)))
    }

    pub fn horz_wall(&mut self, x: usize, y: usize, len: usize) {
        for dx in 0..len {
            self.set(x + dx, y, Some(Cell::Wall));
        }
    }

    pub fn vert_wall(&mut self, x: usize, y: usize, len: usize) {
        for dy in 0..len {
            self.set(x, y + dy, Some(Cell::Wall));
        }
    }

    /// Walls along the border of the `w`x`h` rectangle anchored at (x, y).
    pub fn wall_rect(&mut self, x: usize, y: usize, w: usize, h: usize) {
        if w == 0 || h == 0 {
            return;
        }
        self.horz_wall(x, y, w);
        self.horz_wall(x, y + h - 1, w);
        self.vert_wall(x, y, h);
        self.vert_wall(x + w - 1, y, h);
    }

    /// `[h][w]` array of `(kind, color, state)` triples; empty cells encode as `Empty`.
    pub fn encode(&self) -> Vec<Vec<[u8; 3]>> {
        let empty = [crate::types::CellKind::Empty as u8, 0, 0];
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|c| c.as_ref().map_or(empty, Cell::encode)).collect())
            .collect()
    }
}
