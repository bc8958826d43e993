//! Grid-backed felt/hole lookup.
//!
//! Cells are stored in row-major order: index = y * width + x.
//! Points outside the grid are neither felt nor hole.

use glam::Vec2;

use super::FeltProvider;

/// What lies under one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeltCell {
    #[default]
    Felt,
    Hole,
    /// Cushion or frame. Not felt, not a pocket.
    Rail,
}

/// Uniform grid over the table surface.
#[derive(Debug, Clone)]
pub struct FeltGrid {
    pub width: u32,
    pub height: u32,
    /// Size of each cell in world units.
    pub cell_size: f32,
    /// World position of cell (0, 0)'s top-left corner.
    pub origin: Vec2,
    cells: Vec<FeltCell>,
}

impl FeltGrid {
    /// Create a grid covered entirely in felt.
    pub fn new(width: u32, height: u32, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin: Vec2::ZERO,
            cells: vec![FeltCell::Felt; width as usize * height as usize],
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Grid coordinates for a world point, or `None` outside the grid.
    pub fn cell_at(&self, p: Vec2) -> Option<(u32, u32)> {
        if self.cell_size <= 0.0 {
            return None;
        }
        let local = (p - self.origin) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (x, y) = (local.x as u32, local.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((x, y))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Option<FeltCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(self.index(x, y)).copied()
    }

    pub fn set(&mut self, x: u32, y: u32, cell: FeltCell) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.cells[i] = cell;
        }
    }

    /// Fill a rectangular region of cells.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, cell: FeltCell) {
        for cy in y..y.saturating_add(h).min(self.height) {
            for cx in x..x.saturating_add(w).min(self.width) {
                let i = self.index(cx, cy);
                self.cells[i] = cell;
            }
        }
    }

    /// Mark every cell whose center lies within `radius` of `center`.
    pub fn carve_circle(&mut self, center: Vec2, radius: f32, cell: FeltCell) {
        let r2 = radius * radius;
        for cy in 0..self.height {
            for cx in 0..self.width {
                let c = self.origin
                    + (Vec2::new(cx as f32, cy as f32) + Vec2::splat(0.5)) * self.cell_size;
                if c.distance_squared(center) <= r2 {
                    let i = self.index(cx, cy);
                    self.cells[i] = cell;
                }
            }
        }
    }

    fn lookup(&self, p: Vec2) -> Option<FeltCell> {
        let (x, y) = self.cell_at(p)?;
        self.get(x, y)
    }
}

impl FeltProvider for FeltGrid {
    fn is_felt(&self, p: Vec2) -> bool {
        self.lookup(p) == Some(FeltCell::Felt)
    }

    fn is_hole(&self, p: Vec2) -> bool {
        self.lookup(p) == Some(FeltCell::Hole)
    }
}
