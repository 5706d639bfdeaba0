use bitflags::*;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Occupancy flags for one cell of the optimizer's logical grid.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        const FREE = 0;
        const BUILDING = 1;
        const ROAD = 2;
    }
}

/// An unlocked expansion rectangle. `length` is the vertical extent
/// (the field name the game's export format uses for height).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub length: i32,
}

impl Expansion {
    pub fn new(x: i32, y: i32, width: i32, length: i32) -> Self {
        Expansion {
            x,
            y,
            width,
            length,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.length
    }
}

/// A W×H array of per-cell data, indexed in local (offset-free) coordinates.
#[derive(Clone)]
pub struct CellGrid<T: Copy> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy> CellGrid<T> {
    pub fn new(width: usize, height: usize, initial: T) -> Self {
        CellGrid {
            width,
            height,
            data: vec![initial; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        &mut self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        *self.get_mut(x, y) = value;
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        self.data.iter().enumerate().map(|(i, v)| {
            let x = i % self.width;
            let y = i / self.width;
            ((x, y), v)
        })
    }
}

/// Neighbor offsets for 4-directional (cardinal) movement, in the scan order
/// the road search expands cells. Changing this order changes which of several
/// equal-length road spurs the optimizer picks.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_grid_indexing() {
        let mut grid = CellGrid::new(4, 3, 0u8);
        grid.set(3, 2, 9);
        assert_eq!(*grid.get(3, 2), 9);
        assert_eq!(*grid.get(0, 0), 0);
        assert!(grid.in_bounds(3, 2));
        assert!(!grid.in_bounds(4, 0));
        assert!(!grid.in_bounds(-1, 0));
        assert_eq!(grid.iter().count(), 12);
    }

    #[test]
    fn expansion_contains() {
        let area = Expansion::new(-4, 0, 4, 4);
        assert!(area.contains(-4, 0));
        assert!(area.contains(-1, 3));
        assert!(!area.contains(0, 0));
        assert!(!area.contains(-5, 2));
    }
}
