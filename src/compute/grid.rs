//! Flat row-major terrain grid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::MAX_TERRAINS;

/// Terrain type identifier, always in `0..terrains` of its grid.
pub type Terrain = u8;

/// Errors building a grid from external data.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid size must be non-zero")]
    EmptyGrid,
    #[error("Terrain count must be between 1 and 36, got {0}")]
    InvalidTerrainCount(u8),
    #[error("Expected {expected} cells, got {actual}")]
    CellCount { expected: usize, actual: usize },
    #[error("Cell {index} holds terrain {value}, outside 0..{terrains}")]
    InvalidTerrain {
        index: usize,
        value: Terrain,
        terrains: u8,
    },
    #[error("Row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("Unrecognized terrain digit {0:?}")]
    InvalidDigit(char),
}

/// A square map of terrain identifiers stored row-major.
///
/// `cells[row * size + col]` holds the terrain at `(row, col)`. The cell count
/// is fixed at `size * size` for the grid's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    size: usize,
    terrains: u8,
    cells: Vec<Terrain>,
}

impl TerrainGrid {
    /// Create a grid with every cell set to terrain 0.
    ///
    /// Panics unless `terrains` is in `1..=MAX_TERRAINS`.
    pub fn new(size: usize, terrains: u8) -> Self {
        assert!(
            terrains > 0 && terrains <= MAX_TERRAINS,
            "terrain count must be between 1 and {MAX_TERRAINS}, got {terrains}"
        );
        Self {
            size,
            terrains,
            cells: vec![0; size * size],
        }
    }

    /// Build a grid from row-major cells, checking shape and values.
    pub fn from_cells(size: usize, terrains: u8, cells: Vec<Terrain>) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::EmptyGrid);
        }
        if terrains == 0 || terrains > MAX_TERRAINS {
            return Err(GridError::InvalidTerrainCount(terrains));
        }
        if cells.len() != size * size {
            return Err(GridError::CellCount {
                expected: size * size,
                actual: cells.len(),
            });
        }
        if let Some((index, &value)) = cells.iter().enumerate().find(|&(_, &v)| v >= terrains) {
            return Err(GridError::InvalidTerrain {
                index,
                value,
                terrains,
            });
        }

        Ok(Self {
            size,
            terrains,
            cells,
        })
    }

    /// Side length in cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of terrain types this grid draws from.
    #[inline]
    pub fn terrains(&self) -> u8 {
        self.terrains
    }

    /// Total cell count (`size * size`).
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert (row, col) coordinates to flat index.
    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.size && col < self.size);
        row * self.size + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Terrain {
        self.cells[self.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, terrain: Terrain) {
        let idx = self.idx(row, col);
        self.set_index(idx, terrain);
    }

    /// Write a cell by flat index.
    #[inline]
    pub fn set_index(&mut self, index: usize, terrain: Terrain) {
        debug_assert!(terrain < self.terrains);
        self.cells[index] = terrain;
    }

    /// Row-major cell slice.
    #[inline]
    pub fn cells(&self) -> &[Terrain] {
        &self.cells
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Terrain]> {
        self.cells.chunks(self.size)
    }

    /// Coordinates of every cell holding `terrain`, in row-major order.
    pub fn positions(&self, terrain: Terrain) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(move |&(_, &t)| t == terrain)
            .map(move |(i, _)| (i / size, i % size))
    }

    /// Number of cells holding `terrain`.
    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|&&t| t == terrain).count()
    }

    /// Check the cell count and that every value is a valid terrain.
    pub fn is_valid(&self) -> bool {
        self.cells.len() == self.size * self.size && self.cells.iter().all(|&t| t < self.terrains)
    }
}

impl fmt::Display for TerrainGrid {
    /// One line per row, one digit per cell, no separators.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &terrain in row {
                let digit = char::from_digit(terrain as u32, MAX_TERRAINS as u32).ok_or(fmt::Error)?;
                write!(f, "{digit}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl TerrainGrid {
    /// Parse the dump format with a known terrain count.
    ///
    /// Unlike `FromStr`, this keeps terrains that do not occur in the text.
    pub fn parse_with_terrains(s: &str, terrains: u8) -> Result<Self, GridError> {
        let (size, cells) = parse_rows(s)?;
        Self::from_cells(size, terrains, cells)
    }
}

impl FromStr for TerrainGrid {
    type Err = GridError;

    /// Parse the dump format back into a grid.
    ///
    /// The terrain count is inferred as one past the largest digit seen, so a
    /// grid that never uses its highest terrains parses back with fewer. Use
    /// [`TerrainGrid::parse_with_terrains`] to keep the original count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (size, cells) = parse_rows(s)?;
        let terrains = cells.iter().copied().max().unwrap_or(0) + 1;
        Self::from_cells(size, terrains, cells)
    }
}

/// Split dump text into a side length and row-major cells.
fn parse_rows(s: &str) -> Result<(usize, Vec<Terrain>), GridError> {
    let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let size = rows.len();
    if size == 0 {
        return Err(GridError::EmptyGrid);
    }

    let mut cells = Vec::with_capacity(size * size);
    for (row, line) in rows.iter().enumerate() {
        let len = line.chars().count();
        if len != size {
            return Err(GridError::RaggedRow {
                row,
                len,
                expected: size,
            });
        }
        for c in line.chars() {
            let value = c
                .to_digit(MAX_TERRAINS as u32)
                .ok_or(GridError::InvalidDigit(c))?;
            cells.push(value as Terrain);
        }
    }
    Ok((size, cells))
}
