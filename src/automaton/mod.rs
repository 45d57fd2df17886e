// src/automaton/mod.rs

//! Cellular-automaton engine shared by decoration, path growth and lake carving.
//!
//! Grids are local to one room: `(0, 0)` is the room's bottom-left cell. Each
//! iteration reads the previous grid and writes a fresh one, so a step never
//! observes its own partial output.

use crate::theme::CaParams;
use crate::utils::{Cell, DungeonRng};
use log::debug;
use std::collections::BTreeSet;

/// Dense boolean grid. Cells outside the grid read as dead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl CellGrid {
    pub fn new(width: usize, height: usize) -> Self {
        CellGrid {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = alive;
        }
    }

    /// Live cells among the eight Moore neighbours.
    pub fn live_neighbors(&self, x: usize, y: usize) -> u8 {
        let (x, y) = (x as i64, y as i64);
        let mut count = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if (dx != 0 || dy != 0) && self.get(x + dx, y + dy) {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn count_live(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// Live cells translated to world space by `origin`, in set order.
    pub fn live_cells(&self, origin: Cell) -> BTreeSet<Cell> {
        let mut out = BTreeSet::new();
        for x in 0..self.width {
            for y in 0..self.height {
                if self.cells[y * self.width + x] {
                    out.insert(origin.offset(x as i32, y as i32));
                }
            }
        }
        out
    }
}

/// Survive/birth thresholds and iteration count for one call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaRules {
    pub survive_min: u8,
    pub birth_min: u8,
    pub iterations: u32,
}

impl From<CaParams> for CaRules {
    fn from(params: CaParams) -> Self {
        CaRules {
            survive_min: params.survive_min,
            birth_min: params.birth_min,
            iterations: params.iterations,
        }
    }
}

/// One generation: a live cell survives with at least `survive_min` live
/// neighbours, a dead one is born with at least `birth_min`.
pub fn step(grid: &CellGrid, rules: &CaRules) -> CellGrid {
    let mut next = CellGrid::new(grid.width, grid.height);
    for x in 0..grid.width {
        for y in 0..grid.height {
            let n = grid.live_neighbors(x, y);
            let alive = if grid.get(x as i64, y as i64) {
                n >= rules.survive_min
            } else {
                n >= rules.birth_min
            };
            next.set(x, y, alive);
        }
    }
    next
}

/// Seeds a `width` x `height` grid with `seed_fn(x, y)` (x outer, y inner) and
/// runs `rules.iterations` steps.
pub fn simulate<F>(width: usize, height: usize, mut seed_fn: F, rules: &CaRules) -> CellGrid
where
    F: FnMut(usize, usize) -> bool,
{
    let mut grid = CellGrid::new(width, height);
    for x in 0..width {
        for y in 0..height {
            grid.set(x, y, seed_fn(x, y));
        }
    }
    debug!(
        "CA {}x{} seeded with {} live cells, {} iterations",
        width,
        height,
        grid.count_live(),
        rules.iterations
    );
    for _ in 0..rules.iterations {
        grid = step(&grid, rules);
    }
    grid
}

/// Every cell alive with probability `density`.
pub fn uniform(rng: &mut DungeonRng, density: f64) -> impl FnMut(usize, usize) -> bool + '_ {
    move |_, _| rng.next_f64() < density
}

/// Like [`uniform`], but cells within `margin` of the grid edge start dead.
pub fn bordered(
    rng: &mut DungeonRng,
    density: f64,
    width: usize,
    height: usize,
    margin: usize,
) -> impl FnMut(usize, usize) -> bool + '_ {
    move |x, y| {
        if x < margin || y < margin || x + margin >= width || y + margin >= height {
            false
        } else {
            rng.next_f64() < density
        }
    }
}

/// Density `near` within `radius` of any of `portals` (world cells), `ambient`
/// elsewhere. `origin` maps local grid coordinates to world cells.
pub fn portal_seeded<'a>(
    rng: &'a mut DungeonRng,
    origin: Cell,
    portals: &'a [Cell],
    radius: f64,
    near: f64,
    ambient: f64,
) -> impl FnMut(usize, usize) -> bool + 'a {
    let radius_sq = radius * radius;
    move |x, y| {
        let cell = origin.offset(x as i32, y as i32);
        let close = portals.iter().any(|p| (cell.distance_sq(p) as f64) <= radius_sq);
        let density = if close { near } else { ambient };
        rng.next_f64() < density
    }
}

/// Outcome of [`cleanup_orphans`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub cells: BTreeSet<Cell>,
    /// Cells removed by each pass that ran.
    pub removed_per_pass: Vec<usize>,
}

impl CleanupReport {
    pub fn passes(&self) -> usize {
        self.removed_per_pass.len()
    }

    pub fn total_removed(&self) -> usize {
        self.removed_per_pass.iter().sum()
    }
}

/// Repeatedly drops cells with fewer than `min_neighbors` live Moore neighbours.
/// Stops after a pass that removes nothing or after `max_iterations` passes.
pub fn cleanup_orphans(cells: &BTreeSet<Cell>, min_neighbors: u8, max_iterations: u32) -> CleanupReport {
    let mut current = cells.clone();
    let mut removed_per_pass = Vec::new();

    for _ in 0..max_iterations {
        let orphans: Vec<Cell> = current
            .iter()
            .filter(|c| c.neighbors8().filter(|n| current.contains(n)).count() < min_neighbors as usize)
            .copied()
            .collect();

        removed_per_pass.push(orphans.len());
        if orphans.is_empty() {
            break;
        }
        for c in &orphans {
            current.remove(c);
        }
    }

    debug!(
        "orphan cleanup: {} -> {} cells over {} passes",
        cells.len(),
        current.len(),
        removed_per_pass.len()
    );

    CleanupReport {
        cells: current,
        removed_per_pass,
    }
}
