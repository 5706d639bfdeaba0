//! Automatic layout optimizer.
//!
//! Re-derives a compact, fully road-connected layout from scratch: the town
//! hall is centered, then every road-needing building is placed greedily in
//! descending footprint-area order. Each placement scans candidate top-left
//! positions in row-major order and, at the first position whose footprint is
//! free, searches breadth-first from the footprint's perimeter for the
//! shortest spur to the existing road network or the town hall's adjacency
//! ring. The first successful search commits the building and carves the spur.
//!
//! Largest-first ordering keeps big footprints from being crowded out by
//! small ones; the fixed scan and neighbor orders make the result a pure
//! function of the input building set and grid size.
//!
//! The previous buildings/roads/grid size are snapshotted before any mutation
//! so one level of undo is always exact.

use crate::building::Building;
use crate::city::CityState;
use crate::grid::{CellFlags, CellGrid, NEIGHBORS_4};
use crate::location::Location;
use fnv::FnvHashSet;
use itertools::Itertools;
use log::{debug, warn};
use pathfinding::directed::bfs::bfs;

/// Pre-optimize state for undo. Pool, metadata and unlocked areas are not
/// captured because the optimizer never touches them.
struct OptimizeSnapshot {
    buildings: Vec<Building>,
    roads: FnvHashSet<Location>,
    wide_roads: FnvHashSet<Location>,
    grid_width: i32,
    grid_height: i32,
}

/// What the optimizer did, including everything it could not place.
/// Roadless buildings are not re-placed by this algorithm; they are returned
/// here so the caller can surface them instead of silently dropping them.
#[derive(Clone, Debug, Default)]
pub struct OptimizeReport {
    /// Road-needing buildings successfully placed (town hall not counted).
    pub placed: usize,
    /// Candidates for which no position with a road connection exists.
    pub unplaced: Vec<Building>,
    /// Buildings excluded from placement because they need no road.
    pub skipped_roadless: Vec<Building>,
}

/// Greedy largest-first packer with BFS road-pathing and single-level undo.
///
/// Only one run can be active at a time: `run` takes `&mut self` and `&mut
/// CityState`, so re-entry is excluded statically.
#[derive(Default)]
pub struct Optimizer {
    snapshot: Option<OptimizeSnapshot>,
}

impl Optimizer {
    pub fn new() -> Self {
        Optimizer { snapshot: None }
    }

    pub fn can_undo(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Drop the undo snapshot (slot switch, clear-all).
    pub fn clear_snapshot(&mut self) {
        self.snapshot = None;
    }

    /// Run the optimizer on the given city.
    ///
    /// `progress` is the cooperative checkpoint: it is invoked with
    /// (percent, text) at the start phases and once per candidate building,
    /// never mid-search. Fatal preconditions (no buildings, no town-hall-class
    /// building, town hall does not fit centered) return `Err` with the city
    /// untouched; a building that cannot be placed is logged, recorded in the
    /// report and skipped.
    pub fn run(
        &mut self,
        city: &mut CityState,
        progress: &mut dyn FnMut(u8, &str),
    ) -> Result<OptimizeReport, String> {
        if city.buildings().is_empty() {
            return Err("no buildings to optimize".to_string());
        }
        let Some(town_hall) = city
            .buildings()
            .iter()
            .find(|b| b.is_townhall_class())
            .cloned()
        else {
            return Err("no town hall found to optimize around".to_string());
        };

        progress(0, "Starting optimization");

        let width = city.grid_width();
        let height = city.grid_height();
        let mut grid = CellGrid::new(width as usize, height as usize, CellFlags::FREE);

        let th_x = (width - town_hall.width).div_euclid(2);
        let th_y = (height - town_hall.height).div_euclid(2);
        if !area_free(&grid, th_x, th_y, town_hall.width, town_hall.height) {
            return Err("cannot center the town hall: grid too small".to_string());
        }

        progress(5, "Initializing grid");

        // All preconditions hold; capture the undo snapshot before mutating.
        self.snapshot = Some(OptimizeSnapshot {
            buildings: city.buildings().to_vec(),
            roads: city.roads().clone(),
            wide_roads: city.wide_roads().clone(),
            grid_width: width,
            grid_height: height,
        });

        let mut new_buildings = Vec::with_capacity(city.buildings().len());
        let mut connected_roads: FnvHashSet<Location> = FnvHashSet::default();

        let mut centered = town_hall.clone();
        centered.x = th_x;
        centered.y = th_y;
        mark_area(&mut grid, &centered, CellFlags::BUILDING);
        new_buildings.push(centered.clone());

        // Cells at Manhattan distance 1 from the town hall footprint; reaching
        // any of them terminates a road search.
        let th_ring = adjacency_ring(&centered);

        let mut report = OptimizeReport::default();
        let candidates: Vec<Building> = city
            .buildings()
            .iter()
            .filter(|b| !b.is_townhall_class())
            .filter(|b| {
                if b.needs_road {
                    true
                } else {
                    report.skipped_roadless.push((*b).clone());
                    false
                }
            })
            .cloned()
            .sorted_by_key(|b| std::cmp::Reverse(b.area()))
            .collect();

        let total = candidates.len();
        progress(15, &format!("Placing {total} buildings via BFS"));

        for (i, b) in candidates.iter().enumerate() {
            match place_with_road(&mut grid, &mut connected_roads, &th_ring, b) {
                Some(placed) => {
                    new_buildings.push(placed);
                    report.placed += 1;
                }
                None => {
                    warn!("could not place building: {}", b.name);
                    report.unplaced.push(b.clone());
                }
            }
            // Checkpoint between placements, never mid-search.
            let percent = 15 + (80 * (i + 1) / total.max(1)) as u8;
            progress(percent, &format!("Placing buildings ({}/{total})", i + 1));
        }

        debug!(
            "optimize complete: placed={}, unplaced={}, roadless={}, roads={}",
            report.placed,
            report.unplaced.len(),
            report.skipped_roadless.len(),
            connected_roads.len()
        );

        city.commit_optimized(new_buildings, connected_roads);
        progress(100, "Complete");
        Ok(report)
    }

    /// Restore the exact pre-run state. Single level: the snapshot is
    /// consumed, and the next `run` overwrites whatever was there.
    pub fn undo(&mut self, city: &mut CityState) -> bool {
        let Some(snap) = self.snapshot.take() else {
            return false;
        };
        city.restore_optimized(
            snap.buildings,
            snap.roads,
            snap.wide_roads,
            snap.grid_width,
            snap.grid_height,
        );
        true
    }
}

fn area_free(grid: &CellGrid<CellFlags>, x: i32, y: i32, w: i32, h: i32) -> bool {
    if !grid.in_bounds(x, y) || !grid.in_bounds(x + w - 1, y + h - 1) {
        return false;
    }
    for dy in 0..h {
        for dx in 0..w {
            if *grid.get((x + dx) as usize, (y + dy) as usize) != CellFlags::FREE {
                return false;
            }
        }
    }
    true
}

fn mark_area(grid: &mut CellGrid<CellFlags>, b: &Building, flags: CellFlags) {
    for dy in 0..b.height {
        for dx in 0..b.width {
            grid.set((b.x + dx) as usize, (b.y + dy) as usize, flags);
        }
    }
}

/// Cells edge-adjacent to the building's footprint (the 1-ring minus corners).
fn adjacency_ring(b: &Building) -> FnvHashSet<(i32, i32)> {
    let mut ring = FnvHashSet::default();
    for dx in 0..b.width {
        ring.insert((b.x + dx, b.y - 1));
        ring.insert((b.x + dx, b.y + b.height));
    }
    for dy in 0..b.height {
        ring.insert((b.x - 1, b.y + dy));
        ring.insert((b.x + b.width, b.y + dy));
    }
    ring
}

/// Try every top-left position in row-major order; at the first free
/// footprint, search from its perimeter for a road connection. Commits the
/// footprint and the backtracked road path on the first success.
fn place_with_road(
    grid: &mut CellGrid<CellFlags>,
    connected_roads: &mut FnvHashSet<Location>,
    th_ring: &FnvHashSet<(i32, i32)>,
    b: &Building,
) -> Option<Building> {
    let height = grid.height() as i32;
    let width = grid.width() as i32;

    for (y, x) in itertools::iproduct!(0..height, 0..width) {
        if !area_free(grid, x, y, b.width, b.height) {
            continue;
        }

        // Perimeter edge cells in a fixed order: top/bottom per column,
        // then left/right per row.
        let mut edge_cells = Vec::with_capacity(2 * (b.width + b.height) as usize);
        for dx in 0..b.width {
            edge_cells.push((x + dx, y - 1));
            edge_cells.push((x + dx, y + b.height));
        }
        for dy in 0..b.height {
            edge_cells.push((x - 1, y + dy));
            edge_cells.push((x + b.width, y + dy));
        }

        for (sx, sy) in edge_cells {
            if !grid.in_bounds(sx, sy) || *grid.get(sx as usize, sy as usize) != CellFlags::FREE {
                continue;
            }

            let path = bfs(
                &(sx, sy),
                |&(cx, cy)| {
                    NEIGHBORS_4
                        .iter()
                        .filter_map(|&(dx, dy)| {
                            let (nx, ny) = (cx + dx, cy + dy);
                            if !grid.in_bounds(nx, ny) {
                                return None;
                            }
                            // Free cells are traversable; connected road
                            // cells are admissible terminals (the success
                            // check fires before they would be expanded).
                            let flags = *grid.get(nx as usize, ny as usize);
                            if flags == CellFlags::FREE || flags.contains(CellFlags::ROAD) {
                                Some((nx, ny))
                            } else {
                                None
                            }
                        })
                        .collect::<Vec<_>>()
                },
                |&(cx, cy)| {
                    th_ring.contains(&(cx, cy))
                        || connected_roads.contains(&Location::from_coords(cx, cy))
                },
            );

            if let Some(path) = path {
                let mut placed = b.clone();
                placed.x = x;
                placed.y = y;
                mark_area(grid, &placed, CellFlags::BUILDING);
                for (rx, ry) in path {
                    grid.set(rx as usize, ry as usize, CellFlags::ROAD);
                    connected_roads.insert(Location::from_coords(rx, ry));
                }
                return Some(placed);
            }
        }
    }

    None
}
