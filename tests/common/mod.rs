//! Shared builders for integration tests.
#![allow(dead_code)]

use foe_foreman::{BuildingKind, BuildingTemplate, CityState, Location};

pub fn template(id: &str, kind: BuildingKind, w: i32, h: i32, needs_road: bool) -> BuildingTemplate {
    BuildingTemplate {
        id: id.to_string(),
        name: id.to_string(),
        width: w,
        height: h,
        color: "#5F8DC3".to_string(),
        kind,
        needs_road,
        age: None,
        boosts: Vec::new(),
        current_prod: None,
    }
}

pub fn town_hall() -> BuildingTemplate {
    template("town_hall", BuildingKind::Townhall, 3, 3, false)
}

pub fn hut() -> BuildingTemplate {
    template("hut", BuildingKind::Residential, 2, 2, true)
}

/// A city with a town hall at the origin and the given extra buildings placed.
pub fn city_with(grid: (i32, i32), buildings: &[(BuildingTemplate, i32, i32)]) -> CityState {
    let mut city = CityState::new(grid.0, grid.1);
    assert!(city.place_building(town_hall().instantiate(0, 0)));
    for (t, x, y) in buildings {
        assert!(city.place_building(t.instantiate(*x, *y)), "placing {}", t.id);
    }
    city
}

/// Every placed non-town-hall building must touch a road cell or the town
/// hall footprint, and every road cell must be reachable from the town hall's
/// adjacency ring through road cells alone.
pub fn assert_connected(city: &CityState) {
    let th = city
        .buildings()
        .iter()
        .find(|b| b.is_townhall_class())
        .expect("town hall present");

    for b in city.buildings().iter().filter(|b| !b.is_townhall_class()) {
        let mut touches = false;
        'scan: for cell in b.footprint_cells() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let (nx, ny) = (cell.x() + dx, cell.y() + dy);
                if b.footprint_contains(nx, ny) {
                    continue;
                }
                if city.is_road_at(nx, ny) || th.footprint_contains(nx, ny) {
                    touches = true;
                    break 'scan;
                }
            }
        }
        assert!(touches, "building {} has no road/town-hall contact", b.name);
    }

    // Flood the road set from cells adjacent to the town hall.
    let mut reached: Vec<Location> = Vec::new();
    let mut queue: Vec<Location> = city
        .roads()
        .iter()
        .copied()
        .filter(|r| {
            th.footprint_cells()
                .any(|c| c.manhattan_distance_to(*r) == 1)
        })
        .collect();
    reached.extend(queue.iter().copied());
    while let Some(cell) = queue.pop() {
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let next = Location::from_coords(cell.x() + dx, cell.y() + dy);
            if city.roads().contains(&next) && !reached.contains(&next) {
                reached.push(next);
                queue.push(next);
            }
        }
    }
    assert_eq!(
        reached.len(),
        city.roads().len(),
        "road set contains islands not connected to the town hall"
    );
}

/// No two building footprints overlap and no footprint covers a road cell.
pub fn assert_exclusive(city: &CityState) {
    let buildings = city.buildings();
    for (i, a) in buildings.iter().enumerate() {
        for b in &buildings[i + 1..] {
            let disjoint = a.x + a.width <= b.x
                || b.x + b.width <= a.x
                || a.y + a.height <= b.y
                || b.y + b.height <= a.y;
            assert!(disjoint, "{} overlaps {}", a.name, b.name);
        }
        for cell in a.footprint_cells() {
            assert!(
                !city.roads().contains(&cell),
                "{} overlaps a road at {}",
                a.name,
                cell
            );
        }
    }
}
