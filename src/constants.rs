use crate::session::CityType;

pub const MIN_GRID_SIZE: i32 = 10;
pub const MAX_GRID_SIZE: i32 = 200;
pub const DEFAULT_GRID_SIZE: i32 = 20;

/// Side length of a single unlockable expansion block, in cells.
pub const EXPANSION_SIZE: i32 = 4;

/// Default grid dimensions (width, height) for a freshly initialized city slot.
pub fn default_grid_size(city_type: CityType) -> (i32, i32) {
    match city_type {
        CityType::Main => (20, 20),
        CityType::Settlement => (20, 20),
        CityType::Colony => (20, 20),
        CityType::Quantum => (12, 16),
    }
}
