//! Multi-city session: independent city slots, the active-slot pointer and
//! the interaction state that must not leak across slot switches.

use crate::building::TemplateCatalog;
use crate::city::{CitySnapshot, CityState};
use crate::constants::default_grid_size;
use crate::location::Location;
use crate::optimizer::{OptimizeReport, Optimizer};
use fnv::FnvHashMap;
use log::warn;
use serde::{Deserialize, Serialize};

/// The four independent city slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityType {
    Main,
    Settlement,
    Colony,
    Quantum,
}

impl CityType {
    pub const ALL: [CityType; 4] = [
        CityType::Main,
        CityType::Settlement,
        CityType::Colony,
        CityType::Quantum,
    ];
}

/// The active placement tool.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    PlaceRoad,
    PlaceWideRoad,
    PlaceExpansion,
    /// Placement mode for the template with this catalogue id.
    PlaceBuilding(String),
}

/// What is currently selected on the canvas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Building(usize),
    Road(Location),
}

/// Owns the active `CityState`, one parked snapshot per inactive slot, the
/// template catalogue and the optimizer. Interaction state (tool, selection)
/// is reset on every slot switch.
pub struct Session {
    active: CityType,
    slots: FnvHashMap<CityType, CitySnapshot>,
    city: CityState,
    catalog: TemplateCatalog,
    optimizer: Optimizer,
    tool: Tool,
    selection: Selection,
}

impl Session {
    pub fn new(catalog: TemplateCatalog) -> Self {
        let mut session = Session {
            active: CityType::Main,
            slots: FnvHashMap::default(),
            city: CityState::new(1, 1),
            catalog,
            optimizer: Optimizer::new(),
            tool: Tool::Select,
            selection: Selection::None,
        };
        session.init_empty_slot();
        session
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn active_city_type(&self) -> CityType {
        self.active
    }

    pub fn city(&self) -> &CityState {
        &self.city
    }

    pub fn city_mut(&mut self) -> &mut CityState {
        &mut self.city
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TemplateCatalog {
        &mut self.catalog
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// True if the given inactive slot (or the active city) has any buildings.
    pub fn slot_has_buildings(&self, city_type: CityType) -> bool {
        if city_type == self.active {
            !self.city.buildings().is_empty()
        } else {
            self.slots
                .get(&city_type)
                .map(|s| !s.buildings.is_empty())
                .unwrap_or(false)
        }
    }

    // ------------------------------------------------------------------
    // Interaction
    // ------------------------------------------------------------------

    /// Apply the active tool at a grid cell. Returns true if state changed.
    pub fn apply_tool_at(&mut self, x: i32, y: i32) -> bool {
        match self.tool.clone() {
            Tool::Select => self.select_at(x, y),
            Tool::PlaceRoad => self.city.place_road(x, y),
            Tool::PlaceWideRoad => self.city.place_wide_road(x, y),
            Tool::PlaceExpansion => self.city.add_expansion(x, y),
            Tool::PlaceBuilding(id) => self.place_building(&id, x, y),
        }
    }

    /// Select the building, else the road, else nothing at (x, y).
    /// Returns true if something was selected.
    pub fn select_at(&mut self, x: i32, y: i32) -> bool {
        if let Some(index) = self.city.building_index_at(x, y) {
            self.selection = Selection::Building(index);
            return true;
        }
        let loc = Location::from_coords(x, y);
        if self.city.roads().contains(&loc) {
            self.selection = Selection::Road(loc);
            return true;
        }
        self.selection = Selection::None;
        false
    }

    /// Place a catalogue template at (x, y). Placing a town-hall-class
    /// building exits placement mode after success (only one is allowed).
    pub fn place_building(&mut self, template_id: &str, x: i32, y: i32) -> bool {
        let Some(template) = self.catalog.get(template_id) else {
            return false;
        };
        let townhall_class = template.is_townhall_class();
        let placed = self.city.place_building(template.instantiate(x, y));
        if placed && townhall_class {
            self.tool = Tool::Select;
        }
        placed
    }

    /// Move a building to the pool, deselecting it if it was selected.
    pub fn move_to_pool(&mut self, index: usize) -> bool {
        if !self.city.move_to_pool(index) {
            return false;
        }
        self.fix_selection_after_removal(index);
        true
    }

    /// Delete a building (town-hall-class buildings are stashed to the pool
    /// by the engine instead of being discarded).
    pub fn delete_building(&mut self, index: usize) -> bool {
        if index >= self.city.buildings().len() {
            return false;
        }
        self.city.delete_building(index);
        self.fix_selection_after_removal(index);
        true
    }

    /// Remove the road (or whole wide-road block) at (x, y), clearing the
    /// road selection if it pointed into the removed cells.
    pub fn remove_road_at(&mut self, x: i32, y: i32) {
        let anchor = self.city.wide_road_anchor_at(x, y);
        self.city.remove_road_at(x, y);
        if let Selection::Road(sel) = self.selection {
            let cleared = match anchor {
                Some(a) => {
                    sel.x() >= a.x()
                        && sel.x() < a.x() + 2
                        && sel.y() >= a.y()
                        && sel.y() < a.y() + 2
                }
                None => sel == Location::from_coords(x, y),
            };
            if cleared {
                self.selection = Selection::None;
            }
        }
    }

    fn fix_selection_after_removal(&mut self, removed: usize) {
        if let Selection::Building(i) = self.selection {
            if i == removed {
                self.selection = Selection::None;
            } else if i > removed {
                self.selection = Selection::Building(i - 1);
            }
        }
    }

    // ------------------------------------------------------------------
    // Slot management
    // ------------------------------------------------------------------

    /// Switch to another city slot, parking the current one first.
    ///
    /// Interaction state and the optimizer undo snapshot are dropped so
    /// nothing from one slot can act on another.
    pub fn switch_city(&mut self, city_type: CityType) {
        if city_type == self.active {
            return;
        }
        self.slots.insert(self.active, self.city.snapshot());
        self.active = city_type;
        self.reset_interaction();
        self.optimizer.clear_snapshot();
        let snap = self.slots.get(&city_type).cloned();
        self.restore_snapshot(snap);
    }

    /// Capture the active slot's state.
    pub fn snapshot(&self) -> CitySnapshot {
        self.city.snapshot()
    }

    /// Restore the active slot from a snapshot, or reset it to a fresh empty
    /// slot when None. Either way the slot ends up with exactly one
    /// town-hall-class building across grid and pool.
    pub fn restore_snapshot(&mut self, snap: Option<CitySnapshot>) {
        match snap {
            Some(snap) => {
                self.city = CityState::from_snapshot(snap);
                self.ensure_townhall();
            }
            None => self.init_empty_slot(),
        }
        self.reset_interaction();
    }

    /// Empty the active slot, re-seeding the default anchor building.
    /// Grid dimensions and unlocked areas survive; only buildings, roads
    /// and the pool are cleared.
    pub fn clear_all(&mut self) {
        self.city.clear_contents();
        self.place_default_townhall();
        self.optimizer.clear_snapshot();
        self.reset_interaction();
    }

    fn init_empty_slot(&mut self) {
        let (w, h) = default_grid_size(self.active);
        self.city = CityState::new(w, h);
        self.place_default_townhall();
    }

    /// Synthesize the default town hall / main building at the origin if the
    /// slot has none (fresh slots and legacy saves predating the invariant).
    fn ensure_townhall(&mut self) {
        if self.city.townhall_count() == 0 {
            self.place_default_townhall();
        }
    }

    fn place_default_townhall(&mut self) {
        let Some(seed) = self.catalog.default_seed(self.active) else {
            warn!("no default town-hall template for {:?}", self.active);
            return;
        };
        let building = seed.instantiate(0, 0);
        if !self.city.place_building(building.clone()) {
            // Origin is blocked (legacy save). The invariant still wants the
            // anchor building to exist, so it goes to the pool.
            self.city.stash_in_pool(building);
        }
    }

    fn reset_interaction(&mut self) {
        self.tool = Tool::Select;
        self.selection = Selection::None;
    }

    // ------------------------------------------------------------------
    // Optimizer
    // ------------------------------------------------------------------

    /// Re-derive a compact, fully road-connected layout for the active city.
    /// `progress` is the cooperative checkpoint: called with (percent, text)
    /// between placements so a host UI can repaint.
    pub fn optimize(
        &mut self,
        progress: &mut dyn FnMut(u8, &str),
    ) -> Result<OptimizeReport, String> {
        self.selection = Selection::None;
        self.optimizer.run(&mut self.city, progress)
    }

    /// Restore the exact pre-optimize state. Returns false if there is no
    /// snapshot to undo to.
    pub fn undo_optimize(&mut self) -> bool {
        self.selection = Selection::None;
        self.optimizer.undo(&mut self.city)
    }

    pub fn can_undo_optimize(&self) -> bool {
        self.optimizer.can_undo()
    }
}
