//! Building records and the template catalogue.
//!
//! A `BuildingTemplate` is a catalogue entry (no position); a `Building` is a
//! placed or pooled instance stamped from one. The optional aggregates
//! (`boosts`, `items`, `efficiency`, ...) default to empty/absent and only
//! appear on instances whose source data carried them.

use crate::location::Location;
use crate::session::CityType;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// Building classification. Serialized names match the game-export strings;
/// the Quantum Incursion database calls culture buildings "lifesupport".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Townhall,
    Residential,
    Goods,
    #[serde(alias = "lifesupport")]
    Culture,
    Production,
    Military,
    Great,
    Event,
    MainBuilding,
    Impediment,
    Roadless,
    Unknown,
}

impl BuildingKind {
    /// Town hall / main building: the unique anchor building of a city slot.
    /// Never deleted or duplicated.
    pub fn is_townhall_class(self) -> bool {
        matches!(self, BuildingKind::Townhall | BuildingKind::MainBuilding)
    }
}

/// A production/defense boost carried by some event buildings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub kind: String,
    pub value: f64,
}

/// Imported efficiency-rating figures (display/grouping only).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyStats {
    pub total: f64,
    pub per_tile: f64,
}

fn default_needs_road() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

/// A building instance, either placed on a grid (valid `x`, `y`) or held in
/// a city's pool (coordinates ignored until re-placed).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub name: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: BuildingKind,
    #[serde(default = "default_needs_road", skip_serializing_if = "is_true")]
    pub needs_road: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boosts: Vec<Boost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<EfficiencyStats>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_prod: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
}

impl Building {
    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    pub fn is_townhall_class(&self) -> bool {
        self.kind.is_townhall_class()
    }

    pub fn footprint_contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Footprint cells in row-major order.
    pub fn footprint_cells(&self) -> impl Iterator<Item = Location> + '_ {
        let (x0, y0, w, h) = (self.x, self.y, self.width, self.height);
        (0..h).flat_map(move |dy| (0..w).map(move |dx| Location::from_coords(x0 + dx, y0 + dy)))
    }
}

/// A catalogue entry that placements stamp instances from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingTemplate {
    pub id: String,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: BuildingKind,
    #[serde(default = "default_needs_road")]
    pub needs_road: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boosts: Vec<Boost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_prod: Option<String>,
}

impl BuildingTemplate {
    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    pub fn is_townhall_class(&self) -> bool {
        self.kind.is_townhall_class()
    }

    /// Stamp an instance of this template at the given top-left cell.
    pub fn instantiate(&self, x: i32, y: i32) -> Building {
        Building {
            id: self.id.clone(),
            x,
            y,
            width: self.width,
            height: self.height,
            name: self.name.clone(),
            color: self.color.clone(),
            kind: self.kind,
            needs_road: self.needs_road,
            age: self.age.clone(),
            boosts: self.boosts.clone(),
            efficiency: None,
            items: Vec::new(),
            current_prod: self.current_prod.clone(),
            expiration: None,
        }
    }
}

/// The building catalogue. Content databases (the game's static data tables)
/// are inserted by the caller; only the town-hall-class seed templates are
/// built in so an empty city slot can always synthesize its anchor building.
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    templates: FnvHashMap<String, BuildingTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        TemplateCatalog {
            templates: FnvHashMap::default(),
        }
    }

    /// Catalogue pre-loaded with the default town-hall-class templates.
    pub fn with_defaults() -> Self {
        let mut catalog = TemplateCatalog::new();
        catalog.insert(BuildingTemplate {
            id: "town_hall".to_string(),
            name: "Town Hall".to_string(),
            width: 3,
            height: 3,
            color: "#E8D679".to_string(),
            kind: BuildingKind::Townhall,
            needs_road: false,
            age: None,
            boosts: Vec::new(),
            current_prod: None,
        });
        catalog.insert(BuildingTemplate {
            id: "qi_main_hall".to_string(),
            name: "Main Hall".to_string(),
            width: 3,
            height: 3,
            color: "#E8D679".to_string(),
            kind: BuildingKind::MainBuilding,
            needs_road: false,
            age: None,
            boosts: Vec::new(),
            current_prod: None,
        });
        catalog
    }

    /// Insert a template, rejecting degenerate footprints.
    /// Returns false (and leaves the catalogue unchanged) if width or height < 1.
    pub fn insert(&mut self, template: BuildingTemplate) -> bool {
        if template.width < 1 || template.height < 1 {
            return false;
        }
        self.templates.insert(template.id.clone(), template);
        true
    }

    pub fn get(&self, id: &str) -> Option<&BuildingTemplate> {
        self.templates.get(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingTemplate> {
        self.templates.values()
    }

    /// The default anchor-building template for a city type:
    /// the Quantum Incursion slot seeds a main building, all others a town hall.
    pub fn default_seed(&self, city_type: CityType) -> Option<&BuildingTemplate> {
        let want = if city_type == CityType::Quantum {
            BuildingKind::MainBuilding
        } else {
            BuildingKind::Townhall
        };
        self.templates.values().find(|t| t.kind == want)
    }
}
