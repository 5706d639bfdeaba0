pub mod building;
pub mod city;
pub mod constants;
pub mod grid;
pub mod location;
pub mod optimizer;
pub mod session;

pub use building::{Building, BuildingKind, BuildingTemplate, TemplateCatalog};
pub use city::{CityMetadata, CitySnapshot, CityState};
pub use grid::Expansion;
pub use location::Location;
pub use optimizer::{OptimizeReport, Optimizer};
pub use session::{CityType, Selection, Session, Tool};
