//! The serialized snapshot shape consumed/produced by the save-load layer.

mod common;

use common::*;
use foe_foreman::{BuildingKind, CitySnapshot};

#[test]
fn snapshot_serializes_with_save_format_field_names() {
    let mut city = city_with((20, 20), &[(hut(), 5, 5)]);
    assert!(city.place_road(8, 8));
    assert!(city.place_wide_road(10, 10));

    let json = serde_json::to_value(city.snapshot()).unwrap();
    for key in [
        "buildings",
        "roads",
        "wideRoads",
        "unlockedAreas",
        "buildingPool",
        "gridWidth",
        "gridHeight",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["gridWidth"], 20);
    assert_eq!(json["roads"].as_array().unwrap().len(), 5);
    assert_eq!(json["wideRoads"].as_array().unwrap().len(), 1);
    assert_eq!(json["buildings"][0]["type"], "townhall");
}

#[test]
fn snapshot_json_round_trip() {
    let mut city = city_with(
        (20, 20),
        &[(template("statue", BuildingKind::Roadless, 1, 1, false), 7, 7)],
    );
    assert!(city.add_expansion(21, 2));
    let snap = city.snapshot();

    let json = serde_json::to_string(&snap).unwrap();
    let back: CitySnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn missing_optional_fields_default() {
    // Older saves carry neither wideRoads nor unlockedAreas nor a pool.
    let json = r#"{
        "buildings": [],
        "roads": [],
        "gridWidth": 16,
        "gridHeight": 16
    }"#;
    let snap: CitySnapshot = serde_json::from_str(json).unwrap();
    assert!(snap.wide_roads.is_empty());
    assert!(snap.unlocked_areas.is_empty());
    assert!(snap.building_pool.is_empty());
    assert_eq!(snap.grid_width, 16);
}
