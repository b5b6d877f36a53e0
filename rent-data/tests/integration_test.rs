//! Integration tests for loading suburb directories from the fixture files.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rent_data::{DirectoryFormat, DirectoryLoadError, load_from_file, load_from_str};
use rust_decimal_macros::dec;

const SUBURBS_CSV: &str = include_str!("../test-data/suburbs.csv");

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join(name)
}

#[test]
fn test_load_descriptive_csv_file() {
    let directory = load_from_file(fixture("suburbs.csv")).unwrap();

    assert_eq!(directory.len(), 12);
    let soweto = directory.resolve("Soweto", None).unwrap();
    assert_eq!(soweto.town, "Johannesburg");
    assert_eq!(soweto.distance_km, dec!(50));
}

#[test]
fn test_load_census_csv_file() {
    let directory = load_from_file(fixture("suburbs_census.csv")).unwrap();

    let khayelitsha = directory.resolve("khayelitsha", None).unwrap();
    assert_eq!(khayelitsha.municipality, "City of Cape Town");
    assert_eq!(khayelitsha.province, "Western Cape");
    assert_eq!(khayelitsha.distance_km, dec!(1400));
}

#[test]
fn test_load_json_file_with_mixed_schemas() {
    let directory = load_from_file(fixture("suburbs.json")).unwrap();

    assert_eq!(directory.len(), 3);
    assert_eq!(
        directory.resolve("Tembisa", None).map(|s| s.distance_km),
        Some(dec!(45.5))
    );
    assert_eq!(
        directory.resolve("Riverside", None).map(|s| s.town.as_str()),
        Some("Nelspruit")
    );
}

#[test]
fn test_search_over_loaded_directory() {
    let directory = load_from_str(SUBURBS_CSV, DirectoryFormat::Csv).unwrap();

    let names: Vec<_> = directory
        .search("san")
        .into_iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["Sandton", "Sandown"]);

    let riversides = directory.search("riverside");
    assert_eq!(riversides.len(), 2);
    assert_eq!(riversides[1].town, "Pietermaritzburg");
}

#[test]
fn test_missing_file() {
    let err = load_from_file(fixture("does_not_exist.csv")).unwrap_err();

    assert!(matches!(err, DirectoryLoadError::Io { .. }), "got {err:?}");
}

#[test]
fn test_unsupported_extension() {
    let err = load_from_file(fixture("suburbs.txt")).unwrap_err();

    assert!(
        matches!(err, DirectoryLoadError::UnsupportedFormat(ref ext) if ext == "txt"),
        "got {err:?}"
    );
}
